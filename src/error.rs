use thiserror::Error;

/// Errors surfaced by the player store and the progress operations.
#[derive(Debug, Error)]
pub enum GameError {
    /// No record exists for the given player id
    #[error("player {0} not found")]
    NotFound(String),

    /// The database could not be reached or the query failed
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// Input that cannot be stored as-is
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
}

impl GameError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

pub type GameResult<T> = Result<T, GameError>;
