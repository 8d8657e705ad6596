use crate::error::{GameError, GameResult};
use crate::fatigue::clamp_fatigue;
use crate::models::{Player, PlayerUpdate, Progress};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

const PLAYER_COLUMNS: &str =
    "player_id, click_count, fatigue_level, experience_level, experience_amount, last_update_time, created_at";

#[derive(Clone)]
pub struct PlayerRepository {
    pool: SqlitePool,
}

impl PlayerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, player_id: &str) -> GameResult<Player> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut *conn, player_id).await
    }

    /// Create the player with default progress unless a record already exists.
    /// Returns `true` when a new record was created.
    pub async fn register(&self, player_id: &str) -> GameResult<bool> {
        validate_player_id(player_id)?;
        let player = Player::new(player_id.to_string());

        let result = sqlx::query(&format!(
            "INSERT INTO players ({}) VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(player_id) DO NOTHING",
            PLAYER_COLUMNS
        ))
        .bind(&player.player_id)
        .bind(player.click_count)
        .bind(player.fatigue_level)
        .bind(player.experience_level)
        .bind(player.experience_amount)
        .bind(player.last_update_time)
        .bind(player.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Overwrite every gameplay field, creating the record if needed.
    ///
    /// Fatigue is clamped into range; negative counters are rejected.
    pub async fn upsert(&self, player_id: &str, progress: &Progress, at: DateTime<Utc>) -> GameResult<Player> {
        validate_player_id(player_id)?;
        validate_counter("clickCount", progress.click_count)?;
        validate_counter("experienceLevel", progress.experience_level)?;
        validate_counter("experienceAmount", progress.experience_amount)?;
        let fatigue_level = clamp_fatigue(progress.fatigue_level);
        let now = at.timestamp();

        let player = sqlx::query_as::<_, Player>(&format!(
            "INSERT INTO players ({columns}) VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(player_id) DO UPDATE SET
                 click_count = excluded.click_count,
                 fatigue_level = excluded.fatigue_level,
                 experience_level = excluded.experience_level,
                 experience_amount = excluded.experience_amount,
                 last_update_time = excluded.last_update_time
             RETURNING {columns}",
            columns = PLAYER_COLUMNS
        ))
        .bind(player_id)
        .bind(progress.click_count)
        .bind(fatigue_level)
        .bind(progress.experience_level)
        .bind(progress.experience_amount)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(player)
    }

    /// Write only the fields set in `update`.
    pub async fn update_partial(&self, player_id: &str, update: &PlayerUpdate) -> GameResult<()> {
        let mut conn = self.pool.acquire().await?;
        apply_update(&mut *conn, player_id, update).await
    }

    /// Read a player, derive an update from the stored row and write it back
    /// in one transaction. Returns the record as stored afterwards.
    ///
    /// A save committed by another connection cannot slip in between the read
    /// and the write: SQLite makes one side fail with a busy error instead.
    pub async fn update_with<F>(&self, player_id: &str, derive: F) -> GameResult<Player>
    where
        F: FnOnce(&Player) -> PlayerUpdate,
    {
        let mut tx = self.pool.begin().await?;
        let current = fetch(&mut *tx, player_id).await?;
        let update = derive(&current);
        apply_update(&mut *tx, player_id, &update).await?;
        let player = fetch(&mut *tx, player_id).await?;
        tx.commit().await?;
        Ok(player)
    }
}

async fn fetch(conn: &mut SqliteConnection, player_id: &str) -> GameResult<Player> {
    sqlx::query_as::<_, Player>(&format!(
        "SELECT {} FROM players WHERE player_id = ?",
        PLAYER_COLUMNS
    ))
    .bind(player_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| GameError::NotFound(player_id.to_string()))
}

async fn apply_update(conn: &mut SqliteConnection, player_id: &str, update: &PlayerUpdate) -> GameResult<()> {
    if update.is_empty() {
        return fetch(conn, player_id).await.map(|_| ());
    }

    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE players SET ");
    let mut set = builder.separated(", ");
    if let Some(click_count) = update.click_count {
        validate_counter("clickCount", click_count)?;
        set.push("click_count = ").push_bind_unseparated(click_count);
    }
    if let Some(fatigue_level) = update.fatigue_level {
        set.push("fatigue_level = ").push_bind_unseparated(clamp_fatigue(fatigue_level));
    }
    if let Some(experience_level) = update.experience_level {
        validate_counter("experienceLevel", experience_level)?;
        set.push("experience_level = ").push_bind_unseparated(experience_level);
    }
    if let Some(experience_amount) = update.experience_amount {
        validate_counter("experienceAmount", experience_amount)?;
        set.push("experience_amount = ").push_bind_unseparated(experience_amount);
    }
    if let Some(last_update_time) = update.last_update_time {
        set.push("last_update_time = ").push_bind_unseparated(last_update_time);
    }
    builder.push(" WHERE player_id = ").push_bind(player_id.to_string());

    let result = builder.build().execute(&mut *conn).await?;
    if result.rows_affected() == 0 {
        return Err(GameError::NotFound(player_id.to_string()));
    }
    Ok(())
}

fn validate_player_id(player_id: &str) -> GameResult<()> {
    if player_id.trim().is_empty() {
        return Err(GameError::validation("playerId", "must not be empty"));
    }
    Ok(())
}

fn validate_counter(field: &'static str, value: i64) -> GameResult<()> {
    if value < 0 {
        return Err(GameError::validation(field, format!("must be non-negative, got {}", value)));
    }
    Ok(())
}
