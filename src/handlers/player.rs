use crate::AppState;
use crate::db::player::PlayerRepository;
use crate::error::{GameError, GameResult};
use crate::models::{Player, Progress, ProgressPatch};
use crate::progress::{self, Registration};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use std::sync::Arc;

/// POST /api/players/:player_id/register
pub async fn handle_register(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> GameResult<Json<Registration>> {
    let player_repo = PlayerRepository::new(state.db_pool.clone());
    let registration = progress::register(&player_repo, &player_id).await?;
    Ok(Json(registration))
}

/// GET /api/players/:player_id/enter
///
/// First contact from the game page: registers unknown players, then loads.
pub async fn handle_enter(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> GameResult<Json<Player>> {
    tracing::info!("Player {} entered the game", player_id);
    let player_repo = PlayerRepository::new(state.db_pool.clone());
    let player = progress::enter(&player_repo, &player_id, chrono::Utc::now()).await?;
    Ok(Json(player))
}

/// GET /api/players/:player_id
pub async fn handle_load(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> GameResult<Json<Player>> {
    tracing::info!("Received load request for player {}", player_id);
    let player_repo = PlayerRepository::new(state.db_pool.clone());
    let player = progress::load(&player_repo, &player_id, chrono::Utc::now()).await?;
    Ok(Json(player))
}

/// PUT /api/players/:player_id
pub async fn handle_save(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
    body: Result<Json<Progress>, JsonRejection>,
) -> GameResult<Json<Player>> {
    tracing::info!("Received save request for player {}", player_id);
    let Json(body) = body.map_err(|rejection| GameError::validation("body", rejection.body_text()))?;
    let player_repo = PlayerRepository::new(state.db_pool.clone());
    let player = progress::save(&player_repo, &player_id, &body, chrono::Utc::now()).await?;
    Ok(Json(player))
}

/// PATCH /api/players/:player_id
pub async fn handle_update(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
    body: Result<Json<ProgressPatch>, JsonRejection>,
) -> GameResult<Json<Player>> {
    tracing::info!("Received update request for player {}", player_id);
    let Json(patch) = body.map_err(|rejection| GameError::validation("body", rejection.body_text()))?;
    let player_repo = PlayerRepository::new(state.db_pool.clone());
    let player = progress::update(&player_repo, &player_id, &patch, chrono::Utc::now()).await?;
    Ok(Json(player))
}
