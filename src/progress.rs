//! Register, enter, load, save and update: the operations the game client drives.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::player::PlayerRepository;
use crate::error::GameResult;
use crate::fatigue;
use crate::models::{Player, PlayerUpdate, Progress, ProgressPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Registered,
    AlreadyRegistered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub status: RegistrationStatus,
}

pub async fn register(repo: &PlayerRepository, player_id: &str) -> GameResult<Registration> {
    let status = if repo.register(player_id).await? {
        tracing::info!("Registered new player {}", player_id);
        RegistrationStatus::Registered
    } else {
        tracing::debug!("Player {} already registered", player_id);
        RegistrationStatus::AlreadyRegistered
    };
    Ok(Registration { status })
}

/// Fetch a player's progress, applying fatigue recovered since the last update.
///
/// The recovered value and `now` are written back in the same transaction as
/// the read, so a second load right after the first grants nothing extra.
/// Recovery below half a point is rounded away while the timestamp still
/// advances: a client polling more often than every 7.5 seconds regains nothing.
pub async fn load(repo: &PlayerRepository, player_id: &str, now: DateTime<Utc>) -> GameResult<Player> {
    let mut previous = None;
    let player = repo
        .update_with(player_id, |current| {
            previous = Some(current.fatigue_level);
            let recovered = fatigue::recover(current.fatigue_level, current.last_updated(), now);
            PlayerUpdate::fatigue(recovered, now)
        })
        .await?;

    if let Some(previous) = previous.filter(|f| *f != player.fatigue_level) {
        tracing::debug!(
            "Player {} recovered fatigue {} -> {}",
            player_id,
            previous,
            player.fatigue_level
        );
    }

    tracing::info!("Loaded progress for player {}", player_id);
    Ok(player)
}

/// First contact from the game page: create the player with defaults if
/// needed, then load as usual.
pub async fn enter(repo: &PlayerRepository, player_id: &str, now: DateTime<Utc>) -> GameResult<Player> {
    register(repo, player_id).await?;
    load(repo, player_id, now).await
}

/// Overwrite only the fields present in `patch`. A new fatigue value is taken
/// as current at `now`.
pub async fn update(
    repo: &PlayerRepository,
    player_id: &str,
    patch: &ProgressPatch,
    now: DateTime<Utc>,
) -> GameResult<Player> {
    let update = PlayerUpdate {
        click_count: patch.click_count,
        fatigue_level: patch.fatigue_level,
        experience_level: patch.experience_level,
        experience_amount: patch.experience_amount,
        last_update_time: patch.fatigue_level.map(|_| now.timestamp()),
    };
    repo.update_partial(player_id, &update).await?;
    tracing::info!("Updated progress fields for player {}", player_id);
    repo.get(player_id).await
}

/// Overwrite a player's gameplay fields. Fatigue is taken as current at `now`.
pub async fn save(
    repo: &PlayerRepository,
    player_id: &str,
    progress: &Progress,
    now: DateTime<Utc>,
) -> GameResult<Player> {
    let player = repo.upsert(player_id, progress, now).await?;
    tracing::info!(
        "Saved progress for player {}: clicks={} fatigue={} level={} xp={}",
        player_id,
        player.click_count,
        player.fatigue_level,
        player.experience_level,
        player.experience_amount
    );
    Ok(player)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::error::GameError;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    async fn test_repo() -> PlayerRepository {
        PlayerRepository::new(test_pool().await)
    }

    fn progress(click_count: i64, fatigue_level: i64, experience_level: i64, experience_amount: i64) -> Progress {
        Progress {
            click_count,
            fatigue_level,
            experience_level,
            experience_amount,
        }
    }

    #[tokio::test]
    async fn test_register_twice() {
        let repo = test_repo().await;

        let first = register(&repo, "p1").await.unwrap();
        assert_eq!(first.status, RegistrationStatus::Registered);
        let before = repo.get("p1").await.unwrap();

        let second = register(&repo, "p1").await.unwrap();
        assert_eq!(second.status, RegistrationStatus::AlreadyRegistered);
        assert_eq!(repo.get("p1").await.unwrap(), before);
    }

    #[test]
    fn test_registration_status_json() {
        let json = serde_json::to_value(Registration {
            status: RegistrationStatus::AlreadyRegistered,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "status": "already_registered" }));
    }

    #[tokio::test]
    async fn test_save_then_load_without_elapsed_time() {
        let repo = test_repo().await;

        save(&repo, "p1", &progress(50, 80, 2, 300), t0()).await.unwrap();
        let player = load(&repo, "p1", t0()).await.unwrap();

        assert_eq!(player.click_count, 50);
        assert_eq!(player.fatigue_level, 80);
        assert_eq!(player.experience_level, 2);
        assert_eq!(player.experience_amount, 300);
    }

    #[tokio::test]
    async fn test_load_applies_and_persists_recovery() {
        let repo = test_repo().await;
        save(&repo, "p1", &progress(5, 10, 0, 0), t0()).await.unwrap();

        let now = t0() + Duration::minutes(15);
        let player = load(&repo, "p1", now).await.unwrap();
        assert_eq!(player.fatigue_level, 70);
        assert_eq!(player.last_update_time, now.timestamp());

        let stored = repo.get("p1").await.unwrap();
        assert_eq!(stored.fatigue_level, 70);
        assert_eq!(stored.last_update_time, now.timestamp());
        assert_eq!(stored.click_count, 5);
    }

    #[tokio::test]
    async fn test_load_is_idempotent() {
        let repo = test_repo().await;
        save(&repo, "p1", &progress(0, 20, 0, 0), t0()).await.unwrap();

        let now = t0() + Duration::minutes(5);
        let first = load(&repo, "p1", now).await.unwrap();
        let second = load(&repo, "p1", now).await.unwrap();
        assert_eq!(first.fatigue_level, 40);
        assert_eq!(second.fatigue_level, first.fatigue_level);
    }

    #[tokio::test]
    async fn test_load_caps_at_max() {
        let repo = test_repo().await;
        save(&repo, "p1", &progress(0, 40, 0, 0), t0()).await.unwrap();

        let player = load(&repo, "p1", t0() + Duration::hours(1)).await.unwrap();
        assert_eq!(player.fatigue_level, 100);
    }

    #[tokio::test]
    async fn test_load_with_clock_skew_keeps_fatigue() {
        let repo = test_repo().await;
        save(&repo, "p1", &progress(0, 33, 0, 0), t0()).await.unwrap();

        let player = load(&repo, "p1", t0() - Duration::hours(1)).await.unwrap();
        assert_eq!(player.fatigue_level, 33);
    }

    #[tokio::test]
    async fn test_load_rounds_away_short_intervals() {
        let repo = test_repo().await;
        save(&repo, "p1", &progress(0, 50, 0, 0), t0()).await.unwrap();

        // Five seconds is a third of a point each time; nothing accumulates
        for step in 1..=6 {
            let player = load(&repo, "p1", t0() + Duration::seconds(5 * step)).await.unwrap();
            assert_eq!(player.fatigue_level, 50);
        }
    }

    #[tokio::test]
    async fn test_enter_creates_defaults_on_first_visit() {
        let repo = test_repo().await;

        let player = enter(&repo, "p1", t0()).await.unwrap();
        assert_eq!(player.player_id, "p1");
        assert_eq!(player.click_count, 0);
        assert_eq!(player.fatigue_level, 100);
        assert_eq!(player.experience_level, 0);
        assert_eq!(player.experience_amount, 0);
        assert_eq!(repo.get("p1").await.unwrap(), player);
    }

    #[tokio::test]
    async fn test_enter_keeps_saved_progress() {
        let repo = test_repo().await;
        enter(&repo, "p1", t0()).await.unwrap();
        save(&repo, "p1", &progress(50, 10, 2, 300), t0()).await.unwrap();

        let player = enter(&repo, "p1", t0() + Duration::minutes(15)).await.unwrap();
        assert_eq!(player.click_count, 50);
        assert_eq!(player.fatigue_level, 70);
        assert_eq!(player.experience_level, 2);
        assert_eq!(player.experience_amount, 300);
    }

    #[tokio::test]
    async fn test_update_touches_only_given_fields() {
        let repo = test_repo().await;
        save(&repo, "p1", &progress(50, 10, 2, 300), t0()).await.unwrap();

        let patch = ProgressPatch {
            click_count: Some(75),
            ..ProgressPatch::default()
        };
        let later = t0() + Duration::minutes(15);
        let player = update(&repo, "p1", &patch, later).await.unwrap();
        assert_eq!(player.click_count, 75);
        assert_eq!(player.experience_amount, 300);
        // Fatigue untouched, so the recovery clock keeps running from the save
        assert_eq!(player.last_update_time, t0().timestamp());
        assert_eq!(load(&repo, "p1", later).await.unwrap().fatigue_level, 70);

        let patch = ProgressPatch {
            fatigue_level: Some(5),
            ..ProgressPatch::default()
        };
        let player = update(&repo, "p1", &patch, later).await.unwrap();
        assert_eq!(player.fatigue_level, 5);
        assert_eq!(player.last_update_time, later.timestamp());
    }

    #[tokio::test]
    async fn test_update_unknown_player() {
        let repo = test_repo().await;
        let patch = ProgressPatch {
            click_count: Some(1),
            ..ProgressPatch::default()
        };
        let err = update(&repo, "ghost", &patch, t0()).await.unwrap_err();
        assert!(matches!(err, GameError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_load_unknown_player() {
        let repo = test_repo().await;
        let err = load(&repo, "ghost", t0()).await.unwrap_err();
        assert!(matches!(err, GameError::NotFound(_)));
    }
}
