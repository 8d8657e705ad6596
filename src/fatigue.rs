//! Lazy fatigue recovery.
//!
//! Fatigue regenerates linearly with wall-clock time. Nothing ticks in the
//! background: the new value is computed whenever a player's progress is
//! loaded, and the caller writes it back together with a fresh timestamp.

use chrono::{DateTime, Utc};

/// Fatigue points regained per hour of real time
pub const RECOVERY_RATE_PER_HOUR: f64 = 240.0;

pub const MIN_FATIGUE: i64 = 0;
pub const MAX_FATIGUE: i64 = 100;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Clamp a fatigue value into the valid range.
pub fn clamp_fatigue(fatigue_level: i64) -> i64 {
    fatigue_level.clamp(MIN_FATIGUE, MAX_FATIGUE)
}

/// Compute the fatigue level after the time between `last_update` and `now`.
///
/// Negative elapsed time (clock skew) counts as zero, so the result is never
/// lower than the starting level. Less than half a point of recovery (about
/// 7.5 seconds) rounds to no change.
pub fn recover(fatigue_level: i64, last_update: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let fatigue_level = clamp_fatigue(fatigue_level);
    let elapsed_ms = (now - last_update).num_milliseconds().max(0);
    let hours_elapsed = elapsed_ms as f64 / MILLIS_PER_HOUR;

    let recovered = fatigue_level as f64 + hours_elapsed * RECOVERY_RATE_PER_HOUR;
    recovered.min(MAX_FATIGUE as f64).round() as i64
}
