//! Score-driven difficulty curve

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Spawner parameters for a given score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    /// Time between spawn events
    pub spawn_interval_ms: f64,
    /// Multiplier applied to a meteor's base speed
    pub speed_multiplier: f32,
    /// Meteors spawned per spawn event
    pub spawn_count: u32,
}

/// Map the running score to spawner parameters.
///
/// Spawns speed up by 9 ms per point (capped at 550 ms of reduction, floored
/// at 350 ms), meteors gain 2.5% speed per point up to 3x, and one extra
/// meteor joins each spawn every 10 points up to 3 at once.
pub fn scale(score: u32) -> Difficulty {
    let reduction = (score as f64 * SPAWN_REDUCTION_PER_POINT_MS).min(MAX_SPAWN_REDUCTION_MS);
    let spawn_interval_ms = (BASE_SPAWN_INTERVAL_MS - reduction).max(MIN_SPAWN_INTERVAL_MS);

    let speed_multiplier = 1.0 + (score as f32 * SPEED_BONUS_PER_POINT).min(MAX_SPEED_BONUS);

    let spawn_count = 1 + (score / POINTS_PER_EXTRA_SPAWN).min(MAX_EXTRA_SPAWNS);

    Difficulty {
        spawn_interval_ms,
        speed_multiplier,
        spawn_count,
    }
}
