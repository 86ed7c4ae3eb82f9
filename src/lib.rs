//! Meteor Shooter - a ship-vs-meteor arcade core
//!
//! Core modules:
//! - `sim`: Simulation (entities, difficulty, collisions, per-frame update)
//! - `game`: Idle/Running/Over lifecycle and frame loop ownership
//! - `highscores`: Top-3 leaderboard over a key-value store
//! - `platform`: Scheduler, storage and keyboard abstractions
//! - `feedback`: Haptic/audio feedback capability
//! - `settings`: Persisted player preferences

pub mod feedback;
pub mod game;
pub mod highscores;
pub mod platform;
pub mod settings;
pub mod sim;

pub use feedback::{FeedbackSink, NullFeedback};
pub use game::{Game, GameStatus, RenderSnapshot};
pub use highscores::{ScoreBoard, ScoreStore};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Largest frame delta fed to the simulation (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Ship defaults
    pub const SHIP_WIDTH: f32 = 40.0;
    pub const SHIP_HEIGHT: f32 = 48.0;
    pub const SHIP_SPEED: f32 = 380.0;
    /// Radians per second while a rotate action is held
    pub const SHIP_ROTATION_SPEED: f32 = 3.6;
    /// Start position is `(width / 2, height - SHIP_START_BOTTOM_OFFSET)`
    pub const SHIP_START_BOTTOM_OFFSET: f32 = 120.0;
    /// Collision box is shrunk to `width / 2.2` by `height / 2.5` half extents
    pub const SHIP_HITBOX_WIDTH_DIVISOR: f32 = 2.2;
    pub const SHIP_HITBOX_HEIGHT_DIVISOR: f32 = 2.5;

    /// Laser defaults
    pub const LASER_WIDTH: f32 = 3.0;
    pub const LASER_HEIGHT: f32 = 18.0;
    pub const LASER_SPEED: f32 = 900.0;
    /// Minimum time between shots (ms)
    pub const LASER_COOLDOWN_MS: f64 = 260.0;
    /// Lateral muzzle offset from ship center (each side)
    pub const LASER_MUZZLE_OFFSET: f32 = 12.0;
    /// Lasers are culled outside the viewport grown by this margin
    pub const LASER_CULL_MARGIN: f32 = 200.0;

    /// Meteors spawn this far beyond the chosen viewport edge
    pub const METEOR_SPAWN_MARGIN: f32 = 60.0;
    /// Meteors are culled outside the viewport grown by this margin
    pub const METEOR_CULL_MARGIN: f32 = 100.0;

    /// Difficulty scaling
    pub const BASE_SPAWN_INTERVAL_MS: f64 = 1150.0;
    pub const MIN_SPAWN_INTERVAL_MS: f64 = 350.0;
    pub const SPAWN_REDUCTION_PER_POINT_MS: f64 = 9.0;
    pub const MAX_SPAWN_REDUCTION_MS: f64 = 550.0;
    pub const SPEED_BONUS_PER_POINT: f32 = 0.025;
    pub const MAX_SPEED_BONUS: f32 = 2.0;
    /// Extra simultaneous spawn every this many points
    pub const POINTS_PER_EXTRA_SPAWN: u32 = 10;
    pub const MAX_EXTRA_SPAWNS: u32 = 2;

    /// Number of scores kept on the leaderboard
    pub const MAX_HIGH_SCORES: usize = 3;

    /// Idle hover animation
    pub const HOVER_AMPLITUDE: f32 = 6.0;
    pub const HOVER_FREQUENCY: f32 = 1.6;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped >= PI { wrapped - TAU } else { wrapped }
}

/// Unit vector a heading points along (0 = up, clockwise positive, y down)
#[inline]
pub fn heading_forward(rotation: f32) -> Vec2 {
    Vec2::new(rotation.sin(), -rotation.cos())
}

/// Unit vector to the right of a heading
#[inline]
pub fn heading_right(rotation: f32) -> Vec2 {
    Vec2::new(rotation.cos(), rotation.sin())
}

/// Convert a local `(right, forward)` offset into world space for a heading
#[inline]
pub fn local_to_world(offset: Vec2, rotation: f32) -> Vec2 {
    heading_right(rotation) * offset.x + heading_forward(rotation) * offset.y
}

/// Heading whose forward vector points along `dir`
#[inline]
pub fn heading_of(dir: Vec2) -> f32 {
    dir.x.atan2(-dir.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(2.5 * PI) - FRAC_PI_2).abs() < 1e-5);
        assert!((normalize_angle(-FRAC_PI_2) + FRAC_PI_2).abs() < 1e-6);
        assert_eq!(normalize_angle(f32::NAN), 0.0);
        let big = normalize_angle(1.0e30);
        assert!((-PI..PI).contains(&big));
    }

    #[test]
    fn test_heading_vectors() {
        // 0 points up the screen (negative y)
        assert!((heading_forward(0.0) - Vec2::new(0.0, -1.0)).length() < 1e-6);
        assert!((heading_right(0.0) - Vec2::new(1.0, 0.0)).length() < 1e-6);
        assert!((heading_forward(FRAC_PI_2) - Vec2::new(1.0, 0.0)).length() < 1e-6);
        assert!((heading_of(Vec2::new(1.0, 0.0)) - FRAC_PI_2).abs() < 1e-6);
        let w = local_to_world(Vec2::new(12.0, 0.0), FRAC_PI_2);
        assert!((w - Vec2::new(0.0, 12.0)).length() < 1e-5);
    }
}
