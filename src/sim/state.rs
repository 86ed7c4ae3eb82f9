//! Simulation state and entity types
//!
//! Everything the per-frame update mutates lives in [`SimulationState`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::OrientedRect;
use crate::consts::*;
use crate::heading_of;

/// Viewport dimensions supplied by the host (resize-driven)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Clamp a center point so a box of `half` extents stays on screen.
    ///
    /// When the viewport is smaller than the box the point is centered on
    /// that axis instead.
    pub fn clamp_center(&self, pos: Vec2, half: Vec2) -> Vec2 {
        let axis = |v: f32, h: f32, size: f32| {
            if size < 2.0 * h {
                size / 2.0
            } else {
                v.clamp(h, size - h)
            }
        };
        Vec2::new(
            axis(pos.x, half.x, self.width),
            axis(pos.y, half.y, self.height),
        )
    }

    /// Where the ship sits at the start of a round
    pub fn ship_start(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height - SHIP_START_BOTTOM_OFFSET)
    }

    /// Where the ship rests while idle or after a round
    pub fn ship_rest(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    /// Center point
    pub position: Vec2,
    pub width: f32,
    pub height: f32,
    /// Units per second along the heading
    pub speed: f32,
    /// Heading in radians, 0 = facing up
    pub rotation: f32,
    /// Radians per second while rotating
    pub rotation_speed: f32,
}

impl Default for Ship {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            width: SHIP_WIDTH,
            height: SHIP_HEIGHT,
            speed: SHIP_SPEED,
            rotation: 0.0,
            rotation_speed: SHIP_ROTATION_SPEED,
        }
    }
}

impl Ship {
    #[inline]
    pub fn half_size(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Keep the ship inside the viewport
    pub fn clamp_to(&mut self, viewport: &Viewport) {
        self.position = viewport.clamp_center(self.position, self.half_size());
    }

    /// Place the ship facing up at `position`
    pub fn reset_at(&mut self, position: Vec2, viewport: &Viewport) {
        self.position = position;
        self.rotation = 0.0;
        self.clamp_to(viewport);
    }

    /// Collision box, deliberately smaller than the drawn ship
    pub fn hitbox(&self) -> OrientedRect {
        OrientedRect::new(
            self.position,
            Vec2::new(
                self.width / SHIP_HITBOX_WIDTH_DIVISOR,
                self.height / SHIP_HITBOX_HEIGHT_DIVISOR,
            ),
            self.rotation,
        )
    }
}

/// Meteor size classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeteorSize {
    Small,
    Medium,
    Large,
}

impl MeteorSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeteorSize::Small => "small",
            MeteorSize::Medium => "medium",
            MeteorSize::Large => "large",
        }
    }

    /// Pick a size from a roll in `[0, 1)`: 50% small, 30% medium, 20% large
    pub fn from_roll(roll: f32) -> Self {
        if roll < 0.5 {
            MeteorSize::Small
        } else if roll < 0.8 {
            MeteorSize::Medium
        } else {
            MeteorSize::Large
        }
    }

    /// Points awarded for destroying a meteor of this size
    pub fn points(&self) -> u32 {
        match self {
            MeteorSize::Small => 1,
            MeteorSize::Medium => 2,
            MeteorSize::Large => 3,
        }
    }

    /// Radius range (min, max)
    pub fn radius_range(&self) -> (f32, f32) {
        match self {
            MeteorSize::Small => (14.0, 22.0),
            MeteorSize::Medium => (24.0, 34.0),
            MeteorSize::Large => (38.0, 52.0),
        }
    }

    /// Base speed range before difficulty scaling (min, max)
    pub fn speed_range(&self) -> (f32, f32) {
        match self {
            MeteorSize::Small => (150.0, 210.0),
            MeteorSize::Medium => (110.0, 160.0),
            MeteorSize::Large => (75.0, 115.0),
        }
    }

    /// Maximum spin (radians/sec); smaller rocks spin faster
    pub fn max_spin(&self) -> f32 {
        match self {
            MeteorSize::Small => 3.0,
            MeteorSize::Medium => 1.8,
            MeteorSize::Large => 0.9,
        }
    }
}

/// A meteor entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meteor {
    pub id: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub size: MeteorSize,
}

impl Meteor {
    /// Advance position and spin
    pub fn integrate(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        self.rotation += self.rotation_speed * dt;
    }
}

/// A laser bolt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Laser {
    pub id: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Laser {
    /// Heading the bolt travels along (0 = up)
    pub fn heading(&self) -> f32 {
        if self.velocity == Vec2::ZERO {
            0.0
        } else {
            heading_of(self.velocity)
        }
    }

    /// Collision box aligned with the direction of travel
    pub fn bounds(&self) -> OrientedRect {
        OrientedRect::new(
            self.position,
            Vec2::new(self.width / 2.0, self.height / 2.0),
            self.heading(),
        )
    }
}

/// Everything the frame update owns
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub ship: Ship,
    /// Live meteors (in spawn order)
    pub meteors: Vec<Meteor>,
    /// Live lasers (in spawn order)
    pub lasers: Vec<Laser>,
    /// Points scored this round
    pub score: u32,
    /// Milliseconds accumulated toward the next spawn
    pub spawn_timer_ms: f64,
    /// Simulation clock (ms since round start)
    pub clock_ms: f64,
    /// Clock value of the last shot, `None` until the first shot
    pub last_shot_ms: Option<f64>,
    /// Spawner RNG
    pub rng: Pcg32,
    next_id: u32,
}

impl SimulationState {
    /// Create a state with the given spawner seed
    pub fn new(seed: u64) -> Self {
        Self {
            ship: Ship::default(),
            meteors: Vec::new(),
            lasers: Vec::new(),
            score: 0,
            spawn_timer_ms: 0.0,
            clock_ms: 0.0,
            last_shot_ms: None,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Clear the round: score, entities and timers. The RNG keeps its stream.
    pub fn reset(&mut self, viewport: &Viewport) {
        self.score = 0;
        self.meteors.clear();
        self.lasers.clear();
        self.spawn_timer_ms = 0.0;
        self.clock_ms = 0.0;
        self.last_shot_ms = None;
        self.ship.reset_at(viewport.ship_start(), viewport);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_roll_weights() {
        assert_eq!(MeteorSize::from_roll(0.0), MeteorSize::Small);
        assert_eq!(MeteorSize::from_roll(0.49), MeteorSize::Small);
        assert_eq!(MeteorSize::from_roll(0.5), MeteorSize::Medium);
        assert_eq!(MeteorSize::from_roll(0.79), MeteorSize::Medium);
        assert_eq!(MeteorSize::from_roll(0.8), MeteorSize::Large);
        assert_eq!(MeteorSize::from_roll(0.999), MeteorSize::Large);
    }

    #[test]
    fn test_size_tables_are_sane() {
        for size in [MeteorSize::Small, MeteorSize::Medium, MeteorSize::Large] {
            let (rmin, rmax) = size.radius_range();
            let (smin, smax) = size.speed_range();
            assert!(rmin > 0.0 && rmin < rmax);
            assert!(smin >= 0.0 && smin < smax);
        }
        assert!(MeteorSize::Small.max_spin() > MeteorSize::Large.max_spin());
        assert_eq!(
            MeteorSize::Small.points() + MeteorSize::Medium.points(),
            3
        );
    }

    #[test]
    fn test_reset_places_ship_at_start() {
        let viewport = Viewport::new(800.0, 600.0);
        let mut state = SimulationState::new(7);
        state.score = 12;
        state.ship.rotation = 1.0;
        state.last_shot_ms = Some(50.0);
        state.reset(&viewport);

        assert_eq!(state.score, 0);
        assert_eq!(state.ship.position, Vec2::new(400.0, 480.0));
        assert_eq!(state.ship.rotation, 0.0);
        assert!(state.last_shot_ms.is_none());
    }

    #[test]
    fn test_clamp_center_tiny_viewport() {
        let viewport = Viewport::new(30.0, 30.0);
        let pos = viewport.clamp_center(Vec2::new(500.0, -20.0), Vec2::new(20.0, 24.0));
        assert_eq!(pos, Vec2::new(15.0, 15.0));
    }

    #[test]
    fn test_laser_heading_follows_velocity() {
        let laser = Laser {
            id: 1,
            position: Vec2::ZERO,
            velocity: Vec2::new(0.0, -900.0),
            width: LASER_WIDTH,
            height: LASER_HEIGHT,
        };
        assert!(laser.heading().abs() < 1e-6);

        let right = Laser {
            velocity: Vec2::new(900.0, 0.0),
            ..laser
        };
        assert!((right.heading() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }
}
