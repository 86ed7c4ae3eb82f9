//! Per-frame simulation update
//!
//! Advances the ship, meteors and lasers by a frame delta. Collision
//! resolution runs separately afterwards (see [`super::collision`]).

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::{Difficulty, scale};
use super::geometry::inside_expanded;
use super::state::{Laser, Meteor, MeteorSize, SimulationState, Viewport};
use crate::consts::*;
use crate::{heading_forward, heading_of, local_to_world, normalize_angle};

/// Discrete actions produced by the input mapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    RotateLeft,
    RotateRight,
    ThrustForward,
    ThrustBackward,
    StrafeLeft,
    StrafeRight,
    Shoot,
    Start,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::RotateLeft,
        Action::RotateRight,
        Action::ThrustForward,
        Action::ThrustBackward,
        Action::StrafeLeft,
        Action::StrafeRight,
        Action::Shoot,
        Action::Start,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::RotateLeft => "rotate-left",
            Action::RotateRight => "rotate-right",
            Action::ThrustForward => "thrust-forward",
            Action::ThrustBackward => "thrust-backward",
            Action::StrafeLeft => "strafe-left",
            Action::StrafeRight => "strafe-right",
            Action::Shoot => "shoot",
            Action::Start => "start",
        }
    }
}

/// Held actions for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub thrust_forward: bool,
    pub thrust_backward: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    pub shoot: bool,
}

impl TickInput {
    /// Record a press/release. `Start` is a one-shot and is not held here.
    pub fn set(&mut self, action: Action, pressed: bool) {
        match action {
            Action::RotateLeft => self.rotate_left = pressed,
            Action::RotateRight => self.rotate_right = pressed,
            Action::ThrustForward => self.thrust_forward = pressed,
            Action::ThrustBackward => self.thrust_backward = pressed,
            Action::StrafeLeft => self.strafe_left = pressed,
            Action::StrafeRight => self.strafe_right = pressed,
            Action::Shoot => self.shoot = pressed,
            Action::Start => {}
        }
    }

    /// Turn direction: -1 left, +1 right, 0 when none or both are held
    pub fn turn_axis(&self) -> f32 {
        axis(self.rotate_left, self.rotate_right)
    }

    /// Movement in the ship's local frame: x = strafe (right +), y = thrust (forward +)
    pub fn move_axes(&self) -> Vec2 {
        Vec2::new(
            axis(self.strafe_left, self.strafe_right),
            axis(self.thrust_backward, self.thrust_forward),
        )
    }
}

#[inline]
fn axis(negative: bool, positive: bool) -> f32 {
    match (negative, positive) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}

/// Advance the simulation by `dt` seconds
pub fn update(state: &mut SimulationState, input: &TickInput, dt: f32, viewport: &Viewport) {
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
    state.clock_ms += dt as f64 * 1000.0;

    // Rotation
    let turn = input.turn_axis();
    if turn != 0.0 {
        let ship = &mut state.ship;
        ship.rotation = normalize_angle(ship.rotation + turn * ship.rotation_speed * dt);
    }

    // Translation
    let local = input.move_axes();
    if local != Vec2::ZERO {
        let ship = &mut state.ship;
        ship.position += local_to_world(local, ship.rotation) * ship.speed * dt;
    }
    state.ship.clamp_to(viewport);

    // Spawning
    let difficulty = scale(state.score);
    state.spawn_timer_ms += dt as f64 * 1000.0;
    if state.spawn_timer_ms > difficulty.spawn_interval_ms {
        state.spawn_timer_ms = 0.0;
        for _ in 0..difficulty.spawn_count {
            spawn_meteor(state, viewport, &difficulty);
        }
    }

    // Meteors
    let size = viewport.size();
    for meteor in &mut state.meteors {
        meteor.integrate(dt);
    }
    state
        .meteors
        .retain(|m| inside_expanded(m.position, m.radius, size, METEOR_CULL_MARGIN));

    // Lasers
    for laser in &mut state.lasers {
        laser.position += laser.velocity * dt;
    }
    state
        .lasers
        .retain(|l| inside_expanded(l.position, 0.0, size, LASER_CULL_MARGIN));

    if input.shoot {
        try_shoot(state);
    }
}

/// Whether the cooldown allows a shot at the current clock
pub fn can_shoot(state: &SimulationState) -> bool {
    state
        .last_shot_ms
        .is_none_or(|last| state.clock_ms - last >= LASER_COOLDOWN_MS)
}

/// Fire a laser pair if the cooldown has elapsed. Returns true if fired.
pub fn try_shoot(state: &mut SimulationState) -> bool {
    if !can_shoot(state) {
        return false;
    }

    let rotation = state.ship.rotation;
    let velocity = heading_forward(rotation) * LASER_SPEED;
    for side in [-1.0, 1.0] {
        let muzzle = local_to_world(Vec2::new(side * LASER_MUZZLE_OFFSET, 0.0), rotation);
        let laser = Laser {
            id: state.next_entity_id(),
            position: state.ship.position + muzzle,
            velocity,
            width: LASER_WIDTH,
            height: LASER_HEIGHT,
        };
        state.lasers.push(laser);
    }
    state.last_shot_ms = Some(state.clock_ms);
    true
}

#[inline]
fn roll_between(rng: &mut Pcg32, (min, max): (f32, f32)) -> f32 {
    min + (max - min) * rng.random::<f32>()
}

/// Spawn one meteor just beyond a random viewport edge, aimed at the ship
pub fn spawn_meteor(state: &mut SimulationState, viewport: &Viewport, difficulty: &Difficulty) {
    let rng = &mut state.rng;
    let along_x = rng.random::<f32>() * viewport.width;
    let along_y = rng.random::<f32>() * viewport.height;
    let position = match rng.random_range(0..4u8) {
        0 => Vec2::new(along_x, -METEOR_SPAWN_MARGIN),
        1 => Vec2::new(viewport.width + METEOR_SPAWN_MARGIN, along_y),
        2 => Vec2::new(along_x, viewport.height + METEOR_SPAWN_MARGIN),
        _ => Vec2::new(-METEOR_SPAWN_MARGIN, along_y),
    };

    let size = MeteorSize::from_roll(rng.random::<f32>());
    let radius = roll_between(rng, size.radius_range());
    let base_speed = roll_between(rng, size.speed_range());
    let rotation = rng.random::<f32>() * std::f32::consts::TAU;
    let rotation_speed = (rng.random::<f32>() * 2.0 - 1.0) * size.max_spin();

    // Straight down when the ship sits exactly on the spawn point
    let direction = (state.ship.position - position)
        .try_normalize()
        .unwrap_or(Vec2::Y);

    let meteor = Meteor {
        id: state.next_entity_id(),
        position,
        velocity: direction * base_speed * difficulty.speed_multiplier,
        radius,
        rotation,
        rotation_speed,
        size,
    };
    log::debug!(
        "Spawned {} meteor #{} at ({:.0}, {:.0})",
        size.as_str(),
        meteor.id,
        position.x,
        position.y
    );
    state.meteors.push(meteor);
}

/// Demo controller: turn toward the nearest meteor, fire when lined up,
/// and back off when something gets too close.
pub fn autopilot(state: &SimulationState) -> TickInput {
    let ship = &state.ship;
    let mut input = TickInput::default();

    let nearest = state.meteors.iter().min_by(|a, b| {
        a.position
            .distance_squared(ship.position)
            .total_cmp(&b.position.distance_squared(ship.position))
    });

    let Some(meteor) = nearest else {
        return input;
    };

    let to_meteor = meteor.position - ship.position;
    let target = heading_of(to_meteor);
    let delta = normalize_angle(target - ship.rotation);

    input.rotate_left = delta < -0.05;
    input.rotate_right = delta > 0.05;
    input.shoot = delta.abs() < 0.2;

    let danger = meteor.radius + ship.height * 2.0;
    if to_meteor.length() < danger {
        input.thrust_backward = true;
    }

    input
}
