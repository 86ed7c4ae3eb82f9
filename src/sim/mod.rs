//! Simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering
//! and platform dependencies:
//! - Time only advances through the `dt` passed to `update`
//! - Seeded RNG only
//! - Stable iteration order (spawn order)

pub mod collision;
pub mod difficulty;
pub mod geometry;
pub mod state;
pub mod tick;

pub use collision::{CollisionResult, resolve};
pub use difficulty::{Difficulty, scale};
pub use geometry::{OrientedRect, rect_circle_overlap};
pub use state::{Laser, Meteor, MeteorSize, Ship, SimulationState, Viewport};
pub use tick::{Action, TickInput, autopilot, try_shoot, update};
