//! Collision resolution for lasers, meteors and the ship
//!
//! Runs once per tick after integration. Both passes are linear in the
//! number of meteors and keep entity order stable.

use super::geometry::rect_circle_overlap;
use super::state::{MeteorSize, SimulationState};

/// What happened during one collision pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionResult {
    /// Sizes of meteors destroyed by lasers, in meteor order
    pub destroyed: Vec<MeteorSize>,
    /// Points awarded this pass
    pub points: u32,
    /// Id of the meteor that reached the ship, if any
    pub ship_hit_by: Option<u32>,
}

impl CollisionResult {
    /// Whether the ship was hit (the round must end)
    pub fn ship_hit(&self) -> bool {
        self.ship_hit_by.is_some()
    }
}

/// Resolve laser-meteor hits (awarding points) then ship-meteor contact.
///
/// Each meteor is consumed by the first live laser touching it, and each
/// laser destroys at most one meteor. A meteor destroyed this pass cannot
/// also hit the ship. Only the first ship contact is reported.
pub fn resolve(state: &mut SimulationState) -> CollisionResult {
    let mut result = CollisionResult::default();

    if !state.lasers.is_empty() {
        let mut laser_alive = vec![true; state.lasers.len()];
        let lasers = &state.lasers;

        state.meteors.retain(|meteor| {
            let hit = lasers.iter().enumerate().position(|(i, laser)| {
                laser_alive[i] && rect_circle_overlap(&laser.bounds(), meteor.position, meteor.radius)
            });
            match hit {
                Some(i) => {
                    laser_alive[i] = false;
                    result.destroyed.push(meteor.size);
                    result.points += meteor.size.points();
                    log::debug!(
                        "Laser #{} destroyed {} meteor #{}",
                        lasers[i].id,
                        meteor.size.as_str(),
                        meteor.id
                    );
                    false
                }
                None => true,
            }
        });

        let mut alive = laser_alive.into_iter();
        state.lasers.retain(|_| alive.next().unwrap_or(true));
    }

    state.score = state.score.saturating_add(result.points);

    let hitbox = state.ship.hitbox();
    result.ship_hit_by = state
        .meteors
        .iter()
        .find(|m| rect_circle_overlap(&hitbox, m.position, m.radius))
        .map(|m| m.id);

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::state::{Laser, Meteor, Viewport};
    use glam::Vec2;

    fn state() -> SimulationState {
        let mut state = SimulationState::new(1);
        state.reset(&Viewport::new(800.0, 600.0));
        state
    }

    fn add_meteor(state: &mut SimulationState, pos: Vec2, radius: f32, size: MeteorSize) -> u32 {
        let id = state.next_entity_id();
        state.meteors.push(Meteor {
            id,
            position: pos,
            velocity: Vec2::ZERO,
            radius,
            rotation: 0.0,
            rotation_speed: 0.0,
            size,
        });
        id
    }

    fn add_laser(state: &mut SimulationState, pos: Vec2) -> u32 {
        let id = state.next_entity_id();
        state.lasers.push(Laser {
            id,
            position: pos,
            velocity: Vec2::new(0.0, -LASER_SPEED),
            width: LASER_WIDTH,
            height: LASER_HEIGHT,
        });
        id
    }

    #[test]
    fn test_laser_hits_meteor() {
        let mut state = state();
        add_laser(&mut state, Vec2::new(100.0, 100.0));
        add_meteor(&mut state, Vec2::new(100.0, 90.0), 20.0, MeteorSize::Large);

        let result = resolve(&mut state);
        assert_eq!(result.destroyed, vec![MeteorSize::Large]);
        assert_eq!(result.points, 3);
        assert_eq!(state.score, 3);
        assert!(state.meteors.is_empty());
        assert!(state.lasers.is_empty());
        assert!(!result.ship_hit());
    }

    #[test]
    fn test_small_plus_medium_scores_three() {
        let mut state = state();
        add_laser(&mut state, Vec2::new(100.0, 100.0));
        add_meteor(&mut state, Vec2::new(100.0, 90.0), 18.0, MeteorSize::Small);
        add_laser(&mut state, Vec2::new(300.0, 100.0));
        add_meteor(&mut state, Vec2::new(300.0, 80.0), 28.0, MeteorSize::Medium);

        let result = resolve(&mut state);
        assert_eq!(result.points, 3);
        assert_eq!(state.score, 3);
    }

    #[test]
    fn test_laser_destroys_only_one_meteor() {
        let mut state = state();
        let laser = add_laser(&mut state, Vec2::new(100.0, 100.0));
        add_meteor(&mut state, Vec2::new(100.0, 90.0), 20.0, MeteorSize::Small);
        let survivor = add_meteor(&mut state, Vec2::new(104.0, 95.0), 20.0, MeteorSize::Medium);

        let result = resolve(&mut state);
        assert_eq!(result.points, 1);
        assert_eq!(state.meteors.len(), 1);
        assert_eq!(state.meteors[0].id, survivor);
        assert!(state.lasers.iter().all(|l| l.id != laser));
    }

    #[test]
    fn test_miss_keeps_everything() {
        let mut state = state();
        add_laser(&mut state, Vec2::new(100.0, 100.0));
        add_meteor(&mut state, Vec2::new(200.0, 90.0), 20.0, MeteorSize::Small);

        let result = resolve(&mut state);
        assert_eq!(result, CollisionResult::default());
        assert_eq!(state.lasers.len(), 1);
        assert_eq!(state.meteors.len(), 1);
    }

    #[test]
    fn test_ship_hit_reports_first_meteor() {
        let mut state = state();
        let ship = state.ship.position;
        let first = add_meteor(&mut state, ship + Vec2::new(5.0, 0.0), 15.0, MeteorSize::Small);
        add_meteor(&mut state, ship - Vec2::new(5.0, 0.0), 15.0, MeteorSize::Small);

        let result = resolve(&mut state);
        assert_eq!(result.ship_hit_by, Some(first));
    }

    #[test]
    fn test_hitbox_is_forgiving() {
        let mut state = state();
        let ship = state.ship.position;
        // Overlaps the drawn 40px-wide ship but not the shrunk box (half width ~18.2)
        add_meteor(&mut state, ship + Vec2::new(19.0 + 10.0, 0.0), 10.0, MeteorSize::Small);
        assert!(!resolve(&mut state).ship_hit());
    }

    #[test]
    fn test_meteor_shot_this_tick_spares_ship() {
        let mut state = state();
        let ship = state.ship.position;
        add_laser(&mut state, ship);
        add_meteor(&mut state, ship, 15.0, MeteorSize::Small);

        let result = resolve(&mut state);
        assert_eq!(result.points, 1);
        assert!(!result.ship_hit());
    }
}
