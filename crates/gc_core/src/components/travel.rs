//! Straight-line motion toward a target entity (spec.md §4.3). Pathfinding
//! is a Non-goal (spec.md §1); this is point-to-point interpolation only.

use super::position::{Position, Velocity};
use crate::ecs::{Component, Entity, System, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelState {
    Idle,
    Moving,
}

pub struct Travel {
    pub state: TravelState,
    destination: Option<Entity>,
}

impl Component for Travel {
    const EXPOSURE: Option<&'static str> = Some("travel");
}

impl Default for Travel {
    fn default() -> Self {
        Travel {
            state: TravelState::Idle,
            destination: None,
        }
    }
}

impl Travel {
    pub fn destination(&self) -> Option<Entity> {
        self.destination
    }

    pub fn is_targeting(&self, entity: Entity) -> bool {
        self.destination == Some(entity)
    }

    /// Fails (returns `false`) if a destination is already active.
    pub fn start(&mut self, destination: Entity) -> bool {
        if self.destination.is_some() {
            return false;
        }
        self.destination = Some(destination);
        self.state = TravelState::Moving;
        true
    }

    pub fn stop(&mut self) {
        self.destination = None;
        self.state = TravelState::Idle;
    }
}

/// Advances `(Travel, Position, Velocity)` triples toward their
/// destination's position by at most `speed` units per tick, snapping
/// exactly on arrival (spec.md §4.3, §8 boundary behavior).
pub struct TravelSystem;

impl System for TravelSystem {
    fn process(&mut self, _tick: i64, world: &mut World) {
        for entity in world.query3::<Travel, Position, Velocity>() {
            let destination = match world.get::<Travel>(entity).and_then(|t| t.destination()) {
                Some(d) => d,
                None => continue,
            };

            if !world.is_alive(destination) || world.get::<Position>(destination).is_none() {
                if let Some(mut travel) = world.get_mut::<Travel>(entity) {
                    travel.stop();
                }
                continue;
            }

            let target_pos = *world.get::<Position>(destination).unwrap();
            let current_pos = *world.get::<Position>(entity).unwrap();
            let speed = world.get::<Velocity>(entity).unwrap().speed as f64;

            if current_pos == target_pos {
                if let Some(mut travel) = world.get_mut::<Travel>(entity) {
                    travel.stop();
                }
                continue;
            }

            let dx = (target_pos.x - current_pos.x) as f64;
            let dy = (target_pos.y - current_pos.y) as f64;
            let distance = (dx * dx + dy * dy).sqrt();

            let mut position = world.get_mut::<Position>(entity).unwrap();
            if distance <= speed {
                position.x = target_pos.x;
                position.y = target_pos.y;
            } else {
                let ratio = speed / distance;
                position.x += (dx * ratio).round() as i32;
                position.y += (dy * ratio).round() as i32;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::position::{Position, Velocity};

    #[test]
    fn snaps_exactly_when_distance_within_speed() {
        let mut world = World::new();
        let dest = world.spawn();
        world.attach(dest, Position::new(10, 0)).unwrap();

        let traveler = world.spawn();
        world.attach(traveler, Position::new(9, 0)).unwrap();
        world.attach(traveler, Velocity::new(2)).unwrap();
        let mut travel = Travel::default();
        travel.start(dest);
        world.attach(traveler, travel).unwrap();

        let mut system = TravelSystem;
        system.process(0, &mut world);

        let pos = *world.get::<Position>(traveler).unwrap();
        assert_eq!(pos, Position::new(10, 0));
        assert_eq!(world.get::<Travel>(traveler).unwrap().state, TravelState::Idle);
    }

    #[test]
    fn stops_when_destination_goes_stale() {
        let mut world = World::new();
        let dest = world.spawn();
        world.attach(dest, Position::new(10, 0)).unwrap();

        let traveler = world.spawn();
        world.attach(traveler, Position::new(0, 0)).unwrap();
        world.attach(traveler, Velocity::new(2)).unwrap();
        let mut travel = Travel::default();
        travel.start(dest);
        world.attach(traveler, travel).unwrap();

        world.despawn(dest).unwrap();

        let mut system = TravelSystem;
        system.process(0, &mut world);
        assert_eq!(world.get::<Travel>(traveler).unwrap().state, TravelState::Idle);
    }
}
