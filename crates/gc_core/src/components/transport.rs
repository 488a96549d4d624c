//! Agents that ferry goods between a source and a destination building
//! (spec.md §4.9).

use std::collections::HashSet;

use super::position::Position;
use super::storage::InventoryRouting;
use crate::ecs::{Component, Entity, System, World};
use crate::resource::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Idle,
    Moving,
    Loading,
    Unloading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Source,
    Destination,
}

pub struct ResourceTransport {
    pub state: TransportState,
    pub direction: Direction,
    source: Option<Entity>,
    destination: Option<Entity>,
    /// Memoized per destination: the intersection of what the destination
    /// accepts and what this transporter's own storages carry.
    route_cache: Option<(Entity, HashSet<ResourceKind>)>,
    pub carry: InventoryRouting,
}

impl Component for ResourceTransport {
    const EXPOSURE: Option<&'static str> = Some("resource_transport");
}

impl ResourceTransport {
    pub fn new(carry: InventoryRouting) -> Self {
        ResourceTransport {
            state: TransportState::Idle,
            direction: Direction::Source,
            source: None,
            destination: None,
            route_cache: None,
            carry,
        }
    }

    pub fn source(&self) -> Option<Entity> {
        self.source
    }

    pub fn destination(&self) -> Option<Entity> {
        self.destination
    }

    /// Fails if a destination is already bound.
    pub fn start(&mut self, destination: Entity, source: Option<Entity>) -> bool {
        if self.destination.is_some() {
            return false;
        }
        self.destination = Some(destination);
        self.source = source;
        true
    }

    pub fn stop(&mut self) {
        self.state = TransportState::Idle;
        self.source = None;
        self.destination = None;
        self.route_cache = None;
    }

    fn common_route_resources(&mut self, destination: Entity, world: &World) -> HashSet<ResourceKind> {
        if let Some((cached_for, cached)) = &self.route_cache {
            if *cached_for == destination {
                return cached.clone();
            }
        }
        let own_kinds: HashSet<ResourceKind> = self.carry.kinds().collect();
        let wanted: HashSet<ResourceKind> = world
            .get::<InventoryRouting>(destination)
            .map(|r| r.wants_resources().into_iter().collect())
            .unwrap_or_default();
        let common: HashSet<ResourceKind> = own_kinds.intersection(&wanted).copied().collect();
        self.route_cache = Some((destination, common.clone()));
        common
    }

    pub fn is_valid_route(&mut self, destination: Entity, world: &World) -> bool {
        !self.common_route_resources(destination, world).is_empty()
    }
}

/// Drives the idle→moving→loading→moving→unloading round trip (spec.md
/// §4.9).
pub struct ResourceTransportSystem;

impl System for ResourceTransportSystem {
    fn process(&mut self, _tick: i64, world: &mut World) {
        for entity in world.query1::<ResourceTransport>() {
            let state = world.get::<ResourceTransport>(entity).unwrap().state;
            match state {
                TransportState::Idle => step_idle(entity, world),
                TransportState::Moving => step_moving(entity, world),
                TransportState::Loading => step_loading(entity, world),
                TransportState::Unloading => step_unloading(entity, world),
            }
        }
    }
}

fn travel_toward(entity: Entity, target: Entity, world: &mut World) {
    let already_traveling = world
        .get::<super::travel::Travel>(entity)
        .map(|t| t.is_targeting(target))
        .unwrap_or(false);
    if !already_traveling {
        if let Some(mut travel) = world.get_mut::<super::travel::Travel>(entity) {
            travel.start(target);
        }
    }
}

fn colocated(a: Entity, b: Entity, world: &World) -> bool {
    world.get::<Position>(a).map(|p| *p) == world.get::<Position>(b).map(|p| *p)
}

fn step_idle(entity: Entity, world: &mut World) {
    let source = world.get::<ResourceTransport>(entity).unwrap().source();
    let Some(source) = source else { return };
    if !world.is_alive(source) {
        return;
    }

    let destination = world.get::<ResourceTransport>(entity).unwrap().destination();
    let Some(destination) = destination else { return };

    let route_empty = {
        let mut transport = world.get_mut::<ResourceTransport>(entity).unwrap();
        transport.common_route_resources(destination, world).is_empty()
    };
    if route_empty {
        return;
    }

    let common = {
        let mut transport = world.get_mut::<ResourceTransport>(entity).unwrap();
        transport.common_route_resources(destination, world)
    };
    let has_something = world
        .get::<InventoryRouting>(source)
        .map(|r| r.available_for_transport(Some(&common)).is_some())
        .unwrap_or(false);
    if !has_something {
        return;
    }

    if !colocated(entity, source, world) {
        world.get_mut::<ResourceTransport>(entity).unwrap().direction = Direction::Source;
        world.get_mut::<ResourceTransport>(entity).unwrap().state = TransportState::Moving;
        travel_toward(entity, source, world);
    } else {
        world.get_mut::<ResourceTransport>(entity).unwrap().state = TransportState::Loading;
    }
}

fn step_moving(entity: Entity, world: &mut World) {
    let direction = world.get::<ResourceTransport>(entity).unwrap().direction;
    match direction {
        Direction::Source => {
            let source = world.get::<ResourceTransport>(entity).unwrap().source();
            if let Some(source) = source {
                if colocated(entity, source, world) {
                    world.get_mut::<ResourceTransport>(entity).unwrap().state = TransportState::Loading;
                }
            }
        }
        Direction::Destination => {
            let destination = world.get::<ResourceTransport>(entity).unwrap().destination();
            if let Some(destination) = destination {
                if colocated(entity, destination, world) {
                    world.get_mut::<ResourceTransport>(entity).unwrap().state = TransportState::Unloading;
                }
            }
        }
    }
}

fn step_loading(entity: Entity, world: &mut World) {
    let source = world.get::<ResourceTransport>(entity).unwrap().source();
    let Some(source) = source else {
        world.get_mut::<ResourceTransport>(entity).unwrap().stop();
        return;
    };
    if !world.is_alive(source) || !colocated(entity, source, world) {
        world.get_mut::<ResourceTransport>(entity).unwrap().stop();
        return;
    }

    let destination = world.get::<ResourceTransport>(entity).unwrap().destination();
    let common = {
        let mut transport = world.get_mut::<ResourceTransport>(entity).unwrap();
        destination
            .map(|d| transport.common_route_resources(d, world))
            .unwrap_or_default()
    };

    let kind = world
        .get::<InventoryRouting>(source)
        .map(|r| r.available_for_transport(Some(&common)))
        .unwrap_or(None);

    if let Some(kind) = kind {
        loop {
            let own_full = world
                .get::<ResourceTransport>(entity)
                .unwrap()
                .carry
                .storage(kind)
                .map(|s| s.is_full())
                .unwrap_or(true);
            if own_full {
                break;
            }
            let item = world
                .get_mut::<InventoryRouting>(source)
                .and_then(|mut r| r.remove_inventory(kind));
            match item {
                Some(item) => {
                    world
                        .get_mut::<ResourceTransport>(entity)
                        .unwrap()
                        .carry
                        .receive_resource(item);
                }
                None => break,
            }
        }
    }

    if let Some(destination) = destination {
        world.get_mut::<ResourceTransport>(entity).unwrap().direction = Direction::Destination;
        world.get_mut::<ResourceTransport>(entity).unwrap().state = TransportState::Moving;
        travel_toward(entity, destination, world);
    }
}

fn step_unloading(entity: Entity, world: &mut World) {
    let destination = world.get::<ResourceTransport>(entity).unwrap().destination();
    let Some(destination) = destination else {
        world.get_mut::<ResourceTransport>(entity).unwrap().stop();
        return;
    };
    if !world.is_alive(destination) || !colocated(entity, destination, world) {
        world.get_mut::<ResourceTransport>(entity).unwrap().stop();
        return;
    }

    let common = {
        let mut transport = world.get_mut::<ResourceTransport>(entity).unwrap();
        transport.common_route_resources(destination, world)
    };

    let mut accepted_any = false;
    for kind in common {
        loop {
            let item = world
                .get_mut::<ResourceTransport>(entity)
                .unwrap()
                .carry
                .remove_inventory(kind);
            let Some(item) = item else { break };
            let accepted = world
                .get_mut::<InventoryRouting>(destination)
                .map(|mut r| r.receive_resource(item))
                .unwrap_or(false);
            if accepted {
                accepted_any = true;
            } else {
                world
                    .get_mut::<ResourceTransport>(entity)
                    .unwrap()
                    .carry
                    .storage_mut(kind)
                    .unwrap()
                    .add(item);
                break;
            }
        }
    }

    if !accepted_any {
        world.get_mut::<ResourceTransport>(entity).unwrap().stop();
        return;
    }

    world.get_mut::<ResourceTransport>(entity).unwrap().direction = Direction::Source;
    world.get_mut::<ResourceTransport>(entity).unwrap().state = TransportState::Moving;
    let source = world.get::<ResourceTransport>(entity).unwrap().source();
    if let Some(source) = source {
        if world.is_alive(source) {
            travel_toward(entity, source, world);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::storage::Storage;

    #[test]
    fn backpressure_returns_cargo_and_stops() {
        let mut world = World::new();

        let source = world.spawn();
        world.attach(source, Position::new(0, 0)).unwrap();
        let mut source_routing = InventoryRouting::new();
        let mut lumber_out = Storage::new(false, true, 10, 0);
        for _ in 0..5 {
            lumber_out.add(ResourceKind::Lumber);
        }
        source_routing = source_routing.with_storage(ResourceKind::Lumber, lumber_out);
        world.attach(source, source_routing).unwrap();

        let destination = world.spawn();
        world.attach(destination, Position::new(5, 0)).unwrap();
        let mut dest_in = Storage::new(true, false, 5, 0);
        for _ in 0..5 {
            dest_in.add(ResourceKind::Lumber);
        }
        let dest_routing = InventoryRouting::new().with_storage(ResourceKind::Lumber, dest_in);
        world.attach(destination, dest_routing).unwrap();

        let transporter = world.spawn();
        world.attach(transporter, Position::new(0, 0)).unwrap();
        let carry = InventoryRouting::new().with_storage(ResourceKind::Lumber, Storage::new(true, true, 5, 0));
        let mut transport = ResourceTransport::new(carry);
        assert!(transport.start(destination, Some(source)));
        world.attach(transporter, transport).unwrap();

        let mut system = ResourceTransportSystem;
        system.process(0, &mut world); // idle -> loading (colocated with source)
        system.process(0, &mut world); // loading -> moving

        // Teleport to destination to skip travel simulation.
        *world.get_mut::<Position>(transporter).unwrap() = Position::new(5, 0);
        system.process(0, &mut world); // moving -> unloading
        system.process(0, &mut world); // unloading rejected -> stop

        let transport = world.get::<ResourceTransport>(transporter).unwrap();
        assert_eq!(transport.state, TransportState::Idle);
        assert_eq!(transport.carry.storage(ResourceKind::Lumber).unwrap().quantity(), 5);
    }
}
