//! The resource-side (`Harvestable`) and agent-side (`Harvester`) endpoints
//! of harvesting (spec.md §4.4, §4.8).

use std::collections::HashSet;

use super::position::Position;
use super::storage::InventoryRouting;
use crate::ecs::{Component, Entity, System, World};
use crate::log::report_invariant_violation;
use crate::resource::ResourceKind;

/// The passive, resource-side endpoint: a tree, a stone quarry, anything a
/// `Harvester` can work.
pub struct Harvestable {
    workers: Vec<Entity>,
    pub max_workers: u32,
    pub harvest_value_per_cycle: u32,
    pub output: ResourceKind,
    pub ticks_per_cycle: u32,
    remaining: u32,
}

impl Component for Harvestable {
    const EXPOSURE: Option<&'static str> = Some("harvest");
}

impl Harvestable {
    pub fn new(
        output: ResourceKind,
        initial_quantity: u32,
        harvest_value_per_cycle: u32,
        ticks_per_cycle: u32,
        max_workers: u32,
    ) -> Self {
        Harvestable {
            workers: Vec::new(),
            max_workers,
            harvest_value_per_cycle,
            output,
            ticks_per_cycle,
            remaining: initial_quantity,
        }
    }

    pub fn provides(&self) -> ResourceKind {
        self.output
    }

    pub fn current_yield(&self) -> u32 {
        self.remaining
    }

    pub fn can_add_worker(&self) -> bool {
        // Spec.md §9: the resolved open question uses strict `<`, not `<=`.
        (self.workers.len() as u32) < self.max_workers
    }

    pub fn add_worker(&mut self, worker: Entity) -> bool {
        if !self.can_add_worker() {
            return false;
        }
        self.workers.push(worker);
        true
    }

    pub fn remove_worker(&mut self, worker: Entity) {
        self.workers.retain(|&w| w != worker);
    }

    pub fn prune_dead_workers(&mut self, world: &World) {
        self.workers.retain(|&w| world.is_alive(w));
    }

    /// Decreases the remaining yield by `n`, never below zero.
    pub fn harvested_quantity(&mut self, n: u32) -> u32 {
        let taken = n.min(self.remaining);
        self.remaining -= taken;
        taken
    }

    pub(crate) fn regrow(&mut self, increase: u32, max_value: u32) {
        self.remaining = (self.remaining + increase).min(max_value);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvesterState {
    Idle,
    Harvesting,
    Full,
    Delivering,
}

pub struct Harvester {
    pub state: HarvesterState,
    source: Option<Entity>,
    destination: Option<Entity>,
    progress: u32,
    /// Empty set means "accept any kind this harvester's storage supports"
    /// (spec.md §4.8 `can_harvest`).
    pub allowed_kinds: HashSet<ResourceKind>,
    pub carry: InventoryRouting,
}

impl Component for Harvester {
    const EXPOSURE: Option<&'static str> = Some("harvest_worker");
}

impl Harvester {
    pub fn new(carry: InventoryRouting, allowed_kinds: HashSet<ResourceKind>) -> Self {
        Harvester {
            state: HarvesterState::Idle,
            source: None,
            destination: None,
            progress: 0,
            allowed_kinds,
            carry,
        }
    }

    pub fn source(&self) -> Option<Entity> {
        self.source
    }

    pub fn destination(&self) -> Option<Entity> {
        self.destination
    }

    pub fn assign_destination(&mut self, building: Entity) {
        self.destination = Some(building);
    }

    pub fn can_harvest(&self, kind: ResourceKind) -> bool {
        let allowed = self.allowed_kinds.is_empty() || self.allowed_kinds.contains(&kind);
        if !allowed {
            return false;
        }
        match self.carry.storage(kind) {
            Some(s) => !s.is_full(),
            None => self.allowed_kinds.is_empty(),
        }
    }

    pub fn inventory_available_for(&self, kind: ResourceKind) -> u32 {
        self.carry.storage(kind).map(|s| s.available()).unwrap_or(0)
    }

    /// `false` if `owner`'s `Harvester` is already bound to a source, or if
    /// the source refuses `add_worker` (spec.md §4.8 `start`). A free
    /// function rather than a method: it needs two live borrows of `world`
    /// in sequence (the harvester, then the source), which a `&mut self`
    /// receiver obtained from `world` can't coexist with a second `world`
    /// argument.
    pub fn start(owner: Entity, source: Entity, world: &mut World) -> bool {
        if world.get::<Harvester>(owner).unwrap().source.is_some() {
            return false;
        }
        let accepted = world
            .get_mut::<Harvestable>(source)
            .map(|mut h| h.add_worker(owner))
            .unwrap_or(false);
        if !accepted {
            return false;
        }
        world.get_mut::<Harvester>(owner).unwrap().source = Some(source);
        true
    }

    pub(crate) fn accumulate_progress(&mut self) -> u32 {
        self.progress += 1;
        self.progress
    }

    pub(crate) fn reset_progress(&mut self) {
        self.progress = 0;
    }

    pub fn receive_harvest(&mut self, kind: ResourceKind, quantity: u32) -> Result<(), &'static str> {
        let storage = self.carry.storage_mut(kind).ok_or("no storage for kind")?;
        for _ in 0..quantity {
            if !storage.add(kind) {
                return Err("full");
            }
        }
        Ok(())
    }

    /// Requires a live destination colocated with this harvester; drains
    /// every carried kind into the destination's matching incoming storage
    /// until full or exhausted, then returns to idle.
    pub fn deliver(&mut self, destination_routing: &mut InventoryRouting) {
        let kinds: Vec<ResourceKind> = self.carry.kinds().collect();
        for kind in kinds {
            loop {
                if destination_routing
                    .storage(kind)
                    .map(|s| s.is_full())
                    .unwrap_or(true)
                {
                    break;
                }
                match self.carry.remove_inventory(kind) {
                    Some(item) => {
                        if !destination_routing.receive_resource(item) {
                            // Shouldn't happen given the is_full check above,
                            // but keep the item rather than lose it.
                            self.carry.storage_mut(kind).unwrap().add(item);
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
        self.destination = None;
        self.state = HarvesterState::Idle;
    }

    pub fn stop(&mut self) {
        self.state = HarvesterState::Idle;
        self.source = None;
        self.destination = None;
        self.progress = 0;
    }
}

/// Drives the travel→harvest→deliver loop for every `Harvester` (spec.md
/// §4.8).
pub struct HarvesterSystem;

impl System for HarvesterSystem {
    fn process(&mut self, _tick: i64, world: &mut World) {
        for entity in world.query1::<Harvester>() {
            self.step(entity, world);
        }
    }
}

impl HarvesterSystem {
    fn step(&mut self, entity: Entity, world: &mut World) {
        let state = world.get::<Harvester>(entity).unwrap().state;
        match state {
            HarvesterState::Idle => self.step_idle(entity, world),
            HarvesterState::Harvesting => self.step_harvesting(entity, world),
            HarvesterState::Full | HarvesterState::Delivering => self.step_delivery(entity, world),
        }
    }

    fn step_idle(&mut self, entity: Entity, world: &mut World) {
        let has_source = world.get::<Harvester>(entity).unwrap().source().is_some();
        if has_source {
            world.get_mut::<Harvester>(entity).unwrap().state = HarvesterState::Harvesting;
        }
    }

    fn step_harvesting(&mut self, entity: Entity, world: &mut World) {
        let source = world.get::<Harvester>(entity).unwrap().source();
        let Some(source) = source else { return };

        if !world.is_alive(source) || world.get::<Harvestable>(source).is_none() {
            world.get_mut::<Harvester>(entity).unwrap().stop();
            return;
        }

        let output = world.get::<Harvestable>(source).unwrap().provides();

        let full = world
            .get::<Harvester>(entity)
            .unwrap()
            .carry
            .storage(output)
            .map(|s| s.is_full())
            .unwrap_or(false);
        if full {
            world.get_mut::<Harvester>(entity).unwrap().state = HarvesterState::Full;
            return;
        }

        let colocated =
            world.get::<Position>(entity).map(|p| *p) == world.get::<Position>(source).map(|p| *p);
        if !colocated {
            let already_traveling = world
                .get::<super::travel::Travel>(entity)
                .map(|t| t.is_targeting(source))
                .unwrap_or(false);
            if !already_traveling {
                let started = world
                    .get_mut::<super::travel::Travel>(entity)
                    .map(|mut travel| travel.start(source))
                    .unwrap_or(true);
                if !started {
                    report_invariant_violation(
                        world.log_mut(),
                        format!("harvester {entity:?} could not start travel to source {source:?}: already targeting another destination"),
                    );
                }
            }
            return;
        }

        if !world.get::<Harvester>(entity).unwrap().can_harvest(output) {
            {
                let mut harvester = world.get_mut::<Harvester>(entity).unwrap();
                harvester.source = None;
                harvester.state = HarvesterState::Idle;
            }
            if let Some(mut harvestable) = world.get_mut::<Harvestable>(source) {
                harvestable.remove_worker(entity);
            }
            return;
        }

        let ticks_per_cycle = world.get::<Harvestable>(source).unwrap().ticks_per_cycle;
        let progress = world.get_mut::<Harvester>(entity).unwrap().accumulate_progress();
        if progress < ticks_per_cycle {
            return;
        }
        world.get_mut::<Harvester>(entity).unwrap().reset_progress();

        let (harvest_value, harvestable_quantity) = {
            let h = world.get::<Harvestable>(source).unwrap();
            (h.harvest_value_per_cycle, h.current_yield())
        };
        let capacity = world
            .get::<Harvester>(entity)
            .unwrap()
            .inventory_available_for(output);
        let take = harvest_value.min(harvestable_quantity).min(capacity);
        if take == 0 {
            return;
        }

        world
            .get_mut::<Harvestable>(source)
            .unwrap()
            .harvested_quantity(take);
        let _ = world
            .get_mut::<Harvester>(entity)
            .unwrap()
            .receive_harvest(output, take);
    }

    fn step_delivery(&mut self, entity: Entity, world: &mut World) {
        let destination = world.get::<Harvester>(entity).unwrap().destination();
        let Some(destination) = destination else {
            // No destination yet; VillagerAiSystem assigns one on its own
            // cooldown (spec.md §4.10). Nothing to do this tick.
            return;
        };

        if !world.is_alive(destination) || world.get::<InventoryRouting>(destination).is_none() {
            world.get_mut::<Harvester>(entity).unwrap().stop();
            return;
        }

        let colocated =
            world.get::<Position>(entity).map(|p| *p) == world.get::<Position>(destination).map(|p| *p);
        if !colocated {
            let already_traveling = world
                .get::<super::travel::Travel>(entity)
                .map(|t| t.is_targeting(destination))
                .unwrap_or(false);
            if !already_traveling {
                let started = world
                    .get_mut::<super::travel::Travel>(entity)
                    .map(|mut travel| travel.start(destination))
                    .unwrap_or(true);
                if !started {
                    report_invariant_violation(
                        world.log_mut(),
                        format!("harvester {entity:?} could not start travel to destination {destination:?}: already targeting another destination"),
                    );
                }
            }
            return;
        }

        let mut dest_routing = world.get_mut::<InventoryRouting>(destination).unwrap();
        world
            .get_mut::<Harvester>(entity)
            .unwrap()
            .deliver(&mut dest_routing);
    }
}
