//! Building sites: `new → in_progress → completed` (spec.md §4.7).

use std::collections::HashSet;

use super::position::Renderable;
use super::storage::InventoryRouting;
use crate::ecs::{Component, Entity, System, World};
use crate::resource::ResourceKind;

/// What a completed construction becomes: its post-completion storages,
/// the components attached to the owner, and its finished renderable tag.
pub struct ConstructionSpec {
    pub required_resources: Vec<(ResourceKind, u32)>,
    pub construction_ticks: u32,
    pub required_abilities: HashSet<&'static str>,
    pub finished_storages: InventoryRouting,
    pub finished_renderable: String,
    pub build_components: Box<dyn FnOnce(Entity, &mut World)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructionState {
    New,
    InProgress,
    Completed,
}

pub struct Construction {
    pub state: ConstructionState,
    pub max_workers: u32,
    workers: Vec<Entity>,
    pub ticks: u32,
    pub spec: Option<ConstructionSpec>,
}

impl Component for Construction {
    const EXPOSURE: Option<&'static str> = Some("construction");
}

impl Construction {
    pub fn new(spec: ConstructionSpec, max_workers: u32) -> Self {
        Construction {
            state: ConstructionState::New,
            max_workers,
            workers: Vec::new(),
            ticks: 0,
            spec: Some(spec),
        }
    }

    pub fn workers(&self) -> &[Entity] {
        &self.workers
    }

    /// `max_workers` bound and, when the spec names required abilities,
    /// the candidate's ability set must intersect them.
    pub fn add_worker(&mut self, worker: Entity, worker_abilities: &HashSet<&'static str>) -> bool {
        if (self.workers.len() as u32) >= self.max_workers {
            return false;
        }
        if let Some(spec) = &self.spec {
            if !spec.required_abilities.is_empty()
                && spec.required_abilities.is_disjoint(worker_abilities)
            {
                return false;
            }
        }
        self.workers.push(worker);
        true
    }

    pub fn remove_worker(&mut self, worker: Entity) {
        self.workers.retain(|&w| w != worker);
    }

    pub fn stop(&mut self) {
        // About to be removed from its owner; no re-idling of its own state
        // needed (spec.md §4.7 completion routine).
    }
}

pub struct ConstructionWorker {
    workplace: Option<Entity>,
    pub abilities: HashSet<&'static str>,
}

impl Component for ConstructionWorker {
    const EXPOSURE: Option<&'static str> = Some("construction_worker");
}

impl ConstructionWorker {
    pub fn new(abilities: HashSet<&'static str>) -> Self {
        ConstructionWorker {
            workplace: None,
            abilities,
        }
    }

    pub fn workplace(&self) -> Option<Entity> {
        self.workplace
    }

    /// Free function for the same reason as
    /// [`super::factory::FactoryWorker::start`].
    pub fn start(owner: Entity, site: Entity, world: &mut World) -> bool {
        if world.get::<ConstructionWorker>(owner).unwrap().workplace.is_some() {
            return false;
        }
        let abilities = world.get::<ConstructionWorker>(owner).unwrap().abilities.clone();
        let accepted = world
            .get_mut::<Construction>(site)
            .map(|mut c| c.add_worker(owner, &abilities))
            .unwrap_or(false);
        if accepted {
            world.get_mut::<ConstructionWorker>(owner).unwrap().workplace = Some(site);
        }
        accepted
    }

    pub fn clear_workplace(&mut self) {
        self.workplace = None;
    }
}

/// Throttles the expensive `new`-scan; `in_progress` and `completed`
/// handling run every tick regardless (spec.md §4.7).
pub struct ConstructionSystem {
    new_scan_interval: i64,
    last_scanned_at: i64,
}

impl ConstructionSystem {
    pub fn new(new_scan_interval: i64) -> Self {
        ConstructionSystem {
            new_scan_interval,
            last_scanned_at: i64::MIN,
        }
    }
}

impl Default for ConstructionSystem {
    fn default() -> Self {
        Self::new(200)
    }
}

impl System for ConstructionSystem {
    fn process(&mut self, tick: i64, world: &mut World) {
        let run_new_scan =
            self.last_scanned_at == i64::MIN || tick - self.last_scanned_at >= self.new_scan_interval;
        if run_new_scan {
            self.last_scanned_at = tick;
        }

        for site in world.query1::<Construction>() {
            let state = world.get::<Construction>(site).unwrap().state;
            match state {
                ConstructionState::New => {
                    if run_new_scan {
                        step_new(site, world);
                    }
                }
                ConstructionState::InProgress => step_in_progress(site, world),
                ConstructionState::Completed => complete(site, world),
            }
        }
    }
}

fn step_new(site: Entity, world: &mut World) {
    let has_workers = !world.get::<Construction>(site).unwrap().workers().is_empty();
    if !has_workers {
        return;
    }
    let resources_ready = {
        let construction = world.get::<Construction>(site).unwrap();
        let Some(spec) = &construction.spec else { return };
        let routing = world.get::<InventoryRouting>(site);
        let Some(routing) = routing else { return };
        spec.required_resources
            .iter()
            .all(|(kind, _)| routing.storage(*kind).map(|s| s.is_full()).unwrap_or(false))
    };
    if resources_ready {
        world.get_mut::<Construction>(site).unwrap().state = ConstructionState::InProgress;
    }
}

fn step_in_progress(site: Entity, world: &mut World) {
    let worker_count = world.get::<Construction>(site).unwrap().workers().len() as u32;
    if worker_count == 0 {
        return;
    }
    let construction_ticks = world
        .get::<Construction>(site)
        .unwrap()
        .spec
        .as_ref()
        .map(|s| s.construction_ticks)
        .unwrap_or(0);

    let mut construction = world.get_mut::<Construction>(site).unwrap();
    construction.ticks += worker_count;
    if construction.ticks >= construction_ticks {
        construction.state = ConstructionState::Completed;
    }
}

fn complete(site: Entity, world: &mut World) {
    let mut construction = world.detach::<Construction>(site).unwrap();
    construction.stop();
    let workers = construction.workers().to_vec();
    let Some(spec) = construction.spec.take() else { return };

    for worker in workers {
        if !world.is_alive(worker) {
            continue;
        }
        if let Some(mut w) = world.get_mut::<ConstructionWorker>(worker) {
            w.clear_workplace();
        }
    }

    let _ = world.detach::<InventoryRouting>(site);
    let _ = world.attach(site, spec.finished_storages);

    if let Some(mut renderable) = world.get_mut::<Renderable>(site) {
        renderable.0 = spec.finished_renderable;
    }

    (spec.build_components)(site, world);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::storage::Storage;

    fn lumber_site() -> ConstructionSpec {
        ConstructionSpec {
            required_resources: vec![(ResourceKind::Lumber, 10)],
            construction_ticks: 4,
            required_abilities: HashSet::new(),
            finished_storages: InventoryRouting::new(),
            finished_renderable: "workshop".to_string(),
            build_components: Box::new(|_, _| {}),
        }
    }

    #[test]
    fn completes_after_resources_and_ticks() {
        let mut world = World::new();
        let site = world.spawn();
        let mut routing = InventoryRouting::new();
        let mut lumber = Storage::new(true, false, 10, 0);
        for _ in 0..10 {
            lumber.add(ResourceKind::Lumber);
        }
        routing = routing.with_storage(ResourceKind::Lumber, lumber);
        world.attach(site, routing).unwrap();
        world.attach(site, Construction::new(lumber_site(), 1)).unwrap();

        let carpenter = world.spawn();
        world.attach(carpenter, ConstructionWorker::new(HashSet::new())).unwrap();
        assert!(ConstructionWorker::start(carpenter, site, &mut world));

        let mut system = ConstructionSystem::new(1);
        system.process(0, &mut world);
        assert_eq!(world.get::<Construction>(site).unwrap().state, ConstructionState::InProgress);

        for t in 1..=4 {
            system.process(t, &mut world);
        }
        assert_eq!(world.get::<Construction>(site).unwrap().state, ConstructionState::Completed);
        system.process(5, &mut world);
        assert!(!world.has::<Construction>(site));
        assert!(world.get::<ConstructionWorker>(carpenter).unwrap().workplace().is_none());
    }
}
