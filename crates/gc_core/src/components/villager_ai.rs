//! Task selection and target-search heuristics for villagers (spec.md
//! §4.10). The heavy lifting of each task (travel, harvesting, production)
//! lives in that task's own system; this module only decides *which* task
//! a villager takes on and *which* target it binds to.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;

use super::construction::{Construction, ConstructionWorker};
use super::factory::{Factory, FactoryWorker};
use super::harvest::{Harvestable, Harvester, HarvesterState};
use super::spawner::{Spawner, SpawnerWorker};
use super::storage::InventoryRouting;
use super::transport::ResourceTransport;
use super::travel::Travel;
use crate::ecs::{Component, Entity, System, World};
use crate::resource::ResourceKind;
use crate::rng::DeterministicRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Harvester,
    ConstructionWorker,
    FactoryWorker,
    SpawnerWorker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiState {
    Idle,
    Busy,
}

/// `supported_tasks` is fixed at archetype-construction time: which of the
/// four task-worker components this villager was built with (spec.md §9's
/// resolved reading of "locally supported tasks" as a per-entity memoized
/// list rather than a global capability scan).
pub struct VillagerAi {
    pub state: AiState,
    pub task: Option<TaskKind>,
    pub supported_tasks: Vec<TaskKind>,
}

impl Component for VillagerAi {}

impl VillagerAi {
    pub fn new(supported_tasks: Vec<TaskKind>) -> Self {
        VillagerAi {
            state: AiState::Idle,
            task: None,
            supported_tasks,
        }
    }
}

pub struct VillagerAiSystem {
    rng: DeterministicRng,
    harvester_destination_cooldown_ticks: i64,
    last_destination_search: HashMap<Entity, i64>,
}

impl VillagerAiSystem {
    pub fn new(seed: u64, harvester_destination_cooldown_ticks: i64) -> Self {
        VillagerAiSystem {
            rng: DeterministicRng::new(seed),
            harvester_destination_cooldown_ticks,
            last_destination_search: HashMap::new(),
        }
    }
}

impl System for VillagerAiSystem {
    fn process(&mut self, tick: i64, world: &mut World) {
        for villager in world.query1::<VillagerAi>() {
            reconcile_task_end(villager, world);

            let (state, task) = {
                let ai = world.get::<VillagerAi>(villager).unwrap();
                (ai.state, ai.task)
            };

            if state == AiState::Idle && task.is_none() {
                self.assign_task(villager, world);
            } else if state == AiState::Busy && task == Some(TaskKind::Harvester) {
                self.handle_busy_harvester(villager, tick, world);
            }

            if world.has::<ResourceTransport>(villager) {
                self.handle_idle_transport(villager, world);
            }
        }
    }
}

impl VillagerAiSystem {
    fn assign_task(&mut self, villager: Entity, world: &mut World) {
        let mut order = world.get::<VillagerAi>(villager).unwrap().supported_tasks.clone();
        order.shuffle(&mut self.rng.ai_rng);

        for task in order {
            let started = match task {
                TaskKind::Harvester => self.try_start_harvester(villager, world),
                TaskKind::ConstructionWorker => self.try_start_construction_worker(villager, world),
                TaskKind::FactoryWorker => self.try_start_factory_worker(villager, world),
                TaskKind::SpawnerWorker => self.try_start_spawner_worker(villager, world),
            };
            if started {
                let mut ai = world.get_mut::<VillagerAi>(villager).unwrap();
                ai.task = Some(task);
                ai.state = AiState::Busy;
                return;
            }
        }
    }

    fn try_start_harvester(&mut self, villager: Entity, world: &mut World) -> bool {
        if !world.has::<Harvester>(villager) {
            return false;
        }
        if world.get::<Harvester>(villager).unwrap().source().is_some() {
            return false;
        }
        let mut candidates = world.query1::<Harvestable>();
        candidates.shuffle(&mut self.rng.ai_rng);
        let target = candidates
            .into_iter()
            .find(|&e| world.get::<Harvestable>(e).unwrap().can_add_worker());
        let Some(target) = target else { return false };
        Harvester::start(villager, target, world)
    }

    fn try_start_construction_worker(&mut self, villager: Entity, world: &mut World) -> bool {
        if !world.has::<ConstructionWorker>(villager) {
            return false;
        }
        if world.get::<ConstructionWorker>(villager).unwrap().workplace().is_some() {
            return false;
        }
        let abilities = world.get::<ConstructionWorker>(villager).unwrap().abilities.clone();
        let mut candidates = world.query1::<Construction>();
        candidates.shuffle(&mut self.rng.ai_rng);
        let target = candidates.into_iter().find(|&e| {
            let c = world.get::<Construction>(e).unwrap();
            if (c.workers().len() as u32) >= c.max_workers {
                return false;
            }
            match &c.spec {
                Some(spec) => spec.required_abilities.is_empty() || !spec.required_abilities.is_disjoint(&abilities),
                None => true,
            }
        });
        let Some(target) = target else { return false };
        ConstructionWorker::start(villager, target, world)
    }

    fn try_start_factory_worker(&mut self, villager: Entity, world: &mut World) -> bool {
        if !world.has::<FactoryWorker>(villager) {
            return false;
        }
        if world.get::<FactoryWorker>(villager).unwrap().workplace().is_some() {
            return false;
        }
        let mut candidates = world.query1::<Factory>();
        candidates.shuffle(&mut self.rng.ai_rng);
        let target = candidates
            .into_iter()
            .find(|&e| world.get::<Factory>(e).unwrap().can_add_worker());
        let Some(target) = target else { return false };
        FactoryWorker::start(villager, target, world)
    }

    fn try_start_spawner_worker(&mut self, villager: Entity, world: &mut World) -> bool {
        if !world.has::<SpawnerWorker>(villager) {
            return false;
        }
        if world.get::<SpawnerWorker>(villager).unwrap().workplace().is_some() {
            return false;
        }
        let mut candidates = world.query1::<Spawner>();
        candidates.shuffle(&mut self.rng.ai_rng);
        let target = candidates
            .into_iter()
            .find(|&e| world.get::<Spawner>(e).unwrap().can_add_worker());
        let Some(target) = target else { return false };
        SpawnerWorker::start(villager, target, world)
    }

    /// A harvester that's gone `full` without a destination searches for
    /// one on a long cooldown (spec.md §4.10 "busy handling").
    fn handle_busy_harvester(&mut self, villager: Entity, tick: i64, world: &mut World) {
        let (state, has_destination) = {
            let h = world.get::<Harvester>(villager).unwrap();
            (h.state, h.destination().is_some())
        };
        if state != HarvesterState::Full || has_destination {
            return;
        }

        let last = self.last_destination_search.get(&villager).copied();
        if let Some(last) = last {
            if tick - last < self.harvester_destination_cooldown_ticks {
                return;
            }
        }
        self.last_destination_search.insert(villager, tick);

        let carried_kinds: HashSet<ResourceKind> = world.get::<Harvester>(villager).unwrap().carry.kinds().collect();
        let mut candidates: Vec<Entity> = world
            .query1::<InventoryRouting>()
            .into_iter()
            .filter(|&e| {
                world
                    .get::<InventoryRouting>(e)
                    .unwrap()
                    .wants_resources()
                    .iter()
                    .any(|k| carried_kinds.contains(k))
            })
            .collect();
        candidates.shuffle(&mut self.rng.ai_rng);
        let Some(destination) = candidates.into_iter().next() else { return };

        if let Some(mut travel) = world.get_mut::<Travel>(villager) {
            travel.stop();
        }
        let mut harvester = world.get_mut::<Harvester>(villager).unwrap();
        harvester.assign_destination(destination);
        harvester.state = HarvesterState::Delivering;
    }

    /// The only idle-handling heuristic currently declared:
    /// resource-transport-for-villager (spec.md §4.10).
    fn handle_idle_transport(&mut self, villager: Entity, world: &mut World) {
        if world.get::<ResourceTransport>(villager).unwrap().destination().is_some() {
            return;
        }

        let mut sources = world.query2::<Factory, InventoryRouting>();
        sources.shuffle(&mut self.rng.ai_rng);

        for source in sources {
            let kind = world.get::<InventoryRouting>(source).unwrap().available_for_transport(None);
            let Some(kind) = kind else { continue };

            if let Some(destination) = pick_destination_wanting(world, &mut self.rng, source, kind) {
                world.get_mut::<ResourceTransport>(villager).unwrap().start(destination, Some(source));
                return;
            }
        }
    }
}

fn reconcile_task_end(villager: Entity, world: &mut World) {
    let task = world.get::<VillagerAi>(villager).unwrap().task;
    let Some(task) = task else { return };
    let still_assigned = match task {
        TaskKind::Harvester => world.get::<Harvester>(villager).map(|h| h.source().is_some()).unwrap_or(false),
        TaskKind::ConstructionWorker => world
            .get::<ConstructionWorker>(villager)
            .map(|w| w.workplace().is_some())
            .unwrap_or(false),
        TaskKind::FactoryWorker => world
            .get::<FactoryWorker>(villager)
            .map(|w| w.workplace().is_some())
            .unwrap_or(false),
        TaskKind::SpawnerWorker => world
            .get::<SpawnerWorker>(villager)
            .map(|w| w.workplace().is_some())
            .unwrap_or(false),
    };
    if !still_assigned {
        let mut ai = world.get_mut::<VillagerAi>(villager).unwrap();
        ai.task = None;
        ai.state = AiState::Idle;
    }
}

/// Priority tiers: construction sites first, then factories, then anyone
/// wanting `kind` (spec.md §4.10 "idle handling — resource transport").
fn pick_destination_wanting(
    world: &World,
    rng: &mut DeterministicRng,
    source: Entity,
    kind: ResourceKind,
) -> Option<Entity> {
    let wants_kind = |e: Entity| -> bool {
        world
            .get::<InventoryRouting>(e)
            .map(|r| r.wants_resources().contains(&kind))
            .unwrap_or(false)
    };

    let mut tier1: Vec<Entity> = world
        .query2::<Construction, InventoryRouting>()
        .into_iter()
        .filter(|&e| wants_kind(e))
        .collect();
    if !tier1.is_empty() {
        tier1.shuffle(&mut rng.ai_rng);
        return tier1.into_iter().next();
    }

    let mut tier2: Vec<Entity> = world
        .query2::<Factory, InventoryRouting>()
        .into_iter()
        .filter(|&e| e != source && wants_kind(e))
        .collect();
    if !tier2.is_empty() {
        tier2.shuffle(&mut rng.ai_rng);
        return tier2.into_iter().next();
    }

    let mut tier3: Vec<Entity> = world
        .query1::<InventoryRouting>()
        .into_iter()
        .filter(|&e| e != source && wants_kind(e))
        .collect();
    if !tier3.is_empty() {
        tier3.shuffle(&mut rng.ai_rng);
        return tier3.into_iter().next();
    }

    None
}
