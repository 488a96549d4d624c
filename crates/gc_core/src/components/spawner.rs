//! A Factory whose pipeline output is new entities instead of resources
//! (spec.md §4.6).

use std::rc::Rc;

use super::factory::{FactoryState, PipelineInput};
use super::position::Position;
use super::storage::InventoryRouting;
use crate::ecs::{Component, Entity, System, World};

pub struct SpawnPipeline {
    pub inputs: Vec<PipelineInput>,
    pub spawn_count: u32,
    pub reserved: bool,
    pub ticks_per_cycle: u32,
}

impl SpawnPipeline {
    pub fn new(inputs: Vec<PipelineInput>, spawn_count: u32, ticks_per_cycle: u32) -> Self {
        SpawnPipeline {
            inputs,
            spawn_count,
            reserved: false,
            ticks_per_cycle,
        }
    }

    /// No sink to check fullness of; only the inputs gate availability.
    pub fn is_available(&self, routing: &InventoryRouting) -> bool {
        if self.reserved {
            return false;
        }
        self.inputs.iter().all(|input| {
            routing
                .storage(input.resource_kind)
                .map(|s| s.quantity() >= input.quantity)
                .unwrap_or(false)
        })
    }

    fn consume_inputs(&self, routing: &mut InventoryRouting) -> bool {
        if !self.is_available(routing) {
            return false;
        }
        for input in &self.inputs {
            let storage = routing.storage_mut(input.resource_kind).unwrap();
            for _ in 0..input.quantity {
                storage.pop();
            }
        }
        true
    }
}

/// Installs the baseline components a freshly spawned villager needs, and
/// registers it with the world. This *is* the `on_production(factory,
/// [entities])` callback of spec.md §4.6 — it is not an optional override
/// with a separate default, it is mandatory and always runs, which is the
/// only callback this engine ever needed one of.
pub type EntityBuilder = Rc<dyn Fn(Entity, &mut World)>;

pub struct Spawner {
    pub pipelines: Vec<SpawnPipeline>,
    pub max_workers: u32,
    workers: Vec<Entity>,
    pub active: bool,
    pub state: FactoryState,
    pub build_entity: EntityBuilder,
}

impl Component for Spawner {
    const EXPOSURE: Option<&'static str> = Some("spawner");
}

impl Spawner {
    pub fn new(pipelines: Vec<SpawnPipeline>, max_workers: u32, build_entity: EntityBuilder) -> Self {
        Spawner {
            pipelines,
            max_workers,
            workers: Vec::new(),
            active: false,
            state: FactoryState::Idle,
            build_entity,
        }
    }

    pub fn can_add_worker(&self) -> bool {
        (self.workers.len() as u32) < self.max_workers
    }

    pub fn add_worker(&mut self, worker: Entity) -> bool {
        if !self.can_add_worker() {
            return false;
        }
        self.workers.push(worker);
        self.active = true;
        true
    }

    pub fn remove_worker(&mut self, worker: Entity) {
        self.workers.retain(|&w| w != worker);
    }

    pub fn workers(&self) -> &[Entity] {
        &self.workers
    }

    pub fn available_pipeline(&self, routing: &InventoryRouting) -> Option<usize> {
        self.pipelines.iter().position(|p| p.is_available(routing))
    }
}

pub struct SpawnerWorker {
    workplace: Option<Entity>,
    pipeline_index: Option<usize>,
    pub progress: u32,
    pub active: bool,
}

impl Component for SpawnerWorker {
    const EXPOSURE: Option<&'static str> = Some("spawner_worker");
}

impl Default for SpawnerWorker {
    fn default() -> Self {
        SpawnerWorker {
            workplace: None,
            pipeline_index: None,
            progress: 0,
            active: false,
        }
    }
}

impl SpawnerWorker {
    pub fn workplace(&self) -> Option<Entity> {
        self.workplace
    }

    pub fn can_work(&self, owner: Entity, world: &World) -> bool {
        let Some(workplace) = self.workplace else { return false };
        if !world.is_alive(workplace) {
            return false;
        }
        world.get::<Position>(owner).map(|p| *p) == world.get::<Position>(workplace).map(|p| *p)
    }

    /// Free function for the same reason as [`super::factory::FactoryWorker::start`].
    pub fn start(owner: Entity, workplace: Entity, world: &mut World) -> bool {
        if world.get::<SpawnerWorker>(owner).unwrap().workplace.is_some() {
            return false;
        }
        let accepted = world
            .get_mut::<Spawner>(workplace)
            .map(|mut s| s.add_worker(owner))
            .unwrap_or(false);
        if accepted {
            world.get_mut::<SpawnerWorker>(owner).unwrap().workplace = Some(workplace);
        }
        accepted
    }

    pub fn stop(owner: Entity, world: &mut World) {
        let workplace = {
            let mut worker = world.get_mut::<SpawnerWorker>(owner).unwrap();
            worker.active = false;
            worker.pipeline_index = None;
            worker.progress = 0;
            worker.workplace.take()
        };
        if let Some(workplace) = workplace {
            if let Some(mut spawner) = world.get_mut::<Spawner>(workplace) {
                spawner.remove_worker(owner);
            }
        }
    }
}

pub struct SpawnerSystem {
    interval: i64,
    last_checked_at: i64,
}

impl SpawnerSystem {
    pub fn new(interval: i64) -> Self {
        SpawnerSystem {
            interval,
            last_checked_at: i64::MIN,
        }
    }
}

impl Default for SpawnerSystem {
    fn default() -> Self {
        Self::new(500)
    }
}

impl System for SpawnerSystem {
    fn should_process(&mut self, tick: i64) -> bool {
        if self.last_checked_at == i64::MIN || tick - self.last_checked_at >= self.interval {
            self.last_checked_at = tick;
            true
        } else {
            false
        }
    }

    fn process(&mut self, _tick: i64, world: &mut World) {
        for spawner_entity in world.query1::<Spawner>() {
            let (active, workers) = {
                let spawner = world.get::<Spawner>(spawner_entity).unwrap();
                (spawner.active, spawner.workers().to_vec())
            };
            if !active || workers.is_empty() {
                continue;
            }
            if world.get::<Spawner>(spawner_entity).unwrap().state == FactoryState::Idle {
                world.get_mut::<Spawner>(spawner_entity).unwrap().state = FactoryState::Active;
            }

            for worker_entity in workers {
                step_worker(spawner_entity, worker_entity, world);
            }
        }
    }
}

fn step_worker(spawner_entity: Entity, worker_entity: Entity, world: &mut World) {
    if !world.is_alive(worker_entity) || world.get::<SpawnerWorker>(worker_entity).is_none() {
        world
            .get_mut::<Spawner>(spawner_entity)
            .unwrap()
            .remove_worker(worker_entity);
        return;
    }

    let can_work = world
        .get::<SpawnerWorker>(worker_entity)
        .unwrap()
        .can_work(worker_entity, world);
    if !can_work {
        let mut worker = world.get_mut::<SpawnerWorker>(worker_entity).unwrap();
        if let Some(idx) = worker.pipeline_index.take() {
            if let Some(mut spawner) = world.get_mut::<Spawner>(spawner_entity) {
                spawner.pipelines[idx].reserved = false;
            }
        }
        worker.progress = 0;
        drop(worker);
        let already_traveling = world
            .get::<super::travel::Travel>(worker_entity)
            .map(|t| t.is_targeting(spawner_entity))
            .unwrap_or(false);
        if !already_traveling {
            if let Some(mut travel) = world.get_mut::<super::travel::Travel>(worker_entity) {
                travel.start(spawner_entity);
            }
        }
        return;
    }

    let active = world.get::<SpawnerWorker>(worker_entity).unwrap().active
        && world.get::<SpawnerWorker>(worker_entity).unwrap().can_work(worker_entity, world);
    if !active {
        let picked = {
            let spawner = world.get::<Spawner>(spawner_entity).unwrap();
            let routing = world.get::<InventoryRouting>(spawner_entity).unwrap();
            spawner.available_pipeline(&routing)
        };
        let Some(pipeline_idx) = picked else { return };

        let consumed = {
            let mut spawner = world.get_mut::<Spawner>(spawner_entity).unwrap();
            let mut routing = world.get_mut::<InventoryRouting>(spawner_entity).unwrap();
            let pipeline = &mut spawner.pipelines[pipeline_idx];
            let ok = pipeline.consume_inputs(&mut routing);
            if ok {
                pipeline.reserved = true;
            }
            ok
        };
        if !consumed {
            return;
        }
        let mut worker = world.get_mut::<SpawnerWorker>(worker_entity).unwrap();
        worker.pipeline_index = Some(pipeline_idx);
        worker.active = true;
        drop(worker);
    }

    let pipeline_idx = world
        .get::<SpawnerWorker>(worker_entity)
        .unwrap()
        .pipeline_index
        .unwrap();
    let (ticks_per_cycle, spawn_count) = {
        let spawner = world.get::<Spawner>(spawner_entity).unwrap();
        let p = &spawner.pipelines[pipeline_idx];
        (p.ticks_per_cycle, p.spawn_count)
    };
    let progress = world.get::<SpawnerWorker>(worker_entity).unwrap().progress + 1;

    if progress >= ticks_per_cycle {
        build_outputs(spawner_entity, spawn_count, world);
        world.get_mut::<Spawner>(spawner_entity).unwrap().pipelines[pipeline_idx].reserved = false;

        let mut worker = world.get_mut::<SpawnerWorker>(worker_entity).unwrap();
        worker.pipeline_index = None;
        worker.progress = 0;
        worker.active = false;
    } else {
        world.get_mut::<SpawnerWorker>(worker_entity).unwrap().progress = progress;
    }
}

fn build_outputs(spawner_entity: Entity, count: u32, world: &mut World) -> Vec<Entity> {
    let builder = world.get::<Spawner>(spawner_entity).unwrap().build_entity.clone();
    let mut spawned = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let entity = world.spawn();
        builder(entity, world);
        spawned.push(entity);
    }
    spawned
}
