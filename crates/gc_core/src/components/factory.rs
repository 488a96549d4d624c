//! Reservation-guarded input→output production (spec.md §3 Pipeline, §4.5).

use super::position::Position;
use super::storage::InventoryRouting;
use crate::ecs::{Component, Entity, System, World};
use crate::resource::ResourceKind;

#[derive(Debug, Clone, Copy)]
pub struct PipelineInput {
    pub quantity: u32,
    pub resource_kind: ResourceKind,
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineOutput {
    pub quantity: u32,
    pub resource_kind: ResourceKind,
}

/// One production recipe inside a [`Factory`]. `source_storage`/
/// `sink_storage` from spec.md §3 are the owning factory's own
/// `InventoryRouting` storage for each input/output kind (factories keep
/// their buffers on the same entity, like the teacher's recipe stations).
pub struct Pipeline {
    pub inputs: Vec<PipelineInput>,
    pub output: PipelineOutput,
    pub reserved: bool,
    pub ticks_per_cycle: u32,
}

impl Pipeline {
    pub fn new(inputs: Vec<PipelineInput>, output: PipelineOutput, ticks_per_cycle: u32) -> Self {
        Pipeline {
            inputs,
            output,
            reserved: false,
            ticks_per_cycle,
        }
    }

    pub fn is_available(&self, routing: &InventoryRouting) -> bool {
        if self.reserved {
            return false;
        }
        let sink_full = routing
            .storage(self.output.resource_kind)
            .map(|s| s.is_full())
            .unwrap_or(true);
        if sink_full {
            return false;
        }
        self.inputs.iter().all(|input| {
            routing
                .storage(input.resource_kind)
                .map(|s| s.quantity() >= input.quantity)
                .unwrap_or(false)
        })
    }

    /// Atomically consumes every input, or consumes nothing at all.
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

    /// Adds up to `output.quantity` units to the sink, stopping early if it
    /// fills up (spec.md §4.5 step 4).
    fn build_outputs(&self, routing: &mut InventoryRouting) {
        if let Some(sink) = routing.storage_mut(self.output.resource_kind) {
            for _ in 0..self.output.quantity {
                if !sink.add(self.output.resource_kind) {
                    break;
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactoryState {
    Idle,
    Active,
}

pub struct Factory {
    pub pipelines: Vec<Pipeline>,
    pub max_workers: u32,
    workers: Vec<Entity>,
    pub active: bool,
    pub state: FactoryState,
}

impl Component for Factory {
    const EXPOSURE: Option<&'static str> = Some("factory");
}

impl Factory {
    pub fn new(pipelines: Vec<Pipeline>, max_workers: u32) -> Self {
        Factory {
            pipelines,
            max_workers,
            workers: Vec::new(),
            active: false,
            state: FactoryState::Idle,
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

    pub fn start(&mut self) {
        self.active = true;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    /// First pipeline for which `is_available` holds.
    pub fn available_pipeline(&self, routing: &InventoryRouting) -> Option<usize> {
        self.pipelines.iter().position(|p| p.is_available(routing))
    }
}

pub struct FactoryWorker {
    workplace: Option<Entity>,
    pipeline_index: Option<usize>,
    pub progress: u32,
    pub state: WorkerState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Active,
}

impl Component for FactoryWorker {
    const EXPOSURE: Option<&'static str> = Some("factory_worker");
}

impl Default for FactoryWorker {
    fn default() -> Self {
        FactoryWorker {
            workplace: None,
            pipeline_index: None,
            progress: 0,
            state: WorkerState::Idle,
        }
    }
}

impl FactoryWorker {
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

    pub fn is_active(&self, owner: Entity, world: &World) -> bool {
        self.can_work(owner, world) && self.state == WorkerState::Active
    }

    /// Fails if already employed or `target.add_worker(self)` refuses. A
    /// free function, not a method: it needs the `FactoryWorker` and
    /// `Factory` borrows of `world` in sequence, which a `&mut self`
    /// receiver taken from `world` can't coexist with a second `world`
    /// argument.
    pub fn start(owner: Entity, workplace: Entity, world: &mut World) -> bool {
        if world.get::<FactoryWorker>(owner).unwrap().workplace.is_some() {
            return false;
        }
        let accepted = world
            .get_mut::<Factory>(workplace)
            .map(|mut f| f.add_worker(owner))
            .unwrap_or(false);
        if !accepted {
            return false;
        }
        world.get_mut::<FactoryWorker>(owner).unwrap().workplace = Some(workplace);
        true
    }

    pub fn stop(owner: Entity, world: &mut World) {
        let workplace = {
            let mut worker = world.get_mut::<FactoryWorker>(owner).unwrap();
            worker.state = WorkerState::Idle;
            worker.pipeline_index = None;
            worker.progress = 0;
            worker.workplace.take()
        };
        if let Some(workplace) = workplace {
            if let Some(mut factory) = world.get_mut::<Factory>(workplace) {
                factory.remove_worker(owner);
            }
        }
    }
}

/// Throttle: only runs the (potentially heavy) per-worker loop every
/// `interval` ticks (spec.md §4.5).
pub struct FactorySystem {
    interval: i64,
    last_checked_at: i64,
}

impl FactorySystem {
    pub fn new(interval: i64) -> Self {
        FactorySystem {
            interval,
            last_checked_at: i64::MIN,
        }
    }
}

impl Default for FactorySystem {
    fn default() -> Self {
        Self::new(500)
    }
}

impl System for FactorySystem {
    fn should_process(&mut self, tick: i64) -> bool {
        if self.last_checked_at == i64::MIN || tick - self.last_checked_at >= self.interval {
            self.last_checked_at = tick;
            true
        } else {
            false
        }
    }

    fn process(&mut self, _tick: i64, world: &mut World) {
        for factory_entity in world.query1::<Factory>() {
            let (active, workers) = {
                let factory = world.get::<Factory>(factory_entity).unwrap();
                (factory.active, factory.workers().to_vec())
            };
            if !active || workers.is_empty() {
                continue;
            }
            if world.get::<Factory>(factory_entity).unwrap().state == FactoryState::Idle {
                world.get_mut::<Factory>(factory_entity).unwrap().state = FactoryState::Active;
            }

            for worker_entity in workers {
                step_worker(factory_entity, worker_entity, world);
            }
        }
    }
}

fn step_worker(factory_entity: Entity, worker_entity: Entity, world: &mut World) {
    if !world.is_alive(worker_entity) || world.get::<FactoryWorker>(worker_entity).is_none() {
        world
            .get_mut::<Factory>(factory_entity)
            .unwrap()
            .remove_worker(worker_entity);
        return;
    }

    let can_work = world
        .get::<FactoryWorker>(worker_entity)
        .unwrap()
        .can_work(worker_entity, world);
    if !can_work {
        let mut worker = world.get_mut::<FactoryWorker>(worker_entity).unwrap();
        if let Some(idx) = worker.pipeline_index.take() {
            if let Some(mut factory) = world.get_mut::<Factory>(factory_entity) {
                factory.pipelines[idx].reserved = false;
            }
        }
        worker.progress = 0;
        drop(worker);
        let already_traveling = world
            .get::<super::travel::Travel>(worker_entity)
            .map(|t| t.is_targeting(factory_entity))
            .unwrap_or(false);
        if !already_traveling {
            if let Some(mut travel) = world.get_mut::<super::travel::Travel>(worker_entity) {
                travel.start(factory_entity);
            }
        }
        return;
    }

    let is_active = world
        .get::<FactoryWorker>(worker_entity)
        .unwrap()
        .is_active(worker_entity, world);
    if !is_active {
        let picked = {
            let factory = world.get::<Factory>(factory_entity).unwrap();
            let routing = world.get::<InventoryRouting>(factory_entity).unwrap();
            factory.available_pipeline(&routing)
        };
        let Some(pipeline_idx) = picked else { return };

        let consumed = {
            let mut factory = world.get_mut::<Factory>(factory_entity).unwrap();
            let mut routing = world.get_mut::<InventoryRouting>(factory_entity).unwrap();
            let pipeline = &mut factory.pipelines[pipeline_idx];
            let ok = pipeline.consume_inputs(&mut routing);
            if ok {
                pipeline.reserved = true;
            }
            ok
        };
        if !consumed {
            return;
        }
        let mut worker = world.get_mut::<FactoryWorker>(worker_entity).unwrap();
        worker.pipeline_index = Some(pipeline_idx);
        worker.state = WorkerState::Active;
        drop(worker);
    }

    let pipeline_idx = world
        .get::<FactoryWorker>(worker_entity)
        .unwrap()
        .pipeline_index
        .unwrap();
    let ticks_per_cycle = world.get::<Factory>(factory_entity).unwrap().pipelines[pipeline_idx]
        .ticks_per_cycle;
    let progress = world.get::<FactoryWorker>(worker_entity).unwrap().progress + 1;

    if progress >= ticks_per_cycle {
        {
            let mut factory = world.get_mut::<Factory>(factory_entity).unwrap();
            let mut routing = world.get_mut::<InventoryRouting>(factory_entity).unwrap();
            let pipeline = &mut factory.pipelines[pipeline_idx];
            pipeline.build_outputs(&mut routing);
            pipeline.reserved = false;
        }
        let mut worker = world.get_mut::<FactoryWorker>(worker_entity).unwrap();
        worker.pipeline_index = None;
        worker.progress = 0;
        worker.state = WorkerState::Idle;
    } else {
        world.get_mut::<FactoryWorker>(worker_entity).unwrap().progress = progress;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::position::Position;

    fn sawmill_pipeline() -> Pipeline {
        Pipeline::new(
            vec![PipelineInput {
                quantity: 1,
                resource_kind: ResourceKind::TreeLog,
            }],
            PipelineOutput {
                quantity: 5,
                resource_kind: ResourceKind::Lumber,
            },
            2,
        )
    }

    #[test]
    fn sawmill_cycle_matches_scenario() {
        let mut world = World::new();
        let sawmill = world.spawn();
        world.attach(sawmill, Position::new(0, 0)).unwrap();
        let mut routing = InventoryRouting::new()
            .with_storage(ResourceKind::TreeLog, {
                let mut s = crate::components::storage::Storage::new(true, false, 10, 0);
                s.add(ResourceKind::TreeLog);
                s.add(ResourceKind::TreeLog);
                s
            })
            .with_storage(ResourceKind::Lumber, crate::components::storage::Storage::new(
                false, true, 50, 0,
            ));
        world.attach(sawmill, routing).unwrap();
        world.attach(sawmill, Factory::new(vec![sawmill_pipeline()], 1)).unwrap();

        let worker = world.spawn();
        world.attach(worker, Position::new(0, 0)).unwrap();
        world.attach(worker, FactoryWorker::default()).unwrap();
        assert!(FactoryWorker::start(worker, sawmill, &mut world));

        let mut system = FactorySystem::new(1);
        for _ in 0..2 {
            system.process(0, &mut world);
        }
        routing = world.detach::<InventoryRouting>(sawmill).unwrap();
        assert_eq!(routing.storage(ResourceKind::TreeLog).unwrap().quantity(), 1);
        assert_eq!(routing.storage(ResourceKind::Lumber).unwrap().quantity(), 5);
        world.attach(sawmill, routing).unwrap();

        for _ in 0..2 {
            system.process(0, &mut world);
        }
        let routing = world.get::<InventoryRouting>(sawmill).unwrap();
        assert_eq!(routing.storage(ResourceKind::TreeLog).unwrap().quantity(), 0);
        assert_eq!(routing.storage(ResourceKind::Lumber).unwrap().quantity(), 10);
    }
}
