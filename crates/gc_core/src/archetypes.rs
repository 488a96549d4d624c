//! Component-bundle assembly for the engine's entity kinds (spec.md §2 "Entity
//! archetypes", §9's "component-bundle descriptor" re-architecture note: each
//! function here is a flat list of attaches, no inherited ancestry walk).

use std::collections::HashSet;

use crate::components::construction::{Construction, ConstructionSpec};
use crate::components::factory::{Factory, Pipeline};
use crate::components::generative::{Generative, TargetAttr};
use crate::components::harvest::{Harvestable, Harvester};
use crate::components::position::{Position, Renderable, Velocity};
use crate::components::spawner::{SpawnPipeline, Spawner};
use crate::components::storage::InventoryRouting;
use crate::components::transport::ResourceTransport;
use crate::components::travel::Travel;
use crate::components::villager_ai::{TaskKind, VillagerAi};
use crate::components::building::Building;
use crate::resource::ResourceKind;
use crate::ecs::{Entity, World};

/// Default villager movement speed and per-kind carry capacity, used
/// throughout world setup unless a caller has a reason to differ.
pub const DEFAULT_VILLAGER_SPEED: u32 = 2;
pub const DEFAULT_CARRY_CAPACITY: u32 = 5;

/// Which single task a freshly assembled villager is built to perform.
/// Spec.md §6's workforce counts (`{Harvester: 7, ...}`) describe one role
/// per villager, not a villager juggling several roles at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VillagerRole {
    Harvester,
    ConstructionWorker,
    FactoryWorker,
    SpawnerWorker,
    ResourceTransport,
}

/// Assembles a villager at `position` with the single worker component
/// `role` names, plus the `Travel`/`VillagerAi` scaffolding every villager
/// needs regardless of role.
pub fn spawn_villager(world: &mut World, position: Position, role: VillagerRole) -> Entity {
    let entity = world.spawn();
    world.attach(entity, position).unwrap();
    world.attach(entity, Velocity::new(DEFAULT_VILLAGER_SPEED)).unwrap();
    world.attach(entity, Travel::default()).unwrap();

    let task = match role {
        VillagerRole::Harvester => {
            let carry = InventoryRouting::new().with_storage(
                ResourceKind::TreeLog,
                crate::components::storage::Storage::new(true, true, DEFAULT_CARRY_CAPACITY, 0),
            );
            world.attach(entity, Harvester::new(carry, HashSet::new())).unwrap();
            Some(TaskKind::Harvester)
        }
        VillagerRole::ConstructionWorker => {
            world
                .attach(entity, crate::components::construction::ConstructionWorker::new(HashSet::new()))
                .unwrap();
            Some(TaskKind::ConstructionWorker)
        }
        VillagerRole::FactoryWorker => {
            world
                .attach(entity, crate::components::factory::FactoryWorker::default())
                .unwrap();
            Some(TaskKind::FactoryWorker)
        }
        VillagerRole::SpawnerWorker => {
            world
                .attach(entity, crate::components::spawner::SpawnerWorker::default())
                .unwrap();
            Some(TaskKind::SpawnerWorker)
        }
        VillagerRole::ResourceTransport => {
            let carry = InventoryRouting::new().with_storage(
                ResourceKind::Lumber,
                crate::components::storage::Storage::new(true, true, DEFAULT_CARRY_CAPACITY, 0),
            );
            world.attach(entity, ResourceTransport::new(carry)).unwrap();
            None
        }
    };

    let supported_tasks = task.into_iter().collect();
    world.attach(entity, VillagerAi::new(supported_tasks)).unwrap();
    entity
}

/// Installs the baseline loadout a spawner-produced villager gets by default
/// (spec.md §4.6, scenario 6): a `Harvester` over its own storages and a
/// `ResourceTransport`, positioned relative to the spawner.
pub fn spawn_produced_villager(new_entity: Entity, spawner: Entity, world: &mut World) {
    let spawner_pos = *world.get::<Position>(spawner).unwrap();
    let position = Position::new(spawner_pos.x + 1, spawner_pos.y + 10);

    world.attach(new_entity, position).unwrap();
    world.attach(new_entity, Velocity::new(DEFAULT_VILLAGER_SPEED)).unwrap();
    world.attach(new_entity, Travel::default()).unwrap();

    let harvest_carry = InventoryRouting::new().with_storage(
        ResourceKind::TreeLog,
        crate::components::storage::Storage::new(true, true, DEFAULT_CARRY_CAPACITY, 0),
    );
    world.attach(new_entity, Harvester::new(harvest_carry, HashSet::new())).unwrap();

    let transport_carry = InventoryRouting::new().with_storage(
        ResourceKind::Lumber,
        crate::components::storage::Storage::new(true, true, DEFAULT_CARRY_CAPACITY, 0),
    );
    world.attach(new_entity, ResourceTransport::new(transport_carry)).unwrap();

    world
        .attach(new_entity, VillagerAi::new(vec![TaskKind::Harvester]))
        .unwrap();
}

/// A renewable resource node (spec.md §8 scenario 1): `Harvestable` plus a
/// `Generative` regrowth driver targeting its yield.
pub fn spawn_tree(
    world: &mut World,
    position: Position,
    initial_quantity: u32,
    max_value: u32,
    harvest_value_per_cycle: u32,
    ticks_per_cycle: u32,
    max_workers: u32,
    regrowth_ticks_per_cycle: u32,
    regrowth_increase_per_cycle: u32,
) -> Entity {
    let entity = world.spawn();
    world.attach(entity, position).unwrap();
    world.attach(entity, Renderable("tree".to_string())).unwrap();
    world
        .attach(
            entity,
            Harvestable::new(
                ResourceKind::TreeLog,
                initial_quantity,
                harvest_value_per_cycle,
                ticks_per_cycle,
                max_workers,
            ),
        )
        .unwrap();
    world
        .attach(
            entity,
            Generative::new(
                -1,
                regrowth_ticks_per_cycle,
                regrowth_increase_per_cycle,
                max_value,
                TargetAttr::HarvestableYield,
            ),
        )
        .unwrap();
    entity
}

/// A non-renewable resource node: `Harvestable` with no `Generative` driver.
pub fn spawn_stone_quarry(
    world: &mut World,
    position: Position,
    initial_quantity: u32,
    harvest_value_per_cycle: u32,
    ticks_per_cycle: u32,
    max_workers: u32,
) -> Entity {
    let entity = world.spawn();
    world.attach(entity, position).unwrap();
    world.attach(entity, Renderable("stone_quarry".to_string())).unwrap();
    world
        .attach(
            entity,
            Harvestable::new(
                ResourceKind::Stone,
                initial_quantity,
                harvest_value_per_cycle,
                ticks_per_cycle,
                max_workers,
            ),
        )
        .unwrap();
    entity
}

/// Shared bundle every building variant starts from: a `Building` tag, a
/// `Position`, its storages, and a renderable tag (spec.md §3 "Building").
fn spawn_building_base(
    world: &mut World,
    position: Position,
    name: &'static str,
    storages: InventoryRouting,
    renderable: &str,
) -> Entity {
    let entity = world.spawn();
    world.attach(entity, position).unwrap();
    world.attach(entity, Building::new(name)).unwrap();
    world.attach(entity, storages).unwrap();
    world.attach(entity, Renderable(renderable.to_string())).unwrap();
    entity
}

/// A running sawmill (spec.md §8 scenario 2): one pipeline turning logs into
/// lumber.
pub fn spawn_sawmill(world: &mut World, position: Position, log_stock: u32) -> Entity {
    let mut logs = crate::components::storage::Storage::new(true, false, 10, 0);
    for _ in 0..log_stock {
        logs.add(ResourceKind::TreeLog);
    }
    let storages = InventoryRouting::new()
        .with_storage(ResourceKind::TreeLog, logs)
        .with_storage(ResourceKind::Lumber, crate::components::storage::Storage::new(false, true, 50, 0));

    let entity = spawn_building_base(world, position, "sawmill", storages, "sawmill");

    let pipeline = Pipeline::new(
        vec![crate::components::factory::PipelineInput {
            quantity: 1,
            resource_kind: ResourceKind::TreeLog,
        }],
        crate::components::factory::PipelineOutput {
            quantity: 5,
            resource_kind: ResourceKind::Lumber,
        },
        2,
    );
    world.attach(entity, Factory::new(vec![pipeline], 2)).unwrap();
    entity
}

/// A spawner house (spec.md §4.6, §8 scenario 6): `5 TreeLog -> 1 Villager`,
/// 2 ticks per cycle.
pub fn spawn_house(world: &mut World, position: Position) -> Entity {
    let storages = InventoryRouting::new().with_storage(
        ResourceKind::TreeLog,
        crate::components::storage::Storage::new(true, false, 10, 0),
    );
    let entity = spawn_building_base(world, position, "house", storages, "house");

    let pipeline = SpawnPipeline::new(
        vec![crate::components::factory::PipelineInput {
            quantity: 5,
            resource_kind: ResourceKind::TreeLog,
        }],
        1,
        2,
    );
    let build_entity: crate::components::spawner::EntityBuilder = std::rc::Rc::new(move |new_entity, world| {
        spawn_produced_villager(new_entity, entity, world);
    });
    world.attach(entity, Spawner::new(vec![pipeline], 1, build_entity)).unwrap();
    entity
}

/// A stone-workshop construction site (spec.md §8 scenario 4's shape,
/// generalized): finishes into a `Factory`.
pub fn spawn_stone_workshop_site(world: &mut World, position: Position) -> Entity {
    let required_storage = InventoryRouting::new().with_storage(
        ResourceKind::Lumber,
        crate::components::storage::Storage::new(true, false, 10, 0),
    );
    let entity = spawn_building_base(world, position, "stone_workshop_site", required_storage, "construction_site");

    let finished_storages = InventoryRouting::new()
        .with_storage(ResourceKind::Stone, crate::components::storage::Storage::new(true, false, 10, 0))
        .with_storage(ResourceKind::Lumber, crate::components::storage::Storage::new(false, true, 20, 0));
    let spec = ConstructionSpec {
        required_resources: vec![(ResourceKind::Lumber, 10)],
        construction_ticks: 40,
        required_abilities: HashSet::new(),
        finished_storages,
        finished_renderable: "stone_workshop".to_string(),
        build_components: Box::new(|site, world| {
            let pipeline = Pipeline::new(
                vec![crate::components::factory::PipelineInput {
                    quantity: 1,
                    resource_kind: ResourceKind::Stone,
                }],
                crate::components::factory::PipelineOutput {
                    quantity: 1,
                    resource_kind: ResourceKind::Lumber,
                },
                4,
            );
            let _ = world.attach(site, Factory::new(vec![pipeline], 2));
        }),
    };
    world.attach(entity, Construction::new(spec, 2)).unwrap();
    entity
}

/// A warehouse construction site: finishes into extra storage capacity with
/// no production pipeline.
pub fn spawn_warehouse_site(world: &mut World, position: Position) -> Entity {
    let required_storage = InventoryRouting::new().with_storage(
        ResourceKind::Lumber,
        crate::components::storage::Storage::new(true, false, 10, 0),
    );
    let entity = spawn_building_base(world, position, "warehouse_site", required_storage, "construction_site");

    let finished_storages = InventoryRouting::new()
        .with_storage(ResourceKind::Lumber, crate::components::storage::Storage::new(true, true, 100, 1))
        .with_storage(ResourceKind::Stone, crate::components::storage::Storage::new(true, true, 100, 1))
        .with_storage(ResourceKind::Food, crate::components::storage::Storage::new(true, true, 100, 1));
    let spec = ConstructionSpec {
        required_resources: vec![(ResourceKind::Lumber, 10)],
        construction_ticks: 40,
        required_abilities: HashSet::new(),
        finished_storages,
        finished_renderable: "warehouse".to_string(),
        build_components: Box::new(|_, _| {}),
    };
    world.attach(entity, Construction::new(spec, 4)).unwrap();
    entity
}
