//! End-to-end scenario coverage (spec.md §8), exercising full systems over a
//! hand-assembled world rather than calling component methods directly.

use gc_core::archetypes::spawn_house;
use gc_core::archetypes::spawn_tree;
use gc_core::components::harvest::{Harvester, HarvesterSystem};
use gc_core::components::position::{Position, Velocity};
use gc_core::components::spawner::SpawnerWorker;
use gc_core::components::storage::{InventoryRouting, Storage};
use gc_core::components::transport::ResourceTransport;
use gc_core::components::travel::{Travel, TravelSystem};
use gc_core::components::generative::GenerativeSystem;
use gc_core::components::spawner::SpawnerSystem;
use gc_core::ecs::{System, World};
use gc_core::resource::ResourceKind;

#[test]
fn regrowth_reaches_cap_and_then_holds() {
    let mut world = World::new();
    let tree = spawn_tree(&mut world, Position::new(0, 0), 1, 10, 3, 3, 1, 4, 1);

    let mut generative = GenerativeSystem;
    for _ in 0..40 {
        generative.process(0, &mut world);
    }
    let harvestable = world.get::<gc_core::components::harvest::Harvestable>(tree).unwrap();
    assert_eq!(harvestable.current_yield(), 10);
    drop(harvestable);

    for _ in 0..60 {
        generative.process(0, &mut world);
    }
    assert_eq!(
        world
            .get::<gc_core::components::harvest::Harvestable>(tree)
            .unwrap()
            .current_yield(),
        10
    );
}

#[test]
fn harvest_then_deliver_round_trip() {
    let mut world = World::new();

    let tree = spawn_tree(&mut world, Position::new(0, 0), 3, 3, 3, 3, 1, 1, 0);

    let destination = world.spawn();
    world.attach(destination, Position::new(10, 0)).unwrap();
    world
        .attach(
            destination,
            InventoryRouting::new().with_storage(ResourceKind::TreeLog, Storage::new(true, false, 5, 0)),
        )
        .unwrap();

    let harvester = world.spawn();
    world.attach(harvester, Position::new(0, 0)).unwrap();
    world.attach(harvester, Velocity::new(2)).unwrap();
    world.attach(harvester, Travel::default()).unwrap();
    let carry = InventoryRouting::new().with_storage(ResourceKind::TreeLog, Storage::new(true, true, 1, 0));
    world
        .attach(harvester, Harvester::new(carry, Default::default()))
        .unwrap();
    assert!(Harvester::start(harvester, tree, &mut world));
    world.get_mut::<Harvester>(harvester).unwrap().assign_destination(destination);

    let mut travel_system = TravelSystem;
    let mut harvester_system = HarvesterSystem;
    for t in 1..=11 {
        travel_system.process(t, &mut world);
        harvester_system.process(t, &mut world);
    }

    let harvester_component = world.get::<Harvester>(harvester).unwrap();
    assert_eq!(harvester_component.state, gc_core::components::harvest::HarvesterState::Idle);
    assert_eq!(harvester_component.destination(), None);
    drop(harvester_component);

    assert_eq!(*world.get::<Position>(harvester).unwrap(), Position::new(10, 0));

    let destination_routing = world.get::<InventoryRouting>(destination).unwrap();
    assert_eq!(destination_routing.storage(ResourceKind::TreeLog).unwrap().quantity(), 1);

    let tree_component = world.get::<gc_core::components::harvest::Harvestable>(tree).unwrap();
    assert_eq!(tree_component.current_yield(), 2);
}

#[test]
fn spawner_produces_a_new_villager_after_two_cycles() {
    let mut world = World::new();
    let house = spawn_house(&mut world, Position::new(0, 0));
    {
        let mut routing = world.get_mut::<InventoryRouting>(house).unwrap();
        let storage = routing.storage_mut(ResourceKind::TreeLog).unwrap();
        for _ in 0..5 {
            storage.add(ResourceKind::TreeLog);
        }
    }

    let worker = world.spawn();
    world.attach(worker, Position::new(0, 0)).unwrap();
    world.attach(worker, SpawnerWorker::default()).unwrap();
    assert!(SpawnerWorker::start(worker, house, &mut world));

    assert!(world.query1::<Harvester>().is_empty());

    let mut system = SpawnerSystem::new(1);
    for _ in 0..2 {
        system.process(0, &mut world);
    }

    let house_routing = world.get::<InventoryRouting>(house).unwrap();
    assert_eq!(house_routing.storage(ResourceKind::TreeLog).unwrap().quantity(), 0);
    drop(house_routing);

    let produced: Vec<_> = world.query1::<Harvester>();
    assert_eq!(produced.len(), 1);
    let villager = produced[0];
    assert!(world.get::<ResourceTransport>(villager).is_some());
    assert_eq!(*world.get::<Position>(villager).unwrap(), Position::new(1, 10));
}
