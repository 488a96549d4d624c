use gc_core::bootstrap::{build_standard_world, ScheduleTuning, WorldSetupFlags};
use gc_tui::render_frame;

#[test]
fn frame_is_deterministic_for_a_fixed_seed() {
    let flags = WorldSetupFlags {
        with_sawmill: true,
        with_house: true,
        random_seed: Some(7),
        ..WorldSetupFlags::default()
    };
    let mut world_a = build_standard_world(flags, ScheduleTuning::default());
    let mut world_b = build_standard_world(flags, ScheduleTuning::default());

    for t in 1..=50 {
        world_a.tick(t);
        world_b.tick(t);
    }

    assert_eq!(render_frame(&world_a), render_frame(&world_b));
}

#[test]
fn frame_lists_every_positioned_entity() {
    let flags = WorldSetupFlags {
        with_sawmill: true,
        random_seed: Some(1),
        ..WorldSetupFlags::default()
    };
    let world = build_standard_world(flags, ScheduleTuning::default());
    let frame = render_frame(&world);
    assert!(frame.contains("sawmill"));
}
