//! Minimal read-only frame printer (SPEC_FULL.md §4). This crate only
//! reads the world through `gc_core::components::renderable_frame`; it does
//! no input handling and sets up no terminal backend, demonstrating that a
//! renderer can consume the simulation without touching component
//! internals or mutating state.

use anyhow::Result;
use gc_core::components::renderable_frame;
use gc_core::ecs::World;

/// Renders one frame as a sorted, stable list of `x,y tag` lines so repeated
/// calls over an unchanged world produce identical text.
pub fn render_frame(world: &World) -> String {
    let mut entries = renderable_frame(world);
    entries.sort_by_key(|(_, position, _)| (position.x, position.y));

    let mut out = String::new();
    for (_, position, renderable) in entries {
        let tag = renderable.as_deref().unwrap_or("-");
        out.push_str(&format!("{},{} {tag}\n", position.x, position.y));
    }
    out
}

/// Prints the current frame to stdout.
pub fn print_frame(world: &World) {
    print!("{}", render_frame(world));
}

/// Advances `world` by `ticks` single-tick steps, then prints the resulting
/// frame. This is the entire "UI" this crate provides.
pub fn run_and_print(world: &mut World, ticks: i64) -> Result<()> {
    for t in 1..=ticks {
        world.tick(t);
    }
    print_frame(world);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_core::components::{Position, Renderable};

    #[test]
    fn frame_is_sorted_by_position_and_includes_untagged_entities() {
        let mut world = World::new();
        let a = world.spawn();
        world.attach(a, Position::new(5, 0)).unwrap();
        world.attach(a, Renderable("tree".to_string())).unwrap();
        let b = world.spawn();
        world.attach(b, Position::new(1, 0)).unwrap();

        let frame = render_frame(&world);
        let lines: Vec<&str> = frame.lines().collect();
        assert_eq!(lines, vec!["1,0 -", "5,0 tree"]);
    }
}
