//! Spatial components. Per spec.md §9's resolved open question, `Position`
//! is uniformly a component (never a bare value type), exposed under
//! `position` so renderers and travel logic reach it the same way.

use crate::ecs::{Component, Entity, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    pub fn distance_squared(self, other: Position) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }
}

impl Component for Position {
    const EXPOSURE: Option<&'static str> = Some("position");
}

/// Scalar movement speed, `>= 1` (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Velocity {
    pub speed: u32,
}

impl Velocity {
    pub fn new(speed: u32) -> Self {
        Velocity { speed: speed.max(1) }
    }
}

impl Component for Velocity {}

/// Opaque sprite/tag key for the renderer (SPEC_FULL.md §4): the core
/// never interprets this, it only swaps it on construction completion
/// (spec.md §4.7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renderable(pub String);

impl Component for Renderable {
    const EXPOSURE: Option<&'static str> = Some("renderable");
}

/// The renderer-facing read surface (SPEC_FULL.md §4): every positioned
/// entity paired with its renderable tag, if it has one. A renderer can
/// call this once per frame without touching any other component class.
pub fn renderable_frame(world: &World) -> Vec<(Entity, Position, Option<String>)> {
    world
        .query1::<Position>()
        .into_iter()
        .map(|e| {
            let position = *world.get::<Position>(e).unwrap();
            let renderable = world.get::<Renderable>(e).map(|r| r.0.clone());
            (e, position, renderable)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_includes_entities_with_and_without_a_renderable() {
        let mut world = World::new();
        let tagged = world.spawn();
        world.attach(tagged, Position::new(1, 2)).unwrap();
        world.attach(tagged, Renderable("tree".to_string())).unwrap();
        let bare = world.spawn();
        world.attach(bare, Position::new(3, 4)).unwrap();

        let frame = renderable_frame(&world);
        assert_eq!(frame.len(), 2);
        assert!(frame.contains(&(tagged, Position::new(1, 2), Some("tree".to_string()))));
        assert!(frame.contains(&(bare, Position::new(3, 4), None)));
    }
}
