//! Static tag marking an entity as a building (as opposed to a villager),
//! for archetype bookkeeping and rendering. Storages live separately on
//! [`super::storage::InventoryRouting`].

use crate::ecs::Component;

pub struct Building {
    pub name: &'static str,
}

impl Component for Building {
    const EXPOSURE: Option<&'static str> = Some("building");
}

impl Building {
    pub fn new(name: &'static str) -> Self {
        Building { name }
    }
}
