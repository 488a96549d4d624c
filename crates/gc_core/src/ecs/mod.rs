//! Hand-rolled ECS core: entity arena, component indexing, capability
//! proxies, and tick dispatch (spec.md §4.1). Grounded on the arena/handle
//! shape of `dungeon2567-rollback_ecs`, restructured to the simpler
//! per-class-list-plus-reverse-map model spec.md §3 `ComponentIndex`
//! describes, and to the typed-proxy re-architecture spec.md §9 calls for
//! in place of the source's string-keyed dynamic dispatch.

mod component;
mod entity;
mod error;
mod proxy;
mod system;
mod world;

pub use component::Component;
pub use entity::Entity;
pub use error::EcsError;
pub use proxy::ComponentProxy;
pub use system::System;
pub use world::World;
