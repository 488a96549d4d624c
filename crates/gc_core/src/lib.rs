//! # Settler Camp Core Simulation Engine
//!
//! `gc_core` is the tick-based settler/economy/logistics simulation
//! described by spec.md: villagers harvest renewable and non-renewable
//! resources, haul goods between storages, staff production pipelines and
//! construction sites, and spawn new villagers from houses.
//!
//! ## Architecture overview
//!
//! The engine follows Entity-Component-System principles on top of a
//! hand-rolled, arena-based ECS (no host ECS framework — see `ecs` and
//! DESIGN.md for why):
//!
//! - **Entities**: villagers, resource nodes, buildings, construction sites.
//! - **Components**: pure data (`Position`, `Storage`/`InventoryRouting`,
//!   `Harvestable`, `Factory`, `Construction`, `Spawner`, `VillagerAi`, ...).
//! - **Systems**: per-tick logic operating on that data (`TravelSystem`,
//!   `HarvesterSystem`, `FactorySystem`, `ConstructionSystem`,
//!   `ResourceTransportSystem`, `SpawnerSystem`, `VillagerAiSystem`).
//!
//! ## Module organization
//!
//! - [`ecs`]: the entity arena, component storage, exposure/proxy rules and
//!   the `System` trait.
//! - [`components`]: every component class and its owning system.
//! - [`archetypes`]: component-bundle assembly for each entity kind.
//! - [`bootstrap`]: world setup from `WorldSetupFlags` and system
//!   registration, shared by `gc_cli`/`gc_tui`.
//! - [`resource`]: the `ResourceKind` enum shared across storages and
//!   pipelines.
//! - [`rng`]: the deterministic, per-subsystem-seeded RNG wrapper.
//! - [`log`]: the `EngineLog` event log.
//!
//! ## Usage example
//!
//! ```rust
//! use gc_core::bootstrap::{build_standard_world, WorldSetupFlags, ScheduleTuning};
//!
//! let flags = WorldSetupFlags {
//!     with_sawmill: true,
//!     with_house: true,
//!     random_seed: Some(7),
//!     ..WorldSetupFlags::default()
//! };
//! let mut world = build_standard_world(flags, ScheduleTuning::default());
//!
//! for _ in 0..100 {
//!     world.tick(1);
//! }
//! ```

pub mod archetypes;
pub mod bootstrap;
pub mod components;
pub mod ecs;
pub mod log;
pub mod resource;
pub mod rng;

/// Convenience re-exports of the most frequently used types, mirroring the
/// teacher's `prelude` module.
pub mod prelude {
    pub use crate::archetypes::*;
    pub use crate::bootstrap::*;
    pub use crate::components::*;
    pub use crate::ecs::*;
    pub use crate::log::EngineLog;
    pub use crate::resource::ResourceKind;
    pub use crate::rng::DeterministicRng;
}
