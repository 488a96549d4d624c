//! Every component class and its owning system (spec.md §2). Submodules are
//! ordered leaves-first, matching the dependency order in which spec.md §4
//! introduces them.

pub mod building;
pub mod construction;
pub mod factory;
pub mod generative;
pub mod harvest;
pub mod position;
pub mod spawner;
pub mod storage;
pub mod transport;
pub mod travel;
pub mod villager_ai;

pub use building::Building;
pub use construction::{Construction, ConstructionSpec, ConstructionState, ConstructionSystem, ConstructionWorker};
pub use factory::{Factory, FactorySystem, FactoryWorker, Pipeline, PipelineInput, PipelineOutput};
pub use generative::{Generative, GenerativeSystem, TargetAttr};
pub use harvest::{Harvestable, Harvester, HarvesterSystem};
pub use position::{renderable_frame, Position, Renderable, Velocity};
pub use spawner::{EntityBuilder, SpawnPipeline, Spawner, SpawnerSystem, SpawnerWorker};
pub use storage::{InventoryRouting, Storage};
pub use transport::{ResourceTransport, ResourceTransportSystem};
pub use travel::{Travel, TravelSystem};
pub use villager_ai::{TaskKind, VillagerAi, VillagerAiSystem};
