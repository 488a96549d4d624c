//! The vocabulary of transportable/harvestable resource kinds. Kept as a
//! plain `enum` (teacher precedent: `components::ItemType`) rather than a
//! string, so storages and pipelines compare kinds without allocation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    TreeLog,
    Lumber,
    Stone,
    Food,
}
