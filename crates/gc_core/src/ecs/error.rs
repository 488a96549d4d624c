//! Misuse-class errors (spec.md §7): duplicate exposures, invalid component
//! declarations, and operations against entities that no longer exist. These
//! are never returned from the tick loop itself — they are raised at the
//! call site that misused the API, matching the teacher's precedent of a
//! dedicated error enum per subsystem (`recipes::RecipeRegistryError`).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EcsError {
    #[error("entity is not registered with this world")]
    UnknownEntity,

    #[error("component is already attached to this entity")]
    DuplicateComponent,

    #[error("exposure `{0}` does not support multiplicity and is already claimed")]
    DuplicateExposure(&'static str),

    #[error("attempted to remove a component that is not attached")]
    ComponentNotAttached,
}
