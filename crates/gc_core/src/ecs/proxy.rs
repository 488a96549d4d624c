//! Capability-restricted handles bound to an `(entity, component)` pair.
//!
//! The source language reaches this via dynamic attribute lookup guarded by
//! a per-component allowlist of method names. In typed Rust the allowlist is
//! just the component's own `pub` surface (spec.md §9): a [`ComponentProxy`]
//! is a thin, explicitly-named wrapper around a borrow of the concrete
//! component so call sites read `world.expose::<Harvester>(entity)` rather
//! than reaching into the component index directly. `reveal` is the
//! documented escape hatch back to the concrete type; since the proxy is
//! already typed there is nothing to downcast, so it is simply the identity.

use std::cell::RefMut;
use std::ops::{Deref, DerefMut};

/// A named, single-component facade borrowed out of the world for the
/// duration of one call. Holds the same `RefMut` the underlying storage
/// hands out, so the dynamic-borrow rule that makes a double-borrow of one
/// component class a panic (spec.md §7: invariant violations are fatal in
/// dev builds) applies here too.
pub struct ComponentProxy<'a, C> {
    inner: RefMut<'a, C>,
}

impl<'a, C> ComponentProxy<'a, C> {
    pub(crate) fn new(inner: RefMut<'a, C>) -> Self {
        ComponentProxy { inner }
    }

    /// The sole escape hatch from the proxy back to the underlying component.
    pub fn reveal(self) -> RefMut<'a, C> {
        self.inner
    }
}

impl<'a, C> Deref for ComponentProxy<'a, C> {
    type Target = C;
    fn deref(&self) -> &C {
        &self.inner
    }
}

impl<'a, C> DerefMut for ComponentProxy<'a, C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.inner
    }
}
