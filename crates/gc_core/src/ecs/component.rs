//! Component class declarations and the per-class storage the
//! [`super::world::World`] indexes components by (spec.md §3 "Component",
//! §4.1 `ComponentIndex`).

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;

use super::entity::Entity;

/// Marker implemented by every component data type.
///
/// `EXPOSURE` names the facade an entity acquires while it carries a live
/// instance of this component (spec.md §3/§4.1); `None` means the
/// component participates in queries but is never reachable through
/// `Entity::<name>`. `EXPOSE_MULTIPLE` allows a second attachment under the
/// same exposure name to extend a list instead of failing.
pub trait Component: 'static + Sized {
    const EXPOSURE: Option<&'static str> = None;
    const EXPOSE_MULTIPLE: bool = false;
}

/// Ordered storage for every live component of one class, plus the reverse
/// entity→slot map. Vec order is insertion order (I3): removals shift
/// later slots down rather than swap-removing, so iteration order never
/// reflects anything but attachment order.
pub(crate) struct Storage<C> {
    owners: Vec<Entity>,
    data: Vec<C>,
    slot_of: HashMap<Entity, usize>,
}

impl<C> Default for Storage<C> {
    fn default() -> Self {
        Storage {
            owners: Vec::new(),
            data: Vec::new(),
            slot_of: HashMap::new(),
        }
    }
}

impl<C> Storage<C> {
    fn insert(&mut self, entity: Entity, component: C) -> bool {
        if self.slot_of.contains_key(&entity) {
            return false;
        }
        let slot = self.data.len();
        self.owners.push(entity);
        self.data.push(component);
        self.slot_of.insert(entity, slot);
        true
    }

    fn remove(&mut self, entity: Entity) -> Option<C> {
        let slot = self.slot_of.remove(&entity)?;
        self.owners.remove(slot);
        let removed = self.data.remove(slot);
        for (e, s) in self.slot_of.iter_mut() {
            if *s > slot {
                *s -= 1;
            }
            debug_assert_ne!(*e, entity);
        }
        Some(removed)
    }

    fn get(&self, entity: Entity) -> Option<&C> {
        self.slot_of.get(&entity).map(|&slot| &self.data[slot])
    }

    fn get_mut(&mut self, entity: Entity) -> Option<&mut C> {
        self.slot_of.get(&entity).map(|&slot| &mut self.data[slot])
    }

    pub(crate) fn owners_in_order(&self) -> &[Entity] {
        &self.owners
    }
}

/// Type-erased map from component class to its [`Storage`], each wrapped in
/// a `RefCell` so a system can hold a live borrow of one component class
/// while independently borrowing another (the single-threaded tick loop
/// never needs more than that; a double-borrow of the *same* class is a
/// genuine misuse and panics, which is the intended dev-build behavior for
/// an invariant violation per spec.md §7).
#[derive(Default)]
pub(crate) struct ComponentIndex {
    storages: HashMap<std::any::TypeId, Box<dyn Any>>,
}

impl ComponentIndex {
    fn cell<C: Component>(&mut self) -> &RefCell<Storage<C>> {
        self.storages
            .entry(std::any::TypeId::of::<C>())
            .or_insert_with(|| Box::new(RefCell::new(Storage::<C>::default())))
            .downcast_ref::<RefCell<Storage<C>>>()
            .expect("component storage type mismatch")
    }

    fn cell_if_present<C: Component>(&self) -> Option<&RefCell<Storage<C>>> {
        self.storages
            .get(&std::any::TypeId::of::<C>())
            .map(|boxed| {
                boxed
                    .downcast_ref::<RefCell<Storage<C>>>()
                    .expect("component storage type mismatch")
            })
    }

    pub fn insert<C: Component>(&mut self, entity: Entity, component: C) -> bool {
        self.cell::<C>().borrow_mut().insert(entity, component)
    }

    pub fn remove<C: Component>(&mut self, entity: Entity) -> Option<C> {
        self.cell::<C>().borrow_mut().remove(entity)
    }

    pub fn has<C: Component>(&self, entity: Entity) -> bool {
        self.cell_if_present::<C>()
            .map(|c| c.borrow().slot_of.contains_key(&entity))
            .unwrap_or(false)
    }

    pub fn get<C: Component>(&self, entity: Entity) -> Option<Ref<'_, C>> {
        let cell = self.cell_if_present::<C>()?;
        let borrowed = cell.borrow();
        if borrowed.slot_of.contains_key(&entity) {
            Some(Ref::map(borrowed, |s| s.get(entity).unwrap()))
        } else {
            None
        }
    }

    pub fn get_mut<C: Component>(&self, entity: Entity) -> Option<RefMut<'_, C>> {
        let cell = self.cell_if_present::<C>()?;
        let borrowed = cell.borrow_mut();
        if borrowed.slot_of.contains_key(&entity) {
            Some(RefMut::map(borrowed, |s| s.get_mut(entity).unwrap()))
        } else {
            None
        }
    }

    /// Entities carrying a live component of class `C`, in insertion order.
    pub fn entities_with<C: Component>(&self) -> Vec<Entity> {
        self.cell_if_present::<C>()
            .map(|c| c.borrow().owners_in_order().to_vec())
            .unwrap_or_default()
    }
}
