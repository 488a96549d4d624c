//! Capacity-bounded containers and the per-building routing view over them
//! (spec.md §3, §4.2).

use crate::resource::ResourceKind;
use std::collections::HashSet;

/// A bounded ordered container. Neutral to what kind of resource it holds —
/// the kind association lives one level up, in [`InventoryRouting`]'s map.
#[derive(Debug, Clone)]
pub struct Storage {
    pub allows_incoming: bool,
    pub allows_outgoing: bool,
    capacity: u32,
    pub priority: u8,
    items: Vec<ResourceKind>,
}

impl Storage {
    pub fn new(allows_incoming: bool, allows_outgoing: bool, capacity: u32, priority: u8) -> Self {
        Storage {
            allows_incoming,
            allows_outgoing,
            capacity,
            priority: priority.min(3),
            items: Vec::new(),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn quantity(&self) -> u32 {
        self.items.len() as u32
    }

    pub fn available(&self) -> u32 {
        self.capacity.saturating_sub(self.quantity())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.quantity() >= self.capacity
    }

    /// `true` iff the storage was not full.
    pub fn add(&mut self, item: ResourceKind) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Removes and returns the last element, or `None` if empty.
    pub fn pop(&mut self) -> Option<ResourceKind> {
        self.items.pop()
    }

    /// Removes the first element equal to `item`.
    pub fn remove(&mut self, item: ResourceKind) -> bool {
        if let Some(pos) = self.items.iter().position(|&i| i == item) {
            self.items.remove(pos);
            true
        } else {
            false
        }
    }
}

/// Per-building view over its `kind -> Storage` map: what it offers for
/// pickup and what it accepts. Attached to buildings, harvesters, and
/// transporters alike (spec.md §4.2).
pub struct InventoryRouting {
    /// Insertion-ordered so priority ties break on attachment order
    /// (spec.md §4.2 tie-break rule).
    storages: Vec<(ResourceKind, Storage)>,
}

impl crate::ecs::Component for InventoryRouting {
    const EXPOSURE: Option<&'static str> = Some("inventory");
}

impl InventoryRouting {
    pub fn new() -> Self {
        InventoryRouting { storages: Vec::new() }
    }

    /// Declares a storage for `kind`, in insertion order.
    pub fn with_storage(mut self, kind: ResourceKind, storage: Storage) -> Self {
        self.storages.push((kind, storage));
        self
    }

    pub fn storage(&self, kind: ResourceKind) -> Option<&Storage> {
        self.storages.iter().find(|(k, _)| *k == kind).map(|(_, s)| s)
    }

    pub fn storage_mut(&mut self, kind: ResourceKind) -> Option<&mut Storage> {
        self.storages
            .iter_mut()
            .find(|(k, _)| *k == kind)
            .map(|(_, s)| s)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.storages.iter().map(|(k, _)| *k)
    }

    /// One outgoing-enabled, non-empty kind, optionally restricted to
    /// `requested`. Candidates are ordered by descending storage priority,
    /// then by insertion order (spec.md §4.2 tie-break).
    pub fn available_for_transport(&self, requested: Option<&HashSet<ResourceKind>>) -> Option<ResourceKind> {
        let mut candidates: Vec<(usize, ResourceKind, u8)> = self
            .storages
            .iter()
            .enumerate()
            .filter(|(_, (_, s))| s.allows_outgoing && !s.is_empty())
            .filter(|(_, (k, _))| requested.map(|r| r.contains(k)).unwrap_or(true))
            .map(|(idx, (k, s))| (idx, *k, s.priority))
            .collect();

        candidates.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));
        candidates.first().map(|(_, k, _)| *k)
    }

    pub fn can_receive_resources(&self) -> bool {
        self.storages
            .iter()
            .any(|(_, s)| s.allows_incoming && !s.is_full())
    }

    /// Succeeds only if the matching storage accepts incoming and has room.
    pub fn receive_resource(&mut self, item: ResourceKind) -> bool {
        match self.storage_mut(item) {
            Some(s) if s.allows_incoming => s.add(item),
            _ => false,
        }
    }

    /// Removes one unit of `kind`, only if outgoing-enabled and non-empty.
    pub fn remove_inventory(&mut self, kind: ResourceKind) -> Option<ResourceKind> {
        match self.storage_mut(kind) {
            Some(s) if s.allows_outgoing && !s.is_empty() => s.pop(),
            _ => None,
        }
    }

    pub fn wants_resources(&self) -> Vec<ResourceKind> {
        self.storages
            .iter()
            .filter(|(_, s)| s.allows_incoming && !s.is_full())
            .map(|(k, _)| *k)
            .collect()
    }
}

impl Default for InventoryRouting {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_to_full_storage_fails_pop_from_empty_is_none() {
        let mut s = Storage::new(true, true, 1, 0);
        assert!(s.add(ResourceKind::Lumber));
        assert!(!s.add(ResourceKind::Lumber));
        assert_eq!(s.pop(), Some(ResourceKind::Lumber));
        assert_eq!(s.pop(), None);
    }

    #[test]
    fn available_for_transport_prefers_higher_priority() {
        let routing = InventoryRouting::new()
            .with_storage(ResourceKind::TreeLog, {
                let mut s = Storage::new(false, true, 5, 0);
                s.add(ResourceKind::TreeLog);
                s
            })
            .with_storage(ResourceKind::Lumber, {
                let mut s = Storage::new(false, true, 5, 2);
                s.add(ResourceKind::Lumber);
                s
            });
        assert_eq!(routing.available_for_transport(None), Some(ResourceKind::Lumber));
    }

    #[test]
    fn available_for_transport_respects_requested_intersection() {
        let mut requested = HashSet::new();
        requested.insert(ResourceKind::Stone);
        let routing = InventoryRouting::new().with_storage(ResourceKind::Lumber, {
            let mut s = Storage::new(false, true, 5, 0);
            s.add(ResourceKind::Lumber);
            s
        });
        assert_eq!(routing.available_for_transport(Some(&requested)), None);
    }
}
