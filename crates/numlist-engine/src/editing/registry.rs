//! # List Item Registry
//!
//! Maps line keys to list-item records. Records live in a generational arena
//! and refer to their neighbours by [`ItemId`], so the `previous`/`next` chain
//! never owns anything and a stale id can never reach a recycled slot.
//!
//! Invariants maintained by every operation:
//! - a key maps to at most one record;
//! - every auxiliary key of a record maps to that record;
//! - a record's primary key maps to that record.

use std::collections::{BTreeSet, HashMap};

use crate::editing::decoration::Decoration;
use crate::geometry::LineKey;

/// Opaque handle to a record in the registry's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId {
    slot: u32,
    generation: u32,
}

/// A rendered numbered-list prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    /// Line this prefix decorates.
    pub key: LineKey,
    pub number: u32,
    /// Label and exclusion region, released only through the renderer.
    pub decoration: Decoration,
    /// Wrapped continuation lines that belong to this item.
    pub auxiliary_keys: BTreeSet<LineKey>,
    pub previous: Option<ItemId>,
    pub next: Option<ItemId>,
}

impl ListItem {
    pub fn new(key: LineKey, number: u32, decoration: Decoration) -> Self {
        Self {
            key,
            number,
            decoration,
            auxiliary_keys: BTreeSet::new(),
            previous: None,
            next: None,
        }
    }

    /// Primary key followed by every auxiliary key.
    pub fn keys(&self) -> impl Iterator<Item = LineKey> + '_ {
        std::iter::once(self.key).chain(self.auxiliary_keys.iter().copied())
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    item: Option<ListItem>,
}

#[derive(Debug, Default)]
pub struct ListRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    keys: HashMap<LineKey, ItemId>,
}

impl ListRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn lookup(&self, key: LineKey) -> Option<ItemId> {
        self.keys.get(&key).copied()
    }

    pub fn get(&self, id: ItemId) -> Option<&ListItem> {
        self.slots
            .get(id.slot as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.item.as_ref())
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut ListItem> {
        self.slots
            .get_mut(id.slot as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.item.as_mut())
    }

    /// The record mapped at `key`, primary or auxiliary.
    pub fn item_at(&self, key: LineKey) -> Option<&ListItem> {
        self.lookup(key).and_then(|id| self.get(id))
    }

    /// Live records in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &ListItem)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.item.as_ref().map(|item| {
                (
                    ItemId {
                        slot: index as u32,
                        generation: slot.generation,
                    },
                    item,
                )
            })
        })
    }

    /// Every mapped key with the record it resolves to.
    pub fn entries(&self) -> impl Iterator<Item = (LineKey, ItemId)> + '_ {
        self.keys.iter().map(|(key, id)| (*key, *id))
    }

    /// Store `item` under its key, overwriting whatever was mapped there.
    ///
    /// If the key was another record's primary key, that record is evicted and
    /// returned so the caller can release its decoration. If it was only an
    /// auxiliary key, it is detached from its old record.
    ///
    /// The item's auxiliary keys follow [`Self::add_auxiliary_key`]: they are
    /// taken over from other records' auxiliary sets, and dropped where they
    /// collide with another record's primary key.
    pub fn insert(&mut self, mut item: ListItem) -> (ItemId, Option<ListItem>) {
        let key = item.key;
        let evicted = self.release_key(key);

        item.auxiliary_keys
            .retain(|aux| *aux != key && self.primary_owner(*aux).is_none());
        let auxiliary: Vec<LineKey> = item.auxiliary_keys.iter().copied().collect();
        for aux in &auxiliary {
            self.release_key(*aux);
        }

        let id = match self.free.pop() {
            Some(slot) => {
                let entry = &mut self.slots[slot as usize];
                entry.item = Some(item);
                ItemId {
                    slot,
                    generation: entry.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    item: Some(item),
                });
                ItemId {
                    slot: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };

        self.keys.insert(key, id);
        for aux in auxiliary {
            self.keys.insert(aux, id);
        }
        (id, evicted)
    }

    /// Remove a record and every key it owns, and unlink it from the chain.
    ///
    /// The returned record still carries its old `previous`/`next` links. The
    /// decoration is not released here.
    pub fn remove(&mut self, id: ItemId) -> Option<ListItem> {
        let slot = self.slots.get_mut(id.slot as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let item = slot.item.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.slot);

        for key in item.keys() {
            if self.keys.get(&key) == Some(&id) {
                self.keys.remove(&key);
            }
        }

        if let Some(previous) = item.previous.and_then(|p| self.get_mut(p))
            && previous.next == Some(id)
        {
            previous.next = item.next;
        }
        if let Some(next) = item.next.and_then(|n| self.get_mut(n))
            && next.previous == Some(id)
        {
            next.previous = item.previous;
        }

        Some(item)
    }

    /// Register `key` as a wrapped continuation line of `id`.
    ///
    /// A key that is currently another record's auxiliary key is moved over.
    /// A key that is another record's primary key is left alone, as are
    /// unknown ids. Returns whether `key` now resolves to `id`.
    pub fn add_auxiliary_key(&mut self, id: ItemId, key: LineKey) -> bool {
        let Some(item) = self.get(id) else {
            return false;
        };
        if item.key == key || self.lookup(key) == Some(id) {
            return true;
        }
        if self.primary_owner(key).is_some() {
            return false;
        }

        self.release_key(key);
        let Some(item) = self.get_mut(id) else {
            return false;
        };
        item.auxiliary_keys.insert(key);
        self.keys.insert(key, id);
        true
    }

    /// Splice `new` into the chain directly after `previous`.
    pub fn link_after(&mut self, previous: ItemId, new: ItemId) {
        if previous == new || self.get(new).is_none() {
            return;
        }
        let Some(old_next) = self.get(previous).map(|item| item.next) else {
            return;
        };

        if let Some(item) = self.get_mut(previous) {
            item.next = Some(new);
        }
        if let Some(item) = self.get_mut(new) {
            item.previous = Some(previous);
            item.next = old_next.filter(|next| *next != new);
        }
        if let Some(next) = old_next.filter(|next| *next != new)
            && let Some(item) = self.get_mut(next)
        {
            item.previous = Some(new);
        }
    }

    /// The record whose primary key is `key`.
    fn primary_owner(&self, key: LineKey) -> Option<ItemId> {
        self.lookup(key)
            .filter(|owner| self.get(*owner).is_some_and(|item| item.key == key))
    }

    /// Drop the mapping at `key`, evicting the record if the key was primary.
    fn release_key(&mut self, key: LineKey) -> Option<ListItem> {
        if let Some(owner) = self.primary_owner(key) {
            return self.remove(owner);
        }

        let owner = self.lookup(key)?;
        if let Some(item) = self.get_mut(owner) {
            item.auxiliary_keys.remove(&key);
        }
        self.keys.remove(&key);
        None
    }
}

/// Validates registry invariants.
///
/// Asserts that:
/// - every mapped key resolves to a live record that owns the key
/// - every key owned by a live record maps back to it
/// - chain links point at live records and are mirrored
///
/// # Panics
/// Panics with a descriptive message if any invariant is violated.
pub fn check(registry: &ListRegistry) {
    for (key, id) in registry.entries() {
        let item = registry
            .get(id)
            .unwrap_or_else(|| panic!("key {key:?} maps to dead record {id:?}"));
        assert!(
            item.key == key || item.auxiliary_keys.contains(&key),
            "key {key:?} maps to {id:?} which does not own it"
        );
    }

    for (id, item) in registry.iter() {
        for key in item.keys() {
            assert_eq!(
                registry.lookup(key),
                Some(id),
                "key {key:?} of record {id:?} does not map back to it"
            );
        }
        if let Some(next) = item.next {
            let next_item = registry
                .get(next)
                .unwrap_or_else(|| panic!("record {id:?} links to dead next {next:?}"));
            assert_eq!(next_item.previous, Some(id), "next link of {id:?} not mirrored");
        }
        if let Some(previous) = item.previous {
            let previous_item = registry
                .get(previous)
                .unwrap_or_else(|| panic!("record {id:?} links to dead previous {previous:?}"));
            assert_eq!(
                previous_item.next,
                Some(id),
                "previous link of {id:?} not mirrored"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ExclusionId, LabelId};
    use pretty_assertions::assert_eq;

    fn decoration(handle: u64) -> Decoration {
        Decoration {
            label: LabelId(handle),
            exclusion: ExclusionId(handle + 1000),
            frame: Default::default(),
            exclusion_region: Default::default(),
            text: String::new(),
        }
    }

    fn item(key: i64, number: u32) -> ListItem {
        ListItem::new(LineKey(key), number, decoration(key as u64))
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut registry = ListRegistry::new();
        let (id, evicted) = registry.insert(item(8, 1));
        assert!(evicted.is_none());
        assert_eq!(registry.lookup(LineKey(8)), Some(id));
        assert_eq!(registry.get(id).map(|i| i.number), Some(1));
        assert_eq!(registry.lookup(LineKey(28)), None);
        assert_eq!(registry.len(), 1);
        check(&registry);
    }

    #[test]
    fn test_insert_over_primary_key_evicts_record() {
        let mut registry = ListRegistry::new();
        let (old, _) = registry.insert(item(8, 1));
        registry.add_auxiliary_key(old, LineKey(28));

        let (new, evicted) = registry.insert(item(8, 5));
        let evicted = evicted.expect("old record evicted");
        assert_eq!(evicted.number, 1);
        assert_eq!(registry.lookup(LineKey(8)), Some(new));
        assert_eq!(registry.lookup(LineKey(28)), None);
        assert!(registry.get(old).is_none());
        assert_eq!(registry.len(), 1);
        check(&registry);
    }

    #[test]
    fn test_insert_over_auxiliary_key_detaches_it() {
        let mut registry = ListRegistry::new();
        let (first, _) = registry.insert(item(8, 1));
        registry.add_auxiliary_key(first, LineKey(28));

        let (second, evicted) = registry.insert(item(28, 2));
        assert!(evicted.is_none());
        assert_eq!(registry.lookup(LineKey(28)), Some(second));
        assert!(registry.get(first).unwrap().auxiliary_keys.is_empty());
        check(&registry);
    }

    #[test]
    fn test_insert_with_auxiliary_keys_respects_owners() {
        let mut registry = ListRegistry::new();
        let (first, _) = registry.insert(item(8, 1));
        registry.add_auxiliary_key(first, LineKey(28));
        let (second, _) = registry.insert(item(48, 2));

        let mut third = item(68, 3);
        third.auxiliary_keys = [28, 48, 68, 88].into_iter().map(LineKey).collect();
        let (third, evicted) = registry.insert(third);

        assert!(evicted.is_none());
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.lookup(LineKey(28)), Some(third));
        assert!(registry.get(first).unwrap().auxiliary_keys.is_empty());
        assert_eq!(registry.lookup(LineKey(48)), Some(second));
        assert_eq!(registry.lookup(LineKey(88)), Some(third));
        assert_eq!(
            registry.get(third).unwrap().keys().collect::<Vec<_>>(),
            vec![LineKey(68), LineKey(28), LineKey(88)]
        );
        check(&registry);
    }

    #[test]
    fn test_remove_drops_every_key() {
        let mut registry = ListRegistry::new();
        let (id, _) = registry.insert(item(8, 1));
        registry.add_auxiliary_key(id, LineKey(28));
        registry.add_auxiliary_key(id, LineKey(48));

        let removed = registry.remove(id).expect("record removed");
        assert_eq!(
            removed.keys().collect::<Vec<_>>(),
            vec![LineKey(8), LineKey(28), LineKey(48)]
        );
        assert_eq!(registry.entries().count(), 0);
        assert!(registry.is_empty());
        assert!(registry.remove(id).is_none());
    }

    #[test]
    fn test_auxiliary_keys_resolve_to_owner() {
        let mut registry = ListRegistry::new();
        let (id, _) = registry.insert(item(8, 1));
        registry.add_auxiliary_key(id, LineKey(28));
        registry.add_auxiliary_key(id, LineKey(28));

        assert_eq!(registry.lookup(LineKey(28)), Some(id));
        assert_eq!(registry.get(id).unwrap().auxiliary_keys.len(), 1);
        assert!(registry.add_auxiliary_key(id, LineKey(8)));
        assert_eq!(registry.get(id).unwrap().auxiliary_keys.len(), 1);
        check(&registry);
    }

    #[test]
    fn test_auxiliary_key_never_steals_a_primary_key() {
        let mut registry = ListRegistry::new();
        let (first, _) = registry.insert(item(8, 1));
        let (second, _) = registry.insert(item(28, 2));

        assert!(!registry.add_auxiliary_key(first, LineKey(28)));
        assert_eq!(registry.lookup(LineKey(28)), Some(second));
        assert!(registry.get(first).unwrap().auxiliary_keys.is_empty());
        check(&registry);
    }

    #[test]
    fn test_auxiliary_key_moves_between_records() {
        let mut registry = ListRegistry::new();
        let (first, _) = registry.insert(item(8, 1));
        let (second, _) = registry.insert(item(48, 2));
        registry.add_auxiliary_key(first, LineKey(28));

        assert!(registry.add_auxiliary_key(second, LineKey(28)));
        assert_eq!(registry.lookup(LineKey(28)), Some(second));
        assert!(registry.get(first).unwrap().auxiliary_keys.is_empty());
        check(&registry);
    }

    #[test]
    fn test_stale_id_does_not_reach_recycled_slot() {
        let mut registry = ListRegistry::new();
        let (old, _) = registry.insert(item(8, 1));
        registry.remove(old);
        let (new, _) = registry.insert(item(48, 3));

        assert!(registry.get(old).is_none());
        assert!(registry.get(new).is_some());
        assert!(!registry.add_auxiliary_key(old, LineKey(68)));
        assert_eq!(registry.lookup(LineKey(68)), None);
    }

    #[test]
    fn test_link_after_splices_chain() {
        let mut registry = ListRegistry::new();
        let (a, _) = registry.insert(item(8, 1));
        let (c, _) = registry.insert(item(48, 2));
        registry.link_after(a, c);
        let (b, _) = registry.insert(item(28, 2));
        registry.link_after(a, b);

        assert_eq!(registry.get(a).unwrap().next, Some(b));
        assert_eq!(registry.get(b).unwrap().previous, Some(a));
        assert_eq!(registry.get(b).unwrap().next, Some(c));
        assert_eq!(registry.get(c).unwrap().previous, Some(b));
        check(&registry);
    }

    #[test]
    fn test_remove_joins_neighbours() {
        let mut registry = ListRegistry::new();
        let (a, _) = registry.insert(item(8, 1));
        let (b, _) = registry.insert(item(28, 2));
        let (c, _) = registry.insert(item(48, 3));
        registry.link_after(a, b);
        registry.link_after(b, c);

        let removed = registry.remove(b).unwrap();
        assert_eq!(removed.previous, Some(a));
        assert_eq!(removed.next, Some(c));
        assert_eq!(registry.get(a).unwrap().next, Some(c));
        assert_eq!(registry.get(c).unwrap().previous, Some(a));
        check(&registry);
    }
}
