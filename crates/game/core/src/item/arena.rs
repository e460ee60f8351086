//! Generational arena owning every live item and its location descriptor.
//!
//! The arena is the single owner of item memory. Storages (inventories, tile
//! stacks, cargo spaces, contents) hold handles carrying [`ItemId`]s, so the
//! ownership graph stays acyclic and destruction order is well defined. A
//! stale id (despawned slot, or slot reused for a new item) simply fails to
//! resolve; there is no dangling pointer to chase.

use std::fmt;

use crate::diag::report;
use crate::item::handle::DetachedItem;
use crate::item::Item;
use crate::location::ItemLocation;

/// Stable identity of an arena-resident item.
///
/// The generation counter distinguishes a reused slot from the item that used
/// to live there, so holders of old ids see "gone", never "someone else".
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemId {
    index: u32,
    generation: u32,
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}.{}", self.index, self.generation)
    }
}

#[derive(Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct Slot {
    generation: u32,
    entry: Option<SlotEntry>,
}

#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct SlotEntry {
    item: Item,
    location: Option<ItemLocation>,
}

/// Arena of every live item in the simulation.
#[derive(Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl ItemArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live items.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Creates a new item with no location, returning its owning handle.
    pub fn spawn(&mut self, item: Item) -> DetachedItem {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.entry = Some(SlotEntry {
            item,
            location: None,
        });
        DetachedItem::new(ItemId {
            index,
            generation: slot.generation,
        })
    }

    /// Creates a short-lived scratch item bound to the template location.
    ///
    /// Template items must never be detached; they exist only to be inspected
    /// and thrown away.
    pub fn spawn_template(&mut self, item: Item) -> ItemId {
        let id = self.spawn(item).id();
        self.set_location(id, ItemLocation::Template);
        id
    }

    /// Creates an item bound to the fake (no real storage) location, e.g. a
    /// freshly deserialized item that has not been placed yet.
    pub fn spawn_fake(&mut self, item: Item) -> ItemId {
        let id = self.spawn(item).id();
        self.set_location(id, ItemLocation::Fake);
        id
    }

    /// True if `id` refers to a live item.
    pub fn contains(&self, id: ItemId) -> bool {
        self.entry(id).is_some()
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.entry(id).map(|entry| &entry.item)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.entry_mut(id).map(|entry| &mut entry.item)
    }

    /// Current location descriptor of the item, `None` while detached.
    pub fn location(&self, id: ItemId) -> Option<&ItemLocation> {
        self.entry(id).and_then(|entry| entry.location.as_ref())
    }

    /// Frees the slot, returning the item value. Stale ids return `None`.
    ///
    /// The caller is responsible for having run the detach protocol first;
    /// despawning a still-located item leaves its storage holding a dead id,
    /// which the next corruption check will surface.
    pub fn despawn(&mut self, id: ItemId) -> Option<Item> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(entry.item)
    }

    /// Iterator over every live item id.
    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entry.as_ref().map(|_| ItemId {
                index: index as u32,
                generation: slot.generation,
            })
        })
    }

    pub(crate) fn set_location(&mut self, id: ItemId, location: ItemLocation) {
        match self.entry_mut(id) {
            Some(entry) => {
                if entry.location.is_some() {
                    report!("set_location: {id} already has a location");
                }
                entry.location = Some(location);
            }
            None => report!("set_location: {id} is not a live item"),
        }
    }

    pub(crate) fn clear_location(&mut self, id: ItemId) {
        if let Some(entry) = self.entry_mut(id) {
            entry.location = None;
        }
    }

    fn entry(&self, id: ItemId) -> Option<&SlotEntry> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    fn entry_mut(&mut self, id: ItemId) -> Option<&mut SlotEntry> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemTypeId;

    fn item(name: &str) -> Item {
        Item::new(ItemTypeId(1), name)
    }

    #[test]
    fn spawn_and_resolve() {
        let mut arena = ItemArena::new();
        let detached = arena.spawn(item("rock"));
        let id = detached.id();

        assert!(arena.contains(id));
        assert_eq!(arena.get(id).map(|it| it.name.as_str()), Some("rock"));
        assert!(arena.location(id).is_none());
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn despawn_invalidates_id() {
        let mut arena = ItemArena::new();
        let id = arena.spawn(item("rock")).id();

        assert!(arena.despawn(id).is_some());
        assert!(!arena.contains(id));
        assert!(arena.despawn(id).is_none());
        assert!(arena.is_empty());
    }

    #[test]
    fn reused_slot_gets_fresh_generation() {
        let mut arena = ItemArena::new();
        let old = arena.spawn(item("rock")).id();
        arena.despawn(old);

        let new = arena.spawn(item("stick")).id();
        assert_ne!(old, new);
        assert!(!arena.contains(old));
        assert_eq!(arena.get(new).map(|it| it.name.as_str()), Some("stick"));
    }

    #[test]
    fn double_set_location_reports() {
        let mut arena = ItemArena::new();
        let id = arena.spawn(item("rock")).id();

        let ((), reports) = crate::diag::capture_reports(|| {
            arena.set_location(id, ItemLocation::Fake);
            arena.set_location(id, ItemLocation::Template);
        });
        assert_eq!(reports.len(), 1);
    }
}
