//! Move-only ownership handles for arena-resident items.
//!
//! A [`DetachedItem`] owns an item that is not placed anywhere (freshly
//! spawned, or mid-transfer between storages). A [`LocatedItem`] owns an
//! item together with the location descriptor of the storage slot it sits
//! in; installing an item stamps that descriptor into the item's arena slot
//! so the rest of the simulation can find it again.
//!
//! Neither handle is cloneable: exactly one owner exists for a live item at
//! any moment, and moving an item between handles is a move, never a copy.

use crate::diag::report;
use crate::item::arena::{ItemArena, ItemId};
use crate::item::Item;
use crate::location::ItemLocation;

/// Owning handle to an item with no location.
///
/// Consumed by installing into a located slot or by [`Self::destroy`]. An
/// unconsumed handle that goes out of scope leaves the item parked in the
/// arena with no location; that is a benign leak, not a dangling reference.
#[derive(Debug, PartialEq, Eq)]
pub struct DetachedItem {
    id: ItemId,
}

impl DetachedItem {
    pub(crate) fn new(id: ItemId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn get<'a>(&self, items: &'a ItemArena) -> Option<&'a Item> {
        items.get(self.id)
    }

    /// Destroys the held item, freeing its arena slot.
    pub fn destroy(self, items: &mut ItemArena) -> Option<Item> {
        items.despawn(self.id)
    }
}

/// Owning handle pairing an item with the location descriptor of its slot.
///
/// The `STRICT` flavor treats an empty dereference as an internal error (the
/// slot is supposed to always hold something, e.g. an inventory entry); the
/// lenient flavor treats empty as a legitimate state (e.g. the wielded-weapon
/// slot of an unarmed character). Both return `Option` rather than a shared
/// null sentinel.
#[derive(Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocatedItem<const STRICT: bool> {
    id: Option<ItemId>,
    location: Option<ItemLocation>,
}

/// Slot that must hold an item whenever it exists in a storage structure.
pub type StrictLocatedItem = LocatedItem<true>;

/// Slot for which "empty" is an ordinary state.
pub type LenientLocatedItem = LocatedItem<false>;

impl<const STRICT: bool> LocatedItem<STRICT> {
    pub fn empty() -> Self {
        Self {
            id: None,
            location: None,
        }
    }

    /// An empty handle already bound to the storage slot it represents.
    pub fn with_location(location: ItemLocation) -> Self {
        Self {
            id: None,
            location: Some(location),
        }
    }

    /// Binds this handle to a storage slot. One handle, one home: binding an
    /// already-bound handle is an internal error and keeps the first binding.
    pub fn set_location(&mut self, location: ItemLocation) {
        if self.location.is_some() {
            report!("set_location on a located handle that already has one");
            return;
        }
        self.location = Some(location);
    }

    pub fn location(&self) -> Option<&ItemLocation> {
        self.location.as_ref()
    }

    pub fn id(&self) -> Option<ItemId> {
        self.id
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none()
    }

    /// Identity comparison: does this handle own exactly `id`?
    pub fn holds(&self, id: ItemId) -> bool {
        self.id == Some(id)
    }

    /// Installs a detached item into this slot.
    ///
    /// If the slot is occupied, the previous item is destroyed first (its
    /// location cleared, its arena slot freed). The incoming item's arena
    /// slot is stamped with this handle's location so the storage can be
    /// found from the id alone.
    pub fn install(&mut self, items: &mut ItemArena, incoming: DetachedItem) -> ItemId {
        if let Some(previous) = self.id.take() {
            items.clear_location(previous);
            items.despawn(previous);
        }
        let id = incoming.id();
        if self.location.is_none() {
            report!("install into a located handle with no location; binding {id} to fake");
            self.location = Some(ItemLocation::Fake);
        }
        if let Some(location) = self.location.clone() {
            items.set_location(id, location);
        }
        self.id = Some(id);
        id
    }

    /// Moves the contents of `source` into this slot.
    ///
    /// The existing occupant, if any, is destroyed as in [`Self::install`].
    /// If this handle has no binding yet it adopts the source's location;
    /// otherwise the item is re-stamped with this handle's own location.
    pub fn install_from<const S: bool>(
        &mut self,
        items: &mut ItemArena,
        source: &mut LocatedItem<S>,
    ) {
        if let Some(previous) = self.id.take() {
            items.clear_location(previous);
            items.despawn(previous);
        }
        if self.location.is_none() {
            self.location = source.location.take();
        }
        if let Some(detached) = source.release(items) {
            self.install(items, detached);
        }
    }

    /// Empties the slot without destroying the item, clearing the item's
    /// location registration. The handle keeps its binding and can be
    /// refilled.
    pub fn release(&mut self, items: &mut ItemArena) -> Option<DetachedItem> {
        let id = self.id.take()?;
        items.clear_location(id);
        Some(DetachedItem::new(id))
    }

    /// By-value form of [`Self::release`] for handles already extracted from
    /// their storage structure.
    pub fn take(mut self, items: &mut ItemArena) -> Option<DetachedItem> {
        self.release(items)
    }

    pub fn get<'a>(&self, items: &'a ItemArena) -> Option<&'a Item> {
        match self.id {
            Some(id) => {
                let item = items.get(id);
                if item.is_none() {
                    report!("located handle holds stale id {id}");
                }
                item
            }
            None => {
                if STRICT {
                    report!("dereferenced an empty strict located handle");
                }
                None
            }
        }
    }

    pub fn get_mut<'a>(&self, items: &'a mut ItemArena) -> Option<&'a mut Item> {
        match self.id {
            Some(id) => items.get_mut(id),
            None => {
                if STRICT {
                    report!("dereferenced an empty strict located handle");
                }
                None
            }
        }
    }
}

impl<const STRICT: bool> PartialEq<ItemId> for LocatedItem<STRICT> {
    fn eq(&self, other: &ItemId) -> bool {
        self.holds(*other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::capture_reports;
    use crate::item::ItemTypeId;

    fn arena_with(name: &str) -> (ItemArena, DetachedItem) {
        let mut arena = ItemArena::new();
        let detached = arena.spawn(Item::new(ItemTypeId(1), name));
        (arena, detached)
    }

    #[test]
    fn install_stamps_location() {
        let (mut arena, detached) = arena_with("rock");
        let mut slot = StrictLocatedItem::with_location(ItemLocation::Fake);

        let id = slot.install(&mut arena, detached);

        assert!(slot.holds(id));
        assert_eq!(arena.location(id), Some(&ItemLocation::Fake));
    }

    #[test]
    fn install_over_occupied_destroys_previous() {
        let (mut arena, first) = arena_with("rock");
        let second = arena.spawn(Item::new(ItemTypeId(1), "stick"));
        let mut slot = StrictLocatedItem::with_location(ItemLocation::Fake);

        let first_id = slot.install(&mut arena, first);
        let second_id = slot.install(&mut arena, second);

        assert!(!arena.contains(first_id));
        assert!(slot.holds(second_id));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn release_clears_registration_without_destroying() {
        let (mut arena, detached) = arena_with("rock");
        let mut slot = StrictLocatedItem::with_location(ItemLocation::Fake);
        let id = slot.install(&mut arena, detached);

        let released = slot.release(&mut arena).expect("slot was occupied");

        assert!(slot.is_empty());
        assert_eq!(released.id(), id);
        assert!(arena.contains(id));
        assert!(arena.location(id).is_none());
    }

    #[test]
    fn double_binding_reports_and_keeps_first() {
        let mut slot = StrictLocatedItem::with_location(ItemLocation::Fake);

        let ((), reports) = capture_reports(|| slot.set_location(ItemLocation::Template));

        assert_eq!(reports.len(), 1);
        assert_eq!(slot.location(), Some(&ItemLocation::Fake));
    }

    #[test]
    fn strict_empty_dereference_reports() {
        let arena = ItemArena::new();
        let slot = StrictLocatedItem::empty();

        let (value, reports) = capture_reports(|| slot.get(&arena).is_none());

        assert!(value);
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn lenient_empty_dereference_is_silent() {
        let arena = ItemArena::new();
        let slot = LenientLocatedItem::empty();

        let (value, reports) = capture_reports(|| slot.get(&arena).is_none());

        assert!(value);
        assert!(reports.is_empty());
    }

    #[test]
    fn install_from_moves_item_and_binding() {
        let (mut arena, detached) = arena_with("rock");
        let mut source = StrictLocatedItem::with_location(ItemLocation::Fake);
        let id = source.install(&mut arena, detached);

        let mut dest = StrictLocatedItem::empty();
        dest.install_from(&mut arena, &mut source);

        assert!(source.is_empty());
        assert!(dest.holds(id));
        assert_eq!(arena.location(id), Some(&ItemLocation::Fake));
    }

    #[test]
    fn identity_comparison_is_by_id() {
        let (mut arena, detached) = arena_with("rock");
        let twin = arena.spawn(Item::new(ItemTypeId(1), "rock"));
        let mut slot = StrictLocatedItem::with_location(ItemLocation::Fake);
        let id = slot.install(&mut arena, detached);

        assert!(slot == id);
        assert!(slot != twin.id());
    }
}
