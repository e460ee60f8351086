//! Monsters: a generic carried-item list, corpse components, and the five
//! typed single-item attachment slots.

use strum::EnumCount as _;

use crate::item::{DetachedItem, ItemArena, ItemId, LenientLocatedItem, StrictLocatedItem};
use crate::location::ItemLocation;
use crate::types::{MonsterId, Position};
use crate::world::map::GameMap;

/// The typed single-item slots a monster exposes.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumCount,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttachmentSlot {
    /// Leash or rope tying the monster down.
    Tied,
    /// Saddle or harness.
    Tack,
    /// Barding.
    Armor,
    /// Strapped-on storage bag.
    Storage,
    /// Battery pack powering a mech.
    Battery,
}

/// A monster able to carry items, wear attachments, and decay into parts.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Monster {
    pub id: MonsterId,
    pub name: String,
    pub position: Position,
    items: Vec<StrictLocatedItem>,
    corpse_components: Vec<StrictLocatedItem>,
    attachments: [LenientLocatedItem; AttachmentSlot::COUNT],
}

impl Monster {
    pub fn new(id: MonsterId, name: impl Into<String>, position: Position) -> Self {
        let mut attachments: [LenientLocatedItem; AttachmentSlot::COUNT] =
            std::array::from_fn(|_| LenientLocatedItem::empty());
        for slot in <AttachmentSlot as strum::IntoEnumIterator>::iter() {
            attachments[slot as usize]
                .set_location(ItemLocation::MonsterAttachment { holder: id, slot });
        }
        Self {
            id,
            name: name.into(),
            position,
            items: Vec::new(),
            corpse_components: Vec::new(),
            attachments,
        }
    }

    pub fn is_loaded(&self, map: &GameMap) -> bool {
        map.inbounds(map.to_local(self.position))
    }

    // ===== generic item list =====

    pub fn add_item(&mut self, items: &mut ItemArena, item: DetachedItem) -> ItemId {
        let mut handle =
            StrictLocatedItem::with_location(ItemLocation::MonsterInventory { holder: self.id });
        let id = handle.install(items, item);
        self.items.push(handle);
        id
    }

    pub fn remove_item(&mut self, items: &mut ItemArena, id: ItemId) -> Option<DetachedItem> {
        let index = self.items.iter().position(|h| h.holds(id))?;
        self.items.remove(index).take(items)
    }

    pub fn has_item(&self, id: ItemId) -> bool {
        self.items.iter().any(|h| h.holds(id))
    }

    pub fn item_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter().filter_map(|h| h.id())
    }

    // ===== corpse components =====

    pub fn add_corpse_component(&mut self, items: &mut ItemArena, item: DetachedItem) -> ItemId {
        let mut handle =
            StrictLocatedItem::with_location(ItemLocation::CorpseComponent { holder: self.id });
        let id = handle.install(items, item);
        self.corpse_components.push(handle);
        id
    }

    pub fn remove_corpse_component(
        &mut self,
        items: &mut ItemArena,
        id: ItemId,
    ) -> Option<DetachedItem> {
        let index = self.corpse_components.iter().position(|h| h.holds(id))?;
        self.corpse_components.remove(index).take(items)
    }

    pub fn has_corpse_component(&self, id: ItemId) -> bool {
        self.corpse_components.iter().any(|h| h.holds(id))
    }

    // ===== typed attachment slots =====

    /// Installs an item in a typed slot, handing back the previous occupant.
    pub fn set_attachment(
        &mut self,
        items: &mut ItemArena,
        slot: AttachmentSlot,
        item: DetachedItem,
    ) -> (ItemId, Option<DetachedItem>) {
        let handle = &mut self.attachments[slot as usize];
        let previous = handle.release(items);
        let id = handle.install(items, item);
        (id, previous)
    }

    /// Empties a typed slot without destroying its occupant.
    pub fn clear_attachment(
        &mut self,
        items: &mut ItemArena,
        slot: AttachmentSlot,
    ) -> Option<DetachedItem> {
        self.attachments[slot as usize].release(items)
    }

    pub fn attachment(&self, slot: AttachmentSlot) -> &LenientLocatedItem {
        &self.attachments[slot as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Item, ItemTypeId};
    use strum::IntoEnumIterator as _;

    fn monster() -> Monster {
        Monster::new(MonsterId(1), "shoggoth", Position::new(3, 3))
    }

    #[test]
    fn every_attachment_slot_is_bound_at_construction() {
        let mon = monster();
        for slot in AttachmentSlot::iter() {
            assert!(mon.attachment(slot).is_empty());
            assert_eq!(
                mon.attachment(slot).location(),
                Some(&ItemLocation::MonsterAttachment {
                    holder: MonsterId(1),
                    slot,
                })
            );
        }
    }

    #[test]
    fn attachment_replacement_hands_back_previous() {
        let mut items = ItemArena::new();
        let mut mon = monster();

        let rope = items.spawn(Item::new(ItemTypeId(1), "rope"));
        let (rope_id, none) = mon.set_attachment(&mut items, AttachmentSlot::Tied, rope);
        assert!(none.is_none());

        let chain = items.spawn(Item::new(ItemTypeId(2), "chain"));
        let (chain_id, previous) = mon.set_attachment(&mut items, AttachmentSlot::Tied, chain);

        assert!(mon.attachment(AttachmentSlot::Tied).holds(chain_id));
        assert_eq!(previous.expect("rope handed back").id(), rope_id);
        assert!(items.location(rope_id).is_none());
    }

    #[test]
    fn item_list_round_trip() {
        let mut items = ItemArena::new();
        let mut mon = monster();

        let bone = items.spawn(Item::new(ItemTypeId(1), "bone"));
        let id = mon.add_item(&mut items, bone);
        assert!(mon.has_item(id));

        let removed = mon.remove_item(&mut items, id).expect("present");
        assert_eq!(removed.id(), id);
        assert!(!mon.has_item(id));
    }
}
