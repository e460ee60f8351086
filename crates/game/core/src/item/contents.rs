//! Nested item storage: the ordered contents of a parent item.
//!
//! The aggregate itself lives inside the parent's arena slot, so operations
//! that must touch both the aggregate and other arena slots (stamping a
//! child's location, releasing every child) are arena- or world-level
//! functions; [`ItemContents`] holds the ordered handles and the pure
//! queries.
//!
//! Insertion order is meaningful: it is stacking order and display order,
//! and the stack-compatibility comparison is positional.

use crate::diag::report;
use crate::error::{ErrorSeverity, GameError};
use crate::item::arena::{ItemArena, ItemId};
use crate::item::handle::{DetachedItem, StrictLocatedItem};
use crate::item::{Item, ItemFlags, QualityId};
use crate::location::ItemLocation;
use crate::types::{CharacterId, Position};
use crate::world::World;

/// Errors from contents insertion.
///
/// Insertion into a live parent always succeeds today; the result type is
/// reserved for capacity-aware insertion logic. Failed insertions carry the
/// rejected item; recover it with [`InsertError::into_item`].
#[derive(Debug, thiserror::Error)]
pub enum InsertError {
    #[error("container {parent} is not a live item")]
    ParentMissing { parent: ItemId, item: DetachedItem },
}

impl InsertError {
    /// Recovers the item whose insertion failed.
    pub fn into_item(self) -> DetachedItem {
        match self {
            Self::ParentMissing { item, .. } => item,
        }
    }
}

impl GameError for InsertError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ParentMissing { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ParentMissing { .. } => "CONTENTS_PARENT_MISSING",
        }
    }
}

/// Disposal routine for liquids that cannot simply be pocketed.
pub trait LiquidSink {
    /// Takes ownership of one batch of `quantity` units of a liquid item.
    fn dispose(&mut self, world: &mut World, liquid: DetachedItem, quantity: u32);
}

/// Ordered collection of items nested inside one parent item.
#[derive(Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemContents {
    items: Vec<StrictLocatedItem>,
}

impl ItemContents {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of top-level item stacks.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Top-level item ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter().filter_map(|h| h.id())
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.iter().any(|h| h.holds(id))
    }

    pub fn front(&self) -> Option<ItemId> {
        self.items.first().and_then(|h| h.id())
    }

    pub fn back(&self) -> Option<ItemId> {
        self.items.last().and_then(|h| h.id())
    }

    /// True if any top-level item satisfies `filter`.
    pub fn has_any_with(&self, items: &ItemArena, filter: impl Fn(&Item) -> bool) -> bool {
        self.get_item_with(items, filter).is_some()
    }

    /// First top-level item satisfying `filter`.
    pub fn get_item_with(
        &self,
        items: &ItemArena,
        filter: impl Fn(&Item) -> bool,
    ) -> Option<ItemId> {
        self.ids()
            .find(|id| items.get(*id).is_some_and(|it| filter(it)))
    }

    pub(crate) fn push(&mut self, handle: StrictLocatedItem) {
        self.items.push(handle);
    }

    pub(crate) fn remove_handle(&mut self, id: ItemId) -> Option<StrictLocatedItem> {
        let index = self.items.iter().position(|h| h.holds(id))?;
        Some(self.items.remove(index))
    }

    pub(crate) fn into_handles(self) -> Vec<StrictLocatedItem> {
        self.items
    }
}

impl ItemArena {
    /// Inserts a detached item at the back of `parent`'s contents.
    ///
    /// Always succeeds for a live parent; capacity and weight limits are a
    /// caller concern validated before calling.
    pub fn insert_into(
        &mut self,
        parent: ItemId,
        item: DetachedItem,
    ) -> Result<ItemId, InsertError> {
        if !self.contains(parent) {
            return Err(InsertError::ParentMissing { parent, item });
        }
        let mut handle =
            StrictLocatedItem::with_location(ItemLocation::Contents { container: parent });
        let id = handle.install(self, item);
        match self.get_mut(parent) {
            Some(it) => it.contents.push(handle),
            None => {
                // Unreachable: checked above, and install cannot kill the parent.
                let item = handle
                    .release(self)
                    .unwrap_or_else(|| DetachedItem::new(id));
                return Err(InsertError::ParentMissing { parent, item });
            }
        }
        Ok(id)
    }

    /// Removes one item from `parent`'s contents by identity.
    pub fn remove_from_contents(&mut self, parent: ItemId, id: ItemId) -> Option<DetachedItem> {
        let handle = self.get_mut(parent)?.contents.remove_handle(id)?;
        handle.take(self)
    }

    /// Moves every contained item out, transferring ownership to the caller
    /// and leaving the aggregate empty.
    pub fn remove_all(&mut self, parent: ItemId) -> Vec<DetachedItem> {
        let contents = match self.get_mut(parent) {
            Some(it) => core::mem::take(&mut it.contents),
            None => return Vec::new(),
        };
        contents
            .into_handles()
            .into_iter()
            .filter_map(|handle| handle.take(self))
            .collect()
    }

    /// Registers a crafting component on `parent`.
    pub fn add_component(
        &mut self,
        parent: ItemId,
        item: DetachedItem,
    ) -> Result<ItemId, InsertError> {
        if !self.contains(parent) {
            return Err(InsertError::ParentMissing { parent, item });
        }
        let mut handle =
            StrictLocatedItem::with_location(ItemLocation::Component { container: parent });
        let id = handle.install(self, item);
        if let Some(it) = self.get_mut(parent) {
            it.components.push(handle);
        }
        Ok(id)
    }

    /// Erases a crafting component's registration from `parent`.
    pub fn remove_component(&mut self, parent: ItemId, id: ItemId) -> Option<DetachedItem> {
        let components = &mut self.get_mut(parent)?.components;
        let index = components.iter().position(|h| h.holds(id))?;
        let handle = components.remove(index);
        handle.take(self)
    }

    /// Every item in `parent`'s contents and all nested contents, flattened
    /// depth-first, parent before children.
    pub fn all_items_in(&self, parent: ItemId) -> Vec<ItemId> {
        let mut out = Vec::new();
        let Some(item) = self.get(parent) else {
            return out;
        };
        for id in item.contents.ids() {
            out.push(id);
            out.extend(self.all_items_in(id));
        }
        out
    }

    /// Deep stacking compatibility: type-level match plus positionally
    /// identical contents.
    pub fn items_stack_with(&self, a: ItemId, b: ItemId) -> bool {
        let (Some(ia), Some(ib)) = (self.get(a), self.get(b)) else {
            return false;
        };
        ia.stacks_with(ib) && self.contents_stack_with(a, b)
    }

    /// Positional stack-compatibility of two aggregates: same stack count,
    /// and at each position equal charges plus deep type compatibility.
    /// Reordering otherwise-identical contents makes two aggregates distinct.
    pub fn contents_stack_with(&self, a: ItemId, b: ItemId) -> bool {
        let (Some(ia), Some(ib)) = (self.get(a), self.get(b)) else {
            return false;
        };
        if ia.contents.len() != ib.contents.len() {
            return false;
        }
        ia.contents.ids().zip(ib.contents.ids()).all(|(x, y)| {
            match (self.get(x), self.get(y)) {
                (Some(ix), Some(iy)) => ix.charges == iy.charges && self.items_stack_with(x, y),
                _ => false,
            }
        })
    }

    /// Volume added to `parent` by everything nested in it.
    pub fn contents_volume(&self, parent: ItemId) -> u32 {
        self.all_items_in(parent)
            .iter()
            .filter_map(|id| self.get(*id))
            .map(Item::volume)
            .sum()
    }

    /// Weight added to `parent` by everything nested in it.
    pub fn contents_weight(&self, parent: ItemId) -> u32 {
        self.all_items_in(parent)
            .iter()
            .filter_map(|id| self.get(*id))
            .map(Item::weight)
            .sum()
    }

    /// Best level of `quality` among `parent`'s top-level contents.
    pub fn best_quality(&self, parent: ItemId, quality: &QualityId) -> Option<i32> {
        let item = self.get(parent)?;
        item.contents
            .ids()
            .filter_map(|id| self.get(id)?.quality(quality))
            .max()
    }
}

impl World {
    /// Inserts a detached item into `parent`'s contents.
    pub fn put_in(&mut self, parent: ItemId, item: DetachedItem) -> Result<ItemId, InsertError> {
        self.items.insert_into(parent, item)
    }

    /// Moves every contained item onto the tile at absolute `pos`, clearing
    /// the aggregate.
    ///
    /// Always reports success once spilled; destination failure modes (a
    /// full or out-of-bubble tile) are deferred, and such items are
    /// destroyed after a report rather than left dangling.
    pub fn spill_contents(&mut self, parent: ItemId, pos: Position) -> bool {
        for detached in self.items.remove_all(parent) {
            let local = self.map.to_local(pos);
            if let Err(err) = self.map.add_item(&mut self.items, local, detached) {
                report!("spill_contents: {err}");
                let item = err.into_item();
                let id = item.id();
                self.items.despawn(id);
            }
        }
        true
    }

    /// Routes every contained item out of `parent`: liquids go one unit at a
    /// time to `sink`, everything else through `who`'s add-or-drop fallback.
    ///
    /// Each item is removed from the aggregate before being handed off, so
    /// the handlers never observe it as still contained.
    pub fn handle_liquid_or_spill(
        &mut self,
        parent: ItemId,
        who: CharacterId,
        sink: &mut dyn LiquidSink,
    ) {
        for detached in self.items.remove_all(parent) {
            let is_liquid = detached
                .get(&self.items)
                .is_some_and(|it| it.is_liquid());
            if is_liquid {
                sink.dispose(self, detached, 1);
            } else {
                match self.characters.get_mut(&who) {
                    Some(ch) => {
                        ch.add_or_drop(&mut self.items, &mut self.map, detached);
                    }
                    None => {
                        report!("handle_liquid_or_spill: no such {who}");
                        let id = detached.id();
                        self.items.despawn(id);
                    }
                }
            }
        }
    }

    /// Offers every CASING-flagged item in `parent`'s contents to `func` as
    /// a detached handle, with the flag cleared. Handles returned unconsumed
    /// are reinserted with the flag restored, ready for the next call.
    pub fn casings_handle(
        &mut self,
        parent: ItemId,
        func: &mut dyn FnMut(&mut World, DetachedItem) -> Option<DetachedItem>,
    ) {
        let contents = match self.items.get_mut(parent) {
            Some(item) => core::mem::take(&mut item.contents),
            None => return,
        };
        let mut kept = ItemContents::default();
        for handle in contents.into_handles() {
            let is_casing = handle
                .id()
                .and_then(|id| self.items.get(id))
                .is_some_and(|it| it.flags.contains(ItemFlags::CASING));
            if !is_casing {
                kept.push(handle);
                continue;
            }
            let Some(id) = handle.id() else {
                kept.push(handle);
                continue;
            };
            if let Some(it) = self.items.get_mut(id) {
                it.flags.remove(ItemFlags::CASING);
            }
            let Some(detached) = handle.take(&mut self.items) else {
                continue;
            };
            if let Some(returned) = func(self, detached) {
                // Not consumed: restore the flag and the registration.
                let returned_id = returned.id();
                let mut fresh = StrictLocatedItem::with_location(ItemLocation::Contents {
                    container: parent,
                });
                fresh.install(&mut self.items, returned);
                if let Some(it) = self.items.get_mut(returned_id) {
                    it.flags.insert(ItemFlags::CASING);
                }
                kept.push(fresh);
            }
        }
        match self.items.get_mut(parent) {
            Some(item) => item.contents = kept,
            None => report!("casings_handle: container {parent} vanished mid-iteration"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::item::{ItemTypeId, Phase};
    use crate::types::Position;

    fn world() -> World {
        World::new(&GameConfig::with_bubble(24, 24))
    }

    fn backpack(world: &mut World) -> ItemId {
        let detached = world.spawn_item(Item::new(ItemTypeId(10), "backpack"));
        world.park_item(detached)
    }

    fn spawn_in(world: &mut World, parent: ItemId, item: Item) -> ItemId {
        let detached = world.spawn_item(item);
        world.put_in(parent, detached).expect("parent is live")
    }

    #[test]
    fn inserted_items_point_back_at_the_parent() {
        let mut world = world();
        let pack = backpack(&mut world);
        let id = spawn_in(&mut world, pack, Item::new(ItemTypeId(1), "rock"));

        assert!(world.items.get(pack).expect("live").contents.contains(id));
        assert_eq!(
            world.items.location(id),
            Some(&ItemLocation::Contents { container: pack })
        );
        assert!(world.check_item(id));
    }

    #[test]
    fn remove_all_transfers_ownership_of_everything() {
        let mut world = world();
        let pack = backpack(&mut world);
        let mut expected = Vec::new();
        for i in 0..3 {
            expected.push(spawn_in(
                &mut world,
                pack,
                Item::new(ItemTypeId(i), format!("thing {i}")),
            ));
        }

        let detached = world.items.remove_all(pack);

        assert_eq!(
            detached.iter().map(DetachedItem::id).collect::<Vec<_>>(),
            expected
        );
        assert!(world.items.get(pack).expect("live").contents.is_empty());
        for handle in &detached {
            assert!(world.items.location(handle.id()).is_none());
        }
    }

    #[test]
    fn stacking_comparison_is_positional() {
        let mut world = world();
        let left = backpack(&mut world);
        let right = backpack(&mut world);

        let ammo = |charges| {
            Item::new(ItemTypeId(7), "rounds")
                .with_charges(charges)
        };
        let bandage = |charges| {
            Item::new(ItemTypeId(8), "bandage")
                .with_charges(charges)
        };

        // Same order, same charges: compatible.
        spawn_in(&mut world, left, ammo(3));
        spawn_in(&mut world, left, bandage(1));
        spawn_in(&mut world, right, ammo(3));
        spawn_in(&mut world, right, bandage(1));
        assert!(world.items.contents_stack_with(left, right));

        // Reordered contents: reported as incompatible.
        let reordered = backpack(&mut world);
        spawn_in(&mut world, reordered, bandage(1));
        spawn_in(&mut world, reordered, ammo(3));
        assert!(!world.items.contents_stack_with(left, reordered));

        // Different charge count at one position: incompatible.
        let short = backpack(&mut world);
        spawn_in(&mut world, short, ammo(2));
        spawn_in(&mut world, short, bandage(1));
        assert!(!world.items.contents_stack_with(left, short));

        // Different stack count: incompatible.
        let fewer = backpack(&mut world);
        spawn_in(&mut world, fewer, ammo(3));
        assert!(!world.items.contents_stack_with(left, fewer));
    }

    #[test]
    fn flatten_is_depth_first_parent_before_children() {
        let mut world = world();
        let pack = backpack(&mut world);

        let pouch = spawn_in(&mut world, pack, Item::new(ItemTypeId(11), "pouch"));
        let coin = {
            let detached = world.spawn_item(Item::new(ItemTypeId(12), "coin"));
            world.put_in(pouch, detached).expect("pouch is live")
        };
        let rock = spawn_in(&mut world, pack, Item::new(ItemTypeId(1), "rock"));

        assert_eq!(world.items.all_items_in(pack), vec![pouch, coin, rock]);
    }

    #[test]
    fn liquids_route_to_the_sink_and_solids_to_the_character() {
        struct CountingSink {
            calls: Vec<(ItemId, u32)>,
        }
        impl LiquidSink for CountingSink {
            fn dispose(&mut self, world: &mut World, liquid: DetachedItem, quantity: u32) {
                self.calls.push((liquid.id(), quantity));
                liquid.destroy(&mut world.items);
            }
        }

        let mut world = world();
        let ch = world.add_character("Sasha", Position::new(4, 4));
        let pack = backpack(&mut world);

        let water = spawn_in(
            &mut world,
            pack,
            Item::new(ItemTypeId(20), "water").with_phase(Phase::Liquid),
        );
        let gasoline = spawn_in(
            &mut world,
            pack,
            Item::new(ItemTypeId(21), "gasoline").with_phase(Phase::Liquid),
        );
        let rock = spawn_in(&mut world, pack, Item::new(ItemTypeId(1), "rock"));

        let mut sink = CountingSink { calls: Vec::new() };
        world.handle_liquid_or_spill(pack, ch, &mut sink);

        assert_eq!(sink.calls, vec![(water, 1), (gasoline, 1)]);
        assert!(world.items.get(pack).expect("live").contents.is_empty());
        assert!(world.characters[&ch].inventory_contains(rock));
    }

    #[test]
    fn spill_contents_moves_everything_to_the_tile() {
        let mut world = world();
        let pack = backpack(&mut world);
        let a = spawn_in(&mut world, pack, Item::new(ItemTypeId(1), "rock"));
        let b = spawn_in(&mut world, pack, Item::new(ItemTypeId(2), "stick"));

        let pos = Position::new(3, 3);
        assert!(world.spill_contents(pack, pos));

        let local = world.map.to_local(pos);
        assert!(world.map.has_item_at(local, a));
        assert!(world.map.has_item_at(local, b));
        assert!(world.items.get(pack).expect("live").contents.is_empty());
        assert!(world.check_item(a));
        assert!(world.check_item(b));
    }

    #[test]
    fn casings_restore_their_flag_when_not_consumed() {
        let mut world = world();
        let gun = backpack(&mut world);
        let casing = spawn_in(
            &mut world,
            gun,
            Item::new(ItemTypeId(30), "casing").with_flags(ItemFlags::CASING),
        );
        let magazine = spawn_in(&mut world, gun, Item::new(ItemTypeId(31), "magazine"));

        // Refuse every offer: contents must be unchanged afterwards.
        let mut offered = Vec::new();
        world.casings_handle(gun, &mut |world, detached| {
            offered.push(detached.id());
            // The flag is cleared while the casing is on offer.
            assert!(!detached
                .get(&world.items)
                .expect("live")
                .flags
                .contains(ItemFlags::CASING));
            Some(detached)
        });

        assert_eq!(offered, vec![casing]);
        let contents = &world.items.get(gun).expect("live").contents;
        assert!(contents.contains(casing));
        assert!(contents.contains(magazine));
        assert!(world
            .items
            .get(casing)
            .expect("live")
            .flags
            .contains(ItemFlags::CASING));

        // Consume every offer: casings leave, the magazine stays.
        world.casings_handle(gun, &mut |world, detached| {
            detached.destroy(&mut world.items);
            None
        });
        let contents = &world.items.get(gun).expect("live").contents;
        assert!(!contents.contains(casing));
        assert!(contents.contains(magazine));
    }

    #[test]
    fn crafting_components_track_their_parent() {
        let mut world = world();
        let hatchet = backpack(&mut world);

        let head = world.spawn_item(Item::new(ItemTypeId(50), "steel head"));
        let id = world
            .items
            .add_component(hatchet, head)
            .expect("parent is live");

        assert_eq!(
            world.items.location(id),
            Some(&ItemLocation::Component {
                container: hatchet
            })
        );
        assert!(world.check_item(id));

        let detached = world.detach_item(id).expect("registered component");
        assert_eq!(detached.id(), id);
        assert!(world.items.location(id).is_none());
    }

    #[test]
    fn filtered_search_finds_top_level_items() {
        let mut world = world();
        let pack = backpack(&mut world);
        spawn_in(&mut world, pack, Item::new(ItemTypeId(1), "rock"));
        let water = spawn_in(
            &mut world,
            pack,
            Item::new(ItemTypeId(20), "water").with_phase(Phase::Liquid),
        );

        let contents = &world.items.get(pack).expect("live").contents;
        assert_eq!(
            contents.get_item_with(&world.items, |it| it.is_liquid()),
            Some(water)
        );
        assert!(contents.has_any_with(&world.items, |it| it.name == "rock"));
        assert!(!contents.has_any_with(&world.items, |it| it.name == "anvil"));
    }

    #[test]
    fn contents_volume_and_weight_are_recursive() {
        let mut world = world();
        let pack = backpack(&mut world);
        let pouch = spawn_in(
            &mut world,
            pack,
            Item::new(ItemTypeId(11), "pouch").with_volume(100).with_weight(50),
        );
        let detached = world.spawn_item(
            Item::new(ItemTypeId(12), "coin").with_volume(5).with_weight(10),
        );
        world.put_in(pouch, detached).expect("pouch is live");

        assert_eq!(world.items.contents_volume(pack), 105);
        assert_eq!(world.items.contents_weight(pack), 60);
    }

    #[test]
    fn best_quality_scans_top_level_contents() {
        let mut world = world();
        let toolbox = backpack(&mut world);
        let cutting = QualityId::new("cut");
        spawn_in(
            &mut world,
            toolbox,
            Item::new(ItemTypeId(40), "knife").with_quality(cutting.clone(), 2),
        );
        spawn_in(
            &mut world,
            toolbox,
            Item::new(ItemTypeId(41), "saw").with_quality(cutting.clone(), 1),
        );

        assert_eq!(world.items.best_quality(toolbox, &cutting), Some(2));
        assert_eq!(
            world.items.best_quality(toolbox, &QualityId::new("pry")),
            None
        );
    }
}
