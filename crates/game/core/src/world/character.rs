//! Characters: carried inventory, worn articles, the wielded slot, and the
//! handling-cost calculator the location strategies consume.

use arrayvec::ArrayVec;

use crate::config::GameConfig;
use crate::diag::report;
use crate::effect::{BodyPart, Effect, EffectRegistry, EffectType, EffectTypeId, EffectsMap};
use crate::error::{ErrorSeverity, GameError};
use crate::item::{
    DetachedItem, Item, ItemArena, ItemId, LenientLocatedItem, StrictLocatedItem,
};
use crate::location::ItemLocation;
use crate::types::{CharacterId, Position, Tick};
use crate::world::map::GameMap;

/// Errors from character storage operations.
///
/// Failed insertions carry the rejected item so ownership always returns to
/// the caller; recover it with [`CharacterError::into_item`].
#[derive(Debug, thiserror::Error)]
pub enum CharacterError {
    #[error("inventory is full (capacity {capacity})")]
    InventoryFull { capacity: usize, item: DetachedItem },

    #[error("no free worn slot (capacity {capacity})")]
    WornFull { capacity: usize, item: DetachedItem },

    #[error("no such character: {character}")]
    NotFound {
        character: CharacterId,
        item: DetachedItem,
    },
}

impl CharacterError {
    /// Recovers the item whose insertion failed.
    pub fn into_item(self) -> DetachedItem {
        match self {
            Self::InventoryFull { item, .. }
            | Self::WornFull { item, .. }
            | Self::NotFound { item, .. } => item,
        }
    }
}

impl GameError for CharacterError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InventoryFull { .. } | Self::WornFull { .. } => ErrorSeverity::Recoverable,
            Self::NotFound { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InventoryFull { .. } => "CHARACTER_INVENTORY_FULL",
            Self::WornFull { .. } => "CHARACTER_WORN_FULL",
            Self::NotFound { .. } => "CHARACTER_NOT_FOUND",
        }
    }
}

type InventorySlots = ArrayVec<StrictLocatedItem, { GameConfig::MAX_INVENTORY_SLOTS }>;
type WornSlots = ArrayVec<StrictLocatedItem, { GameConfig::MAX_WORN_SLOTS }>;

/// A character able to carry, wear, and wield items.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub position: Position,
    inventory: InventorySlots,
    worn: WornSlots,
    wielded: LenientLocatedItem,
    pub effects: EffectsMap,
}

impl Character {
    pub fn new(id: CharacterId, name: impl Into<String>, position: Position) -> Self {
        let mut wielded = LenientLocatedItem::empty();
        wielded.set_location(ItemLocation::Wielded { holder: id });
        Self {
            id,
            name: name.into(),
            position,
            inventory: ArrayVec::new(),
            worn: ArrayVec::new(),
            wielded,
            effects: EffectsMap::new(),
        }
    }

    /// A character is resident while inside the reality bubble.
    pub fn is_loaded(&self, map: &GameMap) -> bool {
        map.inbounds(map.to_local(self.position))
    }

    // ===== carried inventory =====

    pub fn add_to_inventory(
        &mut self,
        items: &mut ItemArena,
        item: DetachedItem,
    ) -> Result<ItemId, CharacterError> {
        if self.inventory.is_full() {
            return Err(CharacterError::InventoryFull {
                capacity: self.inventory.capacity(),
                item,
            });
        }
        let mut handle =
            StrictLocatedItem::with_location(ItemLocation::Character { holder: self.id });
        let id = handle.install(items, item);
        self.inventory.push(handle);
        Ok(id)
    }

    pub fn remove_from_inventory(
        &mut self,
        items: &mut ItemArena,
        id: ItemId,
    ) -> Option<DetachedItem> {
        let index = self.inventory.iter().position(|h| h.holds(id))?;
        self.inventory.remove(index).take(items)
    }

    pub fn inventory_contains(&self, id: ItemId) -> bool {
        self.inventory.iter().any(|h| h.holds(id))
    }

    pub fn inventory_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.inventory.iter().filter_map(|h| h.id())
    }

    // ===== worn articles =====

    pub fn wear(
        &mut self,
        items: &mut ItemArena,
        item: DetachedItem,
    ) -> Result<ItemId, CharacterError> {
        if self.worn.is_full() {
            return Err(CharacterError::WornFull {
                capacity: self.worn.capacity(),
                item,
            });
        }
        let mut handle = StrictLocatedItem::with_location(ItemLocation::Worn { holder: self.id });
        let id = handle.install(items, item);
        self.worn.push(handle);
        Ok(id)
    }

    pub fn remove_worn(&mut self, items: &mut ItemArena, id: ItemId) -> Option<DetachedItem> {
        let index = self.worn.iter().position(|h| h.holds(id))?;
        self.worn.remove(index).take(items)
    }

    pub fn worn_contains(&self, id: ItemId) -> bool {
        self.worn.iter().any(|h| h.holds(id))
    }

    pub fn worn_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.worn.iter().filter_map(|h| h.id())
    }

    // ===== wielded slot =====

    /// Wields an item, handing back whatever was wielded before.
    pub fn wield(
        &mut self,
        items: &mut ItemArena,
        item: DetachedItem,
    ) -> (ItemId, Option<DetachedItem>) {
        let previous = self.wielded.release(items);
        let id = self.wielded.install(items, item);
        (id, previous)
    }

    pub fn remove_wielded(&mut self, items: &mut ItemArena, id: ItemId) -> Option<DetachedItem> {
        if self.wielded.holds(id) {
            self.wielded.release(items)
        } else {
            None
        }
    }

    pub fn wielded(&self) -> &LenientLocatedItem {
        &self.wielded
    }

    // ===== status effects =====

    /// Applies an effect; an existing effect of the same type and body part
    /// has its duration extended instead.
    pub fn add_effect(
        &mut self,
        effect_type: &EffectType,
        duration: Tick,
        body_part: Option<BodyPart>,
        now: Tick,
    ) {
        let key = (effect_type.id.clone(), body_part);
        match self.effects.get_mut(&key) {
            Some(existing) => existing.mod_duration(effect_type, duration.0 as i64),
            None => {
                self.effects
                    .insert(key, Effect::new(effect_type, duration, body_part, now));
            }
        }
    }

    pub fn has_effect(&self, id: &EffectTypeId, body_part: Option<BodyPart>) -> bool {
        self.effects
            .get(&(id.clone(), body_part))
            .is_some_and(|e| !e.is_removed())
    }

    pub fn remove_effect(&mut self, id: &EffectTypeId, body_part: Option<BodyPart>) {
        self.effects.remove(&(id.clone(), body_part));
    }

    /// Ages every effect one tick and purges the expired ones.
    ///
    /// Expiry is marked during the pass and purged after it, so no effect is
    /// removed out from under the iteration.
    pub fn decay_effects(&mut self, registry: &EffectRegistry) {
        for ((kind, _), effect) in self.effects.iter_mut() {
            match registry.get(kind) {
                Some(effect_type) => {
                    if effect.decay(effect_type) {
                        effect.set_removed();
                    }
                }
                None => {
                    report!("decay_effects: unknown effect type {kind}");
                    effect.set_removed();
                }
            }
        }
        self.effects.retain(|_, effect| !effect.is_removed());
    }

    // ===== generic operations =====

    /// Removes an item by identity wherever it is held directly (inventory,
    /// worn, or wielded).
    pub fn remove_item(&mut self, items: &mut ItemArena, id: ItemId) -> Option<DetachedItem> {
        if let Some(detached) = self.remove_from_inventory(items, id) {
            return Some(detached);
        }
        if let Some(detached) = self.remove_worn(items, id) {
            return Some(detached);
        }
        self.remove_wielded(items, id)
    }

    /// True if this character directly holds `id` in any slot.
    pub fn has_item_directly(&self, id: ItemId) -> bool {
        self.inventory_contains(id) || self.worn_contains(id) || self.wielded.holds(id)
    }

    /// Moves it costs this character to manipulate `item`, plus `penalty`.
    pub fn item_handling_cost(&self, item: &Item, penalty: u32) -> u32 {
        let volume_moves = item.volume() / GameConfig::HANDLING_VOLUME_DIVISOR;
        volume_moves.max(GameConfig::MIN_HANDLING_MOVES) + penalty
    }

    /// Fallback insertion: inventory first, the ground at our feet second.
    ///
    /// Returns `None` only in the degenerate case where the inventory is full
    /// and the character is somehow outside the bubble; the item is destroyed
    /// after a report rather than left dangling.
    pub fn add_or_drop(
        &mut self,
        items: &mut ItemArena,
        map: &mut GameMap,
        item: DetachedItem,
    ) -> Option<ItemId> {
        match self.add_to_inventory(items, item) {
            Ok(id) => Some(id),
            Err(err) => {
                let item = err.into_item();
                let local = map.to_local(self.position);
                match map.add_item(items, local, item) {
                    Ok(id) => Some(id),
                    Err(err) => {
                        report!("add_or_drop: no room anywhere near {}", self.id);
                        let item = err.into_item();
                        let id = item.id();
                        items.despawn(id);
                        None
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemTypeId;
    use crate::world::map::MapDimensions;

    fn character() -> Character {
        Character::new(CharacterId(1), "Sasha", Position::new(4, 4))
    }

    fn rock(items: &mut ItemArena) -> DetachedItem {
        items.spawn(Item::new(ItemTypeId(1), "rock"))
    }

    #[test]
    fn inventory_round_trip() {
        let mut items = ItemArena::new();
        let mut ch = character();

        let detached = rock(&mut items);
        let id = ch.add_to_inventory(&mut items, detached).expect("room");
        assert!(ch.inventory_contains(id));
        assert_eq!(
            items.location(id),
            Some(&ItemLocation::Character {
                holder: CharacterId(1)
            })
        );

        let detached = ch.remove_from_inventory(&mut items, id).expect("present");
        assert_eq!(detached.id(), id);
        assert!(!ch.inventory_contains(id));
        assert!(items.location(id).is_none());
    }

    #[test]
    fn full_inventory_hands_the_item_back() {
        let mut items = ItemArena::new();
        let mut ch = character();
        for _ in 0..GameConfig::MAX_INVENTORY_SLOTS {
            let filler = rock(&mut items);
            ch.add_to_inventory(&mut items, filler).expect("room");
        }

        let overflow = rock(&mut items);
        let overflow_id = overflow.id();
        let err = ch
            .add_to_inventory(&mut items, overflow)
            .expect_err("inventory is full");

        assert_eq!(err.error_code(), "CHARACTER_INVENTORY_FULL");
        assert!(err.severity().is_recoverable());
        assert_eq!(err.into_item().id(), overflow_id);
    }

    #[test]
    fn wield_replaces_and_returns_previous() {
        let mut items = ItemArena::new();
        let mut ch = character();

        let detached = rock(&mut items);
        let (first, none) = ch.wield(&mut items, detached);
        assert!(none.is_none());
        assert!(ch.wielded().holds(first));

        let detached = rock(&mut items);
        let (second, previous) = ch.wield(&mut items, detached);
        assert!(ch.wielded().holds(second));
        let previous = previous.expect("first rock handed back");
        assert_eq!(previous.id(), first);
        assert!(items.location(first).is_none());
    }

    #[test]
    fn remove_item_searches_every_slot() {
        let mut items = ItemArena::new();
        let mut ch = character();

        let detached = rock(&mut items);
        let carried = ch.add_to_inventory(&mut items, detached).expect("room");
        let detached = rock(&mut items);
        let worn = ch.wear(&mut items, detached).expect("room");
        let detached = rock(&mut items);
        let (wielded, _) = ch.wield(&mut items, detached);

        for id in [carried, worn, wielded] {
            let detached = ch.remove_item(&mut items, id).expect("held directly");
            assert_eq!(detached.id(), id);
        }
        assert!(!ch.has_item_directly(carried));
        assert!(ch.wielded().is_empty());
    }

    #[test]
    fn add_or_drop_falls_back_to_the_ground() {
        let mut items = ItemArena::new();
        let mut map = GameMap::new(Position::ORIGIN, MapDimensions::new(10, 10));
        let mut ch = character();
        for _ in 0..GameConfig::MAX_INVENTORY_SLOTS {
            let filler = rock(&mut items);
            ch.add_to_inventory(&mut items, filler).expect("room");
        }

        let overflow = rock(&mut items);
        let id = ch
            .add_or_drop(&mut items, &mut map, overflow)
            .expect("dropped at feet");

        assert!(map.has_item_at(map.to_local(ch.position), id));
    }

    #[test]
    fn effects_extend_decay_and_expire() {
        use crate::effect::{EffectRegistry, EffectType, EffectTypeId};

        let mut registry = EffectRegistry::new();
        let poison = EffectType::new(EffectTypeId::new("poison"), "Poisoned")
            .with_max_duration(Tick(100));
        registry.register(poison.clone()).expect("fresh registry");

        let mut ch = character();
        ch.add_effect(&poison, Tick(2), None, Tick::ZERO);
        assert!(ch.has_effect(&poison.id, None));

        // Re-applying extends the existing instance.
        ch.add_effect(&poison, Tick(1), None, Tick::ZERO);
        assert_eq!(ch.effects.len(), 1);

        ch.decay_effects(&registry);
        ch.decay_effects(&registry);
        assert!(ch.has_effect(&poison.id, None));
        ch.decay_effects(&registry);
        assert!(!ch.has_effect(&poison.id, None));
    }

    #[test]
    fn handling_cost_scales_with_volume() {
        let ch = character();
        let pebble = Item::new(ItemTypeId(1), "pebble").with_volume(10);
        let anvil = Item::new(ItemTypeId(2), "anvil").with_volume(9000);

        assert_eq!(
            ch.item_handling_cost(&pebble, 0),
            GameConfig::MIN_HANDLING_MOVES
        );
        assert_eq!(ch.item_handling_cost(&anvil, 100), 900 + 100);
    }
}
