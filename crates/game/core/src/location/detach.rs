//! The detach protocol: removing an item's registration from its storage.
//!
//! Exactly one detach runs per transfer, and it must complete before the
//! destination registers the item. Detaching an item that is not actually
//! present where its location says is an internal-consistency failure:
//! reported, fatal in debug builds, a no-op in release builds.

use crate::diag::report;
use crate::item::{DetachedItem, ItemId};
use crate::location::ItemLocation;
use crate::world::World;

impl ItemLocation {
    /// Removes `item`'s registration from the storage this location
    /// describes and clears its arena-slot location, yielding the owning
    /// detached handle.
    ///
    /// Returns `None` (after reporting) if the item was not present, or if
    /// this location kind forbids detaching.
    pub fn detach(&self, world: &mut World, item: ItemId) -> Option<DetachedItem> {
        let World {
            items,
            characters,
            monsters,
            vehicles,
            map,
            ..
        } = world;
        let removed = match self {
            Self::Fake => {
                // No real storage to unregister from.
                items.clear_location(item);
                return Some(DetachedItem::new(item));
            }
            Self::Template => {
                report!("attempted to detach a template item {item}");
                return None;
            }
            Self::Character { holder } => characters
                .get_mut(holder)
                .and_then(|ch| ch.remove_from_inventory(items, item)),
            Self::Worn { holder } => characters
                .get_mut(holder)
                .and_then(|ch| ch.remove_worn(items, item)),
            Self::Wielded { holder } => characters
                .get_mut(holder)
                .and_then(|ch| ch.remove_wielded(items, item)),
            Self::Tile { pos } => {
                let local = map.to_local(*pos);
                map.remove_item(items, local, item)
            }
            Self::Vehicle { vehicle } => vehicles
                .get_mut(vehicle)
                .and_then(|veh| veh.remove_cargo(items, item)),
            Self::VehicleBase { .. } => {
                report!("attempted to detach a vehicle base part {item}");
                return None;
            }
            Self::Contents { container } => items.remove_from_contents(*container, item),
            Self::Component { container } => items.remove_component(*container, item),
            Self::MonsterInventory { holder } => monsters
                .get_mut(holder)
                .and_then(|mon| mon.remove_item(items, item)),
            Self::CorpseComponent { holder } => monsters
                .get_mut(holder)
                .and_then(|mon| mon.remove_corpse_component(items, item)),
            Self::MonsterAttachment { holder, slot } => {
                monsters.get_mut(holder).and_then(|mon| {
                    if mon.attachment(*slot).holds(item) {
                        mon.clear_attachment(items, *slot)
                    } else {
                        None
                    }
                })
            }
        };
        if removed.is_none() {
            report!("detach: {item} was not present in {self:?}");
        }
        removed
    }

    /// Detach variant used when the item is about to be destroyed rather
    /// than relocated.
    ///
    /// Destroying a still-located item is itself a bug and is reported; the
    /// fake location suppresses the report because it represents no real
    /// storage.
    pub fn detach_for_destroy(&self, world: &mut World, item: ItemId) -> Option<DetachedItem> {
        if let Self::Fake = self {
            world.items.clear_location(item);
            return Some(DetachedItem::new(item));
        }
        report!("attempted to destroy {item} while it still has a location");
        self.detach(world, item)
    }
}
