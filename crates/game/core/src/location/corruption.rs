//! The self-check protocol: is the item really where its location says?
//!
//! Code holding a raw [`ItemId`] across mutations revalidates with
//! [`ItemLocation::check_for_corruption`] before trusting it. A failed check
//! returns `false` rather than asserting: the caller decides whether to log,
//! repair, or escalate. Only the whole-bubble diagnostic scan reports, since
//! it has something concrete to say about where the item actually went.

use crate::diag::report;
use crate::item::ItemId;
use crate::location::ItemLocation;
use crate::world::World;

impl ItemLocation {
    /// Verifies the item is currently present in the storage this location
    /// describes. `true` means "not corrupted".
    pub fn check_for_corruption(&self, world: &World, item: ItemId) -> bool {
        match self {
            // Nothing real to corrupt.
            Self::Fake | Self::Template => true,
            Self::Character { holder } => world
                .characters
                .get(holder)
                .is_some_and(|ch| ch.inventory_contains(item)),
            Self::Worn { holder } => world
                .characters
                .get(holder)
                .is_some_and(|ch| ch.worn_contains(item)),
            Self::Wielded { holder } => world
                .characters
                .get(holder)
                .is_some_and(|ch| ch.wielded().holds(item)),
            Self::Tile { pos } => {
                let local = world.map.to_local(*pos);
                if !world.map.inbounds(local) {
                    // Out of the bubble; cannot verify, so trust the record.
                    return true;
                }
                if world.map.has_item_at(local, item) {
                    return true;
                }
                match world.map.find_item(item) {
                    Some(actual) => report!("{item} found at {actual}, not at {local}"),
                    None => report!("{item} not found anywhere in the bubble"),
                }
                false
            }
            Self::Vehicle { vehicle } => world.vehicles.get(vehicle).is_some_and(|veh| {
                veh.find_part_with_item(item)
                    .is_some_and(|part| veh.valid_part(part))
            }),
            Self::VehicleBase { vehicle } => world.vehicles.get(vehicle).is_some_and(|veh| {
                veh.find_part_with_base(item)
                    .is_some_and(|part| veh.valid_part(part))
            }),
            Self::Contents { container } => world
                .items
                .get(*container)
                .is_some_and(|parent| parent.contents.contains(item)),
            Self::Component { container } => world
                .items
                .get(*container)
                .is_some_and(|parent| parent.components.iter().any(|h| h.holds(item))),
            Self::MonsterInventory { holder } => world
                .monsters
                .get(holder)
                .is_some_and(|mon| mon.has_item(item)),
            Self::CorpseComponent { holder } => world
                .monsters
                .get(holder)
                .is_some_and(|mon| mon.has_corpse_component(item)),
            Self::MonsterAttachment { holder, slot } => world
                .monsters
                .get(holder)
                .is_some_and(|mon| mon.attachment(*slot).holds(item)),
        }
    }
}
