//! Per-storage-kind location behavior.
//!
//! [`ItemLocation`] is the closed set of places an item can be registered:
//! one variant per storage kind, each carrying just enough context to find
//! the storage again. Operations dispatch by pattern match, so adding a
//! storage kind is a compile-checked change rather than a new subclass.
//!
//! The operations are split by concern: detach protocol in [`detach`],
//! retrieval costs in [`cost`], human-readable descriptions in [`describe`],
//! and the self-check protocol in [`corruption`].

mod corruption;
mod cost;
mod describe;
mod detach;

use crate::diag::report;
use crate::item::ItemId;
use crate::types::{CharacterId, MonsterId, Position, VehicleId};
use crate::world::monster::AttachmentSlot;
use crate::world::World;

/// Coarse storage classification for code that branches on storage kind
/// without caring which concrete variant it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LocationKind {
    Character,
    Map,
    Vehicle,
    Container,
    Invalid,
}

/// Where an item is registered, and enough context to find it there.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemLocation {
    /// Transient placeholder with no real storage behind it (freshly
    /// deserialized, or a scratch copy). Every operation is a no-op or a
    /// reported error; there is nothing to corrupt.
    Fake,
    /// Scratch copy used for type inspection; detaching one is always a bug.
    Template,
    /// Carried in a character's inventory.
    Character { holder: CharacterId },
    /// Worn by a character.
    Worn { holder: CharacterId },
    /// Wielded by a character.
    Wielded { holder: CharacterId },
    /// On a map tile; `pos` is absolute, the map translates to bubble-local.
    Tile { pos: Position },
    /// Inside a vehicle's cargo space; the part is found by search.
    Vehicle { vehicle: VehicleId },
    /// The item that *is* a vehicle part; never detachable through here.
    VehicleBase { vehicle: VehicleId },
    /// Nested in another item's contents.
    Contents { container: ItemId },
    /// A crafting component of another item.
    Component { container: ItemId },
    /// In a monster's generic item list.
    MonsterInventory { holder: MonsterId },
    /// Part of a corpse awaiting butchery.
    CorpseComponent { holder: MonsterId },
    /// One of the typed single-item slots on a monster.
    MonsterAttachment {
        holder: MonsterId,
        slot: AttachmentSlot,
    },
}

impl ItemLocation {
    /// Coarse classification tag.
    pub fn kind(&self) -> LocationKind {
        match self {
            Self::Fake | Self::Template => LocationKind::Invalid,
            Self::Character { .. }
            | Self::Worn { .. }
            | Self::Wielded { .. }
            | Self::MonsterInventory { .. }
            | Self::CorpseComponent { .. }
            | Self::MonsterAttachment { .. } => LocationKind::Character,
            Self::Tile { .. } => LocationKind::Map,
            Self::Vehicle { .. } | Self::VehicleBase { .. } => LocationKind::Vehicle,
            Self::Contents { .. } | Self::Component { .. } => LocationKind::Container,
        }
    }

    /// Whether the storage is inside the active reality bubble right now.
    ///
    /// Conservatively false when the storage cannot be found.
    pub fn is_loaded(&self, world: &World, item: ItemId) -> bool {
        match self {
            Self::Fake | Self::Template => false,
            Self::Character { holder } | Self::Worn { holder } | Self::Wielded { holder } => world
                .characters
                .get(holder)
                .is_some_and(|ch| ch.is_loaded(&world.map)),
            Self::Tile { pos } => world.map.inbounds(world.map.to_local(*pos)),
            Self::Vehicle { vehicle } => world
                .vehicles
                .get(vehicle)
                .and_then(|veh| {
                    let part = veh.find_part_with_item(item)?;
                    veh.mount_to_global(part)
                })
                .is_some_and(|pos| world.map.inbounds(world.map.to_local(pos))),
            Self::VehicleBase { vehicle } => world
                .vehicles
                .get(vehicle)
                .and_then(|veh| {
                    let part = veh.find_part_with_base(item)?;
                    veh.mount_to_global(part)
                })
                .is_some_and(|pos| world.map.inbounds(world.map.to_local(pos))),
            Self::Contents { container } | Self::Component { container } => world
                .items
                .location(*container)
                .is_some_and(|loc| loc.is_loaded(world, *container)),
            Self::MonsterInventory { holder }
            | Self::CorpseComponent { holder }
            | Self::MonsterAttachment { holder, .. } => world
                .monsters
                .get(holder)
                .is_some_and(|mon| mon.is_loaded(&world.map)),
        }
    }

    /// Absolute coordinate of the item, derived from its storage.
    pub fn position(&self, world: &World, item: ItemId) -> Option<Position> {
        match self {
            Self::Fake | Self::Template => {
                report!("attempted to find the position of a fake item");
                None
            }
            Self::Character { holder } | Self::Worn { holder } | Self::Wielded { holder } => {
                world.characters.get(holder).map(|ch| ch.position)
            }
            Self::Tile { pos } => Some(*pos),
            Self::Vehicle { vehicle } => world.vehicles.get(vehicle).and_then(|veh| {
                let part = veh.find_part_with_item(item)?;
                veh.mount_to_global(part)
            }),
            Self::VehicleBase { vehicle } => world.vehicles.get(vehicle).and_then(|veh| {
                let part = veh.find_part_with_base(item)?;
                veh.mount_to_global(part)
            }),
            Self::Contents { container } | Self::Component { container } => world
                .items
                .location(*container)
                .and_then(|loc| loc.position(world, *container)),
            Self::MonsterInventory { holder }
            | Self::CorpseComponent { holder }
            | Self::MonsterAttachment { holder, .. } => {
                world.monsters.get(holder).map(|mon| mon.position)
            }
        }
    }
}
