//! Ownership and location tracking for relocatable game items.
//!
//! Every live item is owned by the [`item::ItemArena`]; storages (character
//! inventories, map tiles, vehicle cargo, monster slots, nested contents)
//! register items through move-only handles, and each item's arena slot
//! records an [`location::ItemLocation`] describing where it sits. Transfers
//! run a strict detach-then-register protocol, and any holder of a raw
//! [`item::ItemId`] can revalidate it at any time through the corruption
//! check.
pub mod config;
pub mod diag;
pub mod effect;
pub mod error;
pub mod item;
pub mod location;
pub mod types;
pub mod world;

pub use config::GameConfig;
pub use effect::{
    BodyPart, Effect, EffectError, EffectFlags, EffectRating, EffectRegistry, EffectType,
    EffectTypeId, EffectsMap,
};
pub use error::{ErrorSeverity, GameError};
pub use item::{
    DetachedItem, InsertError, Item, ItemArena, ItemContents, ItemFlags, ItemId, ItemTypeId,
    LenientLocatedItem, LiquidSink, LocatedItem, Phase, QualityId, StrictLocatedItem,
};
pub use location::{ItemLocation, LocationKind};
pub use types::{CharacterId, MonsterId, Position, Tick, VehicleId};
pub use world::{
    AttachmentSlot, Character, CharacterError, GameMap, MapDimensions, MapError, Monster,
    TerrainKind, Vehicle, VehicleError, VehiclePart, World,
};
