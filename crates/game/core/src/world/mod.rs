//! The world: every storage collaborator plus the item arena, and the
//! top-level transfer operations that move items between them.
//!
//! Transfers preserve one ordering guarantee: the old location's detach
//! completes before the new location's registration becomes visible. There
//! is never a moment, observable after a transfer returns, where an item is
//! registered in two storages or in none.

pub mod character;
pub mod map;
pub mod monster;
pub mod vehicle;

use std::collections::BTreeMap;

use crate::config::GameConfig;
use crate::diag::report;
use crate::item::{DetachedItem, Item, ItemArena, ItemId};
use crate::location::{ItemLocation, LocationKind};
use crate::types::{CharacterId, MonsterId, Position, VehicleId};

pub use character::{Character, CharacterError};
pub use map::{GameMap, MapDimensions, MapError, TerrainKind};
pub use monster::{AttachmentSlot, Monster};
pub use vehicle::{Vehicle, VehicleError, VehiclePart};

/// Aggregate of the item arena and every storage collaborator.
#[derive(Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct World {
    pub items: ItemArena,
    pub characters: BTreeMap<CharacterId, Character>,
    pub monsters: BTreeMap<MonsterId, Monster>,
    pub vehicles: BTreeMap<VehicleId, Vehicle>,
    pub map: GameMap,
    next_character: u32,
    next_monster: u32,
    next_vehicle: u32,
}

impl World {
    /// A world whose reality bubble is sized by `config`, anchored at the
    /// absolute origin.
    pub fn new(config: &GameConfig) -> Self {
        Self::with_map(GameMap::new(
            Position::ORIGIN,
            MapDimensions::new(config.bubble_width, config.bubble_height),
        ))
    }

    pub fn with_map(map: GameMap) -> Self {
        Self {
            items: ItemArena::new(),
            characters: BTreeMap::new(),
            monsters: BTreeMap::new(),
            vehicles: BTreeMap::new(),
            map,
            next_character: 0,
            next_monster: 0,
            next_vehicle: 0,
        }
    }

    // ===== population =====

    pub fn add_character(&mut self, name: impl Into<String>, position: Position) -> CharacterId {
        let id = CharacterId(self.next_character);
        self.next_character += 1;
        self.characters.insert(id, Character::new(id, name, position));
        id
    }

    pub fn add_monster(&mut self, name: impl Into<String>, position: Position) -> MonsterId {
        let id = MonsterId(self.next_monster);
        self.next_monster += 1;
        self.monsters.insert(id, Monster::new(id, name, position));
        id
    }

    pub fn add_vehicle(&mut self, name: impl Into<String>, position: Position) -> VehicleId {
        let id = VehicleId(self.next_vehicle);
        self.next_vehicle += 1;
        self.vehicles.insert(id, Vehicle::new(id, name, position));
        id
    }

    // ===== spawning and destruction =====

    /// Creates an item with no location; place it with one of the transfer
    /// operations below.
    pub fn spawn_item(&mut self, item: Item) -> DetachedItem {
        self.items.spawn(item)
    }

    /// Runs the detach protocol against `id`'s current location, yielding
    /// its owning detached handle. This is the first half of every transfer.
    pub fn detach_item(&mut self, id: ItemId) -> Option<DetachedItem> {
        let Some(location) = self.items.location(id).cloned() else {
            report!("detach_item: {id} has no location");
            return None;
        };
        location.detach(self, id)
    }

    /// Destroys an item outright, running the destroy-detach protocol first
    /// if it is still located (which is reported as a bug).
    pub fn destroy_item(&mut self, id: ItemId) -> Option<Item> {
        if let Some(location) = self.items.location(id).cloned() {
            location.detach_for_destroy(self, id)?;
        }
        self.items.despawn(id)
    }

    // ===== transfers into storages =====

    pub fn give_item(
        &mut self,
        to: CharacterId,
        item: DetachedItem,
    ) -> Result<ItemId, CharacterError> {
        match self.characters.get_mut(&to) {
            Some(ch) => ch.add_to_inventory(&mut self.items, item),
            None => Err(CharacterError::NotFound {
                character: to,
                item,
            }),
        }
    }

    pub fn wear_item(
        &mut self,
        on: CharacterId,
        item: DetachedItem,
    ) -> Result<ItemId, CharacterError> {
        match self.characters.get_mut(&on) {
            Some(ch) => ch.wear(&mut self.items, item),
            None => Err(CharacterError::NotFound {
                character: on,
                item,
            }),
        }
    }

    /// Wields an item, handing back the previously wielded one.
    pub fn wield_item(
        &mut self,
        who: CharacterId,
        item: DetachedItem,
    ) -> Result<(ItemId, Option<DetachedItem>), CharacterError> {
        match self.characters.get_mut(&who) {
            Some(ch) => Ok(ch.wield(&mut self.items, item)),
            None => Err(CharacterError::NotFound {
                character: who,
                item,
            }),
        }
    }

    /// Places an item on the tile at an absolute position.
    pub fn add_item_to_tile(
        &mut self,
        pos: Position,
        item: DetachedItem,
    ) -> Result<ItemId, MapError> {
        let local = self.map.to_local(pos);
        self.map.add_item(&mut self.items, local, item)
    }

    pub fn vehicle_add_cargo(
        &mut self,
        vehicle: VehicleId,
        part: usize,
        item: DetachedItem,
    ) -> Result<ItemId, VehicleError> {
        match self.vehicles.get_mut(&vehicle) {
            Some(veh) => veh.add_cargo(&mut self.items, part, item),
            None => Err(VehicleError::NotFound { vehicle, item }),
        }
    }

    pub fn monster_give_item(&mut self, to: MonsterId, item: DetachedItem) -> Option<ItemId> {
        match self.monsters.get_mut(&to) {
            Some(mon) => Some(mon.add_item(&mut self.items, item)),
            None => {
                report!("monster_give_item: no such {to}");
                None
            }
        }
    }

    pub fn monster_set_attachment(
        &mut self,
        on: MonsterId,
        slot: AttachmentSlot,
        item: DetachedItem,
    ) -> Option<(ItemId, Option<DetachedItem>)> {
        match self.monsters.get_mut(&on) {
            Some(mon) => Some(mon.set_attachment(&mut self.items, slot, item)),
            None => {
                report!("monster_set_attachment: no such {on}");
                None
            }
        }
    }

    // ===== location queries, dispatched through the item's record =====

    /// Revalidates that `id` is really where its location record says.
    /// Detached items (no record) are trivially uncorrupted.
    pub fn check_item(&self, id: ItemId) -> bool {
        match self.items.location(id) {
            Some(location) => location.check_for_corruption(self, id),
            None => true,
        }
    }

    pub fn location_kind(&self, id: ItemId) -> LocationKind {
        match self.items.location(id) {
            Some(location) => location.kind(),
            None => LocationKind::Invalid,
        }
    }

    pub fn is_loaded(&self, id: ItemId) -> bool {
        match self.items.location(id) {
            Some(location) => location.is_loaded(self, id),
            None => false,
        }
    }

    pub fn position_of(&self, id: ItemId) -> Option<Position> {
        self.items.location(id)?.position(self, id)
    }

    pub fn obtain_cost(&self, actor: CharacterId, quantity: u32, id: ItemId) -> u32 {
        match self.items.location(id) {
            Some(location) => location.obtain_cost(self, actor, quantity, id),
            None => {
                report!("obtain_cost: {id} has no location");
                0
            }
        }
    }

    pub fn describe_location(&self, viewer: Option<CharacterId>, id: ItemId) -> String {
        match self.items.location(id) {
            Some(location) => location.describe(self, viewer, id),
            None => "nowhere".to_string(),
        }
    }

    /// Stamps the fake location on a freshly spawned item, marking it as
    /// deliberately outside any real storage.
    pub fn park_item(&mut self, item: DetachedItem) -> ItemId {
        let id = item.id();
        self.items.set_location(id, ItemLocation::Fake);
        id
    }
}
