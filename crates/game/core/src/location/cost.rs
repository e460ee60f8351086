//! Retrieval cost of an item from each storage kind.
//!
//! Costs are simulated move units consumed by the game clock. Each kind has
//! a flat handling penalty; spatially remote storages (tiles, vehicles) add
//! walking distance. Partial requests from a charge stack are costed against
//! a representative split carrying just the requested charges, so grabbing
//! two rounds out of a crate is not priced like lifting the crate.

use crate::config::GameConfig;
use crate::diag::report;
use crate::item::{Item, ItemId};
use crate::location::ItemLocation;
use crate::types::CharacterId;
use crate::world::World;

/// Representative stack for costing a partial withdrawal.
fn split_for_cost(item: &Item, quantity: u32) -> Option<Item> {
    if !item.count_by_charges || quantity == 0 || quantity >= item.charges {
        return None;
    }
    Some(item.split_stack(quantity))
}

impl ItemLocation {
    /// Moves it costs `actor` to retrieve `quantity` units of `item` from
    /// this storage.
    pub fn obtain_cost(
        &self,
        world: &World,
        actor: CharacterId,
        quantity: u32,
        item: ItemId,
    ) -> u32 {
        let Some(ch) = world.characters.get(&actor) else {
            report!("obtain_cost for unknown {actor}");
            return 0;
        };
        let Some(whole) = world.items.get(item) else {
            report!("obtain_cost for stale {item}");
            return 0;
        };
        let split = split_for_cost(whole, quantity);
        let stack = split.as_ref().unwrap_or(whole);
        match self {
            Self::Fake | Self::Template => {
                report!("attempted to get the obtain cost of a template item {item}");
                0
            }
            Self::Character { .. } => {
                ch.item_handling_cost(stack, GameConfig::INVENTORY_HANDLING_PENALTY)
            }
            Self::Wielded { .. } => ch.item_handling_cost(stack, 0),
            Self::Worn { .. } => ch.item_handling_cost(stack, GameConfig::WORN_HANDLING_PENALTY),
            Self::Tile { pos } => {
                let mv = ch.item_handling_cost(stack, GameConfig::MAP_HANDLING_PENALTY);
                mv + GameConfig::MOVES_PER_TILE * ch.position.distance(*pos)
            }
            Self::Vehicle { vehicle } => {
                let mv = ch.item_handling_cost(stack, GameConfig::VEHICLE_HANDLING_PENALTY);
                let part_pos = world.vehicles.get(vehicle).and_then(|veh| {
                    let part = veh.find_part_with_item(item)?;
                    veh.mount_to_global(part)
                });
                match part_pos {
                    Some(pos) => mv + GameConfig::MOVES_PER_TILE * ch.position.distance(pos),
                    None => {
                        report!("obtain_cost: {item} not found in {vehicle}");
                        mv
                    }
                }
            }
            Self::VehicleBase { .. } => {
                report!("attempted to get the obtain cost of a vehicle base part {item}");
                0
            }
            Self::Contents { container } | Self::Component { container } => {
                let parent_cost = match world.items.location(*container) {
                    Some(loc) => loc.obtain_cost(world, actor, quantity, *container),
                    None => {
                        report!("obtain_cost: container {container} has no location");
                        0
                    }
                };
                GameConfig::INVENTORY_HANDLING_PENALTY + parent_cost
            }
            Self::MonsterInventory { .. }
            | Self::CorpseComponent { .. }
            | Self::MonsterAttachment { .. } => {
                report!("attempted to get the obtain cost of an item on a monster");
                0
            }
        }
    }
}
