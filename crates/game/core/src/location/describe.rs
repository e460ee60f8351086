//! Human-readable "where is this" descriptions.
//!
//! Framing depends on the viewer: the holder sees first-person slot names
//! ("inventory", "worn", "wield"), everyone else sees the owner's name.
//! Spatial storages append an 8-way compass direction from the viewer.

use crate::item::ItemId;
use crate::location::ItemLocation;
use crate::types::{CharacterId, Position};
use crate::world::World;

/// Compass suffix for the step from `from` towards `to`; empty when equal.
pub fn direction_suffix(from: Position, to: Position) -> &'static str {
    match ((to.x - from.x).signum(), (to.y - from.y).signum()) {
        (0, 0) => "",
        (0, -1) => "north",
        (1, -1) => "north-east",
        (1, 0) => "east",
        (1, 1) => "south-east",
        (0, 1) => "south",
        (-1, 1) => "south-west",
        (-1, 0) => "west",
        (-1, -1) => "north-west",
        _ => "",
    }
}

impl ItemLocation {
    /// Describes this storage from `viewer`'s point of view.
    pub fn describe(&self, world: &World, viewer: Option<CharacterId>, item: ItemId) -> String {
        match self {
            Self::Fake | Self::Template => "Error: Nowhere".to_string(),
            Self::Character { holder } => holder_framing(world, viewer, *holder, "inventory"),
            Self::Worn { holder } => holder_framing(world, viewer, *holder, "worn"),
            Self::Wielded { holder } => holder_framing(world, viewer, *holder, "wield"),
            Self::Tile { pos } => {
                let local = world.map.to_local(*pos);
                let mut res = world.map.tile_name(local).to_string();
                if let Some(pos_of_viewer) = viewer
                    .and_then(|id| world.characters.get(&id))
                    .map(|ch| ch.position)
                {
                    let suffix = direction_suffix(pos_of_viewer, *pos);
                    if !suffix.is_empty() {
                        res.push(' ');
                        res.push_str(suffix);
                    }
                }
                res
            }
            Self::Vehicle { vehicle } => {
                let Some(veh) = world.vehicles.get(vehicle) else {
                    return "Error: Nowhere".to_string();
                };
                let Some(index) = veh.find_part_with_item(item) else {
                    return "Error: Nowhere".to_string();
                };
                let Some(part) = veh.part(index) else {
                    return "Error: Nowhere".to_string();
                };
                if !part.carries_cargo() {
                    return "Error: vehicle part without storage".to_string();
                }
                let mut res = String::new();
                if let Some(label) = part.label() {
                    res.push_str(label);
                    res.push(' ');
                }
                res.push_str(part.name());
                if let Some(pos_of_viewer) = viewer
                    .and_then(|id| world.characters.get(&id))
                    .map(|ch| ch.position)
                {
                    if let Some(part_pos) = veh.mount_to_global(index) {
                        let suffix = direction_suffix(pos_of_viewer, part_pos);
                        if !suffix.is_empty() {
                            res.push(' ');
                            res.push_str(suffix);
                        }
                    }
                }
                res
            }
            Self::VehicleBase { .. } => "Error: Vehicle base part".to_string(),
            Self::Contents { container } | Self::Component { container } => {
                match world.items.get(*container) {
                    Some(parent) => format!("inside {}", parent.name),
                    None => "Error: Nowhere".to_string(),
                }
            }
            Self::MonsterInventory { .. }
            | Self::CorpseComponent { .. }
            | Self::MonsterAttachment { .. } => "on monster".to_string(),
        }
    }
}

fn holder_framing(
    world: &World,
    viewer: Option<CharacterId>,
    holder: CharacterId,
    first_person: &str,
) -> String {
    let Some(ch) = world.characters.get(&holder) else {
        return "Error: Nowhere".to_string();
    };
    if viewer == Some(holder) {
        first_person.to_string()
    } else {
        ch.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compass_directions() {
        let origin = Position::ORIGIN;
        assert_eq!(direction_suffix(origin, origin), "");
        assert_eq!(direction_suffix(origin, Position::new(0, -5)), "north");
        assert_eq!(direction_suffix(origin, Position::new(3, 3)), "south-east");
        assert_eq!(direction_suffix(origin, Position::new(-2, 0)), "west");
        assert_eq!(direction_suffix(origin, Position::new(-1, -9)), "north-west");
    }
}
