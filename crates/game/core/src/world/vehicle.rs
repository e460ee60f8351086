//! Vehicles: parts with mount offsets, per-part cargo stacks, and the base
//! items the parts are built from.
//!
//! Removing a part leaves it in the list flagged as removed so outstanding
//! location records stay resolvable; the corruption check treats items in a
//! removed part as corrupted.

use crate::error::{ErrorSeverity, GameError};
use crate::item::{DetachedItem, ItemArena, ItemId, LenientLocatedItem, StrictLocatedItem};
use crate::location::ItemLocation;
use crate::types::{Position, VehicleId};

/// Errors from vehicle storage operations.
///
/// Failed insertions carry the rejected item; recover it with
/// [`VehicleError::into_item`].
#[derive(Debug, thiserror::Error)]
pub enum VehicleError {
    #[error("vehicle has no part {part}")]
    NoSuchPart { part: usize, item: DetachedItem },

    #[error("part {part} has no cargo space")]
    NotCargoPart { part: usize, item: DetachedItem },

    #[error("no such vehicle: {vehicle}")]
    NotFound {
        vehicle: VehicleId,
        item: DetachedItem,
    },
}

impl VehicleError {
    /// Recovers the item whose insertion failed.
    pub fn into_item(self) -> DetachedItem {
        match self {
            Self::NoSuchPart { item, .. }
            | Self::NotCargoPart { item, .. }
            | Self::NotFound { item, .. } => item,
        }
    }
}

impl GameError for VehicleError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NoSuchPart { .. } | Self::NotFound { .. } => ErrorSeverity::Validation,
            Self::NotCargoPart { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoSuchPart { .. } => "VEHICLE_NO_SUCH_PART",
            Self::NotCargoPart { .. } => "VEHICLE_NOT_CARGO_PART",
            Self::NotFound { .. } => "VEHICLE_NOT_FOUND",
        }
    }
}

/// One installed part of a vehicle.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehiclePart {
    name: String,
    label: Option<String>,
    /// Offset from the vehicle origin, in tiles.
    mount: Position,
    carries_cargo: bool,
    removed: bool,
    cargo: Vec<StrictLocatedItem>,
    base: LenientLocatedItem,
}

impl VehiclePart {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    pub fn mount(&self) -> Position {
        self.mount
    }

    pub fn carries_cargo(&self) -> bool {
        self.carries_cargo
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn base(&self) -> &LenientLocatedItem {
        &self.base
    }

    pub fn cargo_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.cargo.iter().filter_map(|h| h.id())
    }
}

/// A vehicle anchored at an absolute position.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vehicle {
    pub id: VehicleId,
    pub name: String,
    /// Absolute coordinate of the vehicle origin; mounts offset from here.
    pub position: Position,
    parts: Vec<VehiclePart>,
}

impl Vehicle {
    pub fn new(id: VehicleId, name: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            parts: Vec::new(),
        }
    }

    /// Installs a part, returning its index.
    pub fn add_part(
        &mut self,
        name: impl Into<String>,
        mount: Position,
        carries_cargo: bool,
    ) -> usize {
        let mut base = LenientLocatedItem::empty();
        base.set_location(ItemLocation::VehicleBase { vehicle: self.id });
        self.parts.push(VehiclePart {
            name: name.into(),
            label: None,
            mount,
            carries_cargo,
            removed: false,
            cargo: Vec::new(),
            base,
        });
        self.parts.len() - 1
    }

    /// Flags a part as removed; outstanding item registrations in it become
    /// corrupt rather than dangling.
    pub fn remove_part(&mut self, part: usize) {
        if let Some(p) = self.parts.get_mut(part) {
            p.removed = true;
        }
    }

    pub fn part(&self, part: usize) -> Option<&VehiclePart> {
        self.parts.get(part)
    }

    pub fn part_mut(&mut self, part: usize) -> Option<&mut VehiclePart> {
        self.parts.get_mut(part)
    }

    pub fn parts(&self) -> impl Iterator<Item = &VehiclePart> {
        self.parts.iter()
    }

    /// True if `part` exists and has not been removed.
    pub fn valid_part(&self, part: usize) -> bool {
        self.parts.get(part).is_some_and(|p| !p.removed)
    }

    /// Absolute position of a part.
    pub fn mount_to_global(&self, part: usize) -> Option<Position> {
        let p = self.parts.get(part)?;
        Some(self.position.offset(p.mount.x, p.mount.y))
    }

    /// Index of the part whose cargo holds `id`.
    pub fn find_part_with_item(&self, id: ItemId) -> Option<usize> {
        self.parts
            .iter()
            .position(|p| p.cargo.iter().any(|h| h.holds(id)))
    }

    /// Index of the part whose base item is `id`.
    pub fn find_part_with_base(&self, id: ItemId) -> Option<usize> {
        self.parts.iter().position(|p| p.base.holds(id))
    }

    /// Registers an item in a part's cargo space.
    pub fn add_cargo(
        &mut self,
        items: &mut ItemArena,
        part: usize,
        item: DetachedItem,
    ) -> Result<ItemId, VehicleError> {
        let vehicle = self.id;
        match self.parts.get_mut(part) {
            None => Err(VehicleError::NoSuchPart { part, item }),
            Some(p) if p.removed => Err(VehicleError::NoSuchPart { part, item }),
            Some(p) if !p.carries_cargo => Err(VehicleError::NotCargoPart { part, item }),
            Some(p) => {
                let mut handle = StrictLocatedItem::with_location(ItemLocation::Vehicle { vehicle });
                let id = handle.install(items, item);
                p.cargo.push(handle);
                Ok(id)
            }
        }
    }

    /// Erases an item's registration from whichever cargo space holds it.
    pub fn remove_cargo(&mut self, items: &mut ItemArena, id: ItemId) -> Option<DetachedItem> {
        let part = self.find_part_with_item(id)?;
        let p = self.parts.get_mut(part)?;
        let index = p.cargo.iter().position(|h| h.holds(id))?;
        p.cargo.remove(index).take(items)
    }

    /// Installs a part's base item, handing back the previous one.
    pub fn set_base(
        &mut self,
        items: &mut ItemArena,
        part: usize,
        item: DetachedItem,
    ) -> Result<(ItemId, Option<DetachedItem>), VehicleError> {
        match self.parts.get_mut(part) {
            None => Err(VehicleError::NoSuchPart { part, item }),
            Some(p) => {
                let previous = p.base.release(items);
                let id = p.base.install(items, item);
                Ok((id, previous))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Item, ItemTypeId};

    fn vehicle() -> Vehicle {
        Vehicle::new(VehicleId(1), "deathmobile", Position::new(20, 20))
    }

    #[test]
    fn cargo_round_trip() {
        let mut items = ItemArena::new();
        let mut veh = vehicle();
        let trunk = veh.add_part("trunk", Position::new(0, 1), true);

        let detached = items.spawn(Item::new(ItemTypeId(1), "jack"));
        let id = veh.add_cargo(&mut items, trunk, detached).expect("cargo");

        assert_eq!(veh.find_part_with_item(id), Some(trunk));
        assert_eq!(
            items.location(id),
            Some(&ItemLocation::Vehicle {
                vehicle: VehicleId(1)
            })
        );

        let removed = veh.remove_cargo(&mut items, id).expect("present");
        assert_eq!(removed.id(), id);
        assert_eq!(veh.find_part_with_item(id), None);
    }

    #[test]
    fn non_cargo_part_rejects_items() {
        let mut items = ItemArena::new();
        let mut veh = vehicle();
        let frame = veh.add_part("frame", Position::ORIGIN, false);

        let detached = items.spawn(Item::new(ItemTypeId(1), "jack"));
        let err = veh
            .add_cargo(&mut items, frame, detached)
            .expect_err("no cargo space");
        assert_eq!(err.error_code(), "VEHICLE_NOT_CARGO_PART");
    }

    #[test]
    fn base_item_is_tracked_per_part() {
        let mut items = ItemArena::new();
        let mut veh = vehicle();
        let frame = veh.add_part("frame", Position::ORIGIN, false);

        let detached = items.spawn(Item::new(ItemTypeId(9), "steel frame"));
        let (id, previous) = veh.set_base(&mut items, frame, detached).expect("part");

        assert!(previous.is_none());
        assert_eq!(veh.find_part_with_base(id), Some(frame));
        assert_eq!(
            items.location(id),
            Some(&ItemLocation::VehicleBase {
                vehicle: VehicleId(1)
            })
        );
    }

    #[test]
    fn mounts_translate_to_world_coordinates() {
        let mut veh = vehicle();
        let trunk = veh.add_part("trunk", Position::new(-1, 2), true);
        assert_eq!(veh.mount_to_global(trunk), Some(Position::new(19, 22)));
    }
}
