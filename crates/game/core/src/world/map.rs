//! The reality bubble: the bounded active region of the map.
//!
//! Tile storage is keyed by bubble-local coordinates; location records carry
//! absolute coordinates, so the map translates between the two frames. Items
//! outside the bubble are not resident and cannot be verified.

use std::collections::BTreeMap;

use crate::config::GameConfig;
use crate::error::{ErrorSeverity, GameError};
use crate::item::{DetachedItem, ItemArena, ItemId, StrictLocatedItem};
use crate::location::ItemLocation;
use crate::types::Position;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
}

impl MapDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The default reality-bubble footprint.
    pub const fn bubble() -> Self {
        Self::new(
            GameConfig::DEFAULT_BUBBLE_WIDTH,
            GameConfig::DEFAULT_BUBBLE_HEIGHT,
        )
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }
}

impl Default for MapDimensions {
    fn default() -> Self {
        Self::bubble()
    }
}

/// Canonical terrain classes for bubble tiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerrainKind {
    #[default]
    Floor,
    Wall,
    Pavement,
    Grass,
    Water,
}

impl TerrainKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Floor => "floor",
            Self::Wall => "wall",
            Self::Pavement => "pavement",
            Self::Grass => "grass",
            Self::Water => "water",
        }
    }
}

/// Errors from tile-storage operations.
///
/// Failed insertions hand the item back so ownership is never dropped on the
/// floor of an error path.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("position {position} is outside the reality bubble")]
    OutOfBounds {
        position: Position,
        item: DetachedItem,
    },
}

impl MapError {
    /// Recovers the item whose insertion failed.
    pub fn into_item(self) -> DetachedItem {
        match self {
            Self::OutOfBounds { item, .. } => item,
        }
    }
}

impl GameError for MapError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::OutOfBounds { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::OutOfBounds { .. } => "MAP_OUT_OF_BOUNDS",
        }
    }
}

/// Bounded active map region with per-tile item stacks.
#[derive(Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameMap {
    /// Absolute coordinate of local (0, 0).
    origin: Position,
    dimensions: MapDimensions,
    terrain: BTreeMap<Position, TerrainKind>,
    stacks: BTreeMap<Position, Vec<StrictLocatedItem>>,
}

impl GameMap {
    pub fn new(origin: Position, dimensions: MapDimensions) -> Self {
        Self {
            origin,
            dimensions,
            terrain: BTreeMap::new(),
            stacks: BTreeMap::new(),
        }
    }

    pub fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    /// Translates an absolute coordinate into the bubble-local frame.
    pub fn to_local(&self, absolute: Position) -> Position {
        Position::new(absolute.x - self.origin.x, absolute.y - self.origin.y)
    }

    /// Translates a bubble-local coordinate back to the absolute frame.
    pub fn to_global(&self, local: Position) -> Position {
        Position::new(local.x + self.origin.x, local.y + self.origin.y)
    }

    /// Whether a local coordinate is inside the bubble.
    pub fn inbounds(&self, local: Position) -> bool {
        self.dimensions.contains(local)
    }

    pub fn set_terrain(&mut self, local: Position, kind: TerrainKind) {
        self.terrain.insert(local, kind);
    }

    pub fn terrain(&self, local: Position) -> TerrainKind {
        self.terrain.get(&local).copied().unwrap_or_default()
    }

    pub fn tile_name(&self, local: Position) -> &'static str {
        self.terrain(local).name()
    }

    /// Registers an item on the tile at `local`, stamping its location.
    pub fn add_item(
        &mut self,
        items: &mut ItemArena,
        local: Position,
        item: DetachedItem,
    ) -> Result<ItemId, MapError> {
        if !self.inbounds(local) {
            return Err(MapError::OutOfBounds {
                position: local,
                item,
            });
        }
        let mut handle = StrictLocatedItem::with_location(ItemLocation::Tile {
            pos: self.to_global(local),
        });
        let id = handle.install(items, item);
        self.stacks.entry(local).or_default().push(handle);
        Ok(id)
    }

    /// Erases an item's registration from the tile at `local`.
    pub fn remove_item(
        &mut self,
        items: &mut ItemArena,
        local: Position,
        id: ItemId,
    ) -> Option<DetachedItem> {
        let stack = self.stacks.get_mut(&local)?;
        let index = stack.iter().position(|h| h.holds(id))?;
        let detached = stack.remove(index).take(items);
        if stack.is_empty() {
            self.stacks.remove(&local);
        }
        detached
    }

    pub fn items_at(&self, local: Position) -> impl Iterator<Item = ItemId> + '_ {
        self.stacks
            .get(&local)
            .into_iter()
            .flatten()
            .filter_map(|h| h.id())
    }

    pub fn has_item_at(&self, local: Position, id: ItemId) -> bool {
        self.stacks
            .get(&local)
            .is_some_and(|stack| stack.iter().any(|h| h.holds(id)))
    }

    /// Whole-bubble scan used by corruption diagnostics; returns the local
    /// coordinate of the tile actually holding `id`, if any does.
    pub fn find_item(&self, id: ItemId) -> Option<Position> {
        self.stacks
            .iter()
            .find(|(_, stack)| stack.iter().any(|h| h.holds(id)))
            .map(|(pos, _)| *pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Item, ItemTypeId};

    fn map() -> GameMap {
        GameMap::new(Position::new(100, 200), MapDimensions::new(10, 10))
    }

    #[test]
    fn coordinate_translation_round_trips() {
        let map = map();
        let absolute = Position::new(103, 207);
        let local = map.to_local(absolute);
        assert_eq!(local, Position::new(3, 7));
        assert_eq!(map.to_global(local), absolute);
    }

    #[test]
    fn bounds_checking() {
        let map = map();
        assert!(map.inbounds(Position::new(0, 0)));
        assert!(map.inbounds(Position::new(9, 9)));
        assert!(!map.inbounds(Position::new(10, 3)));
        assert!(!map.inbounds(Position::new(-1, 3)));
    }

    #[test]
    fn add_and_remove_items() {
        let mut map = map();
        let mut items = ItemArena::new();
        let local = Position::new(2, 2);

        let detached = items.spawn(Item::new(ItemTypeId(1), "rock"));
        let id = map.add_item(&mut items, local, detached).expect("inbounds");

        assert!(map.has_item_at(local, id));
        assert_eq!(
            items.location(id),
            Some(&ItemLocation::Tile {
                pos: Position::new(102, 202)
            })
        );

        let removed = map.remove_item(&mut items, local, id).expect("present");
        assert_eq!(removed.id(), id);
        assert!(!map.has_item_at(local, id));
        assert!(items.location(id).is_none());
    }

    #[test]
    fn out_of_bounds_add_returns_the_item() {
        let mut map = map();
        let mut items = ItemArena::new();

        let detached = items.spawn(Item::new(ItemTypeId(1), "rock"));
        let id = detached.id();
        let err = map
            .add_item(&mut items, Position::new(50, 50), detached)
            .expect_err("out of bounds");

        assert_eq!(err.into_item().id(), id);
        assert!(items.location(id).is_none());
    }
}
