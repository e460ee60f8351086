/// Game configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Width of the active reality bubble, in tiles.
    pub bubble_width: u32,
    /// Height of the active reality bubble, in tiles.
    pub bubble_height: u32,
}

impl GameConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_INVENTORY_SLOTS: usize = 32;
    pub const MAX_WORN_SLOTS: usize = 16;

    // ===== item handling penalties, in moves =====
    /// Penalty for rummaging through a carried inventory.
    pub const INVENTORY_HANDLING_PENALTY: u32 = 100;
    /// Penalty for picking an item off the ground.
    pub const MAP_HANDLING_PENALTY: u32 = 80;
    /// Penalty for fishing an item out of vehicle cargo space.
    pub const VEHICLE_HANDLING_PENALTY: u32 = 80;
    /// Penalty for taking off a worn article.
    pub const WORN_HANDLING_PENALTY: u32 = Self::INVENTORY_HANDLING_PENALTY / 2;

    /// Cost of walking one tile; scales distance-based retrieval costs.
    pub const MOVES_PER_TILE: u32 = 100;
    /// Floor for any handling cost, however small the item.
    pub const MIN_HANDLING_MOVES: u32 = 25;
    /// Divisor converting item volume (ml) into handling moves.
    pub const HANDLING_VOLUME_DIVISOR: u32 = 10;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_BUBBLE_WIDTH: u32 = 132;
    pub const DEFAULT_BUBBLE_HEIGHT: u32 = 132;

    pub fn new() -> Self {
        Self {
            bubble_width: Self::DEFAULT_BUBBLE_WIDTH,
            bubble_height: Self::DEFAULT_BUBBLE_HEIGHT,
        }
    }

    pub fn with_bubble(bubble_width: u32, bubble_height: u32) -> Self {
        Self {
            bubble_width,
            bubble_height,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
