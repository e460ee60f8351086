//! Item data model and ownership machinery.
//!
//! An [`Item`] is a mutable game object whose identity is its arena slot, not
//! its value. The [`arena`] owns every live item together with its current
//! location descriptor; [`handle`] provides the move-only handles that
//! transfer items between storages; [`contents`] is the nested-container
//! aggregate.

pub mod arena;
pub mod contents;
pub mod handle;

use std::collections::BTreeMap;
use std::fmt;

pub use arena::{ItemArena, ItemId};
pub use contents::{InsertError, ItemContents, LiquidSink};
pub use handle::{DetachedItem, LenientLocatedItem, LocatedItem, StrictLocatedItem};

/// Reference to an item definition stored outside the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemTypeId(pub u32);

impl fmt::Display for ItemTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

/// Tool-quality key (e.g. cutting, prying) looked up on items.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QualityId(pub String);

impl QualityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Material phase of an item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    #[default]
    Solid,
    Liquid,
    Gas,
}

bitflags::bitflags! {
    /// Boolean item properties consulted by the ownership core.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ItemFlags: u32 {
        /// Spent casing left in a firearm's contents after firing.
        const CASING = 1 << 0;
        /// Container is sealed; contents are not individually reachable.
        const SEALED = 1 << 1;
        /// Cannot be dropped once picked up (integrated tools).
        const NO_DROP = 1 << 2;
    }
}

/// A mutable game object tracked by the ownership core.
///
/// Items are identified by their arena slot ([`ItemId`]); two items are never
/// compared by value for ownership purposes. `stacks_with` is the type-level
/// compatibility check used by stacking displays; it deliberately ignores
/// charge counts, which are compared per-position by the container aggregate.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub kind: ItemTypeId,
    pub name: String,
    pub charges: u32,
    pub count_by_charges: bool,
    pub phase: Phase,
    /// Volume of one charge (or of the whole item when not charge-counted).
    pub volume_ml: u32,
    /// Weight of one charge (or of the whole item when not charge-counted).
    pub weight_g: u32,
    pub flags: ItemFlags,
    pub qualities: BTreeMap<QualityId, i32>,
    pub contents: ItemContents,
    /// Crafting components this item was assembled from.
    pub components: Vec<StrictLocatedItem>,
}

impl Item {
    pub fn new(kind: ItemTypeId, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            charges: 1,
            count_by_charges: false,
            phase: Phase::Solid,
            volume_ml: 250,
            weight_g: 100,
            flags: ItemFlags::empty(),
            qualities: BTreeMap::new(),
            contents: ItemContents::default(),
            components: Vec::new(),
        }
    }

    pub fn with_charges(mut self, charges: u32) -> Self {
        self.charges = charges;
        self.count_by_charges = true;
        self
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_volume(mut self, volume_ml: u32) -> Self {
        self.volume_ml = volume_ml;
        self
    }

    pub fn with_weight(mut self, weight_g: u32) -> Self {
        self.weight_g = weight_g;
        self
    }

    pub fn with_flags(mut self, flags: ItemFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_quality(mut self, quality: QualityId, level: i32) -> Self {
        self.qualities.insert(quality, level);
        self
    }

    pub fn is_liquid(&self) -> bool {
        self.phase == Phase::Liquid
    }

    /// Total volume, scaling with charges for charge-counted items.
    pub fn volume(&self) -> u32 {
        if self.count_by_charges {
            self.volume_ml.saturating_mul(self.charges)
        } else {
            self.volume_ml
        }
    }

    /// Total weight, scaling with charges for charge-counted items.
    pub fn weight(&self) -> u32 {
        if self.count_by_charges {
            self.weight_g.saturating_mul(self.charges)
        } else {
            self.weight_g
        }
    }

    /// Level of the given tool quality, if this item provides it.
    pub fn quality(&self, quality: &QualityId) -> Option<i32> {
        self.qualities.get(quality).copied()
    }

    /// Builds a contents-less copy of this item carrying `charges` charges,
    /// used as the representative stack when costing a partial withdrawal.
    ///
    /// Items are move-only because of the ownership handles nested in their
    /// contents, so this is the only copying operation they support.
    pub fn split_stack(&self, charges: u32) -> Item {
        Item {
            kind: self.kind,
            name: self.name.clone(),
            charges,
            count_by_charges: self.count_by_charges,
            phase: self.phase,
            volume_ml: self.volume_ml,
            weight_g: self.weight_g,
            flags: self.flags,
            qualities: self.qualities.clone(),
            contents: ItemContents::default(),
            components: Vec::new(),
        }
    }

    /// Type-level stacking compatibility; ignores charges and contents.
    ///
    /// Deep comparison including nested contents lives on
    /// [`ItemArena::items_stack_with`].
    pub fn stacks_with(&self, other: &Item) -> bool {
        self.kind == other.kind
            && self.name == other.name
            && self.phase == other.phase
            && self.count_by_charges == other.count_by_charges
            && self.flags == other.flags
    }
}
