//! Status-effect data model: load-time effect-type metadata plus small
//! per-instance values.
//!
//! Effect types are registered once at startup and outlive every instance;
//! instances reference their type by id and are looked up through the
//! registry when decayed or clamped. None of the game-rule formulas (morale,
//! addiction, damage) live here.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ErrorSeverity, GameError};
use crate::types::Tick;

/// Identifier of an effect type, unique within a registry.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectTypeId(pub String);

impl EffectTypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for EffectTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether an effect is good or bad for the one who has it; drives message
/// coloring in the consumers of this model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectRating {
    Good,
    #[default]
    Neutral,
    Bad,
    Mixed,
}

bitflags::bitflags! {
    /// Boolean effect-type properties.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct EffectFlags: u32 {
        /// Only targets body parts that have hit points.
        const MAIN_PARTS_ONLY = 1 << 0;
        /// Shown in the character description screen.
        const SHOW_IN_INFO = 1 << 1;
        /// Coughing fits caused by this effect deal damage.
        const HARMFUL_COUGH = 1 << 2;
        /// Handled by creature movement code.
        const IMPAIRS_MOVEMENT = 1 << 3;
    }
}

/// Body parts an effect can target.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BodyPart {
    Head,
    Torso,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

/// Load-time-immutable metadata shared by all instances of one effect.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectType {
    pub id: EffectTypeId,
    pub name: String,
    pub rating: EffectRating,
    /// Intensities clamp into `1..=max_intensity`.
    pub max_intensity: u32,
    /// Durations cap here; zero means uncapped.
    pub max_duration: Tick,
    /// Turns per point of intensity when intensity follows duration; zero
    /// disables duration-driven intensity.
    pub int_dur_factor: Tick,
    /// Permanent effects never decay.
    pub permanent: bool,
    pub flags: EffectFlags,
}

impl EffectType {
    pub fn new(id: EffectTypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            rating: EffectRating::Neutral,
            max_intensity: 1,
            max_duration: Tick::ZERO,
            int_dur_factor: Tick::ZERO,
            permanent: false,
            flags: EffectFlags::empty(),
        }
    }

    pub fn with_rating(mut self, rating: EffectRating) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_max_intensity(mut self, max_intensity: u32) -> Self {
        self.max_intensity = max_intensity.max(1);
        self
    }

    pub fn with_max_duration(mut self, max_duration: Tick) -> Self {
        self.max_duration = max_duration;
        self
    }

    pub fn with_int_dur_factor(mut self, int_dur_factor: Tick) -> Self {
        self.int_dur_factor = int_dur_factor;
        self
    }

    pub fn permanent(mut self) -> Self {
        self.permanent = true;
        self
    }

    pub fn with_flags(mut self, flags: EffectFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn is_permanent(&self) -> bool {
        self.permanent
    }

    pub fn has_flag(&self, flag: EffectFlags) -> bool {
        self.flags.contains(flag)
    }
}

/// Errors from effect-type registration and lookup.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EffectError {
    #[error("effect type {id} is already registered")]
    DuplicateType { id: EffectTypeId },

    #[error("unknown effect type {id}")]
    UnknownType { id: EffectTypeId },
}

impl GameError for EffectError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::DuplicateType { .. } | Self::UnknownType { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateType { .. } => "EFFECT_DUPLICATE_TYPE",
            Self::UnknownType { .. } => "EFFECT_UNKNOWN_TYPE",
        }
    }
}

/// Registry of every effect type, populated at load time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectRegistry {
    types: BTreeMap<EffectTypeId, EffectType>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, effect_type: EffectType) -> Result<(), EffectError> {
        if self.types.contains_key(&effect_type.id) {
            return Err(EffectError::DuplicateType {
                id: effect_type.id.clone(),
            });
        }
        self.types.insert(effect_type.id.clone(), effect_type);
        Ok(())
    }

    pub fn get(&self, id: &EffectTypeId) -> Option<&EffectType> {
        self.types.get(id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &EffectTypeId> {
        self.types.keys()
    }
}

/// One active effect on a creature.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Effect {
    kind: EffectTypeId,
    duration: Tick,
    intensity: u32,
    body_part: Option<BodyPart>,
    start_time: Tick,
    removed: bool,
}

impl Effect {
    pub fn new(
        effect_type: &EffectType,
        duration: Tick,
        body_part: Option<BodyPart>,
        start_time: Tick,
    ) -> Self {
        let mut effect = Self {
            kind: effect_type.id.clone(),
            duration: Tick::ZERO,
            intensity: 1,
            body_part,
            start_time,
            removed: false,
        };
        effect.set_duration(effect_type, duration);
        effect
    }

    pub fn kind(&self) -> &EffectTypeId {
        &self.kind
    }

    pub fn duration(&self) -> Tick {
        self.duration
    }

    pub fn intensity(&self) -> u32 {
        self.intensity
    }

    pub fn body_part(&self) -> Option<BodyPart> {
        self.body_part
    }

    pub fn start_time(&self) -> Tick {
        self.start_time
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn set_removed(&mut self) {
        self.removed = true;
    }

    /// Sets the duration, capping at the type's maximum when one is set.
    pub fn set_duration(&mut self, effect_type: &EffectType, duration: Tick) {
        self.duration = if effect_type.max_duration > Tick::ZERO {
            duration.min(effect_type.max_duration)
        } else {
            duration
        };
    }

    /// Adds to the duration, capping at the type's maximum.
    pub fn mod_duration(&mut self, effect_type: &EffectType, delta: i64) {
        let current = self.duration.0 as i64;
        let next = current.saturating_add(delta).max(0) as u64;
        self.set_duration(effect_type, Tick(next));
    }

    /// Sets intensity, clamped into `1..=max_intensity`; returns the new value.
    pub fn set_intensity(&mut self, effect_type: &EffectType, intensity: u32) -> u32 {
        self.intensity = intensity.clamp(1, effect_type.max_intensity.max(1));
        self.intensity
    }

    /// Adjusts intensity by `delta`, clamped; returns the new value.
    pub fn mod_intensity(&mut self, effect_type: &EffectType, delta: i32) -> u32 {
        let next = (self.intensity as i64 + delta as i64).max(1) as u32;
        self.set_intensity(effect_type, next)
    }

    /// Ages the effect by one tick, returning true once it has run out.
    ///
    /// Permanent effects never decay. When the type ties intensity to
    /// duration, intensity follows the remaining duration down.
    pub fn decay(&mut self, effect_type: &EffectType) -> bool {
        if effect_type.permanent {
            return false;
        }
        self.duration = self.duration.saturating_sub(1);
        if effect_type.int_dur_factor > Tick::ZERO {
            let steps = (self.duration.0 / effect_type.int_dur_factor.0) + 1;
            self.set_intensity(effect_type, steps as u32);
        }
        self.duration == Tick::ZERO
    }
}

/// Active effects keyed by type and targeted body part.
pub type EffectsMap = BTreeMap<(EffectTypeId, Option<BodyPart>), Effect>;
