//! Item model as seen by the engine.
//!
//! Items are owned by the external item store. The engine only reads their
//! slot type and stat effects; quantity, stacking, and grid placement are the
//! store's business.

use core::fmt;
use core::str::FromStr;

use crate::ids::ItemId;
use crate::stats::{CoreAttribute, DerivedAttribute};

/// Equipment slot an item occupies on a creature.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SlotType {
    Weapon,
    Armor,
    Accessory,
    Relic,
    Bloodline,
    Rune,
}

impl SlotType {
    pub const ALL: [Self; 6] = [
        Self::Weapon,
        Self::Armor,
        Self::Accessory,
        Self::Relic,
        Self::Bloodline,
        Self::Rune,
    ];
}

/// Discrete rarity rank. Shared by creatures and items.
///
/// Tiers are ordered; the creature tier indexes into the quality multiplier
/// table (see [`crate::stats::QualityMultipliers`]).
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum QualityTier {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl QualityTier {
    pub const ALL: [Self; 5] = [
        Self::Common,
        Self::Uncommon,
        Self::Rare,
        Self::Epic,
        Self::Legendary,
    ];

    /// Zero-based rank of this tier.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// The attribute an item effect modifies.
///
/// Effects on a core attribute feed step 1 of the stat pipeline; effects on a
/// derived attribute are applied after quality scaling.
///
/// Serialized as the bare stat name (`"strength"`, `"physical_attack"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "String", try_from = "String"))]
pub enum StatKey {
    Core(CoreAttribute),
    Derived(DerivedAttribute),
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatKey::Core(attr) => write!(f, "{attr}"),
            StatKey::Derived(attr) => write!(f, "{attr}"),
        }
    }
}

impl FromStr for StatKey {
    type Err = strum::ParseError;

    /// Parses a bare stat name such as `"strength"` or `"physical_attack"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CoreAttribute::from_str(s)
            .map(StatKey::Core)
            .or_else(|_| DerivedAttribute::from_str(s).map(StatKey::Derived))
    }
}

impl From<StatKey> for String {
    fn from(key: StatKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for StatKey {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// How an effect value is applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BonusKind {
    /// Added as-is after rounding to the nearest integer.
    #[default]
    Flat,
    /// Percentage of the value the bonus applies to (20.0 = +20%).
    Percent,
}

/// A single stat modification carried by an item.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemEffect {
    pub stat: StatKey,
    #[cfg_attr(feature = "serde", serde(default))]
    pub kind: BonusKind,
    pub value: f64,
}

impl ItemEffect {
    pub fn flat(stat: StatKey, value: f64) -> Self {
        Self {
            stat,
            kind: BonusKind::Flat,
            value,
        }
    }

    pub fn percent(stat: StatKey, value: f64) -> Self {
        Self {
            stat,
            kind: BonusKind::Percent,
            value,
        }
    }
}

/// Item record read from the item store.
///
/// `slot` is `None` for anything that cannot be equipped (materials,
/// consumables). Such items never appear in the relation index.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub slot: Option<SlotType>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub quality: QualityTier,
    #[cfg_attr(feature = "serde", serde(default = "default_item_level"))]
    pub level: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<ItemEffect>,
}

#[cfg(feature = "serde")]
fn default_item_level() -> u32 {
    1
}

impl Item {
    /// Creates an equippable item with no effects.
    pub fn equipment(id: ItemId, name: impl Into<String>, slot: SlotType) -> Self {
        Self {
            id,
            name: name.into(),
            slot: Some(slot),
            quality: QualityTier::Common,
            level: 1,
            effects: Vec::new(),
        }
    }

    /// Creates a non-equippable item.
    pub fn material(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            slot: None,
            quality: QualityTier::Common,
            level: 1,
            effects: Vec::new(),
        }
    }

    /// Adds an effect (builder pattern).
    pub fn with_effect(mut self, effect: ItemEffect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Sets the quality tier (builder pattern).
    pub fn with_quality(mut self, quality: QualityTier) -> Self {
        self.quality = quality;
        self
    }

    /// Sets the item level (builder pattern).
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn is_equipment(&self) -> bool {
        self.slot.is_some()
    }
}
