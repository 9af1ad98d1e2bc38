//! Stat derivation pipeline.
//!
//! # Architecture
//!
//! ```text
//! [ Core Attributes (Layer 1) ]   base + allocated + growth + core equipment
//!      ↓
//! [ Derived Stats (Layer 2) ]     weight table × quality multiplier
//!      ↓
//! [ Equipment (Layer 3) ]         direct derived equipment bonuses
//!      ↓
//! [ Combat Power ]                display / sorting only
//! ```
//!
//! ## Principles
//!
//! 1. **SSOT**: base rolls, allocated points, level, quality, and the equipped
//!    item snapshot are the only inputs
//! 2. **Unidirectional Flow**: combat power never feeds back into layers 1-3
//! 3. **Deterministic**: pure functions with fixed four-decimal rounding

pub mod bonus;
pub mod core;
pub mod derived;
pub mod pipeline;
pub mod power;
pub mod quality;

pub use bonus::{Bonus, BonusStack, STAT_PRECISION, StatLayer, round_stat};
pub use self::core::{
    AllocatedPoints, AttributeSet, BaseAttributes, CoreAttribute, CoreBonuses, CoreEffective,
    CoreLayer, GrowthRates, unequipped_core,
};
pub use derived::{
    DERIVATION_TABLE, DerivationRule, DerivedAttribute, DerivedBonuses, DerivedStats,
    EquipmentLayer, EquippedStats,
};
pub use pipeline::{EquipmentBonuses, StatInputs, StatsOutcome, derive_stats};
pub use power::{COMBAT_POWER_WEIGHTS, combat_power};
pub use quality::QualityMultipliers;
