//! Equipment relations and creature stat derivation.
//!
//! `summon-core` keeps a consistent two-way association between equippable
//! items and the creatures wearing them, and derives each creature's combat
//! statistics from its base rolls, level, allocated points, quality tier, and
//! equipped items. Everything here is synchronous and free of I/O; all
//! mutation flows through [`EquipmentService`], and hosts own persistence and
//! scheduling.
pub mod config;
pub mod creature;
pub mod env;
pub mod error;
pub mod events;
pub mod ids;
pub mod item;
pub mod relation;
pub mod service;
pub mod stats;

pub use config::{ConfigError, EngineConfig, ExperienceCurve};
pub use creature::{Creature, CreatureRegistry, CreatureStatus, LevelUpOutcome, RegistryError};
pub use env::{
    AttributeRange, CreatureOracle, CreatureTemplate, ItemOracle, ItemStorage, PcgRng, RngOracle,
    TemplateOracle, compute_seed,
};
pub use error::{EngineError, ErrorSeverity};
pub use events::{EngineEvent, EngineObserver, EventQueue, RecomputeCause};
pub use ids::{CreatureId, ItemId, SkillId, TemplateId, Tick};
pub use item::{BonusKind, Item, ItemEffect, QualityTier, SlotType, StatKey};
pub use relation::{
    ConsistencyIssue, ConsistencyReport, EquipError, EquipOutcome, LoadoutEntry, Relation,
    RelationIndex, RelationSnapshot, RepairAction, RepairReport, SwapOutcome,
};
pub use service::{DropReason, EquipmentService, ImportReport, RemovedCreature};
pub use stats::{
    AllocatedPoints, AttributeSet, BaseAttributes, CoreAttribute, CoreEffective, DerivedAttribute,
    DerivedStats, GrowthRates, QualityMultipliers, StatInputs, StatsOutcome, derive_stats,
};
