//! Creatures and their registry.
//!
//! A [`Creature`] stores only its persistent fields; its derived attributes are
//! a cache of the stat pipeline evaluated at the last mutation. The
//! [`CreatureRegistry`] owns every creature and is the only code that mutates
//! one, recomputing the cache whenever an input changes.
mod error;
mod progression;
mod registry;

pub use error::RegistryError;
pub use progression::LevelUpOutcome;
pub use registry::CreatureRegistry;

use crate::config::EngineConfig;
use crate::ids::{CreatureId, SkillId, TemplateId};
use crate::item::{Item, QualityTier};
use crate::stats::{
    AllocatedPoints, BaseAttributes, CoreEffective, DerivedStats, GrowthRates, QualityMultipliers,
    StatInputs, StatsOutcome, derive_stats,
};

/// Lifecycle of a creature: `Created → Active → Removed`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum CreatureStatus {
    /// Constructed, stats not yet computed.
    #[default]
    Created,
    /// Registered and mutable.
    Active,
    /// Removed from the registry. Terminal.
    Removed,
}

/// A leveled creature with core and derived attributes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Creature {
    id: CreatureId,
    template: TemplateId,
    status: CreatureStatus,
    level: u32,
    experience: u64,
    quality: QualityTier,
    base: BaseAttributes,
    allocated: AllocatedPoints,
    potential_points: u32,
    growth: GrowthRates,
    skills: Vec<SkillId>,
    /// Equipped item snapshot pushed by the equipment service.
    loadout: Vec<Item>,
    stats: StatsOutcome,
}

impl Creature {
    pub(crate) fn new(
        id: CreatureId,
        template: TemplateId,
        quality: QualityTier,
        base: BaseAttributes,
        growth: GrowthRates,
    ) -> Self {
        Self {
            id,
            template,
            status: CreatureStatus::Created,
            level: 1,
            experience: 0,
            quality,
            base,
            allocated: AllocatedPoints::default(),
            potential_points: 0,
            growth,
            skills: Vec::new(),
            loadout: Vec::new(),
            stats: StatsOutcome::default(),
        }
    }

    pub fn id(&self) -> CreatureId {
        self.id
    }

    pub fn template(&self) -> TemplateId {
        self.template
    }

    pub fn status(&self) -> CreatureStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == CreatureStatus::Active
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Experience accumulated toward the next level.
    pub fn experience(&self) -> u64 {
        self.experience
    }

    pub fn quality(&self) -> QualityTier {
        self.quality
    }

    pub fn base(&self) -> &BaseAttributes {
        &self.base
    }

    pub fn allocated(&self) -> &AllocatedPoints {
        &self.allocated
    }

    pub fn potential_points(&self) -> u32 {
        self.potential_points
    }

    pub fn growth(&self) -> &GrowthRates {
        &self.growth
    }

    pub fn skills(&self) -> &[SkillId] {
        &self.skills
    }

    pub fn loadout(&self) -> &[Item] {
        &self.loadout
    }

    /// Full pipeline output from the last recompute.
    pub fn stats(&self) -> &StatsOutcome {
        &self.stats
    }

    pub fn core(&self) -> &CoreEffective {
        &self.stats.core
    }

    pub fn derived(&self) -> &DerivedStats {
        &self.stats.derived
    }

    /// Portion of [`Self::derived`] owed to direct equipment bonuses.
    pub fn equipment_contribution(&self) -> &DerivedStats {
        &self.stats.equipment_contribution
    }

    pub fn combat_power(&self) -> u64 {
        self.stats.combat_power
    }

    /// Experience still missing for the next level, `None` at max level.
    pub fn experience_to_next(&self, config: &EngineConfig) -> Option<u64> {
        (self.level < config.max_level).then(|| {
            config
                .threshold_for_level(self.level + 1)
                .saturating_sub(self.experience)
        })
    }

    /// `allocated + potential == points earned by level`.
    pub fn points_balanced(&self, config: &EngineConfig) -> bool {
        u64::from(self.allocated.total()) + u64::from(self.potential_points)
            == u64::from(config.points_for_level(self.level))
    }

    /// Pipeline inputs as of now.
    pub fn stat_inputs(&self) -> StatInputs<'_> {
        StatInputs {
            base: &self.base,
            allocated: &self.allocated,
            growth: &self.growth,
            level: self.level,
            quality: self.quality,
            equipped: &self.loadout,
        }
    }

    pub(crate) fn recompute(&mut self, multipliers: &QualityMultipliers) {
        self.stats = derive_stats(&self.stat_inputs(), multipliers);
    }
}
