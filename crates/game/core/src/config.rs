//! Engine configuration constants and tunable parameters.

use crate::error::{EngineError, ErrorSeverity};
use crate::stats::QualityMultipliers;

/// Experience needed per level: `base + step × (level − 2)` for level ≥ 2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExperienceCurve {
    pub base: u64,
    pub step: u64,
}

impl ExperienceCurve {
    pub const DEFAULT: Self = Self {
        base: 100,
        step: 50,
    };

    /// Experience required to advance from `level − 1` to `level`.
    pub fn threshold_for_level(&self, level: u32) -> u64 {
        if level <= 1 {
            0
        } else {
            self.base
                .saturating_add(self.step.saturating_mul(u64::from(level - 2)))
        }
    }

    /// Total experience required to go from `from` to `to`.
    pub fn total_between(&self, from: u32, to: u32) -> u64 {
        (from.saturating_add(1)..=to)
            .map(|level| self.threshold_for_level(level))
            .fold(0u64, u64::saturating_add)
    }
}

impl Default for ExperienceCurve {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Engine configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Highest level a creature can reach.
    pub max_level: u32,
    /// Potential points granted per level gained.
    pub points_per_level: u32,
    /// Maximum number of learned skills per creature.
    pub max_skills: usize,
    pub quality_multipliers: QualityMultipliers,
    pub experience: ExperienceCurve,
}

impl EngineConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_LEVEL: u32 = 100;
    pub const DEFAULT_POINTS_PER_LEVEL: u32 = 5;
    pub const DEFAULT_MAX_SKILLS: usize = 4;

    pub fn new() -> Self {
        Self {
            max_level: Self::DEFAULT_MAX_LEVEL,
            points_per_level: Self::DEFAULT_POINTS_PER_LEVEL,
            max_skills: Self::DEFAULT_MAX_SKILLS,
            quality_multipliers: QualityMultipliers::DEFAULT,
            experience: ExperienceCurve::DEFAULT,
        }
    }

    pub fn with_max_level(mut self, max_level: u32) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn with_points_per_level(mut self, points_per_level: u32) -> Self {
        self.points_per_level = points_per_level;
        self
    }

    pub fn with_max_skills(mut self, max_skills: usize) -> Self {
        self.max_skills = max_skills;
        self
    }

    /// Experience required to advance from `level − 1` to `level`.
    pub fn threshold_for_level(&self, level: u32) -> u64 {
        self.experience.threshold_for_level(level)
    }

    /// Potential points a creature at `level` has earned in total.
    pub fn points_for_level(&self, level: u32) -> u32 {
        level.saturating_sub(1).saturating_mul(self.points_per_level)
    }

    /// Checks the configuration for values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_level == 0 {
            return Err(ConfigError::InvalidMaxLevel(self.max_level));
        }
        if self.max_skills == 0 {
            return Err(ConfigError::InvalidMaxSkills);
        }
        if self.experience.base == 0 {
            return Err(ConfigError::ZeroExperienceThreshold);
        }
        if !self.quality_multipliers.is_strictly_increasing() {
            return Err(ConfigError::QualityMultipliersNotIncreasing(
                self.quality_multipliers.0,
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration rejected by [`EngineConfig::validate`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("max_level must be at least 1 (got {0})")]
    InvalidMaxLevel(u32),

    #[error("max_skills must be at least 1")]
    InvalidMaxSkills,

    #[error("experience curve base must be positive")]
    ZeroExperienceThreshold,

    #[error("quality multipliers must be positive and strictly increasing (got {0:?})")]
    QualityMultipliersNotIncreasing([f64; 5]),
}

impl EngineError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            ConfigError::InvalidMaxLevel(_) => "CONFIG_INVALID_MAX_LEVEL",
            ConfigError::InvalidMaxSkills => "CONFIG_INVALID_MAX_SKILLS",
            ConfigError::ZeroExperienceThreshold => "CONFIG_ZERO_EXPERIENCE_THRESHOLD",
            ConfigError::QualityMultipliersNotIncreasing(_) => {
                "CONFIG_QUALITY_MULTIPLIERS_NOT_INCREASING"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_grow_linearly() {
        let curve = ExperienceCurve::default();
        assert_eq!(curve.threshold_for_level(1), 0);
        assert_eq!(curve.threshold_for_level(2), 100);
        assert_eq!(curve.threshold_for_level(3), 150);
        assert_eq!(curve.total_between(5, 8), 300 + 350 + 400);
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let config = EngineConfig::default().with_max_level(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidMaxLevel(0)));

        let mut config = EngineConfig::default();
        config.quality_multipliers = QualityMultipliers([3.0, 2.5, 2.0, 1.5, 1.0]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::QualityMultipliersNotIncreasing(_))
        ));
    }

    #[test]
    fn points_scale_with_level() {
        let config = EngineConfig::default();
        assert_eq!(config.points_for_level(1), 0);
        assert_eq!(config.points_for_level(8), 35);
    }
}
