//! Experience and level progression.

use crate::config::EngineConfig;

/// Result of granting experience.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelUpOutcome {
    pub previous_level: u32,
    pub level: u32,
    /// Potential points granted by this call.
    pub points_granted: u32,
    /// Experience carried toward the next level.
    pub experience: u64,
}

impl LevelUpOutcome {
    pub fn levels_gained(&self) -> u32 {
        self.level - self.previous_level
    }
}

/// Applies `gained` experience to `(level, experience)`.
///
/// Every level crossed grants `points_per_level`. Reaching `max_level`
/// discards the remainder, so a capped creature always holds zero experience.
pub(crate) fn advance(
    config: &EngineConfig,
    level: u32,
    experience: u64,
    gained: u64,
) -> LevelUpOutcome {
    let previous_level = level;
    let mut level = level;
    let mut experience = experience.saturating_add(gained);
    let mut points_granted = 0u32;

    while level < config.max_level {
        let threshold = config.threshold_for_level(level + 1);
        if experience < threshold {
            break;
        }
        experience -= threshold;
        level += 1;
        points_granted = points_granted.saturating_add(config.points_per_level);
    }

    if level >= config.max_level {
        experience = 0;
    }

    LevelUpOutcome {
        previous_level,
        level,
        points_granted,
        experience,
    }
}
