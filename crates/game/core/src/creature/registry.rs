use std::collections::BTreeMap;
use std::str::FromStr;

use crate::config::{ConfigError, EngineConfig};
use crate::env::{CreatureOracle, RngOracle, TemplateOracle, compute_seed};
use crate::events::{EngineEvent, EventQueue, RecomputeCause};
use crate::ids::{CreatureId, SkillId, TemplateId};
use crate::item::{Item, QualityTier};
use crate::stats::{AttributeSet, BaseAttributes, CoreAttribute};

use super::error::RegistryError;
use super::progression::{LevelUpOutcome, advance};
use super::{Creature, CreatureStatus};

/// Owns every creature and keeps its derived-stat cache current.
///
/// Each mutation that changes a pipeline input recomputes the affected
/// creature exactly once and queues a [`EngineEvent::StatsRecomputed`].
#[derive(Clone, Debug)]
pub struct CreatureRegistry {
    config: EngineConfig,
    creatures: BTreeMap<CreatureId, Creature>,
    next_id: u32,
    events: EventQueue,
}

impl Default for CreatureRegistry {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            creatures: BTreeMap::new(),
            next_id: 1,
            events: EventQueue::new(),
        }
    }
}

impl CreatureRegistry {
    /// Creates an empty registry after validating `config`.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn get(&self, id: CreatureId) -> Option<&Creature> {
        self.creatures.get(&id)
    }

    pub fn contains(&self, id: CreatureId) -> bool {
        self.creatures.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.creatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty()
    }

    pub fn ids(&self) -> Vec<CreatureId> {
        self.creatures.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Creature> {
        self.creatures.values()
    }

    /// Creature ids by descending combat power; ties by ascending id.
    pub fn creatures_by_power(&self) -> Vec<CreatureId> {
        let mut ranked: Vec<&Creature> = self.creatures.values().collect();
        ranked.sort_by(|a, b| {
            b.combat_power()
                .cmp(&a.combat_power())
                .then(a.id().cmp(&b.id()))
        });
        ranked.into_iter().map(Creature::id).collect()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Registers a creature with explicit base rolls.
    ///
    /// The rolls must lie within the template's ranges. The creature starts at
    /// level 1 with nothing allocated, and its stats are computed once before
    /// it becomes active.
    pub fn create<T>(
        &mut self,
        templates: &T,
        template: TemplateId,
        quality: QualityTier,
        base: BaseAttributes,
    ) -> Result<CreatureId, RegistryError>
    where
        T: TemplateOracle + ?Sized,
    {
        let species = templates
            .template(template)
            .ok_or(RegistryError::TemplateNotFound(template))?;
        if let Some((attribute, value, range)) = species.out_of_range(&base) {
            return Err(RegistryError::BaseOutOfRange {
                template,
                attribute,
                value,
                min: range.min,
                max: range.max,
            });
        }

        let id = CreatureId(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or(RegistryError::IdOverflow)?;

        let mut creature = Creature::new(id, template, quality, base, species.growth);
        creature.recompute(&self.config.quality_multipliers);
        creature.status = CreatureStatus::Active;

        tracing::debug!(
            target: "summon::registry",
            creature = %id,
            template = %template,
            %quality,
            combat_power = creature.combat_power(),
            "creature created"
        );

        self.events.push(EngineEvent::StatsRecomputed {
            creature: id,
            combat_power: creature.combat_power(),
            cause: RecomputeCause::Created,
        });
        self.creatures.insert(id, creature);
        Ok(id)
    }

    /// Registers a creature with base rolls drawn from the template ranges.
    ///
    /// The same `world_seed` and creation order always produce the same rolls.
    pub fn spawn<T, R>(
        &mut self,
        templates: &T,
        template: TemplateId,
        quality: QualityTier,
        rng: &R,
        world_seed: u64,
    ) -> Result<CreatureId, RegistryError>
    where
        T: TemplateOracle + ?Sized,
        R: RngOracle + ?Sized,
    {
        let species = templates
            .template(template)
            .ok_or(RegistryError::TemplateNotFound(template))?;
        let sequence = u64::from(self.next_id);
        let mut context = 0u32;
        let base = AttributeSet::from_fn(|attr| {
            let range = species.base_ranges.get(attr);
            let seed = compute_seed(world_seed, sequence, context);
            context += 1;
            rng.range(seed, range.min, range.max)
        });
        self.create(templates, template, quality, base)
    }

    /// Removes a creature that no longer wears anything.
    ///
    /// Equipment must be released first; the equipment service does this in
    /// `remove_creature`.
    pub fn remove(&mut self, id: CreatureId) -> Result<Creature, RegistryError> {
        let creature = active(&self.creatures, id)?;
        if !creature.loadout.is_empty() {
            return Err(RegistryError::CreatureStillEquipped {
                creature: id,
                items: creature.loadout.len(),
            });
        }

        let mut creature = self
            .creatures
            .remove(&id)
            .ok_or(RegistryError::CreatureNotFound(id))?;
        creature.status = CreatureStatus::Removed;
        tracing::debug!(target: "summon::registry", creature = %id, "creature removed");
        Ok(creature)
    }

    // ========================================================================
    // Progression
    // ========================================================================

    /// Grants experience, crossing as many levels as it pays for.
    ///
    /// Stats are recomputed once after the last level, and only if a level was
    /// gained.
    pub fn level_up(&mut self, id: CreatureId, experience: u64) -> Result<LevelUpOutcome, RegistryError> {
        let creature = active_mut(&mut self.creatures, id)?;
        let outcome = advance(&self.config, creature.level, creature.experience, experience);

        creature.level = outcome.level;
        creature.experience = outcome.experience;
        creature.potential_points = creature
            .potential_points
            .saturating_add(outcome.points_granted);

        if outcome.levels_gained() > 0 {
            creature.recompute(&self.config.quality_multipliers);
            tracing::debug!(
                target: "summon::registry",
                creature = %id,
                from = outcome.previous_level,
                to = outcome.level,
                points = outcome.points_granted,
                "level up"
            );
            self.events.push(EngineEvent::StatsRecomputed {
                creature: id,
                combat_power: creature.combat_power(),
                cause: RecomputeCause::LevelUp,
            });
        }
        Ok(outcome)
    }

    /// Moves `amount` potential points into `attribute`.
    pub fn allocate_points(
        &mut self,
        id: CreatureId,
        attribute: CoreAttribute,
        amount: u32,
    ) -> Result<(), RegistryError> {
        let creature = active_mut(&mut self.creatures, id)?;
        if amount > creature.potential_points {
            return Err(RegistryError::InsufficientPotential {
                creature: id,
                requested: amount,
                available: creature.potential_points,
            });
        }
        if amount == 0 {
            return Ok(());
        }

        creature.potential_points -= amount;
        *creature.allocated.get_mut(attribute) += amount;
        creature.recompute(&self.config.quality_multipliers);

        tracing::debug!(target: "summon::registry", creature = %id, %attribute, amount, "points allocated");
        self.events.push(EngineEvent::StatsRecomputed {
            creature: id,
            combat_power: creature.combat_power(),
            cause: RecomputeCause::PointsAllocated,
        });
        Ok(())
    }

    /// [`Self::allocate_points`] with the attribute given by name
    /// (`"strength"`, `"luck"`, ...).
    pub fn allocate_points_by_name(
        &mut self,
        id: CreatureId,
        attribute: &str,
        amount: u32,
    ) -> Result<(), RegistryError> {
        let attribute = CoreAttribute::from_str(attribute)
            .map_err(|_| RegistryError::UnknownAttribute(attribute.to_owned()))?;
        self.allocate_points(id, attribute, amount)
    }

    /// Returns every allocated point to the potential pool.
    ///
    /// Returns the number of points moved.
    pub fn reset_allocated_points(&mut self, id: CreatureId) -> Result<u32, RegistryError> {
        let creature = active_mut(&mut self.creatures, id)?;
        let returned = creature.allocated.total();
        creature.potential_points = creature.potential_points.saturating_add(returned);
        creature.allocated = AttributeSet::default();
        creature.recompute(&self.config.quality_multipliers);

        tracing::debug!(target: "summon::registry", creature = %id, returned, "points reset");
        self.events.push(EngineEvent::StatsRecomputed {
            creature: id,
            combat_power: creature.combat_power(),
            cause: RecomputeCause::PointsReset,
        });
        Ok(returned)
    }

    // ========================================================================
    // Skills
    // ========================================================================

    /// Learns `skill`, appending it or overwriting `replace_index`.
    ///
    /// Returns the skill that was overwritten, if any.
    pub fn learn_skill(
        &mut self,
        id: CreatureId,
        skill: SkillId,
        replace_index: Option<usize>,
    ) -> Result<Option<SkillId>, RegistryError> {
        let max_skills = self.config.max_skills;
        let creature = active_mut(&mut self.creatures, id)?;
        if creature.skills.contains(&skill) {
            return Err(RegistryError::SkillAlreadyLearned {
                creature: id,
                skill,
            });
        }

        let replaced = match replace_index {
            Some(index) => {
                let learned = creature.skills.len();
                let slot = creature
                    .skills
                    .get_mut(index)
                    .ok_or(RegistryError::InvalidSkillSlot {
                        creature: id,
                        index,
                        learned,
                    })?;
                Some(std::mem::replace(slot, skill))
            }
            None if creature.skills.len() >= max_skills => {
                return Err(RegistryError::SkillSlotsFull {
                    creature: id,
                    max: max_skills,
                });
            }
            None => {
                creature.skills.push(skill);
                None
            }
        };

        tracing::debug!(target: "summon::registry", creature = %id, %skill, replaced = ?replaced, "skill learned");
        Ok(replaced)
    }

    /// Forgets `skill`, keeping the order of the rest. Returns its old index.
    pub fn forget_skill(&mut self, id: CreatureId, skill: SkillId) -> Result<usize, RegistryError> {
        let creature = active_mut(&mut self.creatures, id)?;
        let index = creature
            .skills
            .iter()
            .position(|learned| *learned == skill)
            .ok_or(RegistryError::SkillNotLearned {
                creature: id,
                skill,
            })?;
        creature.skills.remove(index);
        tracing::debug!(target: "summon::registry", creature = %id, %skill, "skill forgotten");
        Ok(index)
    }

    // ========================================================================
    // Equipment
    // ========================================================================

    /// Replaces the creature's equipped-item snapshot and recomputes.
    ///
    /// Called by the equipment service after every relation change touching
    /// this creature, so the cache never lags the relation index.
    pub fn apply_loadout(&mut self, id: CreatureId, mut items: Vec<Item>) -> Result<(), RegistryError> {
        let creature = active_mut(&mut self.creatures, id)?;
        items.retain(|item| {
            let keep = item.is_equipment();
            if !keep {
                tracing::warn!(target: "summon::registry", creature = %id, item = %item.id, "ignoring non-equipment in loadout");
            }
            keep
        });
        items.sort_by_key(|item| item.id);

        creature.loadout = items;
        creature.recompute(&self.config.quality_multipliers);

        tracing::debug!(
            target: "summon::registry",
            creature = %id,
            items = creature.loadout.len(),
            combat_power = creature.combat_power(),
            "loadout applied"
        );
        self.events.push(EngineEvent::StatsRecomputed {
            creature: id,
            combat_power: creature.combat_power(),
            cause: RecomputeCause::EquipmentChanged,
        });
        Ok(())
    }

    /// Takes every event queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain()
    }
}

impl CreatureOracle for CreatureRegistry {
    fn creature(&self, id: CreatureId) -> Option<&Creature> {
        self.creatures.get(&id).filter(|creature| creature.is_active())
    }
}

fn active(creatures: &BTreeMap<CreatureId, Creature>, id: CreatureId) -> Result<&Creature, RegistryError> {
    creatures
        .get(&id)
        .filter(|creature| creature.is_active())
        .ok_or(RegistryError::CreatureNotFound(id))
}

fn active_mut(
    creatures: &mut BTreeMap<CreatureId, Creature>,
    id: CreatureId,
) -> Result<&mut Creature, RegistryError> {
    creatures
        .get_mut(&id)
        .filter(|creature| creature.is_active())
        .ok_or(RegistryError::CreatureNotFound(id))
}
