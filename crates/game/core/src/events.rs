//! Engine events and the observer interface.
//!
//! Components queue events while they mutate; the [`crate::EquipmentService`]
//! drains the queues once a command has finished and hands every event to the
//! registered observers synchronously, in emission order. Ordering holds per
//! creature and per item; nothing is promised across unrelated creatures.

use crate::ids::{CreatureId, ItemId};
use crate::item::SlotType;
use crate::relation::{ConsistencyReport, RepairReport};

/// Why a creature's derived stats were recomputed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecomputeCause {
    Created,
    LevelUp,
    PointsAllocated,
    PointsReset,
    EquipmentChanged,
}

/// Everything the engine announces to subscribers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EngineEvent {
    ItemEquipped {
        item: ItemId,
        creature: CreatureId,
        slot: SlotType,
    },
    ItemUnequipped {
        item: ItemId,
        creature: CreatureId,
        slot: SlotType,
    },
    ConsistencyValidated {
        report: ConsistencyReport,
    },
    ConsistencyRepaired {
        report: RepairReport,
    },
    StatsRecomputed {
        creature: CreatureId,
        combat_power: u64,
        cause: RecomputeCause,
    },
}

impl EngineEvent {
    /// The creature this event concerns, if it concerns exactly one.
    pub fn creature(&self) -> Option<CreatureId> {
        match self {
            EngineEvent::ItemEquipped { creature, .. }
            | EngineEvent::ItemUnequipped { creature, .. }
            | EngineEvent::StatsRecomputed { creature, .. } => Some(*creature),
            EngineEvent::ConsistencyValidated { .. } | EngineEvent::ConsistencyRepaired { .. } => {
                None
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineEvent::ItemEquipped { .. } => "item_equipped",
            EngineEvent::ItemUnequipped { .. } => "item_unequipped",
            EngineEvent::ConsistencyValidated { .. } => "consistency_validated",
            EngineEvent::ConsistencyRepaired { .. } => "consistency_repaired",
            EngineEvent::StatsRecomputed { .. } => "stats_recomputed",
        }
    }
}

/// Receives engine events synchronously.
pub trait EngineObserver {
    fn notify(&mut self, event: &EngineEvent);
}

impl<F> EngineObserver for F
where
    F: FnMut(&EngineEvent),
{
    fn notify(&mut self, event: &EngineEvent) {
        self(event)
    }
}

/// Events emitted by a component but not yet delivered.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    pending: Vec<EngineEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: EngineEvent) {
        self.pending.push(event);
    }

    /// Takes every pending event, oldest first.
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_drains_in_order() {
        let mut queue = EventQueue::new();
        queue.push(EngineEvent::ItemEquipped {
            item: ItemId(1),
            creature: CreatureId(1),
            slot: SlotType::Weapon,
        });
        queue.push(EngineEvent::ItemUnequipped {
            item: ItemId(1),
            creature: CreatureId(1),
            slot: SlotType::Weapon,
        });

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].as_str(), "item_equipped");
        assert!(queue.is_empty());
    }

    #[test]
    fn closures_are_observers() {
        let mut seen = Vec::new();
        {
            let mut observer = |event: &EngineEvent| seen.push(event.creature());
            observer.notify(&EngineEvent::StatsRecomputed {
                creature: CreatureId(9),
                combat_power: 10,
                cause: RecomputeCause::Created,
            });
        }
        assert_eq!(seen, vec![Some(CreatureId(9))]);
    }
}
