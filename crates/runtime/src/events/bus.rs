//! Topic-based event bus implementation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use summon_core::{EngineEvent, EngineObserver};
use tokio::sync::broadcast;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Items equipped and unequipped
    Equipment,
    /// Validation and repair reports
    Consistency,
    /// Stat recomputations
    Stats,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Equipment, Topic::Consistency, Topic::Stats];

    /// Topic an engine event is published on.
    pub fn of(event: &EngineEvent) -> Topic {
        match event {
            EngineEvent::ItemEquipped { .. } | EngineEvent::ItemUnequipped { .. } => {
                Topic::Equipment
            }
            EngineEvent::ConsistencyValidated { .. } | EngineEvent::ConsistencyRepaired { .. } => {
                Topic::Consistency
            }
            EngineEvent::StatsRecomputed { .. } => Topic::Stats,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Publishing never blocks; events sent while a
/// topic has no subscribers are dropped.
#[derive(Clone)]
pub struct EventBus {
    equipment: broadcast::Sender<EngineEvent>,
    consistency: broadcast::Sender<EngineEvent>,
    stats: broadcast::Sender<EngineEvent>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            equipment: broadcast::channel(capacity).0,
            consistency: broadcast::channel(capacity).0,
            stats: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<EngineEvent> {
        match topic {
            Topic::Equipment => &self.equipment,
            Topic::Consistency => &self.consistency,
            Topic::Stats => &self.stats,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: EngineEvent) {
        let topic = Topic::of(&event);
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(target: "runtime::events", ?topic, "no subscribers");
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<EngineEvent> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<EngineEvent>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }

    /// Engine observer forwarding every event onto this bus.
    pub fn observer(&self) -> BusObserver {
        BusObserver { bus: self.clone() }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// [`EngineObserver`] that republishes engine events on an [`EventBus`].
#[derive(Clone)]
pub struct BusObserver {
    bus: EventBus,
}

impl EngineObserver for BusObserver {
    fn notify(&mut self, event: &EngineEvent) {
        self.bus.publish(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use summon_core::{CreatureId, ItemId, RecomputeCause, SlotType};

    use super::*;

    #[test]
    fn events_route_to_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut equipment = bus.subscribe(Topic::Equipment);
        let mut stats = bus.subscribe(Topic::Stats);

        let mut observer = bus.observer();
        observer.notify(&EngineEvent::ItemEquipped {
            item: ItemId(1),
            creature: CreatureId(1),
            slot: SlotType::Weapon,
        });
        observer.notify(&EngineEvent::StatsRecomputed {
            creature: CreatureId(1),
            combat_power: 42,
            cause: RecomputeCause::EquipmentChanged,
        });

        assert!(matches!(equipment.try_recv(), Ok(EngineEvent::ItemEquipped { .. })));
        assert!(equipment.try_recv().is_err());
        assert!(matches!(
            stats.try_recv(),
            Ok(EngineEvent::StatsRecomputed { combat_power: 42, .. })
        ));
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(EngineEvent::ItemUnequipped {
            item: ItemId(1),
            creature: CreatureId(1),
            slot: SlotType::Rune,
        });
        assert_eq!(bus.subscribe_multiple(&Topic::ALL).len(), 3);
    }
}
