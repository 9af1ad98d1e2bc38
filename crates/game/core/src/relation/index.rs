use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::env::ItemOracle;
use crate::events::{EngineEvent, EventQueue};
use crate::ids::{CreatureId, ItemId, Tick};
use crate::item::SlotType;

use super::Relation;
use super::error::EquipError;
use super::report::{ConsistencyIssue, ConsistencyReport, RepairAction, RepairReport};
use super::snapshot::{LoadoutEntry, RelationSnapshot};

type Loadouts = BTreeMap<CreatureId, BTreeMap<SlotType, ItemId>>;

/// What an [`RelationIndex::equip`] call changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EquipOutcome {
    /// The relation now in place.
    pub relation: Relation,
    /// Where the item was equipped before, if it was moved.
    pub moved_from: Option<Relation>,
    /// The previous occupant of the target slot, now unequipped.
    pub displaced: Option<Relation>,
    /// The item already sat in the target slot; nothing changed.
    pub already_equipped: bool,
    /// The displaced item, when item storage refused to take it back. It is
    /// then neither worn nor stored and the caller owns its fate.
    pub unstored: Option<ItemId>,
}

impl EquipOutcome {
    /// Every creature whose equipment changed, target first.
    pub fn affected_creatures(&self) -> Vec<CreatureId> {
        let mut creatures = vec![self.relation.creature];
        if let Some(previous) = self.moved_from
            && previous.creature != self.relation.creature
        {
            creatures.push(previous.creature);
        }
        creatures
    }
}

/// What a [`RelationIndex::swap`] call changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapOutcome {
    pub slot: SlotType,
    pub first: CreatureId,
    pub second: CreatureId,
    /// Item now worn by `first` in `slot`.
    pub to_first: Option<ItemId>,
    /// Item now worn by `second` in `slot`.
    pub to_second: Option<ItemId>,
}

/// Bidirectional item ↔ creature association.
///
/// Ordered maps keep iteration, exports, and repairs deterministic.
#[derive(Clone, Debug, Default)]
pub struct RelationIndex {
    forward: BTreeMap<ItemId, Relation>,
    reverse: Loadouts,
    /// Next timestamp to hand out.
    clock: Tick,
    events: EventQueue,
}

impl RelationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Number of forward relations.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn clock(&self) -> Tick {
        self.clock
    }

    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.forward.values()
    }

    pub fn item_relation(&self, item: ItemId) -> Option<Relation> {
        self.forward.get(&item).copied()
    }

    pub fn is_item_equipped(&self, item: ItemId) -> bool {
        self.forward.contains_key(&item)
    }

    /// The creature currently wearing `item`.
    pub fn owner(&self, item: ItemId) -> Option<CreatureId> {
        self.forward.get(&item).map(|relation| relation.creature)
    }

    pub fn creature_equipment(&self, creature: CreatureId) -> BTreeMap<SlotType, ItemId> {
        self.reverse.get(&creature).cloned().unwrap_or_default()
    }

    pub fn equipped_item(&self, creature: CreatureId, slot: SlotType) -> Option<ItemId> {
        self.reverse.get(&creature)?.get(&slot).copied()
    }

    /// Creatures referenced by either map.
    pub fn creatures(&self) -> Vec<CreatureId> {
        let mut creatures: Vec<CreatureId> = self
            .forward
            .values()
            .map(|relation| relation.creature)
            .chain(self.reverse.keys().copied())
            .collect();
        creatures.sort_unstable();
        creatures.dedup();
        creatures
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Equips `item` on `creature` in the item's own slot.
    ///
    /// An item equipped elsewhere is moved, and the target slot's previous
    /// occupant is displaced. Neither is an error here; the equipment service
    /// decides which moves need confirmation.
    pub fn equip<I>(
        &mut self,
        items: &I,
        item: ItemId,
        creature: CreatureId,
    ) -> Result<EquipOutcome, EquipError>
    where
        I: ItemOracle + ?Sized,
    {
        let record = items.item(item).ok_or(EquipError::ItemNotFound(item))?;
        let slot = record.slot.ok_or(EquipError::ItemNotEquipment(item))?;

        if let Some(current) = self.forward.get(&item).copied()
            && current.occupies(creature, slot)
            && self.equipped_item(creature, slot) == Some(item)
        {
            tracing::debug!(target: "summon::relation", %item, %creature, "already equipped");
            return Ok(EquipOutcome {
                relation: current,
                moved_from: None,
                displaced: None,
                already_equipped: true,
                unstored: None,
            });
        }

        let moved_from = self.detach(item);
        let displaced = self
            .occupant(creature, slot)
            .and_then(|occupant| self.detach(occupant));

        let relation = Relation::new(item, creature, slot, self.next_tick());
        self.attach(relation);

        tracing::debug!(
            target: "summon::relation",
            %item,
            %creature,
            %slot,
            moved = moved_from.is_some(),
            displaced = ?displaced.map(|r| r.item),
            "item equipped"
        );

        Ok(EquipOutcome {
            relation,
            moved_from,
            displaced,
            already_equipped: false,
            unstored: None,
        })
    }

    /// Removes `item`'s relation if it points at `creature`.
    ///
    /// Returns false, changing nothing, when the item is not equipped there.
    /// This guards against stale callers racing with an earlier move.
    pub fn unequip(&mut self, item: ItemId, creature: CreatureId) -> bool {
        match self.forward.get(&item) {
            Some(relation) if relation.creature == creature => self.detach(item).is_some(),
            _ => {
                tracing::debug!(target: "summon::relation", %item, %creature, "unequip ignored");
                false
            }
        }
    }

    /// Removes whatever `creature` wears in `slot`.
    pub fn unequip_slot(&mut self, creature: CreatureId, slot: SlotType) -> Option<Relation> {
        let item = self.occupant(creature, slot)?;
        self.detach(item)
    }

    /// Releases every item worn by `creature` and returns them.
    pub fn remove_all_for_creature(&mut self, creature: CreatureId) -> Vec<ItemId> {
        let items: Vec<ItemId> = self
            .forward
            .values()
            .filter(|relation| relation.creature == creature)
            .map(|relation| relation.item)
            .collect();
        for item in &items {
            self.detach(*item);
        }

        if let Some(remnants) = self.reverse.remove(&creature) {
            tracing::warn!(
                target: "summon::relation",
                %creature,
                count = remnants.len(),
                "dropped reverse entries without forward backing"
            );
        }

        tracing::debug!(target: "summon::relation", %creature, freed = items.len(), "creature released");
        items
    }

    /// Exchanges whatever `first` and `second` wear in `slot`.
    ///
    /// Either side may be empty, in which case the item simply moves. This is
    /// a detach-then-attach sequence; a crash between the steps leaves the maps
    /// for [`Self::repair_consistency`] to settle.
    pub fn swap(
        &mut self,
        first: CreatureId,
        second: CreatureId,
        slot: SlotType,
    ) -> Result<SwapOutcome, EquipError> {
        let first_item = self.occupant(first, slot);
        let second_item = self.occupant(second, slot);

        if first_item.is_none() && second_item.is_none() {
            return Err(EquipError::NoPriorRelation {
                creature: first,
                item: None,
                slot: Some(slot),
            });
        }

        if first == second {
            return Ok(SwapOutcome {
                slot,
                first,
                second,
                to_first: first_item,
                to_second: second_item,
            });
        }

        for item in first_item.iter().chain(second_item.iter()) {
            self.detach(*item);
        }
        if let Some(item) = first_item {
            let relation = Relation::new(item, second, slot, self.next_tick());
            self.attach(relation);
        }
        if let Some(item) = second_item {
            let relation = Relation::new(item, first, slot, self.next_tick());
            self.attach(relation);
        }

        tracing::debug!(target: "summon::relation", %first, %second, %slot, "slots swapped");

        Ok(SwapOutcome {
            slot,
            first,
            second,
            to_first: second_item,
            to_second: first_item,
        })
    }

    // ========================================================================
    // Consistency
    // ========================================================================

    /// Scans both maps for invariant violations without side effects.
    pub fn check_consistency(&self) -> ConsistencyReport {
        let mut issues = Vec::new();

        for relation in self.forward.values() {
            match self.equipped_item(relation.creature, relation.slot) {
                None => issues.push(ConsistencyIssue::MissingReverseEntry {
                    item: relation.item,
                    creature: relation.creature,
                    slot: relation.slot,
                }),
                Some(found) if found != relation.item => {
                    issues.push(ConsistencyIssue::ReverseEntryMismatch {
                        item: relation.item,
                        creature: relation.creature,
                        slot: relation.slot,
                        found,
                    })
                }
                Some(_) => {}
            }
        }

        let mut locations: BTreeMap<ItemId, Vec<(CreatureId, SlotType)>> = BTreeMap::new();
        for (&creature, slots) in &self.reverse {
            for (&slot, &item) in slots {
                locations.entry(item).or_default().push((creature, slot));
                match self.forward.get(&item) {
                    None => issues.push(ConsistencyIssue::MissingForwardEntry {
                        creature,
                        slot,
                        item,
                    }),
                    Some(relation) if !relation.occupies(creature, slot) => {
                        issues.push(ConsistencyIssue::ForwardEntryMismatch {
                            creature,
                            slot,
                            item,
                            forward_creature: relation.creature,
                            forward_slot: relation.slot,
                        })
                    }
                    Some(_) => {}
                }
            }
        }
        issues.extend(
            locations
                .into_iter()
                .filter(|(_, found)| found.len() > 1)
                .map(|(item, locations)| ConsistencyIssue::DuplicateItem { item, locations }),
        );

        let mut claims: BTreeMap<(CreatureId, SlotType), Vec<ItemId>> = BTreeMap::new();
        for relation in self.forward.values() {
            claims
                .entry((relation.creature, relation.slot))
                .or_default()
                .push(relation.item);
        }
        issues.extend(
            claims
                .into_iter()
                .filter(|(_, items)| items.len() > 1)
                .map(|((creature, slot), items)| ConsistencyIssue::SlotConflict {
                    creature,
                    slot,
                    items,
                }),
        );

        ConsistencyReport::from_issues(issues, self.forward.len())
    }

    /// Scans both maps and announces the result.
    pub fn validate_consistency(&mut self) -> ConsistencyReport {
        let report = self.check_consistency();
        if report.is_consistent {
            tracing::debug!(
                target: "summon::relation",
                relations = report.relation_count,
                "relation index consistent"
            );
        } else {
            tracing::warn!(
                target: "summon::relation",
                issues = report.issues.len(),
                first = ?report.issues.first().map(ConsistencyIssue::as_str),
                "relation index inconsistent"
            );
        }
        self.events.push(EngineEvent::ConsistencyValidated {
            report: report.clone(),
        });
        report
    }

    /// Restores agreement between the maps, treating forward as ground truth.
    ///
    /// 1. Forward relations sharing a `(creature, slot)` are settled first: the
    ///    most recently equipped one stays, ties go to the lowest item id, the
    ///    rest are released.
    /// 2. The reverse map is rebuilt from the surviving forward relations.
    ///
    /// Calling this on a consistent index changes nothing.
    pub fn repair_consistency(&mut self) -> RepairReport {
        let before = self.check_consistency();
        if before.is_consistent {
            let report = RepairReport {
                after: before.clone(),
                before,
                actions: Vec::new(),
                released: Vec::new(),
            };
            self.events.push(EngineEvent::ConsistencyRepaired {
                report: report.clone(),
            });
            return report;
        }

        let mut actions = Vec::new();
        let released = self.settle_slot_conflicts(&mut actions);
        self.rebuild_reverse(&mut actions);
        let after = self.check_consistency();

        tracing::info!(
            target: "summon::relation",
            issues_before = before.issues.len(),
            issues_after = after.issues.len(),
            actions = actions.len(),
            released = released.len(),
            "relation index repaired"
        );

        let report = RepairReport {
            before,
            after,
            actions,
            released,
        };
        self.events.push(EngineEvent::ConsistencyRepaired {
            report: report.clone(),
        });
        report
    }

    fn settle_slot_conflicts(&mut self, actions: &mut Vec<RepairAction>) -> Vec<Relation> {
        let mut winners: BTreeMap<(CreatureId, SlotType), Relation> = BTreeMap::new();
        let mut losers = Vec::new();

        // Ascending item order, so on equal timestamps the first seen stays.
        for relation in self.forward.values().copied() {
            match winners.entry((relation.creature, relation.slot)) {
                Entry::Vacant(entry) => {
                    entry.insert(relation);
                }
                Entry::Occupied(mut entry) => {
                    if relation.equipped_at > entry.get().equipped_at {
                        losers.push(entry.insert(relation));
                    } else {
                        losers.push(relation);
                    }
                }
            }
        }

        for loser in &losers {
            let kept = winners
                .get(&(loser.creature, loser.slot))
                .map_or(loser.item, |winner| winner.item);
            self.forward.remove(&loser.item);
            self.events.push(EngineEvent::ItemUnequipped {
                item: loser.item,
                creature: loser.creature,
                slot: loser.slot,
            });
            actions.push(RepairAction::ReleasedConflictingRelation {
                relation: *loser,
                kept,
            });
        }
        losers
    }

    fn rebuild_reverse(&mut self, actions: &mut Vec<RepairAction>) {
        let mut rebuilt = Loadouts::new();
        for relation in self.forward.values() {
            rebuilt
                .entry(relation.creature)
                .or_default()
                .insert(relation.slot, relation.item);
        }

        for (&creature, slots) in &self.reverse {
            for (&slot, &item) in slots {
                let expected = rebuilt.get(&creature).and_then(|slots| slots.get(&slot));
                if expected != Some(&item) {
                    actions.push(RepairAction::RemovedReverseEntry {
                        creature,
                        slot,
                        item,
                    });
                }
            }
        }
        for (&creature, slots) in &rebuilt {
            for (&slot, &item) in slots {
                let existing = self.reverse.get(&creature).and_then(|slots| slots.get(&slot));
                if existing != Some(&item) {
                    actions.push(RepairAction::RestoredReverseEntry {
                        creature,
                        slot,
                        item,
                    });
                }
            }
        }

        self.reverse = rebuilt;
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Copies both maps into a serializable snapshot.
    pub fn export_relations(&self) -> RelationSnapshot {
        let relations = self.forward.values().copied().collect();
        let loadouts = self
            .reverse
            .iter()
            .flat_map(|(&creature, slots)| {
                slots.iter().map(move |(&slot, &item)| LoadoutEntry {
                    creature,
                    slot,
                    item,
                })
            })
            .collect();
        RelationSnapshot {
            relations,
            loadouts,
        }
    }

    /// Replaces both maps with the snapshot's contents as-is.
    ///
    /// No healing happens here, so a snapshot whose maps disagree stays
    /// detectable through [`Self::check_consistency`]. The clock moves past
    /// every imported timestamp.
    pub fn import_relations(&mut self, snapshot: RelationSnapshot) {
        self.forward.clear();
        self.reverse.clear();

        for relation in snapshot.relations {
            if let Some(previous) = self.forward.insert(relation.item, relation) {
                tracing::warn!(
                    target: "summon::relation",
                    item = %relation.item,
                    dropped = %previous.creature,
                    "snapshot lists item twice; keeping the later entry"
                );
            }
        }
        for entry in snapshot.loadouts {
            self.reverse
                .entry(entry.creature)
                .or_default()
                .insert(entry.slot, entry.item);
        }

        if let Some(latest) = self.forward.values().map(|r| r.equipped_at).max() {
            self.clock = self.clock.max(latest.next());
        }

        tracing::debug!(
            target: "summon::relation",
            relations = self.forward.len(),
            clock = %self.clock,
            "relations imported"
        );
    }

    /// Takes every event queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain()
    }

    // ========================================================================
    // Choke points: the only code that writes both maps.
    // ========================================================================

    fn attach(&mut self, relation: Relation) {
        self.forward.insert(relation.item, relation);
        self.reverse
            .entry(relation.creature)
            .or_default()
            .insert(relation.slot, relation.item);
        self.events.push(EngineEvent::ItemEquipped {
            item: relation.item,
            creature: relation.creature,
            slot: relation.slot,
        });
    }

    fn detach(&mut self, item: ItemId) -> Option<Relation> {
        let relation = self.forward.remove(&item)?;
        if let Some(slots) = self.reverse.get_mut(&relation.creature) {
            if slots.get(&relation.slot) == Some(&item) {
                slots.remove(&relation.slot);
            }
            if slots.is_empty() {
                self.reverse.remove(&relation.creature);
            }
        }
        self.events.push(EngineEvent::ItemUnequipped {
            item,
            creature: relation.creature,
            slot: relation.slot,
        });
        Some(relation)
    }

    /// The item in `(creature, slot)` if both maps agree on it.
    fn occupant(&self, creature: CreatureId, slot: SlotType) -> Option<ItemId> {
        self.equipped_item(creature, slot).filter(|item| {
            self.forward
                .get(item)
                .is_some_and(|relation| relation.occupies(creature, slot))
        })
    }

    fn next_tick(&mut self) -> Tick {
        let tick = self.clock;
        self.clock = self.clock.next();
        tick
    }
}
