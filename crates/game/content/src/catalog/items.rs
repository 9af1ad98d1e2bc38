use std::collections::{BTreeMap, BTreeSet};

use summon_core::{Item, ItemId, ItemOracle, ItemStorage};

/// In-memory item store.
///
/// Holds every known item plus the set of ids currently sitting in storage.
/// Items leave storage when the engine equips them and come back when they
/// are unequipped or displaced. An optional capacity bounds how many items
/// storage can hold at once.
#[derive(Clone, Debug, Default)]
pub struct ItemCatalog {
    items: BTreeMap<ItemId, Item>,
    stored: BTreeSet<ItemId>,
    capacity: Option<usize>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog with every item placed in storage.
    ///
    /// Later duplicates replace earlier ones.
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        let mut catalog = Self::new();
        for item in items {
            catalog.insert(item);
        }
        catalog
    }

    /// Limits how many items storage accepts (builder pattern).
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Adds an item and places it in storage, returning the item it replaced.
    pub fn insert(&mut self, item: Item) -> Option<Item> {
        self.stored.insert(item.id);
        self.items.insert(item.id, item)
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Returns true if the item is currently in storage (not worn).
    pub fn in_storage(&self, id: ItemId) -> bool {
        self.stored.contains(&id)
    }

    pub fn stored(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.stored.iter().copied()
    }

    pub fn stored_count(&self) -> usize {
        self.stored.len()
    }

    fn is_full(&self) -> bool {
        self.capacity.is_some_and(|cap| self.stored.len() >= cap)
    }
}

impl ItemOracle for ItemCatalog {
    fn item(&self, id: ItemId) -> Option<Item> {
        self.items.get(&id).cloned()
    }
}

impl ItemStorage for ItemCatalog {
    fn return_to_storage(&mut self, item: &Item) -> bool {
        if !self.items.contains_key(&item.id) {
            tracing::warn!(target: "summon::content", item = %item.id, "returned item is not in the catalog");
            return false;
        }
        if self.stored.contains(&item.id) {
            return true;
        }
        if self.is_full() {
            tracing::warn!(target: "summon::content", item = %item.id, "storage is full");
            return false;
        }
        self.stored.insert(item.id)
    }

    fn can_store(&self, items: &[Item]) -> bool {
        let mut incoming = BTreeSet::new();
        for item in items {
            if !self.items.contains_key(&item.id) {
                return false;
            }
            if !self.stored.contains(&item.id) {
                incoming.insert(item.id);
            }
        }
        self.capacity
            .is_none_or(|cap| self.stored.len() + incoming.len() <= cap)
    }

    fn withdraw(&mut self, item: &Item) {
        self.stored.remove(&item.id);
    }
}

#[cfg(test)]
mod tests {
    use summon_core::SlotType;

    use super::*;

    fn sword(id: u32) -> Item {
        Item::equipment(ItemId(id), "Sword", SlotType::Weapon)
    }

    #[test]
    fn items_start_in_storage() {
        let catalog = ItemCatalog::from_items([sword(1), sword(2)]);
        assert_eq!(catalog.len(), 2);
        assert!(catalog.in_storage(ItemId(1)));
        assert_eq!(catalog.stored().collect::<Vec<_>>(), vec![ItemId(1), ItemId(2)]);
    }

    #[test]
    fn withdraw_and_return_move_items() {
        let mut catalog = ItemCatalog::from_items([sword(1)]);
        let item = catalog.item(ItemId(1)).unwrap();

        catalog.withdraw(&item);
        assert!(!catalog.in_storage(ItemId(1)));

        assert!(catalog.return_to_storage(&item));
        assert!(catalog.in_storage(ItemId(1)));
    }

    #[test]
    fn full_storage_refuses_returns() {
        let mut catalog = ItemCatalog::from_items([sword(1), sword(2)]).with_capacity(1);
        let first = catalog.item(ItemId(1)).unwrap();
        let second = catalog.item(ItemId(2)).unwrap();
        catalog.withdraw(&first);
        catalog.withdraw(&second);

        assert!(catalog.return_to_storage(&first));
        assert!(!catalog.return_to_storage(&second));
        assert_eq!(catalog.stored_count(), 1);
    }

    #[test]
    fn can_store_counts_free_room() {
        let mut catalog = ItemCatalog::from_items([sword(1), sword(2), sword(3)]).with_capacity(2);
        let items: Vec<Item> = (1..=3).map(|id| catalog.item(ItemId(id)).unwrap()).collect();
        for item in &items {
            catalog.withdraw(item);
        }
        catalog.return_to_storage(&items[0]);

        assert!(catalog.can_store(&items[..1]));
        assert!(catalog.can_store(&items[1..2]));
        assert!(!catalog.can_store(&items[1..]));
        assert!(!catalog.can_store(&[sword(9)]));
    }

    #[test]
    fn unknown_items_are_refused() {
        let mut catalog = ItemCatalog::new();
        assert!(!catalog.return_to_storage(&sword(9)));
        assert!(catalog.is_empty());
    }
}
