use crate::ids::ItemId;
use crate::item::{Item, SlotType};

/// Read access to the external item store.
pub trait ItemOracle {
    /// Looks up an item by id.
    fn item(&self, id: ItemId) -> Option<Item>;

    /// Returns true if the item exists and has a slot type.
    fn is_equipment(&self, id: ItemId) -> bool {
        self.item(id).is_some_and(|item| item.is_equipment())
    }

    /// Slot type of an equippable item, `None` otherwise.
    fn slot_type(&self, id: ItemId) -> Option<SlotType> {
        self.item(id).and_then(|item| item.slot)
    }
}

/// Write access the engine needs from the item store.
///
/// The store decides what "storage" means (a bag, a warehouse grid); the
/// engine only tells it when an item leaves or re-enters it.
pub trait ItemStorage: ItemOracle {
    /// Hands an unequipped or displaced item back to the store.
    ///
    /// Returns false when the store could not accept it (e.g., storage full).
    fn return_to_storage(&mut self, item: &Item) -> bool;

    /// Returns true if every item in `items` could be returned right now.
    ///
    /// Consulted before an unequip so a full store fails the request instead
    /// of stranding the item.
    fn can_store(&self, _items: &[Item]) -> bool {
        true
    }

    /// Notifies the store that an item is now worn by a creature.
    fn withdraw(&mut self, _item: &Item) {}
}

impl<T: ItemOracle + ?Sized> ItemOracle for &T {
    fn item(&self, id: ItemId) -> Option<Item> {
        (**self).item(id)
    }
}

impl<T: ItemOracle + ?Sized> ItemOracle for &mut T {
    fn item(&self, id: ItemId) -> Option<Item> {
        (**self).item(id)
    }
}

impl<T: ItemStorage + ?Sized> ItemStorage for &mut T {
    fn return_to_storage(&mut self, item: &Item) -> bool {
        (**self).return_to_storage(item)
    }

    fn can_store(&self, items: &[Item]) -> bool {
        (**self).can_store(items)
    }

    fn withdraw(&mut self, item: &Item) {
        (**self).withdraw(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store that accepts everything and tracks nothing.
    struct Bottomless(Item);

    impl ItemOracle for Bottomless {
        fn item(&self, id: ItemId) -> Option<Item> {
            (id == self.0.id).then(|| self.0.clone())
        }
    }

    impl ItemStorage for Bottomless {
        fn return_to_storage(&mut self, _item: &Item) -> bool {
            true
        }
    }

    #[test]
    fn default_storage_hooks_accept_everything() {
        let sword = Item::equipment(ItemId(1), "Sword", SlotType::Weapon);
        let mut store = Bottomless(sword.clone());

        store.withdraw(&sword);
        assert!(store.can_store(std::slice::from_ref(&sword)));
        assert_eq!(store.slot_type(ItemId(1)), Some(SlotType::Weapon));

        let by_ref = &mut store;
        assert!(by_ref.can_store(&[]));
        assert!(by_ref.return_to_storage(&sword));
    }
}
