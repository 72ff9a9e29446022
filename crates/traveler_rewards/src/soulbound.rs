//! # Soulbound Slots
//!
//! A soulbound slot keeps its contents through death. Binding is driven by
//! the Soulbound Ritual Tablet: the slot holding the tablet is bound first,
//! and each further use from an already-bound slot binds the next free slot
//! of the main storage (main hand) or the offhand and armor slots (off hand).

use std::collections::BTreeSet;
use std::ops::Range;

use traveler_shared::constants::{INVENTORY_SLOT_COUNT, MAIN_STORAGE_SLOTS, OFFHAND_AND_ARMOR_SLOTS};
use traveler_shared::Hand;

use crate::inventory::PlayerInventory;
use crate::item::ItemInstance;
use crate::record::TravelerRecord;

/// Binds, unbinds and queries soulbound slots on a record.
#[derive(Clone, Copy, Debug, Default)]
pub struct SoulboundSlotManager;

impl SoulboundSlotManager {
    /// Binds the slot holding `item`, or the next free slot when that one is
    /// already bound.
    ///
    /// Returns the slot that ended up bound, or `None` when `item` is not
    /// in the inventory.
    pub fn bind_slot(
        record: &mut TravelerRecord,
        inventory: &dyn PlayerInventory,
        hand: Hand,
        item: &ItemInstance,
    ) -> Option<usize> {
        let found = inventory.find_matching(item)?;
        let limit = inventory.slot_count().min(INVENTORY_SLOT_COUNT);
        if found >= limit {
            return None;
        }

        let slot = if record.soulbound_slots.contains(&found) {
            let spill = match hand {
                Hand::Main => MAIN_STORAGE_SLOTS,
                Hand::Off => OFFHAND_AND_ARMOR_SLOTS,
            };
            first_unbound(&record.soulbound_slots, spill, limit).unwrap_or(found)
        } else {
            found
        };

        record.soulbound_slots.insert(slot);
        Some(slot)
    }

    /// Removes soulbound status from `slot`. Returns true if it was bound.
    pub fn unbind(record: &mut TravelerRecord, slot: usize) -> bool {
        record.soulbound_slots.remove(&slot)
    }

    /// True if `slot` is soulbound.
    #[must_use]
    pub fn is_bound(record: &TravelerRecord, slot: usize) -> bool {
        record.soulbound_slots.contains(&slot)
    }

    /// Copy of the bound slots.
    #[must_use]
    pub fn list_bound(record: &TravelerRecord) -> BTreeSet<usize> {
        record.soulbound_slots.clone()
    }
}

fn first_unbound(bound: &BTreeSet<usize>, range: Range<usize>, limit: usize) -> Option<usize> {
    range
        .take_while(|&slot| slot < limit)
        .find(|slot| !bound.contains(slot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::SlotInventory;
    use crate::item::ids;

    fn tablet_in(slot: usize) -> (SlotInventory, ItemInstance) {
        let tablet = ItemInstance::new(ids::SOULBOUND_RITUAL_TABLET, 1);
        let mut inventory = SlotInventory::new();
        inventory.set_item(slot, tablet.clone()).unwrap();
        (inventory, tablet)
    }

    #[test]
    fn test_binds_found_slot_first() {
        let (inventory, tablet) = tablet_in(3);
        let mut record = TravelerRecord::new();
        assert_eq!(SoulboundSlotManager::bind_slot(&mut record, &inventory, Hand::Main, &tablet), Some(3));
        assert!(SoulboundSlotManager::is_bound(&record, 3));
    }

    #[test]
    fn test_main_hand_fills_storage_ascending() {
        let (inventory, tablet) = tablet_in(0);
        let mut record = TravelerRecord::new();
        SoulboundSlotManager::bind_slot(&mut record, &inventory, Hand::Main, &tablet);

        for expected in MAIN_STORAGE_SLOTS {
            let bound = SoulboundSlotManager::bind_slot(&mut record, &inventory, Hand::Main, &tablet);
            assert_eq!(bound, Some(expected));
        }

        // Storage exhausted: the original slot is re-added, set unchanged.
        let before = SoulboundSlotManager::list_bound(&record);
        assert_eq!(SoulboundSlotManager::bind_slot(&mut record, &inventory, Hand::Main, &tablet), Some(0));
        assert_eq!(SoulboundSlotManager::list_bound(&record), before);
        assert_eq!(before.len(), 1 + MAIN_STORAGE_SLOTS.len());
    }

    #[test]
    fn test_off_hand_fills_offhand_and_armor() {
        let (inventory, tablet) = tablet_in(36);
        let mut record = TravelerRecord::new();
        assert_eq!(SoulboundSlotManager::bind_slot(&mut record, &inventory, Hand::Off, &tablet), Some(36));
        let next: Vec<_> = (0..4)
            .filter_map(|_| SoulboundSlotManager::bind_slot(&mut record, &inventory, Hand::Off, &tablet))
            .collect();
        assert_eq!(next, vec![37, 38, 39, 40]);
        assert!(record.soulbound_slots().iter().all(|&s| s < INVENTORY_SLOT_COUNT));
    }

    #[test]
    fn test_missing_item_is_noop() {
        let inventory = SlotInventory::new();
        let mut record = TravelerRecord::new();
        let tablet = ItemInstance::new(ids::SOULBOUND_RITUAL_TABLET, 1);
        assert_eq!(SoulboundSlotManager::bind_slot(&mut record, &inventory, Hand::Main, &tablet), None);
        assert!(record.soulbound_slots().is_empty());
    }

    #[test]
    fn test_small_inventory_never_binds_past_shape() {
        let tablet = ItemInstance::new(ids::SOULBOUND_RITUAL_TABLET, 1);
        let mut inventory = SlotInventory::with_slots(12);
        inventory.set_item(10, tablet.clone()).unwrap();
        let mut record = TravelerRecord::new();
        for _ in 0..6 {
            SoulboundSlotManager::bind_slot(&mut record, &inventory, Hand::Main, &tablet);
        }
        assert_eq!(SoulboundSlotManager::list_bound(&record).into_iter().collect::<Vec<_>>(), vec![9, 10, 11]);
    }

    #[test]
    fn test_unbind() {
        let (inventory, tablet) = tablet_in(5);
        let mut record = TravelerRecord::new();
        SoulboundSlotManager::bind_slot(&mut record, &inventory, Hand::Main, &tablet);
        assert!(SoulboundSlotManager::unbind(&mut record, 5));
        assert!(!SoulboundSlotManager::unbind(&mut record, 5));
        assert!(!SoulboundSlotManager::is_bound(&record, 5));
    }
}
