//! # Inventory Access
//!
//! The host owns the real inventory. The core only needs slot reads and
//! writes, so that is all [`PlayerInventory`] asks for. [`SlotInventory`]
//! is a plain in-memory implementation with the standard 41-slot shape.

use traveler_shared::constants::INVENTORY_SLOT_COUNT;

use crate::error::{RewardsError, RewardsResult};
use crate::item::ItemInstance;

/// Slot-level access to a player's inventory.
pub trait PlayerInventory {
    /// Number of addressable slots.
    fn slot_count(&self) -> usize;

    /// Item in `slot`, or `None` if the slot does not exist.
    fn item(&self, slot: usize) -> Option<&ItemInstance>;

    /// Mutable item in `slot`, or `None` if the slot does not exist.
    fn item_mut(&mut self, slot: usize) -> Option<&mut ItemInstance>;

    /// Replaces the contents of `slot`.
    ///
    /// # Errors
    ///
    /// Returns `RewardsError::InvalidSlot` if the slot does not exist.
    fn set_item(&mut self, slot: usize, item: ItemInstance) -> RewardsResult<()>;

    /// Removes and returns the contents of `slot`, leaving it empty.
    fn take_item(&mut self, slot: usize) -> Option<ItemInstance> {
        self.item_mut(slot).map(std::mem::take)
    }

    /// First slot holding a stack that matches `item` (identity and tags).
    fn find_matching(&self, item: &ItemInstance) -> Option<usize> {
        (0..self.slot_count()).find(|&slot| {
            self.item(slot)
                .is_some_and(|held| !held.is_empty() && held.matches(item))
        })
    }
}

/// Pre-sized in-memory inventory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotInventory {
    /// Slots, empty stacks for unused positions.
    slots: Vec<ItemInstance>,
}

impl SlotInventory {
    /// Creates an empty inventory with the standard player shape.
    #[must_use]
    pub fn new() -> Self {
        Self::with_slots(INVENTORY_SLOT_COUNT)
    }

    /// Creates an empty inventory with `slot_count` slots.
    #[must_use]
    pub fn with_slots(slot_count: usize) -> Self {
        Self {
            slots: vec![ItemInstance::empty(); slot_count],
        }
    }
}

impl Default for SlotInventory {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerInventory for SlotInventory {
    fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn item(&self, slot: usize) -> Option<&ItemInstance> {
        self.slots.get(slot)
    }

    fn item_mut(&mut self, slot: usize) -> Option<&mut ItemInstance> {
        self.slots.get_mut(slot)
    }

    fn set_item(&mut self, slot: usize, item: ItemInstance) -> RewardsResult<()> {
        let slot_count = self.slots.len();
        let target = self
            .slots
            .get_mut(slot)
            .ok_or(RewardsError::InvalidSlot { slot, slot_count })?;
        *target = item;
        Ok(())
    }
}
