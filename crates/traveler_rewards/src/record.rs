//! # Traveler Record
//!
//! Per-player reward state: soulbound slots, items waiting to be returned
//! after a death, the last death location and lifetime counters.

use std::collections::{BTreeMap, BTreeSet};

use traveler_shared::constants::INVENTORY_SLOT_COUNT;
use traveler_shared::{BlockPos, DeathLocation};

use crate::host::StructureInfo;
use crate::item::ItemInstance;

/// Reward state for one player.
///
/// Slot fields are crate-private so every write goes through the code that
/// keeps them inside the inventory shape.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TravelerRecord {
    pub(crate) soulbound_slots: BTreeSet<usize>,
    pub(crate) pending_return: BTreeMap<usize, ItemInstance>,
    /// Where the player last died.
    pub last_death_location: Option<DeathLocation>,
    pub(crate) pure_hearts_consumed: u32,
    pub(crate) total_deaths: u32,
    /// Block the player stood on when they approached the current structure.
    pub structure_entry_pos: Option<BlockPos>,
    /// Structure the player was last reported near.
    pub closest_structure: Option<StructureInfo>,
}

impl TravelerRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Soulbound slot indices.
    #[must_use]
    pub fn soulbound_slots(&self) -> &BTreeSet<usize> {
        &self.soulbound_slots
    }

    /// Items captured at death, keyed by the slot they came from.
    #[must_use]
    pub fn pending_return(&self) -> &BTreeMap<usize, ItemInstance> {
        &self.pending_return
    }

    /// True while items captured at death are waiting to be restored.
    #[must_use]
    pub fn has_pending_return(&self) -> bool {
        self.pending_return.values().any(|item| !item.is_empty())
    }

    /// Pure Hearts used over the player's lifetime.
    #[must_use]
    pub fn pure_hearts_consumed(&self) -> u32 {
        self.pure_hearts_consumed
    }

    /// Deaths over the player's lifetime.
    #[must_use]
    pub fn total_deaths(&self) -> u32 {
        self.total_deaths
    }

    /// Restores soulbound slots from persisted data, dropping indices outside
    /// the inventory shape. Returns the rejected indices.
    pub fn restore_soulbound_slots<I>(&mut self, slots: I) -> Vec<i64>
    where
        I: IntoIterator<Item = i64>,
    {
        let mut rejected = Vec::new();
        for slot in slots {
            match usize::try_from(slot) {
                Ok(index) if index < INVENTORY_SLOT_COUNT => {
                    self.soulbound_slots.insert(index);
                }
                _ => rejected.push(slot),
            }
        }
        rejected
    }

    /// Restores lifetime counters from persisted data.
    pub fn restore_counters(&mut self, pure_hearts_consumed: u32, total_deaths: u32) {
        self.pure_hearts_consumed = pure_hearts_consumed;
        self.total_deaths = total_deaths;
    }

    /// Folds a persisted record into this live one.
    ///
    /// Soulbound slots are unioned, counters keep the larger value and every
    /// optional field keeps the live value when one is set. Pending items
    /// are only taken for slots that hold nothing pending already.
    pub fn absorb(&mut self, saved: Self) {
        self.soulbound_slots.extend(saved.soulbound_slots);
        for (slot, item) in saved.pending_return {
            self.pending_return.entry(slot).or_insert(item);
        }
        self.last_death_location = self.last_death_location.take().or(saved.last_death_location);
        self.pure_hearts_consumed = self.pure_hearts_consumed.max(saved.pure_hearts_consumed);
        self.total_deaths = self.total_deaths.max(saved.total_deaths);
        self.structure_entry_pos = self.structure_entry_pos.or(saved.structure_entry_pos);
        self.closest_structure = self.closest_structure.take().or(saved.closest_structure);
    }

    /// Tracks the structure the player is near. When it differs from the
    /// previous one, `entry` becomes the new entry position.
    ///
    /// Returns true if the entry position changed.
    pub fn note_structure(&mut self, structure: StructureInfo, entry: BlockPos) -> bool {
        if self.closest_structure.as_ref() == Some(&structure) {
            return false;
        }
        self.structure_entry_pos = Some(entry);
        self.closest_structure = Some(structure);
        true
    }
}
