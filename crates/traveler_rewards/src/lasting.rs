//! # Lasting Expiration Sweeper
//!
//! Items enchanted with Lasting disappear after a fixed lifetime. The first
//! sweep that sees such an item stamps an expiration tick onto it; a later
//! sweep at or past that tick removes it.
//!
//! Every sweep rescans the whole inventory. Nothing is cached between
//! sweeps, so items moved between slots or handed to another player are
//! always found where they actually are.

use traveler_shared::constants::LASTING_TICKS;

use crate::host::PlayerHandle;
use crate::item::{Enchantment, ItemInstance};

/// Outcome of one sweep over one player.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Slots that received a fresh expiration tick.
    pub assigned: Vec<usize>,
    /// Slots cleared because their item expired, with the removed item.
    pub expired: Vec<(usize, ItemInstance)>,
    /// Slots whose stale expiration tag was removed.
    pub cleaned: Vec<usize>,
}

impl SweepReport {
    /// True if the sweep changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty() && self.expired.is_empty() && self.cleaned.is_empty()
    }
}

/// Periodic Lasting expiration checker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LastingSweeper {
    ticks: [u64; 10],
}

impl Default for LastingSweeper {
    fn default() -> Self {
        Self::new(LASTING_TICKS)
    }
}

impl LastingSweeper {
    /// Creates a sweeper using `ticks` as the lifetime table.
    #[must_use]
    pub const fn new(ticks: [u64; 10]) -> Self {
        Self { ticks }
    }

    /// Lifetime of `item` in ticks: the item's override, else the table
    /// entry for its Lasting level (level 0 counts as level 1).
    #[must_use]
    pub fn duration_for(&self, item: &ItemInstance) -> u64 {
        if let Some(duration) = item.metadata.lasting_duration {
            return duration;
        }
        let level = item.enchantment_level(&Enchantment::Lasting).max(1);
        let index = usize::try_from(level - 1).map_or(9, |i| i.min(9));
        self.ticks[index]
    }

    /// Expiration tick for `item` if it were first seen at `now`.
    #[must_use]
    pub fn expiration_for(&self, item: &ItemInstance, now: u64) -> u64 {
        now.saturating_add(self.duration_for(item))
    }

    /// Runs one sweep over `player`'s inventory at tick `now`.
    pub fn sweep(&self, player: &mut dyn PlayerHandle, now: u64) -> SweepReport {
        let mut report = SweepReport::default();
        let mut marked = Vec::new();
        let player_id = player.id().to_string();

        let slot_count = player.inventory().slot_count();
        for slot in 0..slot_count {
            let Some(item) = player.inventory_mut().item_mut(slot) else {
                continue;
            };
            if item.is_empty() {
                continue;
            }

            if item.enchantment_level(&Enchantment::Lasting) == 0 {
                if item.metadata.lasting_duration.is_some() {
                    item.set_enchantment(Enchantment::Lasting, 1);
                } else {
                    if item.metadata.lasting_expiration.take().is_some() {
                        report.cleaned.push(slot);
                    }
                    continue;
                }
            }

            let expiration = match item.metadata.lasting_expiration {
                Some(expiration) => expiration,
                None => {
                    let expiration = self.expiration_for(item, now);
                    item.metadata.lasting_expiration = Some(expiration);
                    report.assigned.push(slot);
                    tracing::debug!(
                        player = %player_id,
                        slot,
                        item = %item.id,
                        expiration,
                        "lasting item assigned expiration"
                    );
                    expiration
                }
            };

            if now >= expiration {
                marked.push(slot);
            }
        }

        for slot in marked {
            let Some(mut removed) = player.inventory_mut().take_item(slot) else {
                tracing::warn!(player = %player_id, slot, "expired slot vanished before removal");
                continue;
            };
            removed.metadata.lasting_expiration = None;
            tracing::info!(
                player = %player_id,
                slot,
                item = %removed.id,
                tick = now,
                "lasting item expired"
            );
            player.notify(&format!("{} has expired", removed.display_name()));
            report.expired.push((slot, removed));
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessPlayer;
    use crate::inventory::PlayerInventory;

    fn lasting_sword(level: u32) -> ItemInstance {
        ItemInstance::damageable("minecraft:iron_sword", 250).with_enchantment(Enchantment::Lasting, level)
    }

    #[test]
    fn test_duration_table_lookup() {
        let sweeper = LastingSweeper::default();
        assert_eq!(sweeper.duration_for(&lasting_sword(1)), 300);
        assert_eq!(sweeper.duration_for(&lasting_sword(3)), LASTING_TICKS[2]);
        assert_eq!(sweeper.duration_for(&lasting_sword(10)), LASTING_TICKS[9]);
        assert_eq!(sweeper.duration_for(&lasting_sword(255)), LASTING_TICKS[9]);

        let mut custom = lasting_sword(3);
        custom.metadata.lasting_duration = Some(42);
        assert_eq!(sweeper.duration_for(&custom), 42);
    }

    #[test]
    fn test_assign_then_expire() {
        let sweeper = LastingSweeper::default();
        let mut player = HeadlessPlayer::new("alice");
        player.inventory.set_item(4, lasting_sword(3)).unwrap();

        let join_tick = 1_000;
        let report = sweeper.sweep(&mut player, join_tick);
        assert_eq!(report.assigned, vec![4]);
        let expiration = join_tick + LASTING_TICKS[2];
        assert_eq!(player.inventory.item(4).unwrap().metadata.lasting_expiration, Some(expiration));

        let report = sweeper.sweep(&mut player, expiration - 1);
        assert!(report.is_empty());
        assert!(!player.inventory.item(4).unwrap().is_empty());

        let report = sweeper.sweep(&mut player, expiration);
        assert_eq!(report.expired.len(), 1);
        assert!(player.inventory.item(4).unwrap().is_empty());
        assert_eq!(player.messages, vec!["Iron Sword has expired".to_string()]);
    }

    #[test]
    fn test_stale_tag_cleaned() {
        let sweeper = LastingSweeper::default();
        let mut player = HeadlessPlayer::new("bob");
        let mut plain = ItemInstance::new("minecraft:bread", 5);
        plain.metadata.lasting_expiration = Some(10);
        player.inventory.set_item(0, plain).unwrap();

        let report = sweeper.sweep(&mut player, 50);
        assert_eq!(report.cleaned, vec![0]);
        assert!(report.expired.is_empty());
        let bread = player.inventory.item(0).unwrap();
        assert_eq!(bread.count, 5);
        assert_eq!(bread.metadata.lasting_expiration, None);
    }

    #[test]
    fn test_duration_override_implies_level_one() {
        let sweeper = LastingSweeper::default();
        let mut player = HeadlessPlayer::new("carol");
        let mut torch = ItemInstance::new("minecraft:torch", 16);
        torch.metadata.lasting_duration = Some(100);
        player.inventory.set_item(2, torch).unwrap();

        sweeper.sweep(&mut player, 0);
        let torch = player.inventory.item(2).unwrap();
        assert_eq!(torch.enchantment_level(&Enchantment::Lasting), 1);
        assert_eq!(torch.metadata.lasting_expiration, Some(100));
    }

    #[test]
    fn test_moved_item_keeps_expiration() {
        let sweeper = LastingSweeper::default();
        let mut player = HeadlessPlayer::new("dave");
        player.inventory.set_item(0, lasting_sword(1)).unwrap();
        sweeper.sweep(&mut player, 0);

        let sword = player.inventory.take_item(0).unwrap();
        player.inventory.set_item(20, sword).unwrap();
        let report = sweeper.sweep(&mut player, 300);
        assert_eq!(report.expired.iter().map(|(slot, _)| *slot).collect::<Vec<_>>(), vec![20]);
    }
}
