//! # Player Lifecycle Transitions
//!
//! State changes a record goes through as its player joins, dies, respawns
//! and leaves.
//!
//! ```text
//! Absent --join--> Active --death--> Active (items held back)
//!                    ^                  |
//!                    +----respawn-------+   (items returned)
//! Active --leave--> Absent  (unreturned items dropped in the world)
//! ```
//!
//! These functions touch only the record and the player they are given;
//! registry bookkeeping belongs to the service.

use traveler_shared::{DeathLocation, Vec3};

use crate::host::PlayerHandle;
use crate::record::TravelerRecord;

/// Returns held-back items to their original slots.
///
/// Returns the number of items put back. An item whose slot no longer exists
/// is dropped at the player's feet instead of being lost.
pub fn on_join(record: &mut TravelerRecord, player: &mut dyn PlayerHandle) -> usize {
    let restored = restore_pending(record, player);
    tracing::info!(
        player = %player.id(),
        restored,
        soulbound = record.soulbound_slots.len(),
        "traveler joined"
    );
    restored
}

/// Records the death and moves every soulbound slot's contents into the
/// pending buffer, leaving those inventory slots empty.
///
/// Empty soulbound slots are recorded too, so the buffer keys always equal
/// the bound slots at the moment of death.
pub fn on_death(record: &mut TravelerRecord, player: &mut dyn PlayerHandle) {
    record.total_deaths = record.total_deaths.saturating_add(1);

    match player.block_position() {
        Some(pos) => {
            record.last_death_location = Some(DeathLocation::new(pos, player.dimension_id()));
        }
        None => tracing::debug!(player = %player.id(), "death position unresolvable"),
    }

    let slots: Vec<usize> = record.soulbound_slots.iter().copied().collect();
    for slot in slots {
        let item = player.inventory_mut().take_item(slot).unwrap_or_default();
        record.pending_return.insert(slot, item);
    }

    tracing::info!(
        player = %player.id(),
        deaths = record.total_deaths,
        held = record.pending_return.len(),
        "traveler died"
    );
}

/// Returns held-back items after a respawn.
pub fn on_respawn(record: &mut TravelerRecord, player: &mut dyn PlayerHandle) -> usize {
    restore_pending(record, player)
}

/// Drops any items still waiting to be returned, then empties the buffer.
///
/// The drop point is the player's position, else the last death location,
/// else the respawn point. When none resolves the items are discarded.
/// Returns where the items were dropped, if anywhere.
pub fn on_leave(record: &mut TravelerRecord, player: &mut dyn PlayerHandle) -> Option<Vec3> {
    let dropped_at = if record.has_pending_return() {
        drop_pending(record, player)
    } else {
        record.pending_return.clear();
        None
    };

    tracing::info!(player = %player.id(), "traveler left");
    dropped_at
}

fn drop_pending(record: &mut TravelerRecord, player: &mut dyn PlayerHandle) -> Option<Vec3> {
    let pending = std::mem::take(&mut record.pending_return);
    let items: Vec<_> = pending.into_values().filter(|item| !item.is_empty()).collect();

    let anchor = player
        .block_position()
        .or_else(|| record.last_death_location.as_ref().map(DeathLocation::position))
        .or_else(|| player.respawn_position());
    let Some(anchor) = anchor else {
        tracing::debug!(
            player = %player.id(),
            items = items.len(),
            "no drop position for pending items"
        );
        return None;
    };

    let at = anchor.drop_point();
    for item in items {
        player.spawn_item(at, item);
    }
    Some(at)
}

fn restore_pending(record: &mut TravelerRecord, player: &mut dyn PlayerHandle) -> usize {
    let pending = std::mem::take(&mut record.pending_return);
    let mut restored = 0;
    for (slot, item) in pending {
        if item.is_empty() {
            continue;
        }
        let inventory = player.inventory_mut();
        let leftover = inventory.take_item(slot).filter(|existing| !existing.is_empty());
        if let Err(err) = inventory.set_item(slot, item.clone()) {
            tracing::warn!(player = %player.id(), slot, %err, "pending item slot missing");
            if let Some(feet) = player.block_position() {
                player.spawn_item(feet.drop_point(), item);
            }
            continue;
        }
        if let Some(leftover) = leftover {
            if let Some(feet) = player.block_position() {
                player.spawn_item(feet.drop_point(), leftover);
            }
        }
        restored += 1;
    }
    restored
}
