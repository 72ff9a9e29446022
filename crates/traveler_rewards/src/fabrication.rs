//! # Chest Fabrication
//!
//! The Fabrication Ritual Tablet duplicates a single chest into the first
//! free neighbouring space. Only whitelisted building blocks are copied,
//! each into the slot it held in the source chest.
//!
//! Candidate spaces are tried west, east, north, south, then up. A side
//! space needs a solid block underneath; the space above rests on the
//! source chest itself.

use std::collections::BTreeSet;

use traveler_shared::BlockPos;

use crate::config::FabricationSettings;
use crate::host::{ChestKind, HostWorld};
use crate::item::{ItemId, ItemInstance};

const CANDIDATE_OFFSETS: [(i32, i32, i32); 5] =
    [(-1, 0, 0), (1, 0, 0), (0, 0, -1), (0, 0, 1), (0, 1, 0)];

/// Result of using a Fabrication Ritual Tablet on a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FabricationOutcome {
    /// A copy now stands at `at` holding `copied` stacks.
    Fabricated {
        /// Where the copy was placed.
        at: BlockPos,
        /// Stacks copied into it.
        copied: usize,
    },
    /// The target block is not a chest.
    InvalidTarget,
    /// The target is one half of a double chest.
    NotSingleChest,
    /// No neighbouring space can hold a chest.
    NoSpace,
    /// The host refused the placement or did not produce a chest.
    PlacementFailed,
}

impl FabricationOutcome {
    /// True if a chest was fabricated and the tablet should be consumed.
    #[must_use]
    pub const fn consumes_tablet(self) -> bool {
        matches!(self, Self::Fabricated { .. })
    }

    /// Player-facing text for this outcome.
    #[must_use]
    pub fn message(self) -> String {
        match self {
            Self::Fabricated { copied, .. } => {
                format!("The ritual fabricates a chest holding {copied} copied stacks")
            }
            Self::InvalidTarget => "The tablet must be used on a chest".to_string(),
            Self::NotSingleChest => "Only a single chest can be fabricated".to_string(),
            Self::NoSpace => "There is no room beside this chest".to_string(),
            Self::PlacementFailed => "The fabricated chest could not be placed".to_string(),
        }
    }
}

/// Duplicates chests using the configured block whitelist.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChestFabricator {
    blocks: BTreeSet<ItemId>,
}

impl ChestFabricator {
    /// Creates a fabricator copying the blocks listed in `settings`.
    #[must_use]
    pub fn new(settings: &FabricationSettings) -> Self {
        Self {
            blocks: settings.blocks.clone(),
        }
    }

    /// True if `item` is a whitelisted block stack.
    #[must_use]
    pub fn is_copyable(&self, item: &ItemInstance) -> bool {
        !item.is_empty() && self.blocks.contains(&item.id)
    }

    /// First neighbour of `source` that can hold a new chest.
    #[must_use]
    pub fn find_space(world: &dyn HostWorld, source: BlockPos) -> Option<BlockPos> {
        CANDIDATE_OFFSETS
            .iter()
            .map(|&(dx, dy, dz)| source.offset(dx, dy, dz))
            .find(|&pos| {
                world.is_replaceable(pos)
                    && (pos.y > source.y || world.is_solid(pos.offset(0, -1, 0)))
            })
    }

    /// Duplicates the chest at `source`.
    ///
    /// The source chest is never modified. A stack the new chest rejects is
    /// logged and left out of the copied count.
    pub fn fabricate(&self, world: &mut dyn HostWorld, source: BlockPos) -> FabricationOutcome {
        match world.chest_at(source) {
            None => return FabricationOutcome::InvalidTarget,
            Some(ChestKind::Double) => return FabricationOutcome::NotSingleChest,
            Some(ChestKind::Single) => {}
        }

        let Some(at) = Self::find_space(&*world, source) else {
            return FabricationOutcome::NoSpace;
        };
        if !world.place_copy(source, at) || world.chest_at(at).is_none() {
            tracing::warn!(?source, ?at, "chest copy placement failed");
            return FabricationOutcome::PlacementFailed;
        }

        let mut copied = 0;
        for (slot, item) in world.chest_items(source).into_iter().enumerate() {
            if !self.is_copyable(&item) {
                continue;
            }
            match world.set_chest_item(at, slot, item) {
                Ok(()) => copied += 1,
                Err(err) => tracing::warn!(?at, slot, %err, "fabricated chest rejected a stack"),
            }
        }

        tracing::info!(?source, ?at, copied, "chest fabricated");
        FabricationOutcome::Fabricated { at, copied }
    }
}
