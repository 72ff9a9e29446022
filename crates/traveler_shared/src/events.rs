//! Event vocabulary delivered by the host engine.
//!
//! The payload-carrying event type lives in the rewards core because it
//! borrows host handles. This module only names the kinds, so adapters and
//! logs can refer to them without depending on the core.

use serde::{Deserialize, Serialize};

/// Event type discriminator
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Player joined the server
    PlayerJoin = 0,
    /// Player left the server
    PlayerLeave = 1,
    /// Player died
    PlayerDeath = 2,
    /// Player respawned after death
    PlayerRespawn = 3,
    /// Fixed-interval server tick
    ServerTick = 4,
    /// Player tossed an item out of the inventory
    ItemToss = 5,
    /// Anvil inputs changed
    AnvilUpdate = 6,
    /// Player came near a tracked structure
    NearStructure = 7,
}

impl EventKind {
    /// Stable lowercase name, used as a log field.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PlayerJoin => "player_join",
            Self::PlayerLeave => "player_leave",
            Self::PlayerDeath => "player_death",
            Self::PlayerRespawn => "player_respawn",
            Self::ServerTick => "server_tick",
            Self::ItemToss => "item_toss",
            Self::AnvilUpdate => "anvil_update",
            Self::NearStructure => "near_structure",
        }
    }
}

/// Which hand triggered an item use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
    /// Main hand
    Main,
    /// Off hand
    Off,
}
