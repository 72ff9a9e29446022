//! # Slot Layout & Timing Constants
//!
//! Values the core bakes in. Anything a server operator may want to tune
//! is mirrored in the rewards config with these as defaults.

use std::ops::Range;

// =============================================================================
// INVENTORY LAYOUT
// =============================================================================

/// Total number of addressable player inventory slots.
pub const INVENTORY_SLOT_COUNT: usize = 41;

/// Hotbar slots.
pub const HOTBAR_SLOTS: Range<usize> = 0..9;

/// Main storage slots, searched when a main-hand binding spills over.
pub const MAIN_STORAGE_SLOTS: Range<usize> = 9..36;

/// Offhand slot index.
pub const OFFHAND_SLOT: usize = 36;

/// Armor slots (helmet, chest, legs, boots).
pub const ARMOR_SLOTS: Range<usize> = 37..41;

/// Offhand plus armor, searched when an off-hand binding spills over.
pub const OFFHAND_AND_ARMOR_SLOTS: Range<usize> = OFFHAND_SLOT..INVENTORY_SLOT_COUNT;

// =============================================================================
// TIMING
// =============================================================================

/// Ticks between two expiration / mob-ward sweeps.
pub const SWEEP_INTERVAL_TICKS: u64 = 20;

/// Lasting curse lifetime by level, indexed by `min(level - 1, 9)`.
///
/// Entry 0 is the implicit base level; the rest double from five minutes.
pub const LASTING_TICKS: [u64; 10] = [
    300,
    6_000,
    12_000,
    24_000,
    48_000,
    96_000,
    192_000,
    384_000,
    768_000,
    1_536_000,
];

// =============================================================================
// REWARD TUNING
// =============================================================================

/// Health added by one Pure Heart (one full heart).
pub const PURE_HEART_HEALTH: f64 = 2.0;

/// Per-use multiplier for the attack speed bonus.
pub const ATTACK_SPEED_MULTIPLIER: f64 = 1.1;

/// Mobs closer than this to a warded player are told to flee.
pub const WARD_RADIUS: i32 = 16;

/// Distance a warded mob tries to put between itself and the player.
pub const WARD_FLEE_DISTANCE: f64 = 5.0;

/// Navigation speed multiplier for the flee order.
pub const WARD_FLEE_SPEED: f64 = 1.2;

/// A player within this many blocks of a structure origin is inside it.
pub const STRUCTURE_RANGE: i32 = 64;

/// Below this y a player counts as being in the deep caves.
pub const DEEP_CAVE_MAX_Y: i32 = 16;

/// Flat anvil cost reported by every reward recipe.
pub const ANVIL_COST: u32 = 1;
