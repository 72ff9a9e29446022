//! # Traveler Shared
//!
//! Value types used by the rewards core and by every host adapter.
//!
//! Nothing in here talks to the host engine. Positions, slot layout
//! constants, the death-location value object and the event vocabulary
//! live here so adapters can build payloads without linking the core.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod events;
pub mod location;
pub mod math;

pub use constants::{
    ARMOR_SLOTS, HOTBAR_SLOTS, INVENTORY_SLOT_COUNT, LASTING_TICKS, MAIN_STORAGE_SLOTS,
    OFFHAND_SLOT, SWEEP_INTERVAL_TICKS, WARD_RADIUS,
};
pub use events::{EventKind, Hand};
pub use location::DeathLocation;
pub use math::{BlockPos, Vec3};
