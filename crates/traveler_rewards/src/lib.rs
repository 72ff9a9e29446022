//! # Traveler Rewards
//!
//! Per-player reward state and anvil recipe resolution for a game rewards
//! layer. The host engine is reached only through the traits in [`host`];
//! everything here runs synchronously inside one tick.
//!
//! ## Design Principles
//!
//! 1. **No singletons** - one [`TravelerService`] is built at server start
//!    and owns every registry
//! 2. **Typed items** - item state lives in [`ItemMetadata`] fields, not
//!    string-keyed tags
//! 3. **First match wins** - anvil rules are evaluated in registration order
//! 4. **External configuration** - whitelists and tuning come from TOML
//!
//! ## Example
//!
//! ```rust,ignore
//! use traveler_rewards::{HostEvent, RewardsConfig, TravelerService};
//!
//! let service = TravelerService::new(RewardsConfig::load("config/traveler_rewards.toml")?)?;
//!
//! service.dispatch(HostEvent::PlayerJoin { player: &mut player, saved: stored.as_ref() });
//! service.dispatch(HostEvent::ServerTick { tick, world: &mut world });
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod anvil;
pub mod attribute;
pub mod config;
pub mod effects;
pub mod error;
pub mod fabrication;
pub mod headless;
pub mod host;
pub mod inventory;
pub mod item;
pub mod lasting;
pub mod lifecycle;
pub mod loot_index;
pub mod persistence;
pub mod record;
pub mod registry;
pub mod service;
pub mod soulbound;

pub use anvil::{
    AnvilRecipeEngine, AnvilRecipeRule, AnvilResult, AnvilUpdate, Catalyst, MaterialOutcome,
    Progression, RuleKind,
};
pub use attribute::{AttributeHandle, AttributeInstance, AttributeKind, AttributeModifier, ModifierId};
pub use config::{
    AnvilWhitelists, FabricationSettings, LastingSettings, RewardSettings, RewardsConfig,
};
pub use effects::{EscapeOutcome, RewardEffects};
pub use error::{RewardsError, RewardsResult};
pub use fabrication::{ChestFabricator, FabricationOutcome};
pub use host::{
    BrewingTable, ChestKind, HostWorld, MobHandle, PlayerHandle, SoundKind, StructureInfo,
};
pub use inventory::{PlayerInventory, SlotInventory};
pub use item::{Enchantment, ItemId, ItemInstance, ItemMetadata};
pub use lasting::{LastingSweeper, SweepReport};
pub use loot_index::MobLootIndex;
pub use persistence::{TagBlock, TagValue};
pub use record::TravelerRecord;
pub use registry::{EntityStateRegistry, RecordHandle};
pub use service::{EventOutcome, HostEvent, TravelerService};
pub use soulbound::SoulboundSlotManager;
