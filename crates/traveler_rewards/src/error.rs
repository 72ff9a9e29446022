//! # Rewards Error Types
//!
//! Errors that can occur in the rewards core. Lifecycle and tick handlers
//! never let these escape to the host; they log and carry on.

use thiserror::Error;
use traveler_shared::BlockPos;

use crate::attribute::AttributeKind;

/// Errors that can occur in the rewards core.
#[derive(Error, Debug)]
pub enum RewardsError {
    /// Slot index outside the inventory shape.
    #[error("invalid slot {slot}: inventory has {slot_count} slots")]
    InvalidSlot {
        /// The rejected slot index.
        slot: usize,
        /// Number of slots the inventory actually has.
        slot_count: usize,
    },

    /// The host could not supply a required attribute.
    #[error("player has no {0:?} attribute")]
    MissingAttribute(AttributeKind),

    /// A persisted tag was present but unusable.
    #[error("malformed tag `{key}`: {reason}")]
    MalformedTag {
        /// Tag key.
        key: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The host has no chest block at the given position.
    #[error("no chest at {0:?}")]
    NoChest(BlockPos),

    /// An anvil rule with the same kind and catalyst is already registered.
    #[error("duplicate anvil rule: {0}")]
    DuplicateRule(String),

    /// Anvil rules are registered in an order that breaks in-place upgrades.
    #[error("anvil rule ordering violated for catalyst {0}")]
    RuleOrdering(String),

    /// Invalid configuration values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Config file could not be read.
    #[error("config io error: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Tag block could not be rendered as TOML.
    #[error("tag serialization error: {0}")]
    TagSerialize(#[from] toml::ser::Error),
}

/// Result type for rewards operations.
pub type RewardsResult<T> = Result<T, RewardsError>;
