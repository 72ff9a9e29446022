//! # Record Persistence
//!
//! Converts a [`TravelerRecord`] to and from a [`TagBlock`], the logical
//! shape the host stores alongside player data:
//!
//! | Key                   | Type        | Content                      |
//! |-----------------------|-------------|------------------------------|
//! | `soulbound_slots`     | `IntArray`  | bound slot indices           |
//! | `total_hearts`        | `Int`       | Pure Hearts consumed         |
//! | `total_deaths`        | `Int`       | deaths                       |
//! | `death_location`      | `Str`       | `x,y,z\|dimension`, optional |
//! | `structure_entry_pos` | `Str`       | `x,y,z`, optional            |
//!
//! Items awaiting return after a death are not persisted: leaving drops them
//! into the world.
//!
//! Loading never fails. A missing key leaves the field at its default; a
//! key with the wrong type or an unparsable value is logged and skipped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use traveler_shared::{BlockPos, DeathLocation};

use crate::error::{RewardsError, RewardsResult};
use crate::record::TravelerRecord;

/// Key: soulbound slot indices.
pub const KEY_SOULBOUND_SLOTS: &str = "soulbound_slots";
/// Key: Pure Hearts consumed.
pub const KEY_TOTAL_HEARTS: &str = "total_hearts";
/// Key: total deaths.
pub const KEY_TOTAL_DEATHS: &str = "total_deaths";
/// Key: last death location.
pub const KEY_DEATH_LOCATION: &str = "death_location";
/// Key: structure entry position.
pub const KEY_STRUCTURE_ENTRY_POS: &str = "structure_entry_pos";

/// A typed tag value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagValue {
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// Array of 32-bit integers.
    IntArray(Vec<i32>),
    /// String.
    Str(String),
    /// Nested block.
    Compound(TagBlock),
}

impl TagValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "Int",
            Self::Long(_) => "Long",
            Self::IntArray(_) => "IntArray",
            Self::Str(_) => "Str",
            Self::Compound(_) => "Compound",
        }
    }
}

/// String-keyed, ordered tag store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagBlock {
    entries: BTreeMap<String, TagValue>,
}

impl TagBlock {
    /// Creates an empty block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, returning the previous value.
    pub fn put(&mut self, key: impl Into<String>, value: TagValue) -> Option<TagValue> {
        self.entries.insert(key.into(), value)
    }

    /// Value under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.entries.get(key)
    }

    /// Removes and returns the value under `key`.
    pub fn remove(&mut self, key: &str) -> Option<TagValue> {
        self.entries.remove(key)
    }

    /// True if `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the block has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Integer under `key`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedTag` if the key holds another type.
    pub fn get_int(&self, key: &str) -> RewardsResult<Option<i32>> {
        match self.get(key) {
            None => Ok(None),
            Some(TagValue::Int(v)) => Ok(Some(*v)),
            Some(other) => Err(wrong_type(key, "Int", other)),
        }
    }

    /// Long under `key`. Ints widen.
    ///
    /// # Errors
    ///
    /// Returns `MalformedTag` if the key holds a non-integer.
    pub fn get_long(&self, key: &str) -> RewardsResult<Option<i64>> {
        match self.get(key) {
            None => Ok(None),
            Some(TagValue::Long(v)) => Ok(Some(*v)),
            Some(TagValue::Int(v)) => Ok(Some(i64::from(*v))),
            Some(other) => Err(wrong_type(key, "Long", other)),
        }
    }

    /// Integer array under `key`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedTag` if the key holds another type.
    pub fn get_int_array(&self, key: &str) -> RewardsResult<Option<&[i32]>> {
        match self.get(key) {
            None => Ok(None),
            Some(TagValue::IntArray(v)) => Ok(Some(v.as_slice())),
            Some(other) => Err(wrong_type(key, "IntArray", other)),
        }
    }

    /// String under `key`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedTag` if the key holds another type.
    pub fn get_str(&self, key: &str) -> RewardsResult<Option<&str>> {
        match self.get(key) {
            None => Ok(None),
            Some(TagValue::Str(v)) => Ok(Some(v.as_str())),
            Some(other) => Err(wrong_type(key, "Str", other)),
        }
    }

    /// Nested block under `key`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedTag` if the key holds another type.
    pub fn get_compound(&self, key: &str) -> RewardsResult<Option<&TagBlock>> {
        match self.get(key) {
            None => Ok(None),
            Some(TagValue::Compound(v)) => Ok(Some(v)),
            Some(other) => Err(wrong_type(key, "Compound", other)),
        }
    }

    /// Renders the block as TOML.
    ///
    /// # Errors
    ///
    /// Returns `TagSerialize` if TOML cannot represent the block.
    pub fn to_toml_string(&self) -> RewardsResult<String> {
        Ok(toml::to_string(self)?)
    }

    /// Parses a block previously rendered by [`Self::to_toml_string`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigParse` for text that is not a tag block.
    pub fn from_toml_str(source: &str) -> RewardsResult<Self> {
        Ok(toml::from_str(source)?)
    }
}

fn wrong_type(key: &str, expected: &str, found: &TagValue) -> RewardsError {
    RewardsError::MalformedTag {
        key: key.to_string(),
        reason: format!("expected {expected}, found {}", found.type_name()),
    }
}

fn malformed(key: &str, reason: impl Into<String>) -> RewardsError {
    RewardsError::MalformedTag {
        key: key.to_string(),
        reason: reason.into(),
    }
}

// ============================================================================
// Record <-> tag block
// ============================================================================

/// Writes the persistent part of `record`.
#[must_use]
pub fn serialize(record: &TravelerRecord) -> TagBlock {
    let mut tag = TagBlock::new();
    let slots = record
        .soulbound_slots()
        .iter()
        .filter_map(|&slot| i32::try_from(slot).ok())
        .collect();
    tag.put(KEY_SOULBOUND_SLOTS, TagValue::IntArray(slots));
    tag.put(KEY_TOTAL_HEARTS, TagValue::Int(saturating_i32(record.pure_hearts_consumed())));
    if let Some(pos) = record.structure_entry_pos {
        tag.put(KEY_STRUCTURE_ENTRY_POS, TagValue::Str(pos.to_tag_string()));
    }
    if let Some(location) = &record.last_death_location {
        tag.put(KEY_DEATH_LOCATION, TagValue::Str(location.to_tag_string()));
    }
    tag.put(KEY_TOTAL_DEATHS, TagValue::Int(saturating_i32(record.total_deaths())));
    tag
}

/// Rebuilds a record from `tag`, defaulting anything missing or malformed.
#[must_use]
pub fn deserialize(tag: &TagBlock) -> TravelerRecord {
    let mut record = TravelerRecord::new();

    if let Some(slots) = lenient(tag.get_int_array(KEY_SOULBOUND_SLOTS)) {
        let rejected = record.restore_soulbound_slots(slots.iter().map(|&s| i64::from(s)));
        if !rejected.is_empty() {
            tracing::warn!(?rejected, "dropped soulbound slots outside the inventory");
        }
    }

    let hearts = lenient(read_counter(tag, KEY_TOTAL_HEARTS)).unwrap_or(0);
    let deaths = lenient(read_counter(tag, KEY_TOTAL_DEATHS)).unwrap_or(0);
    record.restore_counters(hearts, deaths);

    record.structure_entry_pos = lenient(read_parsed(
        tag,
        KEY_STRUCTURE_ENTRY_POS,
        BlockPos::parse_tag_string,
    ));
    record.last_death_location = lenient(read_parsed(
        tag,
        KEY_DEATH_LOCATION,
        DeathLocation::parse_tag_string,
    ));

    record
}

/// Logs a decode error and turns it into "absent".
fn lenient<T>(result: RewardsResult<Option<T>>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(%err, "ignoring malformed persisted data");
            None
        }
    }
}

fn read_counter(tag: &TagBlock, key: &str) -> RewardsResult<Option<u32>> {
    match tag.get_int(key)? {
        None => Ok(None),
        Some(value) => u32::try_from(value)
            .map(Some)
            .map_err(|_| malformed(key, format!("negative counter {value}"))),
    }
}

fn read_parsed<T>(tag: &TagBlock, key: &str, parse: fn(&str) -> Option<T>) -> RewardsResult<Option<T>> {
    match tag.get_str(key)? {
        None => Ok(None),
        Some(text) => parse(text)
            .map(Some)
            .ok_or_else(|| malformed(key, format!("cannot parse `{text}`"))),
    }
}

fn saturating_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
