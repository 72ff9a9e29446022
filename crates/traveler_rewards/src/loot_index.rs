//! # Mob Loot Index
//!
//! Which items each entity type can drop. The host reports entity loot
//! tables as it loads them; the Mob Ward asks whether a mob's drops
//! include its filter item.

use std::collections::{HashMap, HashSet};

use crate::item::ItemId;

/// Entity type -> items its loot tables can produce.
#[derive(Debug, Default, Clone)]
pub struct MobLootIndex {
    drops: HashMap<String, HashSet<ItemId>>,
}

impl MobLootIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the items of one loot table.
    ///
    /// Only tables under `entities/` are indexed; `ns:entities/zombie/baby`
    /// is attributed to `ns:zombie`. Returns the entity type the table was
    /// filed under, or `None` if it was ignored.
    pub fn record_loot_table<I>(&mut self, table_id: &str, items: I) -> Option<String>
    where
        I: IntoIterator<Item = ItemId>,
    {
        let entity = entity_for_table(table_id)?;
        let items: HashSet<ItemId> = items.into_iter().collect();
        if items.is_empty() {
            return None;
        }
        self.drops.entry(entity.clone()).or_default().extend(items);
        Some(entity)
    }

    /// True if mobs of `entity_type` can drop `item`.
    #[must_use]
    pub fn is_warded_by(&self, entity_type: &str, item: &ItemId) -> bool {
        self.drops
            .get(entity_type)
            .is_some_and(|drops| drops.contains(item))
    }

    /// Number of indexed entity types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.drops.len()
    }

    /// True if nothing has been indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drops.is_empty()
    }

    /// Forgets everything (server stop).
    pub fn clear(&mut self) {
        self.drops.clear();
    }
}

fn entity_for_table(table_id: &str) -> Option<String> {
    let (namespace, path) = table_id.split_once(':').unwrap_or(("minecraft", table_id));
    let entity_path = path.strip_prefix("entities/")?;
    let base = entity_path.split('/').next().filter(|s| !s.is_empty())?;
    Some(format!("{namespace}:{base}"))
}
