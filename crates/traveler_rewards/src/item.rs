//! # Item Model
//!
//! The host's item stacks reduced to what the rewards core reads and writes:
//! an identity, a count, durability, enchantment levels and a typed
//! metadata block. Metadata fields are named and optional instead of the
//! host's free-form key/value tags, so a typo is a compile error rather
//! than a silently missing tag.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Namespaced item identity, e.g. `minecraft:iron_sword`.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Creates an item id from its namespaced name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The namespaced name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name without the namespace.
    #[must_use]
    pub fn path(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(_, path)| path)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Item ids the core recognises.
pub mod ids {
    /// Pure Heart - permanent max health.
    pub const PURE_HEART: &str = "hbs_traveler_rewards:pure_heart";
    /// Soulbound Ritual Tablet - binds an inventory slot.
    pub const SOULBOUND_RITUAL_TABLET: &str = "hbs_traveler_rewards:soulbound_ritual_tablet";
    /// Escape Rope - returns the player to a structure entrance or the surface.
    pub const ESCAPE_ROPE: &str = "hbs_traveler_rewards:escape_rope";
    /// Potion Pot - shatters into brewed potions when tossed.
    pub const POTION_POT: &str = "hbs_traveler_rewards:potion_pot";
    /// Mob Ward - pacifies mobs that drop the filter item.
    pub const MOB_WARD: &str = "hbs_traveler_rewards:mob_ward";
    /// Empty Totem - wraps a single item.
    pub const EMPTY_TOTEM: &str = "hbs_traveler_rewards:empty_totem";

    /// Sharpness catalyst, tier 1.
    pub const WHETSTONE: &str = "hbs_traveler_rewards:whetstone";
    /// Sharpness catalyst, tier 2.
    pub const NETHERITE_WHETSTONE: &str = "hbs_traveler_rewards:netherite_whetstone";
    /// Unbreaking catalyst, tier 1.
    pub const BRACING: &str = "hbs_traveler_rewards:bracing";
    /// Unbreaking catalyst, tier 2.
    pub const NETHERITE_BRACING: &str = "hbs_traveler_rewards:netherite_bracing";
    /// Lasting catalyst, tier 1.
    pub const HOURGLASS: &str = "hbs_traveler_rewards:hourglass";
    /// Lasting catalyst, tier 2.
    pub const DIAMOND_HOURGLASS: &str = "hbs_traveler_rewards:diamond_hourglass";

    /// Repairs diamond gear.
    pub const DIAMOND_SHARD: &str = "hbs_traveler_rewards:diamond_shard";
    /// Repairs iron gear.
    pub const IRON_BLOOM: &str = "hbs_traveler_rewards:iron_bloom";
    /// Repairs gold gear.
    pub const GOLD_BLOOM: &str = "hbs_traveler_rewards:gold_bloom";
    /// Repairs netherite gear.
    pub const NETHERITE_BLOOM: &str = "hbs_traveler_rewards:netherite_bloom";

    /// Vanilla potion item.
    pub const POTION: &str = "minecraft:potion";
    /// Vanilla awkward potion type.
    pub const AWKWARD: &str = "minecraft:awkward";
}

/// Enchantments the core reads or writes.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Enchantment {
    /// Extra melee damage.
    Sharpness,
    /// Durability loss reduction.
    Unbreaking,
    /// Time-limited curse; the item is removed once it expires.
    Lasting,
    /// Anything else, carried through untouched.
    Other(String),
}

/// Typed replacement for the per-item tag store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMetadata {
    /// Tick at which a Lasting item disappears.
    pub lasting_expiration: Option<u64>,
    /// Lifetime override in ticks, used instead of the level table.
    pub lasting_duration: Option<u64>,
    /// Mob Ward filter: mobs that drop this item are pacified.
    pub filter_item: Option<Box<ItemInstance>>,
    /// Contents of holder items, keyed by holder slot.
    pub stored_items: BTreeMap<usize, ItemInstance>,
    /// Potion type for potion items.
    pub potion: Option<String>,
    /// Number of base potions inside a Potion Pot.
    pub potion_base_count: Option<u32>,
    /// Ingredient loaded into a Potion Pot.
    pub potion_ingredient: Option<Box<ItemInstance>>,
}

/// An item stack as seen by the rewards core.
///
/// An empty stack has count 0; every accessor treats it as "nothing here".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInstance {
    /// Item identity.
    pub id: ItemId,
    /// Stack size.
    pub count: u32,
    /// Current damage; 0 is pristine.
    pub damage: u32,
    /// Damage at which the item breaks; 0 for items without durability.
    pub max_damage: u32,
    /// Enchantment levels.
    pub enchantments: BTreeMap<Enchantment, u32>,
    /// Typed tag data.
    pub metadata: ItemMetadata,
}

impl ItemInstance {
    /// Creates an empty stack.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a stack of `count` plain items.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, count: u32) -> Self {
        Self {
            id: id.into(),
            count,
            ..Self::default()
        }
    }

    /// Creates a single damageable item.
    #[must_use]
    pub fn damageable(id: impl Into<ItemId>, max_damage: u32) -> Self {
        Self {
            max_damage,
            ..Self::new(id, 1)
        }
    }

    /// Sets an enchantment level, builder style.
    #[must_use]
    pub fn with_enchantment(mut self, enchantment: Enchantment, level: u32) -> Self {
        self.set_enchantment(enchantment, level);
        self
    }

    /// Sets the damage value, builder style.
    #[must_use]
    pub fn with_damage(mut self, damage: u32) -> Self {
        self.damage = damage;
        self
    }

    /// Returns true if this slot is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.id.as_str().is_empty()
    }

    /// True if the item has durability and has lost some of it.
    #[must_use]
    pub fn is_damaged(&self) -> bool {
        self.max_damage > 0 && self.damage > 0
    }

    /// Level of `enchantment`, 0 when absent.
    #[must_use]
    pub fn enchantment_level(&self, enchantment: &Enchantment) -> u32 {
        self.enchantments.get(enchantment).copied().unwrap_or(0)
    }

    /// Sets `enchantment` to `level`; level 0 removes it.
    pub fn set_enchantment(&mut self, enchantment: Enchantment, level: u32) {
        if level == 0 {
            self.enchantments.remove(&enchantment);
        } else {
            self.enchantments.insert(enchantment, level);
        }
    }

    /// Removes `amount` items from the stack, clearing it when it runs out.
    pub fn shrink(&mut self, amount: u32) {
        self.count = self.count.saturating_sub(amount);
        if self.count == 0 {
            *self = Self::empty();
        }
    }

    /// Same item and same tags, ignoring stack size.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.id == other.id
            && self.damage == other.damage
            && self.enchantments == other.enchantments
            && self.metadata == other.metadata
    }

    /// Human-readable name for player notifications.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.id
            .path()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect()
                })
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    // =========================================================================
    // Holder items (Mob Ward, Empty Totem)
    // =========================================================================

    /// Number of storage slots a holder item exposes; 0 for non-holders.
    #[must_use]
    pub fn holder_capacity(&self) -> usize {
        match self.id.as_str() {
            ids::MOB_WARD | ids::EMPTY_TOTEM => 1,
            _ => 0,
        }
    }

    /// Item stored in holder slot `slot`, if any.
    #[must_use]
    pub fn stored_item(&self, slot: usize) -> Option<&ItemInstance> {
        self.metadata.stored_items.get(&slot).filter(|item| !item.is_empty())
    }

    /// Stores `item` in holder slot `slot`; an empty item clears the slot.
    ///
    /// Returns false when the slot is outside the holder's capacity.
    pub fn set_stored_item(&mut self, slot: usize, item: ItemInstance) -> bool {
        if slot >= self.holder_capacity() {
            return false;
        }
        if item.is_empty() {
            self.metadata.stored_items.remove(&slot);
        } else {
            self.metadata.stored_items.insert(slot, item);
        }
        true
    }

    /// Removes and returns the item in holder slot `slot`.
    pub fn take_stored_item(&mut self, slot: usize) -> Option<ItemInstance> {
        self.metadata
            .stored_items
            .remove(&slot)
            .filter(|item| !item.is_empty())
    }

    /// Sets the Mob Ward filter item.
    pub fn set_ward_filter(&mut self, filter: ItemInstance) {
        self.metadata.filter_item = if filter.is_empty() {
            None
        } else {
            Some(Box::new(filter))
        };
    }

    /// Mob Ward filter item, if configured.
    #[must_use]
    pub fn ward_filter(&self) -> Option<&ItemInstance> {
        self.metadata
            .filter_item
            .as_deref()
            .filter(|item| !item.is_empty())
    }
}
