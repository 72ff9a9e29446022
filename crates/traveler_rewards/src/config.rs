//! # Rewards Configuration
//!
//! Loaded once at server start from a TOML file. Every section and key is
//! optional; missing values fall back to the built-in defaults.
//!
//! ```toml
//! [anvil]
//! whetstone_weapons = ["minecraft:iron_sword", "minecraft:iron_axe"]
//!
//! [lasting]
//! sweep_interval = 20
//!
//! [rewards]
//! pure_heart_health = 2.0
//!
//! [fabrication]
//! blocks = ["minecraft:cobblestone", "minecraft:oak_log"]
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use traveler_shared::constants::{
    ATTACK_SPEED_MULTIPLIER, DEEP_CAVE_MAX_Y, LASTING_TICKS, PURE_HEART_HEALTH, STRUCTURE_RANGE,
    SWEEP_INTERVAL_TICKS, WARD_RADIUS,
};

use crate::error::{RewardsError, RewardsResult};
use crate::item::ItemId;

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardsConfig {
    /// Anvil whitelists.
    pub anvil: AnvilWhitelists,
    /// Lasting curse timing.
    pub lasting: LastingSettings,
    /// Reward tuning.
    pub rewards: RewardSettings,
    /// Chest fabrication whitelist.
    pub fabrication: FabricationSettings,
}

/// Items each anvil catalyst may be applied to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnvilWhitelists {
    /// Weapons a whetstone can sharpen.
    pub whetstone_weapons: BTreeSet<ItemId>,
    /// Tools and armor a bracing can reinforce.
    pub bracing_equipment: BTreeSet<ItemId>,
    /// Tools and armor an hourglass can curse.
    pub hourglass_equipment: BTreeSet<ItemId>,
    /// Gear a diamond shard repairs.
    pub diamond_repair_equip: BTreeSet<ItemId>,
    /// Gear an iron bloom repairs.
    pub iron_repair_equip: BTreeSet<ItemId>,
    /// Gear a gold bloom repairs.
    pub gold_repair_equip: BTreeSet<ItemId>,
    /// Gear a netherite bloom repairs.
    pub netherite_repair_equip: BTreeSet<ItemId>,
}

/// Lasting curse timing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LastingSettings {
    /// Lifetime in ticks by level, indexed by `min(level - 1, 9)`.
    pub ticks: Vec<u64>,
    /// Ticks between sweeps.
    pub sweep_interval: u64,
}

/// Reward effect tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardSettings {
    /// Max health added per Pure Heart.
    pub pure_heart_health: f64,
    /// Multiplier per attack speed reward use.
    pub attack_speed_multiplier: f64,
    /// Radius within which warded mobs flee.
    pub ward_radius: i32,
    /// Distance from a structure origin that still counts as inside it.
    pub structure_range: i32,
    /// Y level below which the player is in the deep caves.
    pub deep_cave_max_y: i32,
}

/// Blocks the Fabrication Ritual Tablet may duplicate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FabricationSettings {
    /// Block items copied into a fabricated chest. Anything else is left out.
    pub blocks: BTreeSet<ItemId>,
}

const FABRICATION_BLOCKS: [&str; 37] = [
    "dirt", "grass_block", "cobblestone", "stone", "gravel", "coarse_dirt", "podzol", "mud",
    "sand", "red_sand", "sand_stone", "soul_sand", "mycelium",
    "oak_planks", "spruce_planks", "birch_planks", "jungle_planks", "acacia_planks",
    "dark_oak_planks",
    "oak_log", "spruce_log", "birch_log", "jungle_log", "acacia_log", "dark_oak_log",
    "andesite", "diorite", "granite", "deepslate", "tuff",
    "bricks", "stone_bricks", "nether_bricks", "basalt", "blackstone", "end_stone", "prismarine",
];

const MATERIALS: [&str; 6] = ["wooden", "stone", "iron", "golden", "diamond", "netherite"];
const ARMOR_MATERIALS: [&str; 6] = ["leather", "chainmail", "iron", "golden", "diamond", "netherite"];
const TOOLS: [&str; 5] = ["sword", "axe", "pickaxe", "shovel", "hoe"];
const ARMOR: [&str; 4] = ["helmet", "chestplate", "leggings", "boots"];

fn vanilla(names: impl IntoIterator<Item = String>) -> BTreeSet<ItemId> {
    names
        .into_iter()
        .map(|name| ItemId::new(format!("minecraft:{name}")))
        .collect()
}

fn weapons() -> BTreeSet<ItemId> {
    vanilla(
        MATERIALS
            .iter()
            .flat_map(|m| ["sword", "axe"].iter().map(move |t| format!("{m}_{t}"))),
    )
}

fn tools_and_armor() -> BTreeSet<ItemId> {
    let tools = MATERIALS
        .iter()
        .flat_map(|m| TOOLS.iter().map(move |t| format!("{m}_{t}")));
    let armor = ARMOR_MATERIALS
        .iter()
        .flat_map(|m| ARMOR.iter().map(move |a| format!("{m}_{a}")));
    vanilla(tools.chain(armor))
}

fn material_tools(material: &str) -> BTreeSet<ItemId> {
    vanilla(TOOLS.iter().map(|t| format!("{material}_{t}")))
}

impl Default for AnvilWhitelists {
    fn default() -> Self {
        Self {
            whetstone_weapons: weapons(),
            bracing_equipment: tools_and_armor(),
            hourglass_equipment: tools_and_armor(),
            diamond_repair_equip: material_tools("diamond"),
            iron_repair_equip: material_tools("iron"),
            gold_repair_equip: material_tools("golden"),
            netherite_repair_equip: material_tools("netherite"),
        }
    }
}

impl Default for FabricationSettings {
    fn default() -> Self {
        Self {
            blocks: vanilla(FABRICATION_BLOCKS.iter().map(ToString::to_string)),
        }
    }
}

impl Default for LastingSettings {
    fn default() -> Self {
        Self {
            ticks: LASTING_TICKS.to_vec(),
            sweep_interval: SWEEP_INTERVAL_TICKS,
        }
    }
}

impl Default for RewardSettings {
    fn default() -> Self {
        Self {
            pure_heart_health: PURE_HEART_HEALTH,
            attack_speed_multiplier: ATTACK_SPEED_MULTIPLIER,
            ward_radius: WARD_RADIUS,
            structure_range: STRUCTURE_RANGE,
            deep_cave_max_y: DEEP_CAVE_MAX_Y,
        }
    }
}

impl LastingSettings {
    /// The duration table as a fixed array.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` unless the table has exactly ten ascending entries.
    pub fn table(&self) -> RewardsResult<[u64; 10]> {
        let table: [u64; 10] = self.ticks.as_slice().try_into().map_err(|_| {
            RewardsError::InvalidConfig(format!(
                "lasting.ticks must have 10 entries, found {}",
                self.ticks.len()
            ))
        })?;
        if !table.windows(2).all(|w| w[0] < w[1]) {
            return Err(RewardsError::InvalidConfig(
                "lasting.ticks must be strictly ascending".to_string(),
            ));
        }
        Ok(table)
    }
}

impl RewardsConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigParse` for malformed TOML and `InvalidConfig` for
    /// values that fail validation.
    pub fn from_toml_str(source: &str) -> RewardsResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigIo` if the file cannot be read, otherwise as
    /// [`RewardsConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> RewardsResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Checks cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` describing the first violation.
    pub fn validate(&self) -> RewardsResult<()> {
        self.lasting.table()?;
        if self.lasting.sweep_interval == 0 {
            return Err(RewardsError::InvalidConfig(
                "lasting.sweep_interval must be positive".to_string(),
            ));
        }
        if !(self.rewards.attack_speed_multiplier > 0.0) {
            return Err(RewardsError::InvalidConfig(
                "rewards.attack_speed_multiplier must be positive".to_string(),
            ));
        }
        if self.rewards.ward_radius < 0 || self.rewards.structure_range < 0 {
            return Err(RewardsError::InvalidConfig(
                "rewards ranges must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
