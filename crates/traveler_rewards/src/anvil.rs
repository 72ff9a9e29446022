//! # Anvil Recipe Engine
//!
//! Ordered registry of two-input anvil rules. The left slot holds the item
//! being improved, the right slot a catalyst. Rules are tried in
//! registration order and the first one whose guard passes produces the
//! result; nothing is combined.
//!
//! Each reward family pairs two rules on one catalyst:
//!
//! | Kind                | Guard                                         | Effect                       |
//! |---------------------|-----------------------------------------------|------------------------------|
//! | `EnchantmentDriven` | left already has the enchantment, below caps  | raise level, tier-gated      |
//! | `MaterialDriven`    | left item id is whitelisted, enchantment absent | add level `tier`           |
//!
//! The enchantment-driven rule must come first so an enchanted item is
//! upgraded in place instead of getting a fresh first level.
//!
//! Repair rules are material-driven: whitelisted and damaged items get a
//! quarter of their durability back.

use std::collections::BTreeSet;
use std::fmt;

use traveler_shared::constants::ANVIL_COST;

use crate::config::AnvilWhitelists;
use crate::error::{RewardsError, RewardsResult};
use crate::item::{ids, Enchantment, ItemId, ItemInstance};

/// Catalyst tier at which a level may pass the per-tier step.
pub const HIGH_TIER: u32 = 2;

// ============================================================================
// Rule model
// ============================================================================

/// Right-hand item a rule is bound to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalyst {
    /// Catalyst identity.
    pub item: ItemId,
    /// Potency; 1 for basic catalysts, 2 for upgraded ones.
    pub tier: u32,
}

impl Catalyst {
    /// Creates a catalyst.
    #[must_use]
    pub fn new(item: impl Into<ItemId>, tier: u32) -> Self {
        Self {
            item: item.into(),
            tier,
        }
    }

    fn accepts(&self, right: &ItemInstance) -> bool {
        !right.is_empty() && right.id == self.item
    }
}

/// Level progression of an enchantment-driven rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progression {
    /// Levels per tier; also the level a low-tier catalyst cannot pass.
    pub base_step: u32,
    /// Level at which no further upgrade is possible.
    pub absolute_cap: u32,
}

impl Progression {
    /// Creates a progression.
    #[must_use]
    pub const fn new(base_step: u32, absolute_cap: u32) -> Self {
        Self {
            base_step,
            absolute_cap,
        }
    }

    /// Next level for `current` with a catalyst of `tier`, or `None` when the
    /// upgrade is not allowed.
    #[must_use]
    pub fn next_level(self, current: u32, tier: u32) -> Option<u32> {
        if current == 0 || current >= self.absolute_cap {
            return None;
        }
        if current >= self.base_step && tier < HIGH_TIER {
            return None;
        }
        let tier_max = self.base_step.saturating_mul(tier);
        let next = current.saturating_add(tier).min(tier_max).min(self.absolute_cap);
        (next > current).then_some(next)
    }
}

/// What a material-driven rule does to a matching item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MaterialOutcome {
    /// Applies the first levels of an enchantment the item does not have yet.
    FirstLevel(Enchantment),
    /// Restores a quarter of max durability.
    Repair,
}

/// Discriminant of [`AnvilRecipeRule`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Keyed on an enchantment already present.
    EnchantmentDriven,
    /// Keyed on the left item's identity.
    MaterialDriven,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnchantmentDriven => f.write_str("enchantment-driven"),
            Self::MaterialDriven => f.write_str("material-driven"),
        }
    }
}

/// One anvil rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnvilRecipeRule {
    /// Upgrades an enchantment the left item already carries.
    EnchantmentDriven {
        /// Reward family, for logs and ordering checks.
        family: String,
        /// Enchantments that trigger the rule; the first one present is upgraded.
        trigger_enchantments: BTreeSet<Enchantment>,
        /// Right-hand item.
        catalyst: Catalyst,
        /// Level rules.
        progression: Progression,
    },
    /// Applies to whitelisted left items.
    MaterialDriven {
        /// Reward family, for logs and ordering checks.
        family: String,
        /// Left item ids the rule accepts.
        eligible_left_items: BTreeSet<ItemId>,
        /// Right-hand item.
        catalyst: Catalyst,
        /// Effect on the left item.
        outcome: MaterialOutcome,
    },
}

impl AnvilRecipeRule {
    /// Rule kind.
    #[must_use]
    pub const fn kind(&self) -> RuleKind {
        match self {
            Self::EnchantmentDriven { .. } => RuleKind::EnchantmentDriven,
            Self::MaterialDriven { .. } => RuleKind::MaterialDriven,
        }
    }

    /// Reward family.
    #[must_use]
    pub fn family(&self) -> &str {
        match self {
            Self::EnchantmentDriven { family, .. } | Self::MaterialDriven { family, .. } => family,
        }
    }

    /// Bound catalyst.
    #[must_use]
    pub const fn catalyst(&self) -> &Catalyst {
        match self {
            Self::EnchantmentDriven { catalyst, .. } | Self::MaterialDriven { catalyst, .. } => catalyst,
        }
    }

    /// Result of this rule for the given inputs, or `None` if its guard fails.
    #[must_use]
    pub fn apply(&self, left: &ItemInstance, right: &ItemInstance) -> Option<ItemInstance> {
        if left.is_empty() || !self.catalyst().accepts(right) {
            return None;
        }
        match self {
            Self::EnchantmentDriven {
                trigger_enchantments,
                catalyst,
                progression,
                ..
            } => {
                let (enchantment, current) = trigger_enchantments
                    .iter()
                    .map(|e| (e, left.enchantment_level(e)))
                    .find(|(_, level)| *level > 0)?;
                let next = progression.next_level(current, catalyst.tier)?;
                let mut result = left.clone();
                result.set_enchantment(enchantment.clone(), next);
                Some(result)
            }
            Self::MaterialDriven {
                eligible_left_items,
                catalyst,
                outcome,
                ..
            } => {
                if !eligible_left_items.contains(&left.id) {
                    return None;
                }
                match outcome {
                    MaterialOutcome::FirstLevel(enchantment) => {
                        let current = left.enchantment_level(enchantment);
                        if current > 0 {
                            return None;
                        }
                        let mut result = left.clone();
                        result.set_enchantment(enchantment.clone(), catalyst.tier + current);
                        Some(result)
                    }
                    MaterialOutcome::Repair => {
                        if !left.is_damaged() {
                            return None;
                        }
                        let mut result = left.clone();
                        result.damage = left.damage.saturating_sub(left.max_damage / 4);
                        Some(result)
                    }
                }
            }
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// A matched rule's output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnvilResult {
    /// Output item.
    pub item: ItemInstance,
    /// Experience cost.
    pub cost: u32,
    /// Family of the rule that matched.
    pub family: String,
}

/// Anvil update payload: inputs plus the result slot the host reads back.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnvilUpdate {
    /// Item being improved.
    pub left: ItemInstance,
    /// Catalyst.
    pub right: ItemInstance,
    /// Output, left unset when no rule matches.
    pub result: Option<ItemInstance>,
    /// Cost of the output.
    pub cost: Option<u32>,
}

impl AnvilUpdate {
    /// Creates an update with an empty result slot.
    #[must_use]
    pub fn new(left: ItemInstance, right: ItemInstance) -> Self {
        Self {
            left,
            right,
            result: None,
            cost: None,
        }
    }
}

/// Ordered rule registry.
#[derive(Clone, Debug, Default)]
pub struct AnvilRecipeEngine {
    rules: Vec<AnvilRecipeRule>,
}

impl AnvilRecipeEngine {
    /// Creates an engine with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an engine from `rules`, in order.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateRule` or `RuleOrdering` as [`Self::register`] and
    /// [`Self::validate_ordering`] would.
    pub fn from_rules(rules: impl IntoIterator<Item = AnvilRecipeRule>) -> RewardsResult<Self> {
        let mut engine = Self::new();
        for rule in rules {
            engine.register(rule)?;
        }
        engine.validate_ordering()?;
        Ok(engine)
    }

    /// Engine with every reward family, using `whitelists` for the
    /// material-driven rules.
    #[must_use]
    pub fn with_default_rules(whitelists: &AnvilWhitelists) -> Self {
        Self {
            rules: default_rules(whitelists),
        }
    }

    /// Appends a rule.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateRule` if a rule of the same kind is already bound
    /// to the same catalyst.
    pub fn register(&mut self, rule: AnvilRecipeRule) -> RewardsResult<()> {
        let clash = self
            .rules
            .iter()
            .any(|r| r.kind() == rule.kind() && r.catalyst().item == rule.catalyst().item);
        if clash {
            return Err(RewardsError::DuplicateRule(format!(
                "{} rule for {}",
                rule.kind(),
                rule.catalyst().item
            )));
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Checks that no material-driven rule precedes the enchantment-driven
    /// rule sharing its catalyst.
    ///
    /// # Errors
    ///
    /// Returns `RuleOrdering` naming the first offending catalyst.
    pub fn validate_ordering(&self) -> RewardsResult<()> {
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.kind() != RuleKind::MaterialDriven {
                continue;
            }
            let later_sibling = self.rules[index + 1..].iter().any(|later| {
                later.kind() == RuleKind::EnchantmentDriven
                    && later.catalyst().item == rule.catalyst().item
            });
            if later_sibling {
                return Err(RewardsError::RuleOrdering(rule.catalyst().item.to_string()));
            }
        }
        Ok(())
    }

    /// Rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[AnvilRecipeRule] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First matching rule's output for `left` + `right`.
    #[must_use]
    pub fn resolve(&self, left: &ItemInstance, right: &ItemInstance) -> Option<AnvilResult> {
        self.rules.iter().find_map(|rule| {
            let item = rule.apply(left, right)?;
            tracing::trace!(
                family = rule.family(),
                kind = %rule.kind(),
                left = %left.id,
                "anvil rule matched"
            );
            Some(AnvilResult {
                item,
                cost: ANVIL_COST,
                family: rule.family().to_string(),
            })
        })
    }

    /// Fills `update`'s result slot. Returns true if a rule matched; the
    /// slot is left untouched otherwise.
    pub fn on_anvil_update(&self, update: &mut AnvilUpdate) -> bool {
        match self.resolve(&update.left, &update.right) {
            Some(result) => {
                update.result = Some(result.item);
                update.cost = Some(result.cost);
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// Default families
// ============================================================================

fn enchant_family(
    rules: &mut Vec<AnvilRecipeRule>,
    family: &str,
    enchantment: Enchantment,
    catalyst: Catalyst,
    progression: Progression,
    eligible: &BTreeSet<ItemId>,
) {
    rules.push(AnvilRecipeRule::EnchantmentDriven {
        family: family.to_string(),
        trigger_enchantments: BTreeSet::from([enchantment.clone()]),
        catalyst: catalyst.clone(),
        progression,
    });
    rules.push(AnvilRecipeRule::MaterialDriven {
        family: family.to_string(),
        eligible_left_items: eligible.clone(),
        catalyst,
        outcome: MaterialOutcome::FirstLevel(enchantment),
    });
}

fn repair_family(rules: &mut Vec<AnvilRecipeRule>, family: &str, catalyst: &str, eligible: &BTreeSet<ItemId>) {
    rules.push(AnvilRecipeRule::MaterialDriven {
        family: family.to_string(),
        eligible_left_items: eligible.clone(),
        catalyst: Catalyst::new(catalyst, 1),
        outcome: MaterialOutcome::Repair,
    });
}

fn default_rules(whitelists: &AnvilWhitelists) -> Vec<AnvilRecipeRule> {
    let sharpness = Progression::new(5, 10);
    let unbreaking = Progression::new(3, 6);
    let lasting = Progression::new(5, 10);

    let mut rules = Vec::with_capacity(16);
    let families = [
        ("whetstone", Enchantment::Sharpness, ids::WHETSTONE, 1, sharpness, &whitelists.whetstone_weapons),
        ("netherite_whetstone", Enchantment::Sharpness, ids::NETHERITE_WHETSTONE, 2, sharpness, &whitelists.whetstone_weapons),
        ("bracing", Enchantment::Unbreaking, ids::BRACING, 1, unbreaking, &whitelists.bracing_equipment),
        ("netherite_bracing", Enchantment::Unbreaking, ids::NETHERITE_BRACING, 2, unbreaking, &whitelists.bracing_equipment),
        ("hourglass", Enchantment::Lasting, ids::HOURGLASS, 1, lasting, &whitelists.hourglass_equipment),
        ("diamond_hourglass", Enchantment::Lasting, ids::DIAMOND_HOURGLASS, 2, lasting, &whitelists.hourglass_equipment),
    ];
    for (family, enchantment, catalyst, tier, progression, eligible) in families {
        enchant_family(&mut rules, family, enchantment, Catalyst::new(catalyst, tier), progression, eligible);
    }

    repair_family(&mut rules, "diamond_shard", ids::DIAMOND_SHARD, &whitelists.diamond_repair_equip);
    repair_family(&mut rules, "iron_bloom", ids::IRON_BLOOM, &whitelists.iron_repair_equip);
    repair_family(&mut rules, "gold_bloom", ids::GOLD_BLOOM, &whitelists.gold_repair_equip);
    repair_family(&mut rules, "netherite_bloom", ids::NETHERITE_BLOOM, &whitelists.netherite_repair_equip);
    rules
}
