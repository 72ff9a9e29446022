//! # Reward Effects
//!
//! What the consumable and passive reward items actually do to a player:
//!
//! - **Pure Heart**: one max-health modifier whose amount grows by a fixed
//!   delta per use; the player is healed to the new maximum.
//! - **Attack speed reward**: one modifier re-derived from the player's other
//!   positive modifiers on every use, so it never compounds on itself.
//! - **Mob Ward**: nearby hostiles whose drops include the ward's filter item
//!   lose interest in the player, and flee if they are close.
//! - **Potion Pot**: shatters into its base potions, brewed with the loaded
//!   ingredient when a mix exists.
//! - **Escape Rope**: returns the player to the structure entrance or the
//!   surface.

use rand::Rng;
use traveler_shared::constants::{WARD_FLEE_DISTANCE, WARD_FLEE_SPEED};
use traveler_shared::{BlockPos, Vec3};

use crate::attribute::{
    AttributeHandle, AttributeKind, AttributeModifier, ATTACK_SPEED_MODIFIER, PURE_HEART_MODIFIER,
};
use crate::config::RewardSettings;
use crate::error::RewardsError;
use crate::host::{BrewingTable, PlayerHandle, SoundKind};
use crate::item::{ids, ItemId, ItemInstance};
use crate::loot_index::MobLootIndex;
use crate::record::TravelerRecord;

/// Display name of the Pure Heart modifier.
pub const PURE_HEART_MODIFIER_NAME: &str = "Pure Heart";

/// Display name of the attack speed modifier.
pub const ATTACK_SPEED_MODIFIER_NAME: &str = "Traveler Attack Speed";

/// Potion Pots hold between one and this many base potions.
pub const POTION_POT_MAX_BASE: u32 = 3;

/// Where a thrown Potion Pot lands relative to the eye, along the look vector.
const POT_THROW_DISTANCE: f64 = 3.5;

/// How far below eye level the pot contents spawn.
const POT_DROP_BELOW_EYE: f64 = 0.5;

/// Result of an Escape Rope use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EscapeOutcome {
    /// Teleported to the recorded structure entrance.
    StructureEntry(BlockPos),
    /// Teleported up to the surface.
    Surface(BlockPos),
    /// Player is hurt; the rope only works at full health.
    NotFullHealth,
    /// Neither inside a structure nor deep underground.
    NowhereToEscape,
    /// Deep underground, but the column above is not open to the sky.
    SurfaceBlocked,
}

impl EscapeOutcome {
    /// True if the player was moved and the rope should be consumed.
    #[must_use]
    pub const fn escaped(self) -> bool {
        matches!(self, Self::StructureEntry(_) | Self::Surface(_))
    }

    fn message(self) -> &'static str {
        match self {
            Self::StructureEntry(_) | Self::Surface(_) => "You climb to safety",
            Self::NotFullHealth => "You must be at full health to use the Escape Rope",
            Self::NowhereToEscape => "You must be inside a structure or deep underground",
            Self::SurfaceBlocked => "There is no open sky above you",
        }
    }
}

/// Applies reward effects using the configured tuning.
#[derive(Clone, Debug, PartialEq)]
pub struct RewardEffects {
    settings: RewardSettings,
}

impl Default for RewardEffects {
    fn default() -> Self {
        Self::new(RewardSettings::default())
    }
}

impl RewardEffects {
    /// Creates an applier with `settings`.
    #[must_use]
    pub const fn new(settings: RewardSettings) -> Self {
        Self { settings }
    }

    /// Tuning in use.
    #[must_use]
    pub const fn settings(&self) -> &RewardSettings {
        &self.settings
    }

    // =========================================================================
    // Attribute bonuses
    // =========================================================================

    /// Grows the Pure Heart modifier by `delta` and heals to full.
    ///
    /// Returns the new modifier amount, or `None` (after logging) when the
    /// player has no max-health attribute.
    pub fn apply_health_bonus(&self, player: &mut dyn PlayerHandle, delta: f64) -> Option<f64> {
        let player_id = player.id().to_string();
        let Some(attribute) = player.attribute_mut(AttributeKind::MaxHealth) else {
            let err = RewardsError::MissingAttribute(AttributeKind::MaxHealth);
            tracing::error!(player = %player_id, %err, "health bonus skipped");
            return None;
        };

        let previous = attribute
            .remove_modifier(PURE_HEART_MODIFIER)
            .map_or(0.0, |m| m.amount);
        let amount = previous + delta;
        attribute.add_modifier(AttributeModifier::addition(
            PURE_HEART_MODIFIER,
            PURE_HEART_MODIFIER_NAME,
            amount,
        ));

        let max = player.max_health();
        player.set_health(max);
        Some(amount)
    }

    /// Uses one Pure Heart's worth of health bonus.
    pub fn use_pure_heart(&self, player: &mut dyn PlayerHandle) -> Option<f64> {
        self.apply_health_bonus(player, self.settings.pure_heart_health)
    }

    /// Sets the attack speed modifier to `base * multiplier^uses - base`,
    /// where `base` is the sum of the attribute's other positive modifiers.
    ///
    /// Returns the new modifier amount, or `None` (after logging) when the
    /// player has no attack-speed attribute.
    pub fn apply_attack_speed_bonus(&self, player: &mut dyn PlayerHandle, uses: u32) -> Option<f64> {
        let player_id = player.id().to_string();
        let Some(attribute) = player.attribute_mut(AttributeKind::AttackSpeed) else {
            let err = RewardsError::MissingAttribute(AttributeKind::AttackSpeed);
            tracing::error!(player = %player_id, %err, "attack speed bonus skipped");
            return None;
        };

        let base = attack_speed_base(attribute);
        let exponent = i32::try_from(uses).unwrap_or(i32::MAX);
        let amount = base * self.settings.attack_speed_multiplier.powi(exponent) - base;

        attribute.remove_modifier(ATTACK_SPEED_MODIFIER);
        attribute.add_modifier(AttributeModifier::addition(
            ATTACK_SPEED_MODIFIER,
            ATTACK_SPEED_MODIFIER_NAME,
            amount,
        ));
        Some(amount)
    }

    // =========================================================================
    // Mob Ward
    // =========================================================================

    /// Pacifies nearby hostiles whose drops include any carried ward's filter.
    ///
    /// Returns the number of mobs warded.
    pub fn ward_mobs(&self, player: &mut dyn PlayerHandle, loot: &MobLootIndex) -> usize {
        let filters = ward_filters(player);
        if filters.is_empty() {
            return 0;
        }
        let Some(player_pos) = player.position() else {
            return 0;
        };
        let player_block = player_pos.block_pos();
        let player_id = player.id().to_string();
        let radius = self.settings.ward_radius;

        let mut warded = 0;
        for mob in player.nearby_mobs() {
            if !mob.is_hostile() {
                continue;
            }
            let entity_type = mob.entity_type().to_string();
            if !filters.iter().any(|filter| loot.is_warded_by(&entity_type, filter)) {
                continue;
            }

            if mob.is_targeting(&player_id) {
                mob.clear_target();
            }
            mob.forget_aggression();

            let mob_pos = mob.position();
            if mob_pos.block_pos().in_range(player_block, radius) {
                let away = (mob_pos - player_pos).normalize();
                mob.move_to(mob_pos + away * WARD_FLEE_DISTANCE, WARD_FLEE_SPEED);
            }
            tracing::trace!(player = %player_id, mob = %entity_type, "mob warded");
            warded += 1;
        }
        warded
    }

    // =========================================================================
    // Potion Pot
    // =========================================================================

    /// Rolls the base potion count of a freshly opened pot.
    ///
    /// A pot that already has a count keeps it. Returns the count.
    pub fn open_potion_pot<R: Rng + ?Sized>(&self, pot: &mut ItemInstance, rng: &mut R) -> u32 {
        *pot.metadata
            .potion_base_count
            .get_or_insert_with(|| rng.gen_range(1..=POTION_POT_MAX_BASE))
    }

    /// Contents a pot would shatter into.
    ///
    /// A pot with no base potions yields nothing. Without an ingredient, or
    /// when the ingredient has no mix with the base potion, the base potions
    /// come out unchanged.
    #[must_use]
    pub fn brew_potion_pot(pot: &ItemInstance, brewing: &dyn BrewingTable) -> Vec<ItemInstance> {
        let count = pot.metadata.potion_base_count.unwrap_or(0);
        if count == 0 {
            return Vec::new();
        }
        let base = base_potion();
        let brewed = pot
            .metadata
            .potion_ingredient
            .as_deref()
            .filter(|ingredient| !ingredient.is_empty())
            .and_then(|ingredient| brewing.mix(ingredient, &base))
            .unwrap_or(base);
        vec![brewed; usize::try_from(count).unwrap_or(0)]
    }

    /// Shatters one tossed pot in front of the player.
    ///
    /// Consumes one pot from `pot`, plays the break sound and spawns the
    /// contents. Returns what was spawned.
    pub fn toss_potion_pot(
        &self,
        player: &mut dyn PlayerHandle,
        pot: &mut ItemInstance,
        brewing: &dyn BrewingTable,
    ) -> Vec<ItemInstance> {
        let contents = Self::brew_potion_pot(pot, brewing);
        pot.shrink(1);

        let eye = player.eye_position();
        let sound_at = player.block_position().unwrap_or_else(|| eye.block_pos());
        player.play_sound(SoundKind::GlassBreak, sound_at);

        let landing = eye + player.look_direction() * POT_THROW_DISTANCE
            - Vec3::new(0.0, POT_DROP_BELOW_EYE, 0.0);
        for potion in &contents {
            player.spawn_item(landing, potion.clone());
        }
        contents
    }

    // =========================================================================
    // Escape Rope
    // =========================================================================

    /// Teleports the player out of a structure or the deep caves.
    ///
    /// Inside a structure with a recorded entrance, the player goes back to
    /// it. Otherwise, below the deep-cave line, the player goes up to the
    /// surface when the column above is open. The entrance is forgotten
    /// after a successful escape.
    pub fn use_escape_rope(
        &self,
        player: &mut dyn PlayerHandle,
        record: &mut TravelerRecord,
    ) -> EscapeOutcome {
        let outcome = self.escape_destination(player, record);
        if let EscapeOutcome::StructureEntry(to) | EscapeOutcome::Surface(to) = outcome {
            player.teleport(to.standing_point());
            record.structure_entry_pos = None;
            tracing::info!(player = %player.id(), ?outcome, "escape rope used");
        }
        player.notify(outcome.message());
        outcome
    }

    fn escape_destination(&self, player: &dyn PlayerHandle, record: &TravelerRecord) -> EscapeOutcome {
        if player.health() < player.max_health() {
            return EscapeOutcome::NotFullHealth;
        }
        let Some(pos) = player.block_position() else {
            return EscapeOutcome::NowhereToEscape;
        };

        let in_structure = record
            .closest_structure
            .as_ref()
            .is_some_and(|s| pos.in_range(s.origin, self.settings.structure_range));
        if in_structure {
            if let Some(entry) = record.structure_entry_pos {
                return EscapeOutcome::StructureEntry(entry);
            }
        }

        if pos.y < self.settings.deep_cave_max_y {
            return player
                .surface_above()
                .map_or(EscapeOutcome::SurfaceBlocked, EscapeOutcome::Surface);
        }
        EscapeOutcome::NowhereToEscape
    }
}

fn attack_speed_base(attribute: &dyn AttributeHandle) -> f64 {
    attribute
        .modifiers()
        .iter()
        .filter(|m| m.id != ATTACK_SPEED_MODIFIER && m.amount > 0.0)
        .map(|m| m.amount)
        .sum()
}

fn ward_filters(player: &dyn PlayerHandle) -> Vec<ItemId> {
    let inventory = player.inventory();
    (0..inventory.slot_count())
        .filter_map(|slot| inventory.item(slot))
        .filter(|item| !item.is_empty() && item.id.as_str() == ids::MOB_WARD)
        .filter_map(|ward| ward.ward_filter().map(|filter| filter.id.clone()))
        .collect()
}

/// The awkward potion every pot starts from.
#[must_use]
pub fn base_potion() -> ItemInstance {
    let mut potion = ItemInstance::new(ids::POTION, 1);
    potion.metadata.potion = Some(ids::AWKWARD.to_string());
    potion
}
