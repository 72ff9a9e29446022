//! # Traveler Service
//!
//! The single object a host constructs at server start. It owns the record
//! registry, the anvil rules, the sweeper, the reward effects and the mob
//! loot index, and routes typed host events to them.
//!
//! ## Event Pipeline
//!
//! ```text
//! Host event -> HostEvent -> dispatch() ->
//!   PlayerJoin      merge saved record, return held-back items
//!   PlayerDeath     hold back soulbound items
//!   PlayerRespawn   return held-back items
//!   PlayerLeave     drop leftovers, persist, forget record
//!   ServerTick      every sweep interval: lasting sweep, then mob ward
//!   ItemToss        shatter potion pots
//!   AnvilUpdate     fill the result slot
//!   NearStructure   remember the structure entrance
//! ```
//!
//! Lock order is rules, then loot index, then a single record. No call into
//! the host is made while the registry map lock is held.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::{Mutex, RwLock};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use traveler_shared::{BlockPos, EventKind, Hand};

use crate::anvil::{AnvilRecipeEngine, AnvilResult, AnvilUpdate};
use crate::config::RewardsConfig;
use crate::effects::{EscapeOutcome, RewardEffects};
use crate::error::RewardsResult;
use crate::fabrication::{ChestFabricator, FabricationOutcome};
use crate::host::{BrewingTable, HostWorld, PlayerHandle, StructureInfo};
use crate::item::{ids, ItemId, ItemInstance};
use crate::lasting::LastingSweeper;
use crate::lifecycle;
use crate::loot_index::MobLootIndex;
use crate::persistence::{self, TagBlock};
use crate::registry::{EntityStateRegistry, RecordHandle};
use crate::soulbound::SoulboundSlotManager;

// ============================================================================
// Events
// ============================================================================

/// A host event with its payload.
pub enum HostEvent<'a> {
    /// Player logged in, with their saved record if any.
    PlayerJoin {
        /// Joining player.
        player: &'a mut dyn PlayerHandle,
        /// Persisted record from the previous session.
        saved: Option<&'a TagBlock>,
    },
    /// Player logged out.
    PlayerLeave {
        /// Leaving player.
        player: &'a mut dyn PlayerHandle,
    },
    /// Player died.
    PlayerDeath {
        /// Dead player.
        player: &'a mut dyn PlayerHandle,
    },
    /// Player respawned.
    PlayerRespawn {
        /// Respawned player.
        player: &'a mut dyn PlayerHandle,
    },
    /// Game tick.
    ServerTick {
        /// Current tick.
        tick: u64,
        /// Online players.
        world: &'a mut dyn HostWorld,
    },
    /// Player tossed an item.
    ItemToss {
        /// Tossing player.
        player: &'a mut dyn PlayerHandle,
        /// The tossed stack.
        item: &'a mut ItemInstance,
        /// Brewing mixes for potion pots.
        brewing: &'a dyn BrewingTable,
    },
    /// Anvil inputs changed.
    AnvilUpdate(&'a mut AnvilUpdate),
    /// Player is near a structure.
    NearStructure {
        /// Nearby player.
        player: &'a mut dyn PlayerHandle,
        /// Nearest structure.
        structure: StructureInfo,
    },
}

impl HostEvent<'_> {
    /// Kind of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::PlayerJoin { .. } => EventKind::PlayerJoin,
            Self::PlayerLeave { .. } => EventKind::PlayerLeave,
            Self::PlayerDeath { .. } => EventKind::PlayerDeath,
            Self::PlayerRespawn { .. } => EventKind::PlayerRespawn,
            Self::ServerTick { .. } => EventKind::ServerTick,
            Self::ItemToss { .. } => EventKind::ItemToss,
            Self::AnvilUpdate(_) => EventKind::AnvilUpdate,
            Self::NearStructure { .. } => EventKind::NearStructure,
        }
    }
}

/// What `dispatch` did with an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    /// The event changed state.
    Handled,
    /// Nothing applied.
    Ignored,
    /// The player left; the host should store this block.
    Persist(TagBlock),
}

// ============================================================================
// Service
// ============================================================================

/// Everything derived from one configuration.
#[derive(Debug)]
struct Rules {
    config: Arc<RewardsConfig>,
    anvil: AnvilRecipeEngine,
    sweeper: LastingSweeper,
    effects: RewardEffects,
    fabricator: ChestFabricator,
    sweep_interval: u64,
}

impl Rules {
    fn build(config: RewardsConfig) -> RewardsResult<Self> {
        config.validate()?;
        let ticks = config.lasting.table()?;
        Ok(Self {
            anvil: AnvilRecipeEngine::with_default_rules(&config.anvil),
            sweeper: LastingSweeper::new(ticks),
            effects: RewardEffects::new(config.rewards.clone()),
            fabricator: ChestFabricator::new(&config.fabrication),
            sweep_interval: config.lasting.sweep_interval,
            config: Arc::new(config),
        })
    }
}

/// Traveler rewards service.
#[derive(Debug)]
pub struct TravelerService {
    rules: RwLock<Rules>,
    loot: RwLock<MobLootIndex>,
    registry: EntityStateRegistry,
    rng: Mutex<ChaCha8Rng>,
}

impl TravelerService {
    /// Creates a service from a validated configuration, seeding potion pot
    /// rolls from the clock.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration fails validation.
    pub fn new(config: RewardsConfig) -> RewardsResult<Self> {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX));
        Self::with_seed(config, seed)
    }

    /// Creates a service whose random rolls are reproducible.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration fails validation.
    pub fn with_seed(config: RewardsConfig, seed: u64) -> RewardsResult<Self> {
        Ok(Self {
            rules: RwLock::new(Rules::build(config)?),
            loot: RwLock::new(MobLootIndex::new()),
            registry: EntityStateRegistry::new(),
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        })
    }

    /// Replaces the configuration and rebuilds the anvil rules. The old
    /// configuration stays in place if the new one is invalid.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration fails validation.
    pub fn reload_config(&self, config: RewardsConfig) -> RewardsResult<()> {
        let rules = Rules::build(config)?;
        tracing::info!(anvil_rules = rules.anvil.len(), "configuration reloaded");
        *self.rules.write() = rules;
        Ok(())
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> Arc<RewardsConfig> {
        Arc::clone(&self.rules.read().config)
    }

    /// Live record registry.
    #[must_use]
    pub const fn registry(&self) -> &EntityStateRegistry {
        &self.registry
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Routes one host event.
    pub fn dispatch(&self, event: HostEvent<'_>) -> EventOutcome {
        let kind = event.kind();
        tracing::trace!(event = kind.name(), "dispatching host event");
        match event {
            HostEvent::PlayerJoin { player, saved } => self.on_join(player, saved),
            HostEvent::PlayerLeave { player } => self.on_leave(player),
            HostEvent::PlayerDeath { player } => {
                let handle = self.registry.get_or_create(player.id());
                lifecycle::on_death(&mut handle.lock(), player);
                EventOutcome::Handled
            }
            HostEvent::PlayerRespawn { player } => {
                let Some(handle) = self.registry.get(player.id()) else {
                    return EventOutcome::Ignored;
                };
                lifecycle::on_respawn(&mut handle.lock(), player);
                EventOutcome::Handled
            }
            HostEvent::ServerTick { tick, world } => self.on_tick(tick, world),
            HostEvent::ItemToss { player, item, brewing } => {
                if item.id.as_str() != ids::POTION_POT {
                    return EventOutcome::Ignored;
                }
                self.rules.read().effects.toss_potion_pot(player, item, brewing);
                EventOutcome::Handled
            }
            HostEvent::AnvilUpdate(update) => {
                if self.rules.read().anvil.on_anvil_update(update) {
                    EventOutcome::Handled
                } else {
                    EventOutcome::Ignored
                }
            }
            HostEvent::NearStructure { player, structure } => {
                let Some(pos) = player.block_position() else {
                    return EventOutcome::Ignored;
                };
                let handle = self.registry.get_or_create(player.id());
                if handle.lock().note_structure(structure, pos.offset(0, 1, 0)) {
                    EventOutcome::Handled
                } else {
                    EventOutcome::Ignored
                }
            }
        }
    }

    fn on_join(&self, player: &mut dyn PlayerHandle, saved: Option<&TagBlock>) -> EventOutcome {
        let handle = self.registry.get_or_create(player.id());
        let mut record = handle.lock();
        if let Some(saved) = saved {
            record.absorb(persistence::deserialize(saved));
        }
        lifecycle::on_join(&mut record, player);
        EventOutcome::Handled
    }

    fn on_leave(&self, player: &mut dyn PlayerHandle) -> EventOutcome {
        let Some(handle) = self.registry.remove(player.id()) else {
            return EventOutcome::Ignored;
        };
        let mut record = handle.lock();
        lifecycle::on_leave(&mut record, player);
        EventOutcome::Persist(persistence::serialize(&record))
    }

    fn on_tick(&self, tick: u64, world: &mut dyn HostWorld) -> EventOutcome {
        let rules = self.rules.read();
        if tick % rules.sweep_interval != 0 {
            return EventOutcome::Ignored;
        }
        let loot = self.loot.read();
        for (player_id, _) in self.registry.snapshot() {
            let Some(player) = world.player_mut(&player_id) else {
                tracing::trace!(player = %player_id, "offline player skipped by sweep");
                continue;
            };
            let report = rules.sweeper.sweep(player, tick);
            if !report.is_empty() {
                tracing::debug!(
                    player = %player_id,
                    tick,
                    assigned = report.assigned.len(),
                    expired = report.expired.len(),
                    "lasting sweep"
                );
            }
            rules.effects.ward_mobs(player, &loot);
        }
        EventOutcome::Handled
    }

    // =========================================================================
    // Item use
    // =========================================================================

    /// Consumes a Pure Heart for `player`. Returns the new bonus amount, or
    /// `None` when the player has no max-health attribute.
    pub fn use_pure_heart(&self, player: &mut dyn PlayerHandle) -> Option<f64> {
        let handle = self.registry.get_or_create(player.id());
        {
            let mut record = handle.lock();
            record.pure_hearts_consumed = record.pure_hearts_consumed.saturating_add(1);
        }
        self.rules.read().effects.use_pure_heart(player)
    }

    /// Soulbinds the slot holding `item`. Returns the slot that was bound.
    pub fn use_soulbound_tablet(
        &self,
        player: &dyn PlayerHandle,
        hand: Hand,
        item: &ItemInstance,
    ) -> Option<usize> {
        let handle = self.registry.get_or_create(player.id());
        let slot = SoulboundSlotManager::bind_slot(&mut handle.lock(), player.inventory(), hand, item);
        if let Some(slot) = slot {
            tracing::debug!(player = %player.id(), slot, ?hand, "slot soulbound");
        }
        slot
    }

    /// Uses an Escape Rope for `player`.
    pub fn use_escape_rope(&self, player: &mut dyn PlayerHandle) -> EscapeOutcome {
        let handle = self.registry.get_or_create(player.id());
        let rules = self.rules.read();
        let mut record = handle.lock();
        rules.effects.use_escape_rope(player, &mut record)
    }

    /// Uses a Fabrication Ritual Tablet held by `player_id` on the block at
    /// `target`, then tells the player the outcome if they are online.
    ///
    /// The caller consumes the tablet when
    /// [`FabricationOutcome::consumes_tablet`] holds.
    pub fn use_fabrication_tablet(
        &self,
        world: &mut dyn HostWorld,
        player_id: &str,
        target: BlockPos,
    ) -> FabricationOutcome {
        let outcome = self.rules.read().fabricator.fabricate(world, target);
        if let Some(player) = world.player_mut(player_id) {
            player.notify(&outcome.message());
        }
        outcome
    }

    /// Rolls the base potion count of a freshly opened Potion Pot.
    pub fn open_potion_pot(&self, pot: &mut ItemInstance) -> u32 {
        let rules = self.rules.read();
        rules.effects.open_potion_pot(pot, &mut *self.rng.lock())
    }

    /// Applies the attack speed reward for `uses` uses.
    pub fn apply_attack_speed_bonus(&self, player: &mut dyn PlayerHandle, uses: u32) -> Option<f64> {
        self.rules.read().effects.apply_attack_speed_bonus(player, uses)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// True if `slot` is soulbound for `player_id`.
    #[must_use]
    pub fn is_slot_soulbound(&self, player_id: &str, slot: usize) -> bool {
        self.registry
            .get(player_id)
            .is_some_and(|handle| SoulboundSlotManager::is_bound(&handle.lock(), slot))
    }

    /// Soulbound slots of `player_id`, empty when no record is active.
    #[must_use]
    pub fn soulbound_slots(&self, player_id: &str) -> BTreeSet<usize> {
        self.registry
            .get(player_id)
            .map(|handle| SoulboundSlotManager::list_bound(&handle.lock()))
            .unwrap_or_default()
    }

    /// Resolves an anvil combination without touching any event payload.
    #[must_use]
    pub fn resolve_anvil(&self, left: &ItemInstance, right: &ItemInstance) -> Option<AnvilResult> {
        self.rules.read().anvil.resolve(left, right)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Persisted form of `player_id`'s live record.
    #[must_use]
    pub fn serialize(&self, player_id: &str) -> Option<TagBlock> {
        self.registry
            .get(player_id)
            .map(|handle| persistence::serialize(&handle.lock()))
    }

    /// Loads `tag` as the live record for `player_id`.
    pub fn deserialize(&self, player_id: &str, tag: &TagBlock) -> RecordHandle {
        self.registry.associate(player_id, persistence::deserialize(tag))
    }

    /// Records which items a loot table drops, for the mob ward.
    pub fn record_loot_table<I>(&self, table_id: &str, items: I) -> Option<String>
    where
        I: IntoIterator<Item = ItemId>,
    {
        self.loot.write().record_loot_table(table_id, items)
    }

    /// Serializes every live record and empties the registry (server stop).
    pub fn shutdown(&self) -> Vec<(String, TagBlock)> {
        let saved: Vec<_> = self
            .registry
            .snapshot()
            .into_iter()
            .map(|(player_id, handle)| {
                let tag = persistence::serialize(&handle.lock());
                (player_id, tag)
            })
            .collect();
        self.registry.clear();
        self.loot.write().clear();
        tracing::info!(records = saved.len(), "traveler service stopped");
        saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::AttributeKind;
    use crate::headless::{HeadlessMob, HeadlessPlayer, HeadlessWorld, RecipeBrewingTable};
    use crate::inventory::PlayerInventory;
    use crate::headless::HeadlessBlock;
    use crate::host::ChestKind;
    use crate::item::Enchantment;
    use traveler_shared::Vec3;

    fn service() -> TravelerService {
        TravelerService::with_seed(RewardsConfig::default(), 7).unwrap()
    }

    #[test]
    fn test_service_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TravelerService>();
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = RewardsConfig::default();
        config.lasting.sweep_interval = 0;
        assert!(TravelerService::new(config.clone()).is_err());

        let service = service();
        assert!(service.reload_config(config).is_err());
        assert_eq!(service.config().lasting.sweep_interval, 20);
    }

    #[test]
    fn test_clock_seeded_pot_roll_in_range() {
        let service = TravelerService::new(RewardsConfig::default()).unwrap();
        let mut pot = ItemInstance::new(ids::POTION_POT, 1);
        assert!((1..=3).contains(&service.open_potion_pot(&mut pot)));
    }

    #[test]
    fn test_join_leave_persists_record() {
        let service = service();
        let mut player = HeadlessPlayer::new("alice");
        player.inventory.set_item(3, ItemInstance::new("minecraft:compass", 1)).unwrap();

        service.dispatch(HostEvent::PlayerJoin { player: &mut player, saved: None });
        let slot = service.use_soulbound_tablet(
            &player,
            Hand::Main,
            &ItemInstance::new("minecraft:compass", 1),
        );
        assert_eq!(slot, Some(3));
        assert!(service.is_slot_soulbound("alice", 3));

        let EventOutcome::Persist(tag) = service.dispatch(HostEvent::PlayerLeave { player: &mut player })
        else {
            panic!("leave should persist");
        };
        assert!(service.registry().is_empty());

        service.dispatch(HostEvent::PlayerJoin { player: &mut player, saved: Some(&tag) });
        assert_eq!(service.soulbound_slots("alice").into_iter().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_leave_unknown_player_ignored() {
        let service = service();
        let mut player = HeadlessPlayer::new("ghost");
        assert_eq!(
            service.dispatch(HostEvent::PlayerLeave { player: &mut player }),
            EventOutcome::Ignored
        );
    }

    #[test]
    fn test_pure_heart_counts_and_stacks() {
        let service = service();
        let mut player = HeadlessPlayer::new("bob");
        service.use_pure_heart(&mut player);
        let amount = service.use_pure_heart(&mut player).unwrap();

        assert!((amount - 4.0).abs() < f64::EPSILON);
        assert!((player.health - 24.0).abs() < f64::EPSILON);
        let handle = service.registry().get("bob").unwrap();
        assert_eq!(handle.lock().pure_hearts_consumed(), 2);
    }

    #[test]
    fn test_tick_runs_on_interval_only() {
        let service = service();
        let mut world = HeadlessWorld::new();
        let mut player = HeadlessPlayer::new("carol");
        player
            .inventory
            .set_item(0, ItemInstance::new("minecraft:torch", 1).with_enchantment(Enchantment::Lasting, 1))
            .unwrap();
        service.dispatch(HostEvent::PlayerJoin { player: &mut player, saved: None });
        world.insert(player);

        assert_eq!(
            service.dispatch(HostEvent::ServerTick { tick: 7, world: &mut world }),
            EventOutcome::Ignored
        );
        service.dispatch(HostEvent::ServerTick { tick: 20, world: &mut world });
        let carol = world.player("carol").unwrap();
        assert_eq!(carol.inventory.item(0).unwrap().metadata.lasting_expiration, Some(320));

        service.dispatch(HostEvent::ServerTick { tick: 320, world: &mut world });
        assert!(world.player("carol").unwrap().inventory.item(0).unwrap().is_empty());
    }

    #[test]
    fn test_tick_skips_offline_players() {
        let service = service();
        let mut player = HeadlessPlayer::new("offline");
        service.dispatch(HostEvent::PlayerJoin { player: &mut player, saved: None });
        let mut world = HeadlessWorld::new();
        assert_eq!(
            service.dispatch(HostEvent::ServerTick { tick: 40, world: &mut world }),
            EventOutcome::Handled
        );
    }

    #[test]
    fn test_tick_wards_mobs() {
        let service = service();
        service.record_loot_table(
            "minecraft:entities/zombie",
            [ItemId::from("minecraft:rotten_flesh")],
        );

        let mut ward = ItemInstance::new(ids::MOB_WARD, 1);
        ward.set_ward_filter(ItemInstance::new("minecraft:rotten_flesh", 1));
        let mut player = HeadlessPlayer::new("erin");
        player.inventory.set_item(8, ward).unwrap();
        player
            .mobs
            .push(HeadlessMob::hostile("minecraft:zombie", Vec3::new(3.5, 64.0, 0.5)).targeting("erin"));
        service.dispatch(HostEvent::PlayerJoin { player: &mut player, saved: None });

        let mut world = HeadlessWorld::new();
        world.insert(player);
        service.dispatch(HostEvent::ServerTick { tick: 0, world: &mut world });

        let zombie = &world.player("erin").unwrap().mobs[0];
        assert_eq!(zombie.target, None);
        assert!(zombie.destination.is_some());
    }

    #[test]
    fn test_toss_only_handles_potion_pots() {
        let service = service();
        let brewing = RecipeBrewingTable::new();
        let mut player = HeadlessPlayer::new("frank");

        let mut dirt = ItemInstance::new("minecraft:dirt", 4);
        let outcome = service.dispatch(HostEvent::ItemToss {
            player: &mut player,
            item: &mut dirt,
            brewing: &brewing,
        });
        assert_eq!(outcome, EventOutcome::Ignored);

        let mut pot = ItemInstance::new(ids::POTION_POT, 1);
        let rolled = service.open_potion_pot(&mut pot);
        assert!((1..=3).contains(&rolled));
        let outcome = service.dispatch(HostEvent::ItemToss {
            player: &mut player,
            item: &mut pot,
            brewing: &brewing,
        });
        assert_eq!(outcome, EventOutcome::Handled);
        assert!(pot.is_empty());
        assert_eq!(player.spawned.len(), usize::try_from(rolled).unwrap());
    }

    #[test]
    fn test_near_structure_then_escape() {
        let service = service();
        let mut player = HeadlessPlayer::new("gina");
        player.move_to(Vec3::new(100.5, 40.0, 100.5));
        let structure = StructureInfo {
            id: "minecraft:stronghold@0".into(),
            origin: BlockPos::new(110, 30, 110),
        };
        let first = service.dispatch(HostEvent::NearStructure {
            player: &mut player,
            structure: structure.clone(),
        });
        assert_eq!(first, EventOutcome::Handled);

        player.move_to(Vec3::new(120.5, 20.0, 120.5));
        let again = service.dispatch(HostEvent::NearStructure { player: &mut player, structure });
        assert_eq!(again, EventOutcome::Ignored);

        let outcome = service.use_escape_rope(&mut player);
        assert_eq!(outcome, EscapeOutcome::StructureEntry(BlockPos::new(100, 41, 100)));
        assert_eq!(player.position, Some(Vec3::new(100.5, 41.0, 100.5)));
    }

    #[test]
    fn test_anvil_update_dispatch() {
        let service = service();
        let sword = ItemInstance::damageable("minecraft:iron_sword", 250);
        let mut update = AnvilUpdate::new(sword, ItemInstance::new(ids::WHETSTONE, 1));
        assert_eq!(service.dispatch(HostEvent::AnvilUpdate(&mut update)), EventOutcome::Handled);
        let result = update.result.unwrap();
        assert_eq!(result.enchantment_level(&Enchantment::Sharpness), 1);
        assert_eq!(update.cost, Some(1));

        let mut nothing = AnvilUpdate::new(
            ItemInstance::new("minecraft:dirt", 1),
            ItemInstance::new(ids::WHETSTONE, 1),
        );
        assert_eq!(service.dispatch(HostEvent::AnvilUpdate(&mut nothing)), EventOutcome::Ignored);
        assert_eq!(nothing.result, None);
    }

    #[test]
    fn test_attack_speed_through_service() {
        let service = service();
        let mut player = HeadlessPlayer::new("hank");
        player.attributes.remove(&AttributeKind::AttackSpeed);
        assert_eq!(service.apply_attack_speed_bonus(&mut player, 2), None);
        assert!(player.attribute_mut(AttributeKind::AttackSpeed).is_none());
    }

    #[test]
    fn test_fabrication_tablet_uses_reloaded_whitelist() {
        let service = service();
        let chest = BlockPos::new(4, 70, 4);
        let mut world = HeadlessWorld::new();
        world.insert(HeadlessPlayer::new("ivy"));
        world.set_block(chest.offset(-1, -1, 0), HeadlessBlock::Solid);
        world.place_chest(chest, ChestKind::Single, vec![ItemInstance::new("minecraft:gravel", 32)]);

        let outcome = service.use_fabrication_tablet(&mut world, "ivy", chest);
        assert_eq!(outcome, FabricationOutcome::Fabricated { at: chest.offset(-1, 0, 0), copied: 1 });

        let mut config = RewardsConfig::default();
        config.fabrication.blocks.clear();
        service.reload_config(config).unwrap();
        world.set_block(chest.offset(-1, 0, 0), HeadlessBlock::Solid);
        let outcome = service.use_fabrication_tablet(&mut world, "ivy", chest);
        assert_eq!(outcome, FabricationOutcome::Fabricated { at: chest.offset(0, 1, 0), copied: 0 });

        let outcome = service.use_fabrication_tablet(&mut world, "ivy", chest.offset(9, 0, 0));
        assert_eq!(outcome, FabricationOutcome::InvalidTarget);
        assert_eq!(world.player("ivy").unwrap().messages.len(), 3);
    }

    #[test]
    fn test_shutdown_saves_everyone() {
        let service = service();
        for id in ["a", "b"] {
            let mut player = HeadlessPlayer::new(id);
            service.dispatch(HostEvent::PlayerJoin { player: &mut player, saved: None });
        }
        let saved = service.shutdown();
        assert_eq!(saved.iter().map(|(id, _)| id.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(service.registry().is_empty());
    }
}
