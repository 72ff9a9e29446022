//! # Traveler Lifecycle Verification Tests
//!
//! End-to-end checks through `TravelerService` with the headless host:
//!
//! 1. **Soulbound slots**: binding order and the `[0, 41)` bound
//! 2. **Death and respawn**: items held back and returned to their slots
//! 3. **Attribute rewards**: Pure Heart stacking and attack speed re-derivation
//! 4. **Lasting**: expiration at join tick plus the table entry
//! 5. **Anvil**: tier gating, first-level application and repair
//! 6. **Persistence**: a record survives leave and rejoin
//!
//! Run with: cargo test --test traveler_lifecycle_verification

use traveler_rewards::attribute::{AttributeHandle, AttributeKind, AttributeModifier, ModifierId};
use traveler_rewards::headless::{HeadlessPlayer, HeadlessWorld};
use traveler_rewards::item::ids;
use traveler_rewards::persistence;
use traveler_rewards::{
    Enchantment, EventOutcome, HostEvent, ItemInstance, PlayerHandle, PlayerInventory,
    RewardsConfig, TravelerRecord, TravelerService,
};
use traveler_shared::{BlockPos, DeathLocation, Hand, LASTING_TICKS};

fn service() -> TravelerService {
    TravelerService::with_seed(RewardsConfig::default(), 42).unwrap()
}

fn joined(service: &TravelerService, id: &str) -> HeadlessPlayer {
    let mut player = HeadlessPlayer::new(id);
    service.dispatch(HostEvent::PlayerJoin { player: &mut player, saved: None });
    player
}

// ============================================================================
// SOULBOUND SLOTS
// ============================================================================

#[test]
fn verify_main_hand_binding_fills_main_storage_in_order() {
    let service = service();
    let tablet = ItemInstance::new(ids::SOULBOUND_RITUAL_TABLET, 1);
    let mut player = joined(&service, "alice");
    player.inventory.set_item(0, tablet.clone()).unwrap();

    let mut bound = Vec::new();
    for _ in 0..30 {
        bound.push(service.use_soulbound_tablet(&player, Hand::Main, &tablet).unwrap());
    }

    let mut expected = vec![0];
    expected.extend(9..36);
    expected.extend([0, 0]);
    assert_eq!(bound, expected);
    assert!(service.soulbound_slots("alice").iter().all(|slot| *slot < 41));
    assert_eq!(service.soulbound_slots("alice").len(), 28);
}

#[test]
fn verify_off_hand_binding_spills_into_armor() {
    let service = service();
    let tablet = ItemInstance::new(ids::SOULBOUND_RITUAL_TABLET, 1);
    let mut player = joined(&service, "bob");
    player.inventory.set_item(36, tablet.clone()).unwrap();

    let slots: Vec<_> = (0..6)
        .map(|_| service.use_soulbound_tablet(&player, Hand::Off, &tablet).unwrap())
        .collect();
    assert_eq!(slots, vec![36, 37, 38, 39, 40, 36]);
}

#[test]
fn verify_binding_missing_item_is_noop() {
    let service = service();
    let player = joined(&service, "carol");
    let tablet = ItemInstance::new(ids::SOULBOUND_RITUAL_TABLET, 1);
    assert_eq!(service.use_soulbound_tablet(&player, Hand::Main, &tablet), None);
    assert!(service.soulbound_slots("carol").is_empty());
}

// ============================================================================
// DEATH AND RESPAWN
// ============================================================================

#[test]
fn verify_death_and_respawn_round_trip() {
    let service = service();
    let sword = ItemInstance::damageable("minecraft:diamond_sword", 1561).with_damage(12);
    let helmet = ItemInstance::damageable("minecraft:iron_helmet", 165);
    let mut player = joined(&service, "dave");
    player.inventory.set_item(0, sword.clone()).unwrap();
    player.inventory.set_item(39, helmet.clone()).unwrap();
    player.inventory.set_item(5, ItemInstance::new("minecraft:dirt", 64)).unwrap();

    service.use_soulbound_tablet(&player, Hand::Main, &sword);
    service.use_soulbound_tablet(&player, Hand::Off, &helmet);
    let bound = service.soulbound_slots("dave");

    service.dispatch(HostEvent::PlayerDeath { player: &mut player });
    {
        let handle = service.registry().get("dave").unwrap();
        let record = handle.lock();
        let held: Vec<_> = record.pending_return().keys().copied().collect();
        assert_eq!(held, bound.iter().copied().collect::<Vec<_>>());
        assert_eq!(record.total_deaths(), 1);
        assert_eq!(
            record.last_death_location,
            Some(DeathLocation::new(BlockPos::new(0, 64, 0), "minecraft:overworld"))
        );
    }
    assert!(player.inventory.item(0).unwrap().is_empty());
    assert!(player.inventory.item(39).unwrap().is_empty());
    assert_eq!(player.inventory.item(5).unwrap().count, 64);

    service.dispatch(HostEvent::PlayerRespawn { player: &mut player });
    let handle = service.registry().get("dave").unwrap();
    assert!(handle.lock().pending_return().is_empty());
    assert_eq!(player.inventory.item(0), Some(&sword));
    assert_eq!(player.inventory.item(39), Some(&helmet));
}

#[test]
fn verify_leave_after_death_drops_at_death_location() {
    let service = service();
    let totem = ItemInstance::new("minecraft:totem_of_undying", 1);
    let mut player = joined(&service, "erin");
    player.inventory.set_item(2, totem.clone()).unwrap();
    service.use_soulbound_tablet(&player, Hand::Main, &totem);
    service.dispatch(HostEvent::PlayerDeath { player: &mut player });

    player.position = None;
    let outcome = service.dispatch(HostEvent::PlayerLeave { player: &mut player });
    assert!(matches!(outcome, EventOutcome::Persist(_)));
    assert_eq!(player.spawned.len(), 1);
    assert_eq!(player.spawned[0].1, totem);
    assert!(service.registry().get("erin").is_none());
}

// ============================================================================
// ATTRIBUTE REWARDS
// ============================================================================

#[test]
fn verify_pure_heart_sums_into_one_modifier() {
    let service = service();
    let delta = service.config().rewards.pure_heart_health;
    let mut player = joined(&service, "frank");

    for n in 1..=5 {
        let amount = service.use_pure_heart(&mut player).unwrap();
        assert!((amount - f64::from(n) * delta).abs() < 1e-9);
        assert!((player.health() - player.max_health()).abs() < 1e-9);
    }
    let attribute = &player.attributes[&AttributeKind::MaxHealth];
    assert_eq!(attribute.modifiers().len(), 1);
}

#[test]
fn verify_attack_speed_recomputed_not_compounded() {
    let service = service();
    let multiplier = service.config().rewards.attack_speed_multiplier;
    let mut player = joined(&service, "gina");
    let weapon = ModifierId(1);
    player
        .attribute_mut(AttributeKind::AttackSpeed)
        .unwrap()
        .add_modifier(AttributeModifier::addition(weapon, "weapon", 2.0));

    let first = service.apply_attack_speed_bonus(&mut player, 3).unwrap();
    assert!((first - (2.0 * multiplier.powi(3) - 2.0)).abs() < 1e-9);

    let second = service.apply_attack_speed_bonus(&mut player, 3).unwrap();
    assert!((second - first).abs() < 1e-9);

    let attribute = player.attribute_mut(AttributeKind::AttackSpeed).unwrap();
    attribute.remove_modifier(weapon);
    attribute.add_modifier(AttributeModifier::addition(weapon, "weapon", 3.0));
    let third = service.apply_attack_speed_bonus(&mut player, 3).unwrap();
    assert!((third - (3.0 * multiplier.powi(3) - 3.0)).abs() < 1e-9);
}

// ============================================================================
// LASTING
// ============================================================================

#[test]
fn verify_lasting_expires_at_join_plus_table_entry() {
    let service = service();
    let mut world = HeadlessWorld::new();
    let mut player = joined(&service, "hank");
    let charm = ItemInstance::new("minecraft:clock", 1).with_enchantment(Enchantment::Lasting, 3);
    player.inventory.set_item(12, charm).unwrap();
    world.insert(player);

    let join_tick = 2_000;
    service.dispatch(HostEvent::ServerTick { tick: join_tick, world: &mut world });
    let expiration = join_tick + LASTING_TICKS[2];
    let stamped = world.player("hank").unwrap().inventory.item(12).unwrap();
    assert_eq!(stamped.metadata.lasting_expiration, Some(expiration));

    service.dispatch(HostEvent::ServerTick { tick: expiration - 20, world: &mut world });
    assert!(!world.player("hank").unwrap().inventory.item(12).unwrap().is_empty());

    service.dispatch(HostEvent::ServerTick { tick: expiration, world: &mut world });
    let hank = world.player("hank").unwrap();
    assert!(hank.inventory.item(12).unwrap().is_empty());
    assert_eq!(hank.messages, vec!["Clock has expired".to_string()]);
}

// ============================================================================
// ANVIL
// ============================================================================

#[test]
fn verify_low_tier_catalyst_cannot_cross_sub_cap() {
    let service = service();
    let sword = ItemInstance::damageable("minecraft:diamond_sword", 1561)
        .with_enchantment(Enchantment::Sharpness, 5);

    let whetstone = ItemInstance::new(ids::WHETSTONE, 1);
    assert!(service.resolve_anvil(&sword, &whetstone).is_none());

    let netherite = ItemInstance::new(ids::NETHERITE_WHETSTONE, 1);
    let result = service.resolve_anvil(&sword, &netherite).unwrap();
    assert_eq!(result.item.enchantment_level(&Enchantment::Sharpness), 7);
    assert_eq!(result.cost, 1);
}

#[test]
fn verify_low_tier_catalyst_below_sub_cap() {
    // The tier gate starts at the sub-cap itself: level 5 rejects a tier 1
    // catalyst, but level 4 still climbs to 5.
    let service = service();
    let whetstone = ItemInstance::new(ids::WHETSTONE, 1);
    let sword = ItemInstance::damageable("minecraft:diamond_sword", 1561)
        .with_enchantment(Enchantment::Sharpness, 4);
    let result = service.resolve_anvil(&sword, &whetstone).unwrap();
    assert_eq!(result.item.enchantment_level(&Enchantment::Sharpness), 5);
}

#[test]
fn verify_repair_restores_a_quarter() {
    let service = service();
    let sword = ItemInstance::damageable("minecraft:diamond_sword", 1560).with_damage(780);
    let shard = ItemInstance::new(ids::DIAMOND_SHARD, 1);
    let result = service.resolve_anvil(&sword, &shard).unwrap();
    assert_eq!(result.item.damage, 390);

    let nearly_new = ItemInstance::damageable("minecraft:diamond_sword", 1560).with_damage(100);
    let result = service.resolve_anvil(&nearly_new, &shard).unwrap();
    assert_eq!(result.item.damage, 0);

    let pristine = ItemInstance::damageable("minecraft:diamond_sword", 1560);
    assert!(service.resolve_anvil(&pristine, &shard).is_none());
}

// ============================================================================
// PERSISTENCE
// ============================================================================

#[test]
fn verify_record_survives_rejoin() {
    let service = service();
    let pearl = ItemInstance::new("minecraft:ender_pearl", 16);
    let mut player = joined(&service, "ivy");
    player.inventory.set_item(7, pearl.clone()).unwrap();
    service.use_soulbound_tablet(&player, Hand::Main, &pearl);
    service.use_pure_heart(&mut player);
    service.dispatch(HostEvent::PlayerDeath { player: &mut player });
    service.dispatch(HostEvent::PlayerRespawn { player: &mut player });

    let EventOutcome::Persist(saved) = service.dispatch(HostEvent::PlayerLeave { player: &mut player })
    else {
        panic!("leave should persist the record");
    };
    let text = saved.to_toml_string().unwrap();
    let reloaded = persistence::TagBlock::from_toml_str(&text).unwrap();

    service.dispatch(HostEvent::PlayerJoin { player: &mut player, saved: Some(&reloaded) });
    let handle = service.registry().get("ivy").unwrap();
    let record = handle.lock();
    assert!(record.soulbound_slots().contains(&7));
    assert_eq!(record.pure_hearts_consumed(), 1);
    assert_eq!(record.total_deaths(), 1);
    assert!(record.last_death_location.is_some());
}

#[test]
fn verify_join_keeps_bindings_made_before_join() {
    let service = service();
    let compass = ItemInstance::new("minecraft:recovery_compass", 1);
    let mut player = HeadlessPlayer::new("jade");
    player.inventory.set_item(3, compass.clone()).unwrap();
    assert_eq!(service.use_soulbound_tablet(&player, Hand::Main, &compass), Some(3));

    service.dispatch(HostEvent::PlayerJoin { player: &mut player, saved: None });

    assert!(service.is_slot_soulbound("jade", 3));
}

#[test]
fn verify_join_merges_saved_record_into_live_one() {
    let service = service();
    let mut saved = TravelerRecord::new();
    saved.restore_soulbound_slots([12]);
    saved.restore_counters(2, 4);
    let saved = persistence::serialize(&saved);

    let compass = ItemInstance::new("minecraft:recovery_compass", 1);
    let mut player = HeadlessPlayer::new("kai");
    player.inventory.set_item(3, compass.clone()).unwrap();
    service.use_soulbound_tablet(&player, Hand::Main, &compass);

    service.dispatch(HostEvent::PlayerJoin { player: &mut player, saved: Some(&saved) });

    assert_eq!(service.soulbound_slots("kai").into_iter().collect::<Vec<_>>(), vec![3, 12]);
    let handle = service.registry().get("kai").unwrap();
    let record = handle.lock();
    assert_eq!(record.pure_hearts_consumed(), 2);
    assert_eq!(record.total_deaths(), 4);
}

#[test]
fn verify_garbage_tag_block_loads_empty() {
    let mut tag = persistence::TagBlock::new();
    tag.put("soulbound_slots", persistence::TagValue::Str("0,1,2".into()));
    tag.put("death_location", persistence::TagValue::Str("not a location".into()));
    tag.put("total_deaths", persistence::TagValue::Int(-3));
    assert_eq!(persistence::deserialize(&tag), TravelerRecord::new());
}
