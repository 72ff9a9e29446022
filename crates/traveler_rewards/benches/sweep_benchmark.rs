//! Benchmark for the periodic lasting sweep and mob ward pass.
//!
//! Run with: cargo bench --package traveler_rewards --bench sweep_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use traveler_rewards::config::RewardSettings;
use traveler_rewards::effects::RewardEffects;
use traveler_rewards::headless::{HeadlessMob, HeadlessPlayer};
use traveler_rewards::inventory::PlayerInventory;
use traveler_rewards::item::{ids, Enchantment, ItemId, ItemInstance};
use traveler_rewards::lasting::LastingSweeper;
use traveler_rewards::loot_index::MobLootIndex;
use traveler_shared::{Vec3, INVENTORY_SLOT_COUNT};

fn create_full_player() -> HeadlessPlayer {
    let mut player = HeadlessPlayer::new("bench");
    for slot in 0..INVENTORY_SLOT_COUNT {
        let item = if slot % 3 == 0 {
            ItemInstance::new("minecraft:torch", 16).with_enchantment(Enchantment::Lasting, 10)
        } else {
            ItemInstance::new("minecraft:cobblestone", 64)
        };
        player.inventory.set_item(slot, item).unwrap();
    }
    player
}

fn benchmark_full_inventory_sweep(c: &mut Criterion) {
    let sweeper = LastingSweeper::default();
    let mut player = create_full_player();
    // Stamp expirations once so the loop measures the steady state
    sweeper.sweep(&mut player, 0);

    c.bench_function("lasting_sweep_41_slots", |b| {
        let mut tick = 0u64;
        b.iter(|| {
            tick += 20;
            black_box(sweeper.sweep(&mut player, tick))
        });
    });
}

fn benchmark_mob_ward(c: &mut Criterion) {
    let effects = RewardEffects::new(RewardSettings::default());
    let mut loot = MobLootIndex::new();
    loot.record_loot_table("minecraft:entities/zombie", [ItemId::from("minecraft:rotten_flesh")]);
    loot.record_loot_table("minecraft:entities/skeleton", [ItemId::from("minecraft:bone")]);

    let mut ward = ItemInstance::new(ids::MOB_WARD, 1);
    ward.set_ward_filter(ItemInstance::new("minecraft:rotten_flesh", 1));
    let mut player = HeadlessPlayer::new("bench");
    player.inventory.set_item(0, ward).unwrap();
    for i in 0..32u32 {
        let kind = if i % 2 == 0 { "minecraft:zombie" } else { "minecraft:skeleton" };
        let offset = f64::from(i) - 16.0;
        player
            .mobs
            .push(HeadlessMob::hostile(kind, Vec3::new(offset, 64.0, 4.0)).targeting("bench"));
    }

    c.bench_function("mob_ward_32_mobs", |b| {
        b.iter(|| black_box(effects.ward_mobs(&mut player, &loot)));
    });
}

criterion_group!(benches, benchmark_full_inventory_sweep, benchmark_mob_ward);
criterion_main!(benches);
