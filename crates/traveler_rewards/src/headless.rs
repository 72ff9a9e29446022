//! # Headless Host
//!
//! In-memory implementations of the host collaborator traits. They back the
//! test suites and benchmarks, and let tooling drive the rewards core
//! without a running game server. Every side effect the core requests is
//! recorded in a public field so callers can inspect it.

use std::collections::HashMap;

use traveler_shared::{BlockPos, Vec3};

use crate::attribute::{AttributeHandle, AttributeInstance, AttributeKind};
use crate::error::{RewardsError, RewardsResult};
use crate::host::{BrewingTable, ChestKind, HostWorld, MobHandle, PlayerHandle, SoundKind};
use crate::inventory::{PlayerInventory, SlotInventory};
use crate::item::{ids, ItemInstance};

/// Vanilla base max health.
pub const DEFAULT_MAX_HEALTH: f64 = 20.0;

/// Vanilla base attack speed.
pub const DEFAULT_ATTACK_SPEED: f64 = 4.0;

/// Distance from feet to eyes for a standing player.
const EYE_HEIGHT: f64 = 1.62;

/// Slots in a single chest.
pub const CHEST_SLOTS: usize = 27;

// ============================================================================
// Mob
// ============================================================================

/// A mob with a target, an aggression flag and a navigation order.
#[derive(Clone, Debug, PartialEq)]
pub struct HeadlessMob {
    /// Namespaced entity type.
    pub entity_type: String,
    /// Whether it attacks players.
    pub hostile: bool,
    /// Current position.
    pub position: Vec3,
    /// Player id this mob is attacking.
    pub target: Option<String>,
    /// Short-term anger memory.
    pub aggressive: bool,
    /// Last navigation order: destination and speed.
    pub destination: Option<(Vec3, f64)>,
}

impl HeadlessMob {
    /// A hostile mob with no target.
    #[must_use]
    pub fn hostile(entity_type: impl Into<String>, position: Vec3) -> Self {
        Self {
            entity_type: entity_type.into(),
            hostile: true,
            position,
            target: None,
            aggressive: false,
            destination: None,
        }
    }

    /// A passive mob.
    #[must_use]
    pub fn passive(entity_type: impl Into<String>, position: Vec3) -> Self {
        Self {
            hostile: false,
            ..Self::hostile(entity_type, position)
        }
    }

    /// Sets the attack target and anger, builder style.
    #[must_use]
    pub fn targeting(mut self, player_id: impl Into<String>) -> Self {
        self.target = Some(player_id.into());
        self.aggressive = true;
        self
    }
}

impl MobHandle for HeadlessMob {
    fn entity_type(&self) -> &str {
        &self.entity_type
    }

    fn is_hostile(&self) -> bool {
        self.hostile
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn is_targeting(&self, player_id: &str) -> bool {
        self.target.as_deref() == Some(player_id)
    }

    fn clear_target(&mut self) {
        self.target = None;
    }

    fn forget_aggression(&mut self) {
        self.aggressive = false;
    }

    fn move_to(&mut self, target: Vec3, speed: f64) {
        self.destination = Some((target, speed));
    }
}

// ============================================================================
// Player
// ============================================================================

/// A player whose world interactions are recorded instead of performed.
#[derive(Clone, Debug)]
pub struct HeadlessPlayer {
    /// Player id.
    pub id: String,
    /// 41-slot inventory.
    pub inventory: SlotInventory,
    /// Attribute instances; remove an entry to simulate a missing handle.
    pub attributes: HashMap<AttributeKind, AttributeInstance>,
    /// Current health.
    pub health: f64,
    /// Feet position, `None` when unresolvable.
    pub position: Option<Vec3>,
    /// Eye position.
    pub eye: Vec3,
    /// Look direction.
    pub look: Vec3,
    /// Dimension id.
    pub dimension: String,
    /// Respawn point.
    pub respawn: Option<BlockPos>,
    /// Open surface above the player.
    pub surface: Option<BlockPos>,
    /// Nearby mobs.
    pub mobs: Vec<HeadlessMob>,
    /// Action-bar messages shown.
    pub messages: Vec<String>,
    /// Items spawned into the world.
    pub spawned: Vec<(Vec3, ItemInstance)>,
    /// Sounds played.
    pub sounds: Vec<(SoundKind, BlockPos)>,
    /// Teleport destinations.
    pub teleports: Vec<Vec3>,
}

impl HeadlessPlayer {
    /// A healthy player standing at the overworld origin with an empty inventory.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let position = Vec3::new(0.5, 64.0, 0.5);
        let attributes = HashMap::from([
            (AttributeKind::MaxHealth, AttributeInstance::new(DEFAULT_MAX_HEALTH)),
            (AttributeKind::AttackSpeed, AttributeInstance::new(DEFAULT_ATTACK_SPEED)),
        ]);
        Self {
            id: id.into(),
            inventory: SlotInventory::new(),
            attributes,
            health: DEFAULT_MAX_HEALTH,
            position: Some(position),
            eye: position + Vec3::new(0.0, EYE_HEIGHT, 0.0),
            look: Vec3::new(0.0, 0.0, 1.0),
            dimension: "minecraft:overworld".to_string(),
            respawn: None,
            surface: None,
            mobs: Vec::new(),
            messages: Vec::new(),
            spawned: Vec::new(),
            sounds: Vec::new(),
            teleports: Vec::new(),
        }
    }

    /// Places the player at `position`, moving the eyes with it.
    pub fn move_to(&mut self, position: Vec3) {
        self.position = Some(position);
        self.eye = position + Vec3::new(0.0, EYE_HEIGHT, 0.0);
    }
}

impl PlayerHandle for HeadlessPlayer {
    fn id(&self) -> &str {
        &self.id
    }

    fn inventory(&self) -> &dyn PlayerInventory {
        &self.inventory
    }

    fn inventory_mut(&mut self) -> &mut dyn PlayerInventory {
        &mut self.inventory
    }

    fn attribute_mut(&mut self, kind: AttributeKind) -> Option<&mut dyn AttributeHandle> {
        self.attributes
            .get_mut(&kind)
            .map(|attribute| attribute as &mut dyn AttributeHandle)
    }

    fn health(&self) -> f64 {
        self.health
    }

    fn max_health(&self) -> f64 {
        self.attributes
            .get(&AttributeKind::MaxHealth)
            .map_or(DEFAULT_MAX_HEALTH, |attribute| attribute.value())
    }

    fn set_health(&mut self, health: f64) {
        self.health = health.clamp(0.0, self.max_health());
    }

    fn position(&self) -> Option<Vec3> {
        self.position
    }

    fn eye_position(&self) -> Vec3 {
        self.eye
    }

    fn look_direction(&self) -> Vec3 {
        self.look
    }

    fn dimension_id(&self) -> &str {
        &self.dimension
    }

    fn respawn_position(&self) -> Option<BlockPos> {
        self.respawn
    }

    fn surface_above(&self) -> Option<BlockPos> {
        self.surface
    }

    fn notify(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn spawn_item(&mut self, at: Vec3, item: ItemInstance) {
        self.spawned.push((at, item));
    }

    fn play_sound(&mut self, sound: SoundKind, at: BlockPos) {
        self.sounds.push((sound, at));
    }

    fn teleport(&mut self, to: Vec3) {
        self.move_to(to);
        self.teleports.push(to);
    }

    fn nearby_mobs(&mut self) -> Vec<&mut dyn MobHandle> {
        self.mobs
            .iter_mut()
            .map(|mob| mob as &mut dyn MobHandle)
            .collect()
    }
}

// ============================================================================
// World
// ============================================================================

/// A block in the headless level. Positions with no entry are air.
#[derive(Clone, Debug, PartialEq)]
pub enum HeadlessBlock {
    /// Terrain a chest can stand on.
    Solid,
    /// Grass, snow and anything else a placement overwrites.
    Replaceable,
    /// A chest and its slots.
    Chest {
        /// Single or double.
        kind: ChestKind,
        /// Slot contents.
        items: Vec<ItemInstance>,
    },
}

/// Online players by id, plus a sparse block map.
#[derive(Debug, Default)]
pub struct HeadlessWorld {
    /// Players currently online.
    pub players: HashMap<String, HeadlessPlayer>,
    /// Non-air blocks.
    pub blocks: HashMap<BlockPos, HeadlessBlock>,
}

impl HeadlessWorld {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a player, replacing any with the same id.
    pub fn insert(&mut self, player: HeadlessPlayer) {
        self.players.insert(player.id.clone(), player);
    }

    /// Player by id.
    #[must_use]
    pub fn player(&self, id: &str) -> Option<&HeadlessPlayer> {
        self.players.get(id)
    }

    /// Sets the block at `pos`.
    pub fn set_block(&mut self, pos: BlockPos, block: HeadlessBlock) {
        self.blocks.insert(pos, block);
    }

    /// Places a chest of `kind` whose leading slots hold `items`.
    pub fn place_chest(&mut self, pos: BlockPos, kind: ChestKind, items: Vec<ItemInstance>) {
        let mut slots = items;
        slots.resize(slots.len().max(CHEST_SLOTS), ItemInstance::empty());
        self.set_block(pos, HeadlessBlock::Chest { kind, items: slots });
    }
}

impl HostWorld for HeadlessWorld {
    fn player_mut(&mut self, id: &str) -> Option<&mut dyn PlayerHandle> {
        self.players
            .get_mut(id)
            .map(|player| player as &mut dyn PlayerHandle)
    }

    fn chest_at(&self, pos: BlockPos) -> Option<ChestKind> {
        match self.blocks.get(&pos) {
            Some(HeadlessBlock::Chest { kind, .. }) => Some(*kind),
            _ => None,
        }
    }

    fn chest_items(&self, pos: BlockPos) -> Vec<ItemInstance> {
        match self.blocks.get(&pos) {
            Some(HeadlessBlock::Chest { items, .. }) => items.clone(),
            _ => Vec::new(),
        }
    }

    fn is_replaceable(&self, pos: BlockPos) -> bool {
        matches!(self.blocks.get(&pos), None | Some(HeadlessBlock::Replaceable))
    }

    fn is_solid(&self, pos: BlockPos) -> bool {
        matches!(
            self.blocks.get(&pos),
            Some(HeadlessBlock::Solid | HeadlessBlock::Chest { .. })
        )
    }

    fn place_copy(&mut self, source: BlockPos, at: BlockPos) -> bool {
        let Some(HeadlessBlock::Chest { kind, items }) = self.blocks.get(&source) else {
            return false;
        };
        let copy = HeadlessBlock::Chest {
            kind: *kind,
            items: vec![ItemInstance::empty(); items.len()],
        };
        if !self.is_replaceable(at) {
            return false;
        }
        self.blocks.insert(at, copy);
        true
    }

    fn set_chest_item(&mut self, pos: BlockPos, slot: usize, item: ItemInstance) -> RewardsResult<()> {
        let Some(HeadlessBlock::Chest { items, .. }) = self.blocks.get_mut(&pos) else {
            return Err(RewardsError::NoChest(pos));
        };
        let slot_count = items.len();
        let target = items
            .get_mut(slot)
            .ok_or(RewardsError::InvalidSlot { slot, slot_count })?;
        *target = item;
        Ok(())
    }
}

// ============================================================================
// Brewing
// ============================================================================

/// Brewing table built from `(ingredient, base potion) -> result potion` entries.
#[derive(Clone, Debug, Default)]
pub struct RecipeBrewingTable {
    mixes: HashMap<(String, String), String>,
}

impl RecipeBrewingTable {
    /// Creates a table with no mixes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mix.
    pub fn add_mix(&mut self, ingredient: &str, base_potion: &str, result_potion: &str) {
        self.mixes.insert(
            (ingredient.to_string(), base_potion.to_string()),
            result_potion.to_string(),
        );
    }
}

impl BrewingTable for RecipeBrewingTable {
    fn mix(&self, ingredient: &ItemInstance, base: &ItemInstance) -> Option<ItemInstance> {
        let base_potion = base.metadata.potion.as_deref()?;
        let result = self
            .mixes
            .get(&(ingredient.id.as_str().to_string(), base_potion.to_string()))?;
        let mut brewed = ItemInstance::new(ids::POTION, base.count.max(1));
        brewed.metadata.potion = Some(result.clone());
        Some(brewed)
    }
}
