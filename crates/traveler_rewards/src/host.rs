//! # Host Collaborators
//!
//! Everything the core needs from the game engine, expressed as traits.
//! Adapters implement these over the engine's own player, mob and brewing
//! objects; nothing here reaches into engine internals.

use traveler_shared::{BlockPos, Vec3};

use crate::attribute::{AttributeHandle, AttributeKind};
use crate::error::RewardsResult;
use crate::inventory::PlayerInventory;
use crate::item::ItemInstance;

/// Sounds the core asks the host to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundKind {
    /// Glass shattering (Potion Pot toss).
    GlassBreak,
}

/// Shape of a chest block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChestKind {
    /// A lone chest.
    Single,
    /// One half of a double chest.
    Double,
}

/// A structure the host reported the player as being near.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructureInfo {
    /// Host identifier for this structure instance.
    pub id: String,
    /// Structure origin.
    pub origin: BlockPos,
}

/// A hostile or neutral mob near a player.
pub trait MobHandle {
    /// Namespaced entity type, e.g. `minecraft:zombie`.
    fn entity_type(&self) -> &str;

    /// True for mobs that can attack the player.
    fn is_hostile(&self) -> bool;

    /// Current position.
    fn position(&self) -> Vec3;

    /// True if this mob is currently targeting the given player.
    fn is_targeting(&self, player_id: &str) -> bool;

    /// Drops the current attack target.
    fn clear_target(&mut self);

    /// Erases short-term aggression memory (attack target, anger).
    fn forget_aggression(&mut self);

    /// Issues a navigation order.
    fn move_to(&mut self, target: Vec3, speed: f64);
}

/// One online player as exposed by the host.
pub trait PlayerHandle {
    /// Stable player identity.
    fn id(&self) -> &str;

    /// Read access to the inventory.
    fn inventory(&self) -> &dyn PlayerInventory;

    /// Write access to the inventory.
    fn inventory_mut(&mut self) -> &mut dyn PlayerInventory;

    /// Attribute instance, or `None` if the host cannot supply it.
    fn attribute_mut(&mut self, kind: AttributeKind) -> Option<&mut dyn AttributeHandle>;

    /// Current health.
    fn health(&self) -> f64;

    /// Current maximum health including modifiers.
    fn max_health(&self) -> f64;

    /// Sets current health.
    fn set_health(&mut self, health: f64);

    /// Last known position, `None` when the host cannot resolve it.
    fn position(&self) -> Option<Vec3>;

    /// Eye position.
    fn eye_position(&self) -> Vec3;

    /// Unit look direction.
    fn look_direction(&self) -> Vec3;

    /// Current dimension id.
    fn dimension_id(&self) -> &str;

    /// Bed or anchor respawn point, if set.
    fn respawn_position(&self) -> Option<BlockPos>;

    /// Open-air surface block directly above the player, if one exists.
    fn surface_above(&self) -> Option<BlockPos>;

    /// Shows a transient action-bar message.
    fn notify(&mut self, message: &str);

    /// Spawns an item entity in the player's level.
    fn spawn_item(&mut self, at: Vec3, item: ItemInstance);

    /// Plays a sound at a position.
    fn play_sound(&mut self, sound: SoundKind, at: BlockPos);

    /// Moves the player.
    fn teleport(&mut self, to: Vec3);

    /// Mobs currently near the player.
    fn nearby_mobs(&mut self) -> Vec<&mut dyn MobHandle>;

    /// Block position, if the position is known.
    fn block_position(&self) -> Option<BlockPos> {
        self.position().map(Vec3::block_pos)
    }
}

/// Brewing transformations known to the host.
pub trait BrewingTable {
    /// Result of brewing `ingredient` into `base`, or `None` if no such mix exists.
    fn mix(&self, ingredient: &ItemInstance, base: &ItemInstance) -> Option<ItemInstance>;
}

/// Level access: online players for the periodic tick, plus the block and
/// container hooks chest fabrication needs.
pub trait HostWorld {
    /// The online player with `id`.
    fn player_mut(&mut self, id: &str) -> Option<&mut dyn PlayerHandle>;

    /// Chest shape at `pos`, `None` when the block there is not a chest.
    fn chest_at(&self, pos: BlockPos) -> Option<ChestKind>;

    /// Contents of the chest at `pos` by slot, empty when there is no chest.
    fn chest_items(&self, pos: BlockPos) -> Vec<ItemInstance>;

    /// True if the block at `pos` is air or may be replaced by a placement.
    fn is_replaceable(&self, pos: BlockPos) -> bool;

    /// True if the block at `pos` is solid enough to stand a chest on.
    fn is_solid(&self, pos: BlockPos) -> bool;

    /// Places an empty copy of the block at `source`, orientation included,
    /// at `at`. Returns false if the host refused the placement.
    fn place_copy(&mut self, source: BlockPos, at: BlockPos) -> bool;

    /// Writes `item` into `slot` of the chest at `pos`.
    ///
    /// # Errors
    ///
    /// Returns `NoChest` if there is no chest at `pos` and `InvalidSlot` if
    /// the chest has no such slot.
    fn set_chest_item(&mut self, pos: BlockPos, slot: usize, item: ItemInstance) -> RewardsResult<()>;
}
