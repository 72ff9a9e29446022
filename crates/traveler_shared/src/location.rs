//! Death location value object.

use serde::{Deserialize, Serialize};

use crate::math::BlockPos;

/// Where a player last died, kept so a later pickup can find the spot.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeathLocation {
    /// Block X
    pub x: i32,
    /// Block Y
    pub y: i32,
    /// Block Z
    pub z: i32,
    /// Namespaced dimension id, e.g. `minecraft:overworld`.
    pub dimension_id: String,
}

impl DeathLocation {
    /// Creates a death location at `pos` in `dimension_id`.
    #[must_use]
    pub fn new(pos: BlockPos, dimension_id: impl Into<String>) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            z: pos.z,
            dimension_id: dimension_id.into(),
        }
    }

    /// Block position of the death.
    #[must_use]
    pub const fn position(&self) -> BlockPos {
        BlockPos::new(self.x, self.y, self.z)
    }

    /// Encodes as `x,y,z|dimension`.
    #[must_use]
    pub fn to_tag_string(&self) -> String {
        format!("{},{},{}|{}", self.x, self.y, self.z, self.dimension_id)
    }

    /// Decodes the `x,y,z|dimension` form.
    ///
    /// Returns `None` for anything malformed; callers decide whether that
    /// is worth logging.
    #[must_use]
    pub fn parse_tag_string(data: &str) -> Option<Self> {
        let (coords, dimension) = data.split_once('|')?;
        if dimension.contains('|') {
            return None;
        }
        let pos = BlockPos::parse_tag_string(coords)?;
        Some(Self::new(pos, dimension))
    }
}
