//! Position types shared between the core and host adapters.

use serde::{Deserialize, Serialize};

/// Continuous world position or direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Z component
    pub z: f64,
}

impl Vec3 {
    /// Creates a new Vec3
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Dot product
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Length
    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len < 1.0e-4 {
            Self::ZERO
        } else {
            self * (1.0 / len)
        }
    }

    /// Block containing this point.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn block_pos(self) -> BlockPos {
        BlockPos::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Integer block coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    /// X coordinate
    pub x: i32,
    /// Y coordinate
    pub y: i32,
    /// Z coordinate
    pub z: i32,
}

impl BlockPos {
    /// Creates a new block position
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns this position shifted by the given deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Centre of the block's top face, where dropped items should land.
    #[must_use]
    pub fn drop_point(self) -> Vec3 {
        Vec3::new(
            f64::from(self.x) + 0.5,
            f64::from(self.y) + 1.0,
            f64::from(self.z) + 0.5,
        )
    }

    /// Centre of the block's bottom face, where a teleported player stands.
    #[must_use]
    pub fn standing_point(self) -> Vec3 {
        Vec3::new(f64::from(self.x) + 0.5, f64::from(self.y), f64::from(self.z) + 0.5)
    }

    /// True when every axis is within `range` blocks of `other`.
    #[must_use]
    pub fn in_range(self, other: Self, range: i32) -> bool {
        (self.x - other.x).abs() <= range
            && (self.y - other.y).abs() <= range
            && (self.z - other.z).abs() <= range
    }

    /// Serializes as `x,y,z`.
    #[must_use]
    pub fn to_tag_string(self) -> String {
        format!("{},{},{}", self.x, self.y, self.z)
    }

    /// Parses the `x,y,z` form. Returns `None` on any malformed component.
    #[must_use]
    pub fn parse_tag_string(data: &str) -> Option<Self> {
        let mut parts = data.split(',');
        let x = parts.next()?.trim().parse().ok()?;
        let y = parts.next()?.trim().parse().ok()?;
        let z = parts.next()?.trim().parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(x, y, z))
    }
}
