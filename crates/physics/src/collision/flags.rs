//! Surface tags for collision filtering.
//!
//! Every static collider carries a set of tags that decides which collision
//! pass may see it. Tags are not exclusive: a ramp can be both `GROUND` and
//! `SURFABLE`.

use serde::{Deserialize, Serialize};

/// Tag set attached to a static surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SurfaceTags(pub u8);

impl SurfaceTags {
    /// No tags - invisible to every pass.
    pub const NONE: Self = Self(0);

    /// Walkable floor.
    pub const GROUND: Self = Self(1 << 0);

    /// Surf ramp - slides the player instead of stopping them.
    pub const SURFABLE: Self = Self(1 << 1);

    /// Wall or blocker.
    pub const OBSTACLE: Self = Self(1 << 2);

    /// Mask for the ground pass.
    pub const MASK_GROUND_PASS: Self = Self(Self::GROUND.0 | Self::SURFABLE.0);

    /// Mask for the wall pass.
    pub const MASK_WALL_PASS: Self = Self(Self::OBSTACLE.0 | Self::SURFABLE.0);

    /// Every tag.
    pub const ALL: Self = Self(Self::GROUND.0 | Self::SURFABLE.0 | Self::OBSTACLE.0);

    /// Check if these tags contain all of `other`.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any of the given tags are set.
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// Combine two tag sets.
    #[inline]
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub fn is_ground(self) -> bool {
        self.contains(Self::GROUND)
    }

    #[inline]
    pub fn is_surfable(self) -> bool {
        self.contains(Self::SURFABLE)
    }

    #[inline]
    pub fn is_obstacle(self) -> bool {
        self.contains(Self::OBSTACLE)
    }
}

impl std::ops::BitOr for SurfaceTags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for SurfaceTags {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_operations() {
        let ramp = SurfaceTags::GROUND | SurfaceTags::SURFABLE;

        assert!(ramp.is_ground());
        assert!(ramp.is_surfable());
        assert!(!ramp.is_obstacle());
        assert!(ramp.intersects(SurfaceTags::SURFABLE));
        assert_eq!(ramp & SurfaceTags::OBSTACLE, SurfaceTags::NONE);
    }

    #[test]
    fn test_pass_masks() {
        assert!(SurfaceTags::MASK_GROUND_PASS.contains(SurfaceTags::GROUND));
        assert!(SurfaceTags::MASK_GROUND_PASS.contains(SurfaceTags::SURFABLE));
        assert!(!SurfaceTags::MASK_GROUND_PASS.intersects(SurfaceTags::OBSTACLE));
        assert!(SurfaceTags::MASK_WALL_PASS.intersects(SurfaceTags::OBSTACLE));
        assert!(!SurfaceTags::NONE.intersects(SurfaceTags::ALL));
    }
}
