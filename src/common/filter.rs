//! Category/mask/group collision eligibility.

use serde::{Deserialize, Serialize};

/// Bitmask filter deciding whether two bodies may interact.
///
/// A shared non-zero `group` overrides the masks: positive groups always
/// collide with each other, negative groups never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionFilter {
    pub category: u32,
    pub mask: u32,
    pub group: i32,
}

impl CollisionFilter {
    pub const DEFAULT_CATEGORY: u32 = 0x0001;
    pub const ALL: u32 = u32::MAX;

    pub fn new(category: u32, mask: u32, group: i32) -> Self {
        Self { category, mask, group }
    }

    /// Filter in a group; see the type docs for the group rule.
    pub fn in_group(group: i32) -> Self {
        Self { group, ..Self::default() }
    }

    pub fn can_collide(&self, other: &CollisionFilter) -> bool {
        if self.group == other.group && self.group != 0 {
            return self.group > 0;
        }
        (self.category & other.mask) != 0 && (other.category & self.mask) != 0
    }
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            category: Self::DEFAULT_CATEGORY,
            mask: Self::ALL,
            group: 0,
        }
    }
}
