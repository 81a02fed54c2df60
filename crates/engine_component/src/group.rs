//! Group identifiers.
//!
//! Groups are small integers chosen by the application (players, walls,
//! projectiles, ...). They drive both collision broad phase and draw
//! layering. A world validates every group against its configured capacity.

use serde::{Deserialize, Serialize};

/// Hard upper bound on distinct groups per world.
pub const MAX_GROUPS: usize = 32;

/// A group identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u8);

impl GroupId {
    /// Create a group id. Usable in `const` declarations.
    #[must_use]
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// Returns the index of this group's bit and member list.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Group({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLS: GroupId = GroupId::new(3);

    #[test]
    fn test_const_group_index() {
        assert_eq!(WALLS.index(), 3);
        assert_eq!(WALLS.to_string(), "Group(3)");
    }

    #[test]
    fn test_groups_order_by_index() {
        assert!(GroupId::new(1) < WALLS);
        assert_eq!(GroupId::new(3), WALLS);
    }
}
