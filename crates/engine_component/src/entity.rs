//! Entity handles.
//!
//! An [`Entity`] names a record owned by one world. The handle itself holds
//! no data, so group indexes, manifolds and collision results copy it
//! freely. A handle that outlives its record simply stops resolving.

use serde::{Deserialize, Serialize};

/// Handle to one entity of one world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(pub u64);

impl Entity {
    /// Wraps a raw id.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Issues handles in creation order, starting at `Entity(1)`.
///
/// Handles are never reused, so a stale handle can't alias an entity created
/// after its own was reclaimed.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    issued: u64,
}

impl EntityAllocator {
    /// An allocator that has issued nothing.
    #[must_use]
    pub const fn new() -> Self {
        Self { issued: 0 }
    }

    /// Issues the next handle.
    pub fn allocate(&mut self) -> Entity {
        self.issued += 1;
        Entity(self.issued)
    }

    /// Handles issued so far, reclaimed ones included.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.issued
    }

    /// Returns `true` if this allocator handed out `entity`, whether or not
    /// it is still alive.
    #[must_use]
    pub fn has_issued(&self, entity: Entity) -> bool {
        (1..=self.issued).contains(&entity.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_follow_creation_order() {
        let mut alloc = EntityAllocator::new();
        let first = alloc.allocate();
        let second = alloc.allocate();
        assert_eq!(first, Entity::from_raw(1));
        assert_eq!(second.id(), 2);
        assert!(first < second);
        assert_eq!(alloc.issued(), 2);
    }

    #[test]
    fn test_has_issued() {
        let mut alloc = EntityAllocator::default();
        assert!(!alloc.has_issued(Entity(1)));
        let e = alloc.allocate();
        assert!(alloc.has_issued(e));
        assert!(!alloc.has_issued(Entity(0)));
        assert!(!alloc.has_issued(Entity(2)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Entity::from_raw(7).to_string(), "Entity(7)");
    }
}
