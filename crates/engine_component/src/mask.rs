//! 32-bit presence and membership sets.

use serde::{Deserialize, Serialize};

/// A set of up to 32 small indices packed into one `u32`.
///
/// Indices at or above 32 are never members; callers validate them against
/// a [`Capacity`](crate::Capacity) before they get here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitMask(pub u32);

/// Which component kinds an entity carries.
pub type ComponentMask = BitMask;

/// Which groups an entity belongs to.
pub type GroupMask = BitMask;

impl BitMask {
    /// The empty set.
    pub const EMPTY: BitMask = BitMask(0);

    fn bit(index: usize) -> u32 {
        u32::try_from(index)
            .ok()
            .and_then(|i| 1u32.checked_shl(i))
            .unwrap_or(0)
    }

    /// Returns `true` if `index` is in the set.
    #[must_use]
    pub fn contains(self, index: usize) -> bool {
        self.0 & Self::bit(index) != 0
    }

    /// Adds `index` to the set.
    pub fn insert(&mut self, index: usize) {
        self.0 |= Self::bit(index);
    }

    /// Removes `index` from the set.
    pub fn remove(&mut self, index: usize) {
        self.0 &= !Self::bit(index);
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns `true` if the set has no members.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates members in ascending order.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..32usize).filter(move |&i| self.contains(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_contains_remove() {
        let mut mask = BitMask::EMPTY;
        mask.insert(0);
        mask.insert(31);
        assert!(mask.contains(0));
        assert!(mask.contains(31));
        assert!(!mask.contains(5));
        assert_eq!(mask.len(), 2);

        mask.remove(0);
        assert!(!mask.contains(0));
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![31]);
    }

    #[test]
    fn test_out_of_range_index_is_never_member() {
        let mut mask = BitMask::EMPTY;
        mask.insert(32);
        mask.insert(usize::MAX);
        assert!(mask.is_empty());
        assert!(!mask.contains(32));
    }
}
