//! Dense component type identity.
//!
//! Every component kind a world sees is assigned a small integer the first
//! time it is referenced. Ids are dense (`0, 1, 2, ...`) so they can index a
//! fixed array of slots on each entity and a bit in a [`ComponentMask`].
//!
//! The number of kinds is bounded by [`Capacity::max_component_types`], which
//! itself can never exceed [`MAX_COMPONENTS`]. Asking for one more kind than
//! the capacity allows is a configuration error, never a silent wrap into an
//! existing slot.
//!
//! [`ComponentMask`]: crate::mask::ComponentMask

use std::any::TypeId;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::EcsError;
use crate::group::MAX_GROUPS;

/// Hard upper bound on distinct component kinds per world.
pub const MAX_COMPONENTS: usize = 32;

/// A dense per-world index for a component kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentTypeId(pub u8);

impl ComponentTypeId {
    /// Returns the slot index this id addresses.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ComponentTypeId({})", self.0)
    }
}

/// Fixed bounds on how many component kinds and groups a world accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capacity {
    /// Maximum number of distinct component kinds.
    pub max_component_types: usize,
    /// Maximum number of distinct groups.
    pub max_groups: usize,
}

impl Capacity {
    /// Create a capacity, rejecting bounds the 32-bit masks cannot represent.
    pub fn new(max_component_types: usize, max_groups: usize) -> Result<Self, EcsError> {
        if max_component_types > MAX_COMPONENTS {
            return Err(EcsError::CapacityTooLarge {
                requested: max_component_types,
                max: MAX_COMPONENTS,
            });
        }
        if max_groups > MAX_GROUPS {
            return Err(EcsError::CapacityTooLarge {
                requested: max_groups,
                max: MAX_GROUPS,
            });
        }
        Ok(Self {
            max_component_types,
            max_groups,
        })
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Self {
            max_component_types: MAX_COMPONENTS,
            max_groups: MAX_GROUPS,
        }
    }
}

/// Allocator mapping Rust component types to dense [`ComponentTypeId`]s.
///
/// Ids are handed out in first-reference order and never change for the
/// lifetime of the allocator.
#[derive(Debug)]
pub struct ComponentTypes {
    capacity: usize,
    ids: HashMap<TypeId, ComponentTypeId>,
    names: Vec<&'static str>,
}

impl ComponentTypes {
    /// Create an empty allocator that accepts at most `capacity` kinds.
    ///
    /// `capacity` is clamped to [`MAX_COMPONENTS`].
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.min(MAX_COMPONENTS),
            ids: HashMap::new(),
            names: Vec::new(),
        }
    }

    /// Returns the id already assigned to `type_id`, if any.
    #[must_use]
    pub fn get(&self, type_id: TypeId) -> Option<ComponentTypeId> {
        self.ids.get(&type_id).copied()
    }

    /// Returns the id for `type_id`, assigning the next dense index on first use.
    pub fn register(
        &mut self,
        type_id: TypeId,
        name: &'static str,
    ) -> Result<ComponentTypeId, EcsError> {
        if let Some(id) = self.get(type_id) {
            return Ok(id);
        }
        let next = self.names.len();
        if next >= self.capacity {
            return Err(EcsError::ComponentCapacity {
                name,
                capacity: self.capacity,
            });
        }
        // `capacity <= MAX_COMPONENTS`, so the index always fits in a `u8`.
        let id = ComponentTypeId(next as u8);
        self.ids.insert(type_id, id);
        self.names.push(name);
        Ok(id)
    }

    /// Typed shorthand for [`ComponentTypes::register`].
    pub fn register_type<T: 'static>(
        &mut self,
        name: &'static str,
    ) -> Result<ComponentTypeId, EcsError> {
        self.register(TypeId::of::<T>(), name)
    }

    /// Returns the name recorded for `id`.
    #[must_use]
    pub fn name(&self, id: ComponentTypeId) -> Option<&'static str> {
        self.names.get(id.index()).copied()
    }

    /// Returns the number of kinds registered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no kind has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the maximum number of kinds this allocator accepts.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Health;
    struct Velocity;

    #[test]
    fn test_ids_are_dense_in_first_use_order() {
        let mut types = ComponentTypes::new(MAX_COMPONENTS);
        let health = types.register_type::<Health>("Health").unwrap();
        let velocity = types.register_type::<Velocity>("Velocity").unwrap();
        assert_eq!(health, ComponentTypeId(0));
        assert_eq!(velocity, ComponentTypeId(1));
        assert_eq!(types.len(), 2);
    }

    #[test]
    fn test_id_is_stable_across_lookups() {
        let mut types = ComponentTypes::new(MAX_COMPONENTS);
        let first = types.register_type::<Health>("Health").unwrap();
        let second = types.register_type::<Health>("Health").unwrap();
        assert_eq!(first, second);
        assert_eq!(types.get(TypeId::of::<Health>()), Some(first));
        assert_eq!(types.name(first), Some("Health"));
    }

    #[test]
    fn test_registration_beyond_capacity_fails() {
        let mut types = ComponentTypes::new(1);
        types.register_type::<Health>("Health").unwrap();
        let err = types.register_type::<Velocity>("Velocity").unwrap_err();
        assert!(matches!(
            err,
            EcsError::ComponentCapacity {
                name: "Velocity",
                capacity: 1
            }
        ));
        // The failed kind must not have consumed an index.
        assert_eq!(types.len(), 1);
        assert_eq!(types.get(TypeId::of::<Velocity>()), None);
    }

    #[test]
    fn test_capacity_is_clamped() {
        let types = ComponentTypes::new(1000);
        assert_eq!(types.capacity(), MAX_COMPONENTS);
    }

    #[test]
    fn test_capacity_rejects_oversized_bounds() {
        assert!(Capacity::new(MAX_COMPONENTS + 1, 4).is_err());
        assert!(Capacity::new(4, MAX_GROUPS + 1).is_err());
        let cap = Capacity::new(8, 4).unwrap();
        assert_eq!(cap.max_component_types, 8);
        assert_eq!(cap.max_groups, 4);
    }

    #[test]
    fn test_capacity_defaults_to_maximum() {
        let cap = Capacity::default();
        assert_eq!(cap.max_component_types, 32);
        assert_eq!(cap.max_groups, 32);
    }
}
