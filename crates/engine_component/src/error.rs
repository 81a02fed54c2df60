//! Engine error types.

use crate::entity::Entity;
use crate::group::GroupId;

/// Errors raised by the registry and the components built on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// More distinct component kinds were referenced than the world allows.
    #[error("component kind '{name}' exceeds the capacity of {capacity} kinds")]
    ComponentCapacity {
        /// The kind that could not be registered.
        name: &'static str,
        /// The configured bound.
        capacity: usize,
    },

    /// A group id lies outside the configured group range.
    #[error("{group} is outside the capacity of {capacity} groups")]
    GroupOutOfRange {
        /// The offending group.
        group: GroupId,
        /// The configured bound.
        capacity: usize,
    },

    /// A capacity larger than the 32-bit masks can represent was requested.
    #[error("requested capacity {requested} exceeds the maximum of {max}")]
    CapacityTooLarge {
        /// The requested bound.
        requested: usize,
        /// The hard maximum.
        max: usize,
    },

    /// The entity handle is not owned by this world (never was, or reclaimed).
    #[error("{0} is not owned by this world")]
    UnknownEntity(Entity),

    /// The entity has no component of the requested kind.
    #[error("{entity} has no '{name}' component")]
    ComponentMissing {
        /// The entity queried.
        entity: Entity,
        /// The component kind requested.
        name: &'static str,
    },

    /// The component is already borrowed, typically by the hook currently running.
    #[error("'{name}' on {entity} is already borrowed")]
    ComponentBusy {
        /// The entity queried.
        entity: Entity,
        /// The component kind requested.
        name: &'static str,
    },

    /// The entity already carries a component of this kind.
    #[error("{entity} already has a '{name}' component")]
    DuplicateComponent {
        /// The entity targeted.
        entity: Entity,
        /// The duplicated kind.
        name: &'static str,
    },

    /// A component's required dependency was absent when it was attached.
    #[error("'{component}' on {entity} requires '{dependency}'")]
    MissingDependency {
        /// The entity targeted.
        entity: Entity,
        /// The component being attached.
        component: &'static str,
        /// The missing dependency.
        dependency: &'static str,
    },
}
