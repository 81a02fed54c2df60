//! # engine_physics
//!
//! Collision detection and response for entities carrying a
//! [`Transform2D`](engine_math::Transform2D).
//!
//! - [`collision`]: pure narrow-phase predicates (box/box, box/circle,
//!   circle/circle) and the shape dispatch between two transforms.
//! - [`resolution`]: impulse-based velocity resolution and bias-based
//!   positional correction for one [`Manifold`].
//! - [`PhysicsBody`]: mass, restitution, free fall and the groups the body
//!   collides with; resolves its contacts during its own `update`.
//! - [`Collider`]: a tagged, physics-free overlap sensor whose hits are
//!   handed to caller-supplied reactions.
//!
//! Groups are the only broad phase: a body or collider tests exactly the
//! members of the groups it was configured with.

pub mod body;
pub mod collider;
pub mod collision;
pub mod config;
pub mod resolution;

pub use body::PhysicsBody;
pub use collider::{Collider, collect_collisions, colliding_partners, notify_collisions};
pub use collision::{Aabb, Circle, Contact, Manifold, ShapePair, collide};
pub use config::{ImpulseWeighting, SolverConfig};
pub use resolution::{Body, Material};
