//! Contact response.
//!
//! One [`Manifold`] is resolved in two steps: an impulse that changes the
//! velocities along the contact normal, then a positional nudge that
//! removes part of the remaining overlap. Nothing is cached between calls.

use engine_math::Transform2D;
use glam::Vec2;

use crate::collision::Manifold;
use crate::config::{ImpulseWeighting, SolverConfig};

/// Mass properties of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Mass; `0` means immovable.
    pub mass: f32,
    /// `1 / mass`, or `0` for an immovable body.
    pub inv_mass: f32,
    /// Bounciness in `[0, 1]`.
    pub restitution: f32,
}

impl Material {
    /// An immovable, non-bouncing body.
    pub const STATIC: Self = Self {
        mass: 0.0,
        inv_mass: 0.0,
        restitution: 0.0,
    };

    /// Negative masses are treated as `0`.
    #[must_use]
    pub fn new(mass: f32, restitution: f32) -> Self {
        let mass = mass.max(0.0);
        let inv_mass = if mass == 0.0 { 0.0 } else { 1.0 / mass };
        Self {
            mass,
            inv_mass,
            restitution,
        }
    }

    /// Returns `true` for an infinite-mass body.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::STATIC
    }
}

/// One side of a contact: its material and the transform it moves.
#[derive(Debug)]
pub struct Body<'a> {
    /// Mass and restitution.
    pub material: Material,
    /// Velocity and position the solver writes.
    pub transform: &'a mut Transform2D,
}

impl<'a> Body<'a> {
    /// Pair `material` with the transform it moves.
    pub fn new(material: Material, transform: &'a mut Transform2D) -> Self {
        Self {
            material,
            transform,
        }
    }
}

/// Apply the collision impulse along `normal` (pointing from `a` to `b`).
///
/// Returns the impulse vector, or `None` when the bodies already separate
/// or both are immovable.
pub fn resolve_collision(
    a: &mut Body<'_>,
    b: &mut Body<'_>,
    normal: Vec2,
    weighting: ImpulseWeighting,
) -> Option<Vec2> {
    let relative = b.transform.velocity - a.transform.velocity;
    let along_normal = relative.dot(normal);
    if along_normal > 0.0 {
        return None;
    }

    let inv_sum = a.material.inv_mass + b.material.inv_mass;
    if inv_sum == 0.0 {
        return None;
    }

    let e = a.material.restitution.min(b.material.restitution);
    let j = -(1.0 + e) * along_normal / inv_sum;
    let impulse = normal * j;

    let (share_a, share_b) = match weighting {
        ImpulseWeighting::MassRatio => {
            let ratio = a.material.mass / (a.material.mass + b.material.mass);
            (ratio, 1.0 - ratio)
        }
        ImpulseWeighting::InverseMass => (a.material.inv_mass, b.material.inv_mass),
    };
    a.transform.velocity -= impulse * share_a;
    b.transform.velocity += impulse * share_b;

    Some(impulse)
}

/// The correction vector for a contact, before it is split by inverse mass.
///
/// Exactly zero when `penetration <= slop` or both bodies are immovable.
#[must_use]
pub fn correction_vector(
    normal: Vec2,
    penetration: f32,
    inv_mass_a: f32,
    inv_mass_b: f32,
    config: &SolverConfig,
) -> Vec2 {
    let inv_sum = inv_mass_a + inv_mass_b;
    if inv_sum == 0.0 {
        return Vec2::ZERO;
    }
    let depth = (penetration - config.slop).max(0.0);
    normal * (depth / inv_sum * config.percent)
}

/// Push the bodies apart along `normal`, each in proportion to its inverse
/// mass.
pub fn positional_correction(
    a: &mut Body<'_>,
    b: &mut Body<'_>,
    normal: Vec2,
    penetration: f32,
    config: &SolverConfig,
) -> Vec2 {
    let correction = correction_vector(
        normal,
        penetration,
        a.material.inv_mass,
        b.material.inv_mass,
        config,
    );
    a.transform.position -= correction * a.material.inv_mass;
    b.transform.position += correction * b.material.inv_mass;
    correction
}

/// Resolve one contact: impulse first, then positional correction.
///
/// The correction runs even when the impulse is skipped, so resting bodies
/// that already separate still get pushed out of each other.
pub fn resolve(
    a: &mut Body<'_>,
    b: &mut Body<'_>,
    manifold: &Manifold,
    config: &SolverConfig,
) -> Option<Vec2> {
    let impulse = resolve_collision(a, b, manifold.normal, config.weighting);
    positional_correction(a, b, manifold.normal, manifold.penetration, config);
    impulse
}
