//! Narrow-phase collision predicates.
//!
//! Every predicate is a pure function of two shapes and returns a
//! [`Contact`] whose normal points from the first shape toward the second.
//! [`collide`] picks the predicate for two transforms from their radius
//! sentinels.

use engine_ecs::Entity;
use engine_math::Transform2D;
use glam::Vec2;
use tracing::trace;

/// Normal used when the geometry does not define one (coincident centres).
pub const DEFAULT_NORMAL: Vec2 = Vec2::X;

/// An axis-aligned box given by its centre and half-extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Centre.
    pub center: Vec2,
    /// Half of the width and height.
    pub half_extents: Vec2,
}

impl Aabb {
    /// Create a box from its centre and half-extents.
    #[must_use]
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// The scaled box described by `transform`, ignoring its radius.
    #[must_use]
    pub fn from_transform(transform: &Transform2D) -> Self {
        Self::new(transform.position, transform.half_extents())
    }
}

/// A circle given by its centre and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Centre.
    pub center: Vec2,
    /// Radius.
    pub radius: f32,
}

impl Circle {
    /// Create a circle.
    #[must_use]
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// The scaled circle described by `transform`.
    #[must_use]
    pub fn from_transform(transform: &Transform2D) -> Self {
        Self::new(transform.position, transform.scaled_radius())
    }
}

/// Result of a successful predicate: unit normal from the first shape to the
/// second, and a non-negative penetration depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal from the first shape toward the second.
    pub normal: Vec2,
    /// Overlap depth along `normal`.
    pub penetration: f32,
}

/// A contact tied to the entity on the far side of it.
///
/// Produced for one resolution step and then dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Manifold {
    /// The opposing entity.
    pub partner: Entity,
    /// Unit normal from the first body toward the second.
    pub normal: Vec2,
    /// Overlap depth along `normal`.
    pub penetration: f32,
}

impl Manifold {
    /// Attach a contact to its partner entity.
    #[must_use]
    pub fn new(partner: Entity, contact: Contact) -> Self {
        Self {
            partner,
            normal: contact.normal,
            penetration: contact.penetration,
        }
    }
}

/// Box vs box. Touching edges are not a collision.
///
/// The contact is reported on the axis with the smaller overlap; on a tie
/// the vertical axis wins.
#[must_use]
pub fn aabb_vs_aabb(a: &Aabb, b: &Aabb) -> Option<Contact> {
    let offset = b.center - a.center;

    let x_overlap = a.half_extents.x + b.half_extents.x - offset.x.abs();
    if x_overlap <= 0.0 {
        return None;
    }
    let y_overlap = a.half_extents.y + b.half_extents.y - offset.y.abs();
    if y_overlap <= 0.0 {
        return None;
    }

    let contact = if x_overlap < y_overlap {
        Contact {
            normal: if offset.x < 0.0 { Vec2::NEG_X } else { Vec2::X },
            penetration: x_overlap,
        }
    } else {
        Contact {
            normal: if offset.y < 0.0 { Vec2::NEG_Y } else { Vec2::Y },
            penetration: y_overlap,
        }
    };
    Some(contact)
}

/// Box vs circle, normal pointing from the box toward the circle.
///
/// The closest point on the box is the circle centre clamped to the box.
/// When the centre lies inside the box the closest point is pushed out to
/// the face on the axis where the centre is furthest from the middle, and
/// the circle is pushed out through that face.
#[must_use]
pub fn aabb_vs_circle(a: &Aabb, b: &Circle) -> Option<Contact> {
    let offset = b.center - a.center;
    let half = a.half_extents;

    let mut closest = offset.max(-half).min(half);
    let inside = offset == closest;
    if inside {
        if offset.x.abs() > offset.y.abs() {
            closest.x = if closest.x > 0.0 { half.x } else { -half.x };
        } else {
            closest.y = if closest.y > 0.0 { half.y } else { -half.y };
        }
    }

    let to_center = offset - closest;
    let distance_squared = to_center.length_squared();
    if distance_squared > b.radius * b.radius && !inside {
        return None;
    }

    let distance = distance_squared.sqrt();
    if distance == 0.0 {
        return Some(Contact {
            normal: DEFAULT_NORMAL,
            penetration: b.radius,
        });
    }

    let direction = to_center / distance;
    let contact = if inside {
        Contact {
            normal: -direction,
            penetration: b.radius + distance,
        }
    } else {
        Contact {
            normal: direction,
            penetration: b.radius - distance,
        }
    };
    Some(contact)
}

/// Circle vs circle. Circles that exactly touch collide with zero
/// penetration.
#[must_use]
pub fn circle_vs_circle(a: &Circle, b: &Circle) -> Option<Contact> {
    let offset = b.center - a.center;
    let reach = a.radius + b.radius;
    if offset.length_squared() > reach * reach {
        return None;
    }

    let distance = offset.length();
    let contact = if distance != 0.0 {
        Contact {
            normal: offset / distance,
            penetration: reach - distance,
        }
    } else {
        Contact {
            normal: DEFAULT_NORMAL,
            penetration: a.radius,
        }
    };
    Some(contact)
}

/// Which predicate two transforms select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapePair {
    /// Both radii are zero.
    BoxBox,
    /// Both radii are non-zero.
    CircleCircle,
    /// The first is a box, the second a circle.
    BoxCircle,
    /// The first is a circle, the second a box.
    CircleBox,
}

impl ShapePair {
    /// Classify two transforms by their radius sentinels.
    #[must_use]
    pub fn of(a: &Transform2D, b: &Transform2D) -> Self {
        match (a.is_circle(), b.is_circle()) {
            (false, false) => Self::BoxBox,
            (true, true) => Self::CircleCircle,
            (false, true) => Self::BoxCircle,
            (true, false) => Self::CircleBox,
        }
    }

    /// `true` when the contact is computed from the second body's side, so
    /// its normal points from `b` toward `a`.
    #[must_use]
    pub fn is_mirrored(self) -> bool {
        self == Self::CircleBox
    }
}

/// Test two transforms with the predicate their shapes select.
///
/// For [`ShapePair::CircleBox`] the box/circle predicate runs with the roles
/// swapped: the contact normal points from `b` (the box) toward `a`.
#[must_use]
pub fn collide(a: &Transform2D, b: &Transform2D) -> Option<(ShapePair, Contact)> {
    let pair = ShapePair::of(a, b);
    let contact = match pair {
        ShapePair::BoxBox => aabb_vs_aabb(&Aabb::from_transform(a), &Aabb::from_transform(b)),
        ShapePair::CircleCircle => {
            circle_vs_circle(&Circle::from_transform(a), &Circle::from_transform(b))
        }
        ShapePair::BoxCircle => {
            aabb_vs_circle(&Aabb::from_transform(a), &Circle::from_transform(b))
        }
        ShapePair::CircleBox => {
            aabb_vs_circle(&Aabb::from_transform(b), &Circle::from_transform(a))
        }
    }?;
    trace!(?pair, normal = ?contact.normal, penetration = contact.penetration, "contact");
    Some((pair, contact))
}
