//! 2D transform component.
//!
//! [`Transform2D`] is the single source of truth for where an entity is,
//! how it moves and what shape it has. Collision, physics and drawing all
//! read it.
//!
//! The shape kind is encoded by the radius: `radius == 0` is an axis-aligned
//! box of `size`, anything else is a circle of `radius`. Both are centred on
//! `position` and multiplied by `scale`.

use engine_ecs::{Component, Context, Rect};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// The collision shape a transform describes, already scaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned box with the given half-extents.
    Box {
        /// Half of the width and height.
        half_extents: Vec2,
    },
    /// Circle with the given radius.
    Circle {
        /// Radius.
        radius: f32,
    },
}

/// Position, motion and extent of an entity in 2D.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform2D {
    /// Position before the most recent integration step.
    pub previous_position: Vec2,
    /// Centre of the entity in world space.
    pub position: Vec2,
    /// Velocity, multiplied by `speed` when integrated.
    pub velocity: Vec2,
    /// Full width and height of the box shape (and of the drawn sprite).
    pub size: Vec2,
    /// Circle radius; `0` selects the box shape.
    pub radius: f32,
    /// Uniform scale applied to `size` and `radius`.
    pub scale: f32,
    /// Integration multiplier.
    pub speed: f32,
    /// Top-left offset of this entity's frame inside a shared texture.
    pub source_position: Vec2,
}

impl Transform2D {
    /// Default box edge length.
    pub const DEFAULT_SIZE: f32 = 32.0;
    /// Default integration multiplier.
    pub const DEFAULT_SPEED: f32 = 3.0;

    /// A default-sized box centred on `position`.
    #[must_use]
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            previous_position: position,
            ..Self::default()
        }
    }

    /// A box of `width × height` centred on `(x, y)`.
    #[must_use]
    pub fn sized(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            ..Self::from_position(Vec2::new(x, y))
        }
    }

    /// A circle of `radius` centred on `(x, y)`.
    #[must_use]
    pub fn circle(x: f32, y: f32, radius: f32) -> Self {
        Self {
            radius,
            size: Vec2::splat(radius * 2.0),
            ..Self::from_position(Vec2::new(x, y))
        }
    }

    /// Set the uniform scale.
    #[must_use]
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Set the integration multiplier.
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Set the initial velocity.
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the frame offset inside a shared texture.
    #[must_use]
    pub fn with_source(mut self, source_position: Vec2) -> Self {
        self.source_position = source_position;
        self
    }

    /// Returns `true` when the radius sentinel selects the circle shape.
    #[must_use]
    pub fn is_circle(&self) -> bool {
        self.radius != 0.0
    }

    /// Half of the scaled width and height.
    #[must_use]
    pub fn half_extents(&self) -> Vec2 {
        self.size * self.scale / 2.0
    }

    /// The scaled radius.
    #[must_use]
    pub fn scaled_radius(&self) -> f32 {
        self.radius * self.scale
    }

    /// The collision shape selected by the radius sentinel.
    #[must_use]
    pub fn shape(&self) -> Shape {
        if self.is_circle() {
            Shape::Circle {
                radius: self.scaled_radius(),
            }
        } else {
            Shape::Box {
                half_extents: self.half_extents(),
            }
        }
    }

    /// Integer bounding rectangle of the scaled shape, top-left based.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        let half = match self.shape() {
            Shape::Box { half_extents } => half_extents,
            Shape::Circle { radius } => Vec2::splat(radius),
        };
        let top_left = (self.position - half).floor();
        let size = (half * 2.0).round();
        Rect::new(top_left.x as i32, top_left.y as i32, size.x as i32, size.y as i32)
    }

    /// Distance moved by the most recent integration step.
    #[must_use]
    pub fn displacement(&self) -> Vec2 {
        self.position - self.previous_position
    }

    /// Remember the current position, then advance by `velocity * speed`.
    pub fn integrate(&mut self) {
        self.previous_position = self.position;
        self.position += self.velocity * self.speed;
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            previous_position: Vec2::ZERO,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            size: Vec2::splat(Self::DEFAULT_SIZE),
            radius: 0.0,
            scale: 1.0,
            speed: Self::DEFAULT_SPEED,
            source_position: Vec2::ZERO,
        }
    }
}

impl Component for Transform2D {
    fn type_name() -> &'static str {
        "Transform2D"
    }

    fn update(&mut self, _ctx: &mut Context<'_>) {
        self.integrate();
    }
}

#[cfg(test)]
mod tests {
    use engine_ecs::World;

    use super::*;

    #[test]
    fn test_defaults() {
        let t = Transform2D::default();
        assert_eq!(t.size, Vec2::new(32.0, 32.0));
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.speed, 3.0);
        assert!(!t.is_circle());
    }

    #[test]
    fn test_radius_sentinel_selects_shape() {
        let boxed = Transform2D::sized(0.0, 0.0, 32.0, 16.0);
        assert_eq!(
            boxed.shape(),
            Shape::Box {
                half_extents: Vec2::new(16.0, 8.0)
            }
        );

        let round = Transform2D::circle(0.0, 0.0, 5.0);
        assert_eq!(round.shape(), Shape::Circle { radius: 5.0 });
    }

    #[test]
    fn test_scale_applies_to_both_shapes() {
        let boxed = Transform2D::sized(0.0, 0.0, 10.0, 20.0).with_scale(2.0);
        assert_eq!(boxed.half_extents(), Vec2::new(10.0, 20.0));
        let round = Transform2D::circle(0.0, 0.0, 3.0).with_scale(2.0);
        assert_eq!(round.scaled_radius(), 6.0);
    }

    #[test]
    fn test_integrate_uses_speed_and_remembers_previous() {
        let mut t = Transform2D::from_position(Vec2::new(1.0, 1.0))
            .with_velocity(Vec2::new(1.0, -2.0))
            .with_speed(2.0);
        t.integrate();
        assert_eq!(t.previous_position, Vec2::new(1.0, 1.0));
        assert_eq!(t.position, Vec2::new(3.0, -3.0));
        assert_eq!(t.displacement(), Vec2::new(2.0, -4.0));
    }

    #[test]
    fn test_bounds_are_centred() {
        let t = Transform2D::sized(50.0, 40.0, 20.0, 10.0);
        assert_eq!(t.bounds(), Rect::new(40, 35, 20, 10));
        let c = Transform2D::circle(10.0, 10.0, 4.0);
        assert_eq!(c.bounds(), Rect::new(6, 6, 8, 8));
    }

    #[test]
    fn test_bounds_snap_down_on_both_sides_of_zero() {
        let left = Transform2D::sized(-0.5, -0.5, 32.0, 32.0);
        assert_eq!(left.bounds(), Rect::new(-17, -17, 32, 32));
        let right = Transform2D::sized(0.5, 0.5, 32.0, 32.0);
        assert_eq!(right.bounds(), Rect::new(-16, -16, 32, 32));
        let odd = Transform2D::sized(0.0, 0.0, 9.9, 9.9);
        assert_eq!(odd.bounds().w, 10);
    }

    #[test]
    fn test_update_hook_integrates() {
        let mut world = World::new();
        let e = world.create_entity();
        world
            .add_component(
                e,
                Transform2D::from_position(Vec2::ZERO).with_velocity(Vec2::X),
            )
            .unwrap();
        world.update();
        world.update();
        let t = world.component::<Transform2D>(e).unwrap();
        assert_eq!(t.position, Vec2::new(6.0, 0.0));
        assert_eq!(t.previous_position, Vec2::new(3.0, 0.0));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let t: Transform2D = serde_json::from_str(r#"{ "radius": 4.0 }"#).unwrap();
        assert!(t.is_circle());
        assert_eq!(t.speed, 3.0);
        assert_eq!(t.scale, 1.0);
    }
}
