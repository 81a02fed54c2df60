//! # engine_math
//!
//! Math types for the engine. Re-exports [`glam`] for linear algebra and
//! defines [`Transform2D`], the kinematic component every physical or
//! drawable entity carries.

pub mod transform;

// Re-export glam types for convenience.
pub use glam::{Vec2, vec2};

pub use transform::{Shape, Transform2D};
