//! The boundary to the external drawing service.
//!
//! The engine never loads textures or talks to a graphics API. Drawable
//! components receive a [`Renderer`] through their
//! [`DrawContext`](crate::DrawContext) and hand it a texture handle, a source
//! rectangle in the texture, a destination rectangle on screen and a flip
//! flag.

use serde::{Deserialize, Serialize};

/// An integer rectangle: top-left corner plus size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub w: i32,
    /// Height.
    pub h: i32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Returns the exclusive right edge.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Returns the exclusive bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Axis-aligned overlap test. Rectangles that only share an edge do not
    /// intersect.
    #[must_use]
    pub const fn intersects(&self, other: &Rect) -> bool {
        self.right() > other.x
            && other.right() > self.x
            && self.bottom() > other.y
            && other.bottom() > self.y
    }
}

/// Mirroring applied when drawing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flip {
    /// Draw as-is.
    #[default]
    None,
    /// Mirror around the vertical axis.
    Horizontal,
    /// Mirror around the horizontal axis.
    Vertical,
}

/// An opaque handle to a texture owned by the drawing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureId(pub u32);

/// The drawing service the engine renders through.
pub trait Renderer {
    /// Copy `src` from `texture` onto `dst`, mirrored by `flip`.
    fn draw(&mut self, texture: TextureId, src: Rect, dst: Rect, flip: Flip);
}

/// One recorded [`Renderer::draw`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    /// Texture drawn.
    pub texture: TextureId,
    /// Source rectangle in the texture.
    pub src: Rect,
    /// Destination rectangle.
    pub dst: Rect,
    /// Mirroring.
    pub flip: Flip,
}

/// Records draw calls in order. Useful for headless runs and tests.
impl Renderer for Vec<DrawCall> {
    fn draw(&mut self, texture: TextureId, src: Rect, dst: Rect, flip: Flip) {
        self.push(DrawCall {
            texture,
            src,
            dst,
            flip,
        });
    }
}
