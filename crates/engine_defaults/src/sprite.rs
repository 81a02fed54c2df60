//! Static sprites.

use engine_ecs::{Component, Context, Dependency, DrawContext, Flip, Rect, TextureId};
use engine_math::Transform2D;
use tracing::warn;

/// Draws one frame of a texture over the owning transform.
///
/// The source rectangle is taken once, at attachment, from the transform's
/// `source_position` and unscaled `size`. The destination follows the
/// transform's scaled bounds every update.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    texture: TextureId,
    src: Rect,
    dst: Rect,
    flip: Flip,
}

impl Sprite {
    #[must_use]
    pub fn new(texture: TextureId) -> Self {
        Self {
            texture,
            src: Rect::default(),
            dst: Rect::default(),
            flip: Flip::None,
        }
    }

    #[must_use]
    pub fn with_flip(mut self, flip: Flip) -> Self {
        self.flip = flip;
        self
    }

    pub fn set_texture(&mut self, texture: TextureId) {
        self.texture = texture;
    }

    pub fn set_flip(&mut self, flip: Flip) {
        self.flip = flip;
    }

    #[must_use]
    pub fn texture(&self) -> TextureId {
        self.texture
    }

    #[must_use]
    pub fn source(&self) -> Rect {
        self.src
    }

    #[must_use]
    pub fn destination(&self) -> Rect {
        self.dst
    }

    #[must_use]
    pub fn flip(&self) -> Flip {
        self.flip
    }
}

impl Default for Sprite {
    fn default() -> Self {
        Self::new(TextureId(0))
    }
}

fn source_rect(transform: &Transform2D) -> Rect {
    let origin = transform.source_position.floor();
    let size = transform.size.round();
    Rect::new(origin.x as i32, origin.y as i32, size.x as i32, size.y as i32)
}

impl Component for Sprite {
    fn type_name() -> &'static str {
        "Sprite"
    }

    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::auto_attach::<Transform2D>()]
    }

    fn init(&mut self, ctx: &mut Context<'_>) {
        match ctx.get::<Transform2D>() {
            Ok(transform) => {
                self.src = source_rect(&transform);
                self.dst = transform.bounds();
            }
            Err(err) => warn!(entity = %ctx.entity(), %err, "sprite has no transform"),
        }
    }

    fn update(&mut self, ctx: &mut Context<'_>) {
        if let Ok(transform) = ctx.get::<Transform2D>() {
            self.dst = transform.bounds();
        }
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>) {
        ctx.renderer().draw(self.texture, self.src, self.dst, self.flip);
    }
}
