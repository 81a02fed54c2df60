//! # engine_defaults
//!
//! Components that sit at the engine's collaborator boundaries. Neither
//! owns a window, a texture or an input device:
//!
//! - [`Sprite`] hands a texture handle and two rectangles to whatever
//!   [`Renderer`](engine_ecs::Renderer) the draw pass is given.
//! - [`KeyboardController`] maps key identifiers to down/up callbacks and is
//!   fed [`KeyEvent`]s by the application.

pub mod keyboard;
pub mod sprite;

pub use keyboard::{KeyEvent, KeyState, KeyboardController};
pub use sprite::Sprite;
