//! # engine_ecs
//!
//! The registry half of the engine. A [`World`] owns every entity; each
//! entity owns its components in dense, kind-indexed slots. Groups are
//! non-owning indexes over entity handles that the world keeps loosely in
//! sync with each entity's membership mask and repairs in
//! [`World::refresh`].
//!
//! A frame is always `update → draw → refresh`:
//!
//! ```rust
//! use engine_ecs::{Component, Context, World};
//!
//! #[derive(Default)]
//! struct Counter(u32);
//!
//! impl Component for Counter {
//!     fn type_name() -> &'static str { "Counter" }
//!     fn update(&mut self, _ctx: &mut Context<'_>) { self.0 += 1; }
//! }
//!
//! let mut world = World::new();
//! let e = world.create_entity();
//! world.add_component(e, Counter::default()).unwrap();
//!
//! world.update();
//! world.draw(&mut Vec::<engine_ecs::DrawCall>::new());
//! world.refresh();
//!
//! assert_eq!(world.component::<Counter>(e).unwrap().0, 1);
//! ```

pub mod component;
pub mod context;
pub mod render;
pub mod world;

pub use component::{AsAny, Component, Dependency};
pub use context::{Context, DrawContext};
pub use engine_component::{
    Capacity, ComponentTypeId, EcsError, Entity, GroupId, RunFlag, MAX_COMPONENTS, MAX_GROUPS,
};
pub use render::{DrawCall, Flip, Rect, Renderer, TextureId};
pub use world::World;
