//! Per-hook views of the world handed to components.
//!
//! Hooks run while the world is shared immutably, so a context can read and
//! write *other* components through their cells but can never add or
//! reclaim entities. Structural changes wait for the frame boundary.

use std::cell::{Ref, RefMut};

use engine_component::{EcsError, Entity, GroupId, RunFlag};

use crate::component::Component;
use crate::render::Renderer;
use crate::world::World;

/// Context passed to [`Component::init`] and [`Component::update`].
pub struct Context<'w> {
    world: &'w World,
    entity: Entity,
}

impl<'w> Context<'w> {
    pub(crate) fn new(world: &'w World, entity: Entity) -> Self {
        Self { world, entity }
    }

    /// The entity owning the component whose hook is running.
    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// The whole world, for scanning groups and reaching other entities.
    #[must_use]
    pub fn world(&self) -> &'w World {
        self.world
    }

    /// Returns `true` if the owning entity carries a `T`.
    #[must_use]
    pub fn has<T: Component>(&self) -> bool {
        self.world.has_component::<T>(self.entity)
    }

    /// Borrow a sibling component immutably.
    pub fn get<T: Component>(&self) -> Result<Ref<'w, T>, EcsError> {
        self.world.component::<T>(self.entity)
    }

    /// Borrow a sibling component mutably.
    ///
    /// Fails with [`EcsError::ComponentBusy`] for the component whose hook is
    /// running; use `self` for that one.
    pub fn get_mut<T: Component>(&self) -> Result<RefMut<'w, T>, EcsError> {
        self.world.component_mut::<T>(self.entity)
    }

    /// Mark the owning entity inactive. It stays readable until the next
    /// [`World::refresh`].
    pub fn destroy(&self) {
        self.world.destroy(self.entity);
    }

    /// Clear the owning entity's membership bit for `group`.
    pub fn remove_group(&self, group: GroupId) -> Result<(), EcsError> {
        self.world.remove_group(self.entity, group)
    }

    /// The world's shared run flag.
    #[must_use]
    pub fn run_flag(&self) -> RunFlag {
        self.world.run_flag()
    }
}

/// Context passed to [`Component::draw`].
pub struct DrawContext<'a> {
    world: &'a World,
    entity: Entity,
    renderer: &'a mut dyn Renderer,
}

impl<'a> DrawContext<'a> {
    pub(crate) fn new(world: &'a World, entity: Entity, renderer: &'a mut dyn Renderer) -> Self {
        Self {
            world,
            entity,
            renderer,
        }
    }

    /// The entity being drawn.
    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// The whole world.
    #[must_use]
    pub fn world(&self) -> &'a World {
        self.world
    }

    /// Borrow a sibling component immutably.
    pub fn get<T: Component>(&self) -> Result<Ref<'a, T>, EcsError> {
        self.world.component::<T>(self.entity)
    }

    /// The drawing service.
    pub fn renderer(&mut self) -> &mut dyn Renderer {
        &mut *self.renderer
    }
}
