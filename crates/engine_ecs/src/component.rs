//! The [`Component`] capability and its declared dependencies.
//!
//! A component is a unit of state attached to exactly one entity, with three
//! lifecycle hooks the world drives: [`Component::init`] once after
//! attachment, [`Component::update`] once per frame, and
//! [`Component::draw`] once per draw pass.
//!
//! ## Dependencies
//!
//! A kind that needs other kinds on the same entity lists them in
//! [`Component::dependencies`]. The world resolves the list *before*
//! storing the component or running its `init`:
//!
//! - [`Dependency::auto_attach`] constructs the missing kind with
//!   `Default` (recursively resolving its own dependencies first).
//! - [`Dependency::required`] refuses the attachment: the world logs the
//!   problem, clears its [`RunFlag`](engine_component::RunFlag) and returns
//!   [`EcsError::MissingDependency`](engine_component::EcsError).
//!
//! Hooks therefore never construct components themselves.

use std::any::{Any, TypeId};

use crate::context::{Context, DrawContext};

/// Object-safe access to [`Any`] for trait objects.
pub trait AsAny {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// Returns `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A polymorphic unit of state attached to an entity.
///
/// # Examples
///
/// ```rust
/// use engine_ecs::{Component, Context};
///
/// #[derive(Default)]
/// struct Lifetime {
///     frames_left: u32,
/// }
///
/// impl Component for Lifetime {
///     fn type_name() -> &'static str {
///         "Lifetime"
///     }
///
///     fn update(&mut self, ctx: &mut Context<'_>) {
///         self.frames_left = self.frames_left.saturating_sub(1);
///         if self.frames_left == 0 {
///             ctx.destroy();
///         }
///     }
/// }
/// ```
pub trait Component: AsAny + 'static {
    /// A human-readable name for this component kind.
    fn type_name() -> &'static str
    where
        Self: Sized;

    /// Kinds that must be present on the entity before this one is attached.
    fn dependencies() -> Vec<Dependency>
    where
        Self: Sized,
    {
        Vec::new()
    }

    /// Called once, right after the component is stored on its entity.
    fn init(&mut self, _ctx: &mut Context<'_>) {}

    /// Called once per [`World::update`](crate::World::update).
    fn update(&mut self, _ctx: &mut Context<'_>) {}

    /// Called once per draw pass that reaches the owning entity.
    fn draw(&mut self, _ctx: &mut DrawContext<'_>) {}
}

/// A component kind another kind depends on.
#[derive(Clone, Copy)]
pub struct Dependency {
    pub(crate) type_id: TypeId,
    pub(crate) name: &'static str,
    pub(crate) dependencies: fn() -> Vec<Dependency>,
    pub(crate) construct: Option<fn() -> Box<dyn Component>>,
}

impl Dependency {
    /// `T` must already be attached; attachment fails otherwise.
    #[must_use]
    pub fn required<T: Component>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: T::type_name(),
            dependencies: T::dependencies,
            construct: None,
        }
    }

    /// `T` is attached with its `Default` value when absent.
    #[must_use]
    pub fn auto_attach<T: Component + Default>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: T::type_name(),
            dependencies: T::dependencies,
            construct: Some(construct_default::<T>),
        }
    }

    /// Returns the name of the depended-on kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if the world may construct the kind itself.
    #[must_use]
    pub fn is_auto_attached(&self) -> bool {
        self.construct.is_some()
    }
}

impl std::fmt::Debug for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dependency")
            .field("name", &self.name)
            .field("auto_attach", &self.is_auto_attached())
            .finish()
    }
}

fn construct_default<T: Component + Default>() -> Box<dyn Component> {
    Box::new(T::default())
}

pub(crate) fn downcast_ref<T: Component>(component: &dyn Component) -> Option<&T> {
    component.as_any().downcast_ref::<T>()
}

pub(crate) fn downcast_mut<T: Component>(component: &mut dyn Component) -> Option<&mut T> {
    component.as_any_mut().downcast_mut::<T>()
}
