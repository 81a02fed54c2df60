//! The registry: entity ownership, component slots, group indexes and the
//! frame passes.
//!
//! ## Ownership
//!
//! The [`World`] exclusively owns every entity record, and each record
//! exclusively owns its components. Group member lists hold plain
//! [`Entity`] handles, never references, so they can go stale without ever
//! dangling.
//!
//! ## Deferred reclamation
//!
//! [`World::destroy`] only clears an entity's active flag. Nothing is removed
//! until [`World::refresh`], which runs once per frame after update and draw.
//! Until then a destroyed entity's components stay readable, so a scan that
//! is halfway through a group never observes a hole.
//!
//! Group lists follow the same rule: [`World::remove_group`] clears the
//! membership bit and leaves the handle in the list; `refresh` drops every
//! handle whose entity is inactive, gone, or no longer flagged for that
//! group.

use std::any::TypeId;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::HashMap;

use engine_component::{
    Capacity, ComponentMask, ComponentTypeId, ComponentTypes, EcsError, Entity, EntityAllocator,
    GroupId, GroupMask, RunFlag,
};
use tracing::{debug, error, trace, warn};

use crate::component::{Component, Dependency, downcast_mut, downcast_ref};
use crate::context::{Context, DrawContext};
use crate::render::Renderer;

type Slot = Option<RefCell<Box<dyn Component>>>;

/// One entity's state: active flag, component slots and membership mask.
struct EntityRecord {
    id: Entity,
    active: Cell<bool>,
    /// Indexed by [`ComponentTypeId`]; `None` where the kind is absent.
    slots: Vec<Slot>,
    /// Kinds in attachment order, which is also hook order.
    order: Vec<ComponentTypeId>,
    components: ComponentMask,
    groups: Cell<GroupMask>,
}

impl EntityRecord {
    fn new(id: Entity, kinds: usize) -> Self {
        Self {
            id,
            active: Cell::new(true),
            slots: (0..kinds).map(|_| None).collect(),
            order: Vec::new(),
            components: ComponentMask::EMPTY,
            groups: Cell::new(GroupMask::EMPTY),
        }
    }

    fn slot(&self, kind: ComponentTypeId) -> Option<&RefCell<Box<dyn Component>>> {
        self.slots.get(kind.index()).and_then(Option::as_ref)
    }

    fn in_group(&self, group: usize) -> bool {
        self.groups.get().contains(group)
    }
}

/// The entity/component registry.
pub struct World {
    capacity: Capacity,
    types: ComponentTypes,
    allocator: EntityAllocator,
    /// Master list in insertion order.
    entities: Vec<EntityRecord>,
    /// Handle → position in `entities`. Rebuilt by `refresh`.
    index: HashMap<Entity, usize>,
    /// One non-owning member list per group.
    groups: Vec<Vec<Entity>>,
    run: RunFlag,
}

impl World {
    /// Create a world with the maximum capacity (32 kinds, 32 groups).
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Capacity::default())
    }

    /// Create a world bounded by `capacity`.
    #[must_use]
    pub fn with_capacity(capacity: Capacity) -> Self {
        let capacity = Capacity {
            max_component_types: capacity.max_component_types.min(engine_component::MAX_COMPONENTS),
            max_groups: capacity.max_groups.min(engine_component::MAX_GROUPS),
        };
        Self {
            capacity,
            types: ComponentTypes::new(capacity.max_component_types),
            allocator: EntityAllocator::new(),
            entities: Vec::new(),
            index: HashMap::new(),
            groups: vec![Vec::new(); capacity.max_groups],
            run: RunFlag::new(),
        }
    }

    /// Returns the bounds this world enforces.
    #[must_use]
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Returns a handle to the shared run flag.
    #[must_use]
    pub fn run_flag(&self) -> RunFlag {
        self.run.clone()
    }

    // -- Entity lifecycle --

    /// Create a new, active entity at the end of the master list.
    pub fn create_entity(&mut self) -> Entity {
        let id = self.allocator.allocate();
        self.index.insert(id, self.entities.len());
        self.entities
            .push(EntityRecord::new(id, self.capacity.max_component_types));
        trace!(entity = %id, "entity created");
        id
    }

    /// Alias of [`World::create_entity`].
    pub fn add_entity(&mut self) -> Entity {
        self.create_entity()
    }

    /// Mark `entity` inactive. Storage is reclaimed by the next
    /// [`World::refresh`]. Unknown handles are ignored.
    pub fn destroy(&self, entity: Entity) {
        match self.record(entity) {
            Some(record) => {
                record.active.set(false);
                trace!(entity = %entity, "entity destroyed");
            }
            None if self.allocator.has_issued(entity) => {
                trace!(entity = %entity, "entity already reclaimed");
            }
            None => {}
        }
    }

    /// Returns `true` if `entity` is owned by this world (active or not).
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.index.contains_key(&entity)
    }

    /// Returns `true` if `entity` is owned and has not been destroyed.
    #[must_use]
    pub fn is_active(&self, entity: Entity) -> bool {
        self.record(entity).is_some_and(|r| r.active.get())
    }

    /// Returns the number of owned entities, including destroyed ones not
    /// yet reclaimed.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Iterates owned entity handles in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter().map(|r| r.id)
    }

    // -- Components --

    /// Returns the dense id of `T`, assigning one on first use.
    pub fn register<T: Component>(&mut self) -> Result<ComponentTypeId, EcsError> {
        self.types.register(TypeId::of::<T>(), T::type_name())
    }

    /// Returns the dense id of `T` if it has been referenced before.
    #[must_use]
    pub fn type_id_of<T: Component>(&self) -> Option<ComponentTypeId> {
        self.types.get(TypeId::of::<T>())
    }

    /// Attach `component` to `entity`.
    ///
    /// Declared dependencies are resolved first, then the component is stored
    /// in its slot, flagged present, and its [`Component::init`] runs.
    pub fn add_component<T: Component>(
        &mut self,
        entity: Entity,
        component: T,
    ) -> Result<&mut T, EcsError> {
        let kind = self.register::<T>()?;
        let mut pending = Vec::new();
        self.attach(
            entity,
            kind,
            T::type_name(),
            T::dependencies(),
            Box::new(component),
            &mut pending,
        )?;

        let missing = EcsError::ComponentMissing {
            entity,
            name: T::type_name(),
        };
        let position = self.position(entity)?;
        let cell = self.entities[position].slots[kind.index()]
            .as_mut()
            .ok_or(missing.clone())?;
        downcast_mut::<T>(cell.get_mut().as_mut()).ok_or(missing)
    }

    fn attach(
        &mut self,
        entity: Entity,
        kind: ComponentTypeId,
        name: &'static str,
        dependencies: Vec<Dependency>,
        component: Box<dyn Component>,
        pending: &mut Vec<ComponentTypeId>,
    ) -> Result<(), EcsError> {
        let position = self.position(entity)?;
        if self.entities[position].components.contains(kind.index()) {
            return Err(EcsError::DuplicateComponent { entity, name });
        }

        pending.push(kind);
        for dependency in dependencies {
            self.resolve_dependency(entity, name, dependency, pending)?;
        }
        pending.retain(|&k| k != kind);

        let record = &mut self.entities[position];
        record.slots[kind.index()] = Some(RefCell::new(component));
        record.components.insert(kind.index());
        record.order.push(kind);
        trace!(entity = %entity, component = name, "component attached");

        let world = &*self;
        if let Some(cell) = world.entities[position].slot(kind) {
            let mut ctx = Context::new(world, entity);
            cell.borrow_mut().init(&mut ctx);
        }
        Ok(())
    }

    fn resolve_dependency(
        &mut self,
        entity: Entity,
        component: &'static str,
        dependency: Dependency,
        pending: &mut Vec<ComponentTypeId>,
    ) -> Result<(), EcsError> {
        let kind = self.types.register(dependency.type_id, dependency.name)?;
        if pending.contains(&kind) || self.has_kind(entity, kind) {
            return Ok(());
        }

        match dependency.construct {
            Some(construct) => {
                debug!(
                    entity = %entity,
                    component,
                    dependency = dependency.name,
                    "auto-attaching dependency"
                );
                self.attach(
                    entity,
                    kind,
                    dependency.name,
                    (dependency.dependencies)(),
                    construct(),
                    pending,
                )
            }
            None => {
                error!(
                    entity = %entity,
                    component,
                    dependency = dependency.name,
                    "required dependency missing, stopping"
                );
                self.run.stop();
                Err(EcsError::MissingDependency {
                    entity,
                    component,
                    dependency: dependency.name,
                })
            }
        }
    }

    fn has_kind(&self, entity: Entity, kind: ComponentTypeId) -> bool {
        self.record(entity)
            .is_some_and(|r| r.components.contains(kind.index()))
    }

    /// Returns `true` if `entity` carries a `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.type_id_of::<T>()
            .is_some_and(|kind| self.has_kind(entity, kind))
    }

    fn cell<T: Component>(&self, entity: Entity) -> Result<&RefCell<Box<dyn Component>>, EcsError> {
        let record = self.record(entity).ok_or(EcsError::UnknownEntity(entity))?;
        self.type_id_of::<T>()
            .and_then(|kind| record.slot(kind))
            .ok_or(EcsError::ComponentMissing {
                entity,
                name: T::type_name(),
            })
    }

    /// Borrow `entity`'s `T` immutably.
    pub fn component<T: Component>(&self, entity: Entity) -> Result<Ref<'_, T>, EcsError> {
        let guard = self.cell::<T>(entity)?.try_borrow().map_err(|_| EcsError::ComponentBusy {
            entity,
            name: T::type_name(),
        })?;
        Ref::filter_map(guard, |c| downcast_ref::<T>(c.as_ref())).map_err(|_| {
            EcsError::ComponentMissing {
                entity,
                name: T::type_name(),
            }
        })
    }

    /// Borrow `entity`'s `T` mutably through its cell.
    ///
    /// Takes `&self` so hooks can mutate other entities during a scan; the
    /// cell rejects overlapping borrows with [`EcsError::ComponentBusy`].
    pub fn component_mut<T: Component>(&self, entity: Entity) -> Result<RefMut<'_, T>, EcsError> {
        let guard = self
            .cell::<T>(entity)?
            .try_borrow_mut()
            .map_err(|_| EcsError::ComponentBusy {
                entity,
                name: T::type_name(),
            })?;
        RefMut::filter_map(guard, |c| downcast_mut::<T>(c.as_mut())).map_err(|_| {
            EcsError::ComponentMissing {
                entity,
                name: T::type_name(),
            }
        })
    }

    // -- Groups --

    fn check_group(&self, group: GroupId) -> Result<(), EcsError> {
        if group.index() < self.capacity.max_groups {
            Ok(())
        } else {
            Err(EcsError::GroupOutOfRange {
                group,
                capacity: self.capacity.max_groups,
            })
        }
    }

    /// Put `entity` in `group`: sets its membership bit and indexes it.
    pub fn add_group(&mut self, entity: Entity, group: GroupId) -> Result<(), EcsError> {
        self.check_group(group)?;
        let record = self.record(entity).ok_or(EcsError::UnknownEntity(entity))?;
        let mut mask = record.groups.get();
        mask.insert(group.index());
        record.groups.set(mask);
        if !self.groups[group.index()].contains(&entity) {
            self.groups[group.index()].push(entity);
        }
        Ok(())
    }

    /// Append `entity` to `group`'s member list without touching its
    /// membership bit.
    ///
    /// The bit is set separately (see [`World::add_group`]); a handle whose
    /// bit is not set is dropped at the next [`World::refresh`].
    pub fn add_to_group(&mut self, entity: Entity, group: GroupId) -> Result<(), EcsError> {
        self.check_group(group)?;
        if !self.contains(entity) {
            return Err(EcsError::UnknownEntity(entity));
        }
        self.groups[group.index()].push(entity);
        Ok(())
    }

    /// Clear `entity`'s membership bit for `group`. The member list keeps the
    /// handle until the next [`World::refresh`].
    pub fn remove_group(&self, entity: Entity, group: GroupId) -> Result<(), EcsError> {
        self.check_group(group)?;
        let record = self.record(entity).ok_or(EcsError::UnknownEntity(entity))?;
        let mut mask = record.groups.get();
        mask.remove(group.index());
        record.groups.set(mask);
        Ok(())
    }

    /// Returns `true` if `entity`'s membership bit for `group` is set.
    #[must_use]
    pub fn has_group(&self, entity: Entity, group: GroupId) -> bool {
        self.record(entity)
            .is_some_and(|r| r.in_group(group.index()))
    }

    /// Returns `group`'s member list as of the last refresh plus any
    /// additions since. May contain inactive or departed entities until the
    /// next [`World::refresh`].
    pub fn group(&self, group: GroupId) -> Result<&[Entity], EcsError> {
        self.check_group(group)?;
        Ok(&self.groups[group.index()])
    }

    // -- Frame passes --

    /// Run every active entity's components' `update` hooks, entities in
    /// insertion order and components in attachment order.
    pub fn update(&mut self) {
        let world = &*self;
        for record in &world.entities {
            if !record.active.get() {
                continue;
            }
            for &kind in &record.order {
                let Some(cell) = record.slot(kind) else {
                    continue;
                };
                match cell.try_borrow_mut() {
                    Ok(mut component) => {
                        let mut ctx = Context::new(world, record.id);
                        component.update(&mut ctx);
                    }
                    Err(_) => warn!(entity = %record.id, %kind, "component busy, update skipped"),
                }
            }
        }
    }

    /// Run every active entity's `draw` hooks in insertion order.
    pub fn draw(&mut self, renderer: &mut dyn Renderer) {
        let world = &*self;
        for record in &world.entities {
            if record.active.get() {
                world.draw_record(record, renderer);
            }
        }
    }

    /// Draw only the members of `layers`, layer by layer in the given order.
    ///
    /// An entity listed in several layers is drawn once per layer.
    pub fn draw_in_order(
        &mut self,
        layers: &[GroupId],
        renderer: &mut dyn Renderer,
    ) -> Result<(), EcsError> {
        for &layer in layers {
            self.check_group(layer)?;
        }
        let world = &*self;
        for &layer in layers {
            for &entity in &world.groups[layer.index()] {
                let Some(record) = world.record(entity) else {
                    continue;
                };
                if record.active.get() && record.in_group(layer.index()) {
                    world.draw_record(record, renderer);
                }
            }
        }
        Ok(())
    }

    fn draw_record(&self, record: &EntityRecord, renderer: &mut dyn Renderer) {
        for &kind in &record.order {
            let Some(cell) = record.slot(kind) else {
                continue;
            };
            match cell.try_borrow_mut() {
                Ok(mut component) => {
                    let mut ctx = DrawContext::new(self, record.id, &mut *renderer);
                    component.draw(&mut ctx);
                }
                Err(_) => warn!(entity = %record.id, %kind, "component busy, draw skipped"),
            }
        }
    }

    /// Reclaim destroyed entities and repair the group indexes.
    ///
    /// Every group drops handles whose entity is inactive, no longer owned,
    /// or whose membership bit for that group is clear. Then inactive
    /// entities leave the master list and their components are dropped.
    /// Returns the number of entities reclaimed.
    pub fn refresh(&mut self) -> usize {
        let entities = &self.entities;
        let index = &self.index;
        for (group, members) in self.groups.iter_mut().enumerate() {
            members.retain(|entity| {
                index
                    .get(entity)
                    .map(|&position| &entities[position])
                    .is_some_and(|r| r.active.get() && r.in_group(group))
            });
        }

        let before = self.entities.len();
        self.entities.retain(|r| r.active.get());
        let reclaimed = before - self.entities.len();

        if reclaimed > 0 {
            self.index = self
                .entities
                .iter()
                .enumerate()
                .map(|(position, r)| (r.id, position))
                .collect();
            debug!(reclaimed, remaining = self.entities.len(), "refreshed world");
        }
        reclaimed
    }

    // -- Lookup --

    fn position(&self, entity: Entity) -> Result<usize, EcsError> {
        self.index
            .get(&entity)
            .copied()
            .ok_or(EcsError::UnknownEntity(entity))
    }

    fn record(&self, entity: Entity) -> Option<&EntityRecord> {
        self.index.get(&entity).map(|&position| &self.entities[position])
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("capacity", &self.capacity)
            .field("component_types", &self.types.len())
            .field("entities", &self.entities.len())
            .field("issued", &self.allocator.issued())
            .field("running", &self.run.is_running())
            .finish()
    }
}
