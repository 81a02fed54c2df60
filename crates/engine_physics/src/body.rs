//! The rigid-body component.

use engine_ecs::{Component, Context, Dependency, EcsError, Entity, GroupId, World};
use engine_math::Transform2D;
use tracing::{trace, warn};

use crate::collision::{Manifold, collide};
use crate::config::SolverConfig;
use crate::resolution::{Body, Material, resolve};

/// Divisor applied to the configured free-fall acceleration.
pub const FREE_FALL_SCALE: f32 = 8.9;

/// Mass, restitution and contact response for an entity with a
/// [`Transform2D`].
///
/// Each update first applies free fall (when enabled), then tests the
/// entity against every active member of its conflict groups that also
/// carries a `PhysicsBody`, resolving each contact immediately. A pair of
/// bodies that list each other is therefore resolved twice per frame, once
/// from each side.
#[derive(Debug, Clone, Default)]
pub struct PhysicsBody {
    material: Material,
    conflict_groups: Vec<GroupId>,
    free_fall: Option<f32>,
    solver: SolverConfig,
}

impl PhysicsBody {
    /// A body of `mass` (0 = immovable) and `restitution`.
    #[must_use]
    pub fn new(mass: f32, restitution: f32) -> Self {
        Self {
            material: Material::new(mass, restitution),
            ..Self::default()
        }
    }

    /// Replace mass and restitution.
    pub fn set_constants(&mut self, mass: f32, restitution: f32) {
        self.material = Material::new(mass, restitution);
    }

    /// The body's current material.
    #[must_use]
    pub fn material(&self) -> Material {
        self.material
    }

    /// Mass; 0 for immovable bodies.
    #[must_use]
    pub fn mass(&self) -> f32 {
        self.material.mass
    }

    /// Inverse mass; 0 for immovable bodies.
    #[must_use]
    pub fn inverse_mass(&self) -> f32 {
        self.material.inv_mass
    }

    /// Bounciness in `[0, 1]`.
    #[must_use]
    pub fn restitution(&self) -> f32 {
        self.material.restitution
    }

    /// Replace the groups scanned each update. Order is kept.
    pub fn set_conflict_groups(&mut self, groups: impl IntoIterator<Item = GroupId>) {
        self.conflict_groups = groups.into_iter().collect();
    }

    /// Builder form of [`PhysicsBody::set_conflict_groups`].
    #[must_use]
    pub fn with_conflict_groups(mut self, groups: impl IntoIterator<Item = GroupId>) -> Self {
        self.set_conflict_groups(groups);
        self
    }

    /// Groups scanned each update, in scan order.
    #[must_use]
    pub fn conflict_groups(&self) -> &[GroupId] {
        &self.conflict_groups
    }

    /// Enable free fall. Every update then subtracts
    /// `acceleration / FREE_FALL_SCALE` from the vertical velocity,
    /// regardless of elapsed time.
    pub fn set_free_fall_acceleration(&mut self, acceleration: f32) {
        self.free_fall = Some(acceleration / FREE_FALL_SCALE);
    }

    /// The per-update velocity decrement, if free fall is enabled.
    #[must_use]
    pub fn free_fall_acceleration(&self) -> Option<f32> {
        self.free_fall
    }

    /// Stop applying free fall.
    pub fn disable_free_fall(&mut self) {
        self.free_fall = None;
    }

    /// Apply one step of free fall to `transform`.
    pub fn apply_free_fall(&self, transform: &mut Transform2D) {
        if let Some(step) = self.free_fall {
            transform.velocity.y -= step;
        }
    }

    /// Use `solver` for this body's contacts.
    #[must_use]
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Solver settings used for this body's contacts.
    #[must_use]
    pub fn solver(&self) -> &SolverConfig {
        &self.solver
    }

    /// Test `entity` against `other` and resolve the contact, if any.
    ///
    /// Returns `Ok(false)` when `other` is not a body or does not touch.
    fn resolve_against(&self, world: &World, entity: Entity, other: Entity) -> Result<bool, EcsError> {
        if !world.has_component::<PhysicsBody>(other) || !world.has_component::<Transform2D>(other) {
            return Ok(false);
        }
        let partner = world.component::<PhysicsBody>(other)?.material;
        let mut mine = world.component_mut::<Transform2D>(entity)?;
        let mut theirs = world.component_mut::<Transform2D>(other)?;

        let Some((pair, contact)) = collide(&mine, &theirs) else {
            return Ok(false);
        };
        let manifold = Manifold::new(other, contact);
        let mut a = Body::new(self.material, &mut mine);
        let mut b = Body::new(partner, &mut theirs);
        if pair.is_mirrored() {
            resolve(&mut b, &mut a, &manifold, &self.solver);
        } else {
            resolve(&mut a, &mut b, &manifold, &self.solver);
        }
        trace!(entity = %entity, partner = %other, ?pair, "resolved contact");
        Ok(true)
    }
}

impl Component for PhysicsBody {
    fn type_name() -> &'static str {
        "PhysicsBody"
    }

    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::required::<Transform2D>()]
    }

    fn update(&mut self, ctx: &mut Context<'_>) {
        if self.free_fall.is_some() {
            match ctx.get_mut::<Transform2D>() {
                Ok(mut transform) => self.apply_free_fall(&mut transform),
                Err(err) => warn!(entity = %ctx.entity(), %err, "free fall skipped"),
            }
        }

        let world = ctx.world();
        let entity = ctx.entity();
        for &group in &self.conflict_groups {
            let members = match world.group(group) {
                Ok(members) => members,
                Err(err) => {
                    warn!(entity = %entity, %err, "conflict group skipped");
                    continue;
                }
            };
            for &other in members {
                if other == entity || !world.is_active(other) || !world.has_group(other, group) {
                    continue;
                }
                if let Err(err) = self.resolve_against(world, entity, other) {
                    warn!(entity = %entity, partner = %other, %err, "contact skipped");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use engine_ecs::RunFlag;
    use glam::Vec2;

    use super::*;
    use crate::config::ImpulseWeighting;

    const FLOOR: GroupId = GroupId::new(0);
    const BALLS: GroupId = GroupId::new(1);

    fn spawn(world: &mut World, transform: Transform2D, body: PhysicsBody, group: GroupId) -> Entity {
        let e = world.create_entity();
        world.add_component(e, transform).unwrap();
        world.add_component(e, body).unwrap();
        world.add_group(e, group).unwrap();
        e
    }

    #[test]
    fn test_requires_transform() {
        let mut world = World::new();
        let run: RunFlag = world.run_flag();
        let e = world.create_entity();
        let err = world.add_component(e, PhysicsBody::new(1.0, 0.5)).unwrap_err();
        assert!(matches!(err, EcsError::MissingDependency { .. }));
        assert!(!run.is_running());
        assert!(!world.has_component::<PhysicsBody>(e));
    }

    #[test]
    fn test_constants() {
        let mut body = PhysicsBody::new(4.0, 0.3);
        assert_eq!(body.inverse_mass(), 0.25);
        body.set_constants(0.0, 0.9);
        assert_eq!(body.mass(), 0.0);
        assert_eq!(body.inverse_mass(), 0.0);
        assert_eq!(body.restitution(), 0.9);
        assert_eq!(PhysicsBody::default().inverse_mass(), 0.0);
    }

    #[test]
    fn test_conflict_groups_keep_order() {
        let body = PhysicsBody::default().with_conflict_groups([BALLS, FLOOR, GroupId::new(7)]);
        assert_eq!(body.conflict_groups(), &[BALLS, FLOOR, GroupId::new(7)]);
    }

    #[test]
    fn test_free_fall_is_scaled_and_applied_each_update() {
        let mut world = World::new();
        let e = world.create_entity();
        world
            .add_component(e, Transform2D::default().with_speed(0.0))
            .unwrap();
        let body = world.add_component(e, PhysicsBody::new(1.0, 0.0)).unwrap();
        body.set_free_fall_acceleration(8.9);
        assert_eq!(body.free_fall_acceleration(), Some(1.0));

        world.update();
        world.update();
        let t = world.component::<Transform2D>(e).unwrap();
        assert!((t.velocity.y + 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_disabled_free_fall_leaves_velocity() {
        let mut body = PhysicsBody::new(1.0, 0.0);
        body.set_free_fall_acceleration(3.0);
        body.disable_free_fall();
        let mut t = Transform2D::default();
        body.apply_free_fall(&mut t);
        assert_eq!(t.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_ball_bounces_off_static_floor() {
        let mut world = World::new();
        let floor = spawn(
            &mut world,
            Transform2D::sized(0.0, 40.0, 200.0, 20.0).with_speed(0.0),
            PhysicsBody::new(0.0, 0.5),
            FLOOR,
        );
        // Overlapping the floor by 6 and moving into it.
        let ball = spawn(
            &mut world,
            Transform2D::sized(0.0, 20.0, 32.0, 32.0)
                .with_velocity(Vec2::new(0.0, 4.0))
                .with_speed(0.0),
            PhysicsBody::new(2.0, 0.5).with_conflict_groups([FLOOR]),
            BALLS,
        );

        world.update();

        let t = world.component::<Transform2D>(ball).unwrap();
        assert!(t.velocity.y < 0.0);
        assert!(t.position.y < 20.0);
        let f = world.component::<Transform2D>(floor).unwrap();
        assert_eq!(f.velocity, Vec2::ZERO);
        assert_eq!(f.position, Vec2::new(0.0, 40.0));
    }

    #[test]
    fn test_inverse_mass_weighting_scales_by_restitution() {
        let mut world = World::new();
        spawn(
            &mut world,
            Transform2D::sized(0.0, 40.0, 200.0, 20.0).with_speed(0.0),
            PhysicsBody::new(0.0, 0.5),
            FLOOR,
        );
        let solver = SolverConfig {
            weighting: ImpulseWeighting::InverseMass,
            ..SolverConfig::default()
        };
        let ball = spawn(
            &mut world,
            Transform2D::sized(0.0, 20.0, 32.0, 32.0)
                .with_velocity(Vec2::new(0.0, 4.0))
                .with_speed(0.0),
            PhysicsBody::new(2.0, 0.5)
                .with_conflict_groups([FLOOR])
                .with_solver(solver),
            BALLS,
        );

        world.update();
        let t = world.component::<Transform2D>(ball).unwrap();
        assert_eq!(t.velocity, Vec2::new(0.0, -2.0));
    }

    #[test]
    fn test_circle_against_box_is_resolved_from_the_box_side() {
        let mut world = World::new();
        let wall = spawn(
            &mut world,
            Transform2D::sized(0.0, 0.0, 20.0, 20.0).with_speed(0.0),
            PhysicsBody::new(0.0, 1.0),
            FLOOR,
        );
        let ball = spawn(
            &mut world,
            Transform2D::circle(13.0, 0.0, 5.0)
                .with_velocity(Vec2::new(-2.0, 0.0))
                .with_speed(0.0),
            PhysicsBody::new(1.0, 1.0).with_conflict_groups([FLOOR]),
            BALLS,
        );

        world.update();
        let t = world.component::<Transform2D>(ball).unwrap();
        // Pushed back out along +X and bouncing away from the wall.
        assert!(t.velocity.x > 0.0);
        assert!(t.position.x > 13.0);
        let w = world.component::<Transform2D>(wall).unwrap();
        assert_eq!(w.position, Vec2::ZERO);
    }

    #[test]
    fn test_skips_self_inactive_and_non_bodies() {
        let mut world = World::new();
        let ghost = world.create_entity();
        world
            .add_component(ghost, Transform2D::sized(0.0, 0.0, 32.0, 32.0))
            .unwrap();
        world.add_group(ghost, BALLS).unwrap();

        let dead = spawn(
            &mut world,
            Transform2D::sized(0.0, 0.0, 32.0, 32.0).with_speed(0.0),
            PhysicsBody::new(0.0, 1.0),
            BALLS,
        );
        world.destroy(dead);

        let me = spawn(
            &mut world,
            Transform2D::sized(0.0, 0.0, 32.0, 32.0)
                .with_velocity(Vec2::X)
                .with_speed(0.0),
            PhysicsBody::new(1.0, 1.0).with_conflict_groups([BALLS]),
            BALLS,
        );

        world.update();
        let t = world.component::<Transform2D>(me).unwrap();
        assert_eq!(t.velocity, Vec2::X);
        assert_eq!(t.position, Vec2::ZERO);
    }

    #[test]
    fn test_member_leaving_a_group_stops_colliding_before_refresh() {
        let mut world = World::new();
        let floor = spawn(
            &mut world,
            Transform2D::sized(0.0, 40.0, 200.0, 20.0).with_speed(0.0),
            PhysicsBody::new(0.0, 0.5),
            FLOOR,
        );
        let ball = spawn(
            &mut world,
            Transform2D::sized(0.0, 20.0, 32.0, 32.0)
                .with_velocity(Vec2::new(0.0, 4.0))
                .with_speed(0.0),
            PhysicsBody::new(2.0, 0.5).with_conflict_groups([FLOOR]),
            BALLS,
        );
        world.remove_group(floor, FLOOR).unwrap();
        assert!(world.group(FLOOR).unwrap().contains(&floor));

        world.update();

        let t = world.component::<Transform2D>(ball).unwrap();
        assert_eq!(t.velocity, Vec2::new(0.0, 4.0));
        assert_eq!(t.position, Vec2::new(0.0, 20.0));
    }

    #[test]
    fn test_out_of_range_group_is_skipped() {
        let mut world = World::new();
        let e = spawn(
            &mut world,
            Transform2D::default().with_speed(0.0),
            PhysicsBody::new(1.0, 0.0).with_conflict_groups([GroupId::new(40)]),
            BALLS,
        );
        world.update();
        assert!(world.run_flag().is_running());
        assert!(world.is_active(e));
    }
}
