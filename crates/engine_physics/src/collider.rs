//! Physics-free overlap sensing.
//!
//! A [`Collider`] marks an entity as something others can hit and lists the
//! groups it watches. Scans never change any state themselves: they report
//! partners to the caller, who decides what a hit means.
//!
//! Partners are gathered before any reaction runs, so a reaction may freely
//! borrow, mutate or destroy either entity.

use std::collections::BTreeMap;

use engine_ecs::{
    Component, Context, Dependency, DrawContext, EcsError, Entity, Flip, GroupId, Rect, TextureId,
    World,
};
use engine_math::Transform2D;
use tracing::{info, trace, warn};

use crate::collision::collide;

/// A tagged collision sensor.
#[derive(Debug, Clone, Default)]
pub struct Collider {
    tag: String,
    bounds: Rect,
    conflict_groups: Vec<GroupId>,
    log_hits: bool,
    debug_texture: Option<(TextureId, Rect)>,
}

impl Collider {
    /// A collider named `tag` that watches no groups.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Name used in hit logs.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Integer bounds of the owning transform as of the last update.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Replace the watched groups. Order is kept and decides the order in
    /// which partners are reported.
    pub fn set_collisions(&mut self, groups: impl IntoIterator<Item = GroupId>) {
        self.conflict_groups = groups.into_iter().collect();
    }

    /// Builder form of [`Collider::set_collisions`].
    #[must_use]
    pub fn with_collisions(mut self, groups: impl IntoIterator<Item = GroupId>) -> Self {
        self.set_collisions(groups);
        self
    }

    /// Watched groups, in report order.
    #[must_use]
    pub fn conflict_groups(&self) -> &[GroupId] {
        &self.conflict_groups
    }

    /// Draw `src` of `texture` over the bounds every draw pass.
    pub fn set_texture(&mut self, texture: TextureId, src: Rect) {
        self.debug_texture = Some((texture, src));
    }

    #[must_use]
    pub fn with_debug_texture(mut self, texture: TextureId, src: Rect) -> Self {
        self.set_texture(texture, src);
        self
    }

    /// Stop drawing the debug texture.
    pub fn stop_draw(&mut self) {
        self.debug_texture = None;
    }

    /// Log every hit at `info` instead of `trace`.
    pub fn set_log_hits(&mut self, log_hits: bool) {
        self.log_hits = log_hits;
    }

    /// Builder form of [`Collider::set_log_hits`].
    #[must_use]
    pub fn with_log_hits(mut self, log_hits: bool) -> Self {
        self.log_hits = log_hits;
        self
    }

    /// Active members of the watched groups that carry a collider and
    /// overlap `entity`'s transform, in group order then member order.
    ///
    /// An entity listed in two watched groups is reported twice. Groups
    /// outside the world's range are logged and skipped.
    pub fn partners(&self, world: &World, entity: Entity) -> Result<Vec<Entity>, EcsError> {
        let transform = world.component::<Transform2D>(entity)?;
        let mut hits = Vec::new();
        for &group in &self.conflict_groups {
            let members = match world.group(group) {
                Ok(members) => members,
                Err(err) => {
                    warn!(entity = %entity, %err, "watched group skipped");
                    continue;
                }
            };
            for &other in members {
                if other == entity
                    || !world.is_active(other)
                    || !world.has_group(other, group)
                    || !world.has_component::<Collider>(other)
                {
                    continue;
                }
                let theirs = world.component::<Transform2D>(other)?;
                if collide(&transform, &theirs).is_none() {
                    continue;
                }
                self.log_hit(world, other);
                hits.push(other);
            }
        }
        Ok(hits)
    }

    fn log_hit(&self, world: &World, other: Entity) {
        let other_tag = world
            .component::<Collider>(other)
            .map(|c| c.tag.clone())
            .unwrap_or_else(|_| other.to_string());
        if self.log_hits {
            info!("The {} hit: {}", self.tag, other_tag);
        } else {
            trace!(tag = %self.tag, other = %other_tag, "hit");
        }
    }

    fn refresh_bounds(&mut self, ctx: &Context<'_>) {
        match ctx.get::<Transform2D>() {
            Ok(transform) => self.bounds = transform.bounds(),
            Err(err) => warn!(entity = %ctx.entity(), %err, "collider bounds not refreshed"),
        }
    }
}

impl Component for Collider {
    fn type_name() -> &'static str {
        "Collider"
    }

    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::auto_attach::<Transform2D>()]
    }

    fn init(&mut self, ctx: &mut Context<'_>) {
        self.refresh_bounds(ctx);
    }

    fn update(&mut self, ctx: &mut Context<'_>) {
        self.refresh_bounds(ctx);
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>) {
        if let Some((texture, src)) = self.debug_texture {
            ctx.renderer().draw(texture, src, self.bounds, Flip::None);
        }
    }
}

/// Partners currently hitting `entity`'s collider.
pub fn colliding_partners(world: &World, entity: Entity) -> Result<Vec<Entity>, EcsError> {
    world.component::<Collider>(entity)?.partners(world, entity)
}

/// Call `reaction(entity, partner)` once per hit. Returns the number of
/// hits.
pub fn notify_collisions<F>(world: &World, entity: Entity, mut reaction: F) -> Result<usize, EcsError>
where
    F: FnMut(Entity, Entity),
{
    let partners = colliding_partners(world, entity)?;
    for &partner in &partners {
        reaction(entity, partner);
    }
    Ok(partners.len())
}

/// Call `reaction(entity, partner)` once per hit and keep each result under
/// its partner. A partner reported twice keeps the later result.
pub fn collect_collisions<T, F>(
    world: &World,
    entity: Entity,
    mut reaction: F,
) -> Result<BTreeMap<Entity, T>, EcsError>
where
    F: FnMut(Entity, Entity) -> T,
{
    let partners = colliding_partners(world, entity)?;
    Ok(partners
        .into_iter()
        .map(|partner| (partner, reaction(entity, partner)))
        .collect())
}

#[cfg(test)]
mod tests {
    use engine_ecs::DrawCall;
    use glam::Vec2;

    use super::*;

    const PLAYER: GroupId = GroupId::new(0);
    const ENEMIES: GroupId = GroupId::new(1);
    const PICKUPS: GroupId = GroupId::new(2);

    fn spawn(world: &mut World, tag: &str, transform: Transform2D, group: GroupId) -> Entity {
        let e = world.create_entity();
        world.add_component(e, transform).unwrap();
        world.add_component(e, Collider::new(tag)).unwrap();
        world.add_group(e, group).unwrap();
        e
    }

    fn arena() -> (World, Entity, Entity, Entity, Entity) {
        let mut world = World::new();
        let player = spawn(
            &mut world,
            "player",
            Transform2D::sized(0.0, 0.0, 32.0, 32.0),
            PLAYER,
        );
        world
            .component_mut::<Collider>(player)
            .unwrap()
            .set_collisions([PICKUPS, ENEMIES]);
        let enemy = spawn(
            &mut world,
            "enemy",
            Transform2D::circle(20.0, 0.0, 8.0),
            ENEMIES,
        );
        let far = spawn(
            &mut world,
            "far",
            Transform2D::sized(200.0, 0.0, 32.0, 32.0),
            ENEMIES,
        );
        let coin = spawn(
            &mut world,
            "coin",
            Transform2D::sized(0.0, 20.0, 16.0, 16.0),
            PICKUPS,
        );
        (world, player, enemy, far, coin)
    }

    #[test]
    fn test_auto_attaches_transform() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, Collider::new("wall")).unwrap();
        assert!(world.has_component::<Transform2D>(e));
        let collider = world.component::<Collider>(e).unwrap();
        assert_eq!(collider.bounds(), Rect::new(-16, -16, 32, 32));
        assert_eq!(collider.tag(), "wall");
    }

    #[test]
    fn test_bounds_follow_scaled_transform() {
        let mut world = World::new();
        let e = world.create_entity();
        world
            .add_component(
                e,
                Transform2D::sized(10.0, 10.0, 8.0, 8.0)
                    .with_scale(2.0)
                    .with_velocity(Vec2::X),
            )
            .unwrap();
        world.add_component(e, Collider::new("box")).unwrap();
        assert_eq!(world.component::<Collider>(e).unwrap().bounds(), Rect::new(2, 2, 16, 16));

        world.update();
        assert_eq!(world.component::<Collider>(e).unwrap().bounds(), Rect::new(5, 2, 16, 16));
    }

    #[test]
    fn test_partners_in_group_order() {
        let (world, player, enemy, _far, coin) = arena();
        assert_eq!(colliding_partners(&world, player).unwrap(), vec![coin, enemy]);
    }

    #[test]
    fn test_skips_inactive_and_sensorless_members() {
        let (mut world, player, enemy, _far, coin) = arena();
        world.destroy(coin);

        let plain = world.create_entity();
        world
            .add_component(plain, Transform2D::sized(0.0, 0.0, 32.0, 32.0))
            .unwrap();
        world.add_group(plain, ENEMIES).unwrap();

        assert_eq!(colliding_partners(&world, player).unwrap(), vec![enemy]);
    }

    #[test]
    fn test_notify_may_mutate_partners() {
        let (mut world, player, enemy, _far, coin) = arena();
        let hits = notify_collisions(&world, player, |_, partner| world.destroy(partner)).unwrap();
        assert_eq!(hits, 2);
        assert!(!world.is_active(enemy));
        assert!(!world.is_active(coin));

        world.refresh();
        assert!(colliding_partners(&world, player).unwrap().is_empty());
    }

    #[test]
    fn test_collect_keys_results_by_partner() {
        let (world, player, enemy, _far, coin) = arena();
        let tags = collect_collisions(&world, player, |me, partner| {
            assert_eq!(me, player);
            world.component::<Collider>(partner).unwrap().tag().to_owned()
        })
        .unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[&enemy], "enemy");
        assert_eq!(tags[&coin], "coin");
    }

    #[test]
    fn test_member_leaving_a_watched_group_is_not_reported() {
        let (world, player, enemy, _far, coin) = arena();
        world.remove_group(enemy, ENEMIES).unwrap();
        assert_eq!(colliding_partners(&world, player).unwrap(), vec![coin]);
    }

    #[test]
    fn test_out_of_range_watched_group_is_skipped() {
        let (world, player, enemy, _far, coin) = arena();
        world
            .component_mut::<Collider>(player)
            .unwrap()
            .set_collisions([GroupId::new(40), PICKUPS, ENEMIES]);
        assert_eq!(colliding_partners(&world, player).unwrap(), vec![coin, enemy]);
    }

    #[test]
    fn test_scan_without_collider_fails() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, Transform2D::default()).unwrap();
        world.register::<Collider>().unwrap();
        let err = colliding_partners(&world, e).unwrap_err();
        assert!(matches!(err, EcsError::ComponentMissing { .. }));
    }

    #[test]
    fn test_debug_texture_draws_until_stopped() {
        let mut world = World::new();
        let e = world.create_entity();
        let src = Rect::new(0, 0, 16, 16);
        world
            .add_component(e, Collider::new("debug").with_debug_texture(TextureId(9), src))
            .unwrap();

        let mut calls: Vec<DrawCall> = Vec::new();
        world.draw(&mut calls);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].texture, TextureId(9));
        assert_eq!(calls[0].dst, Rect::new(-16, -16, 32, 32));

        world.component_mut::<Collider>(e).unwrap().stop_draw();
        calls.clear();
        world.draw(&mut calls);
        assert!(calls.is_empty());
    }
}
