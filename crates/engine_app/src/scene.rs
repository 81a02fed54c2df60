//! The demo scene: bouncing bodies in a walled box and a pickup they can
//! collect.
//!
//! The world is y-up: the floor sits just below `y = 0` and free fall pulls
//! velocities toward negative y.

use std::cell::Cell;
use std::rc::Rc;

use engine_defaults::{KeyboardController, Sprite};
use engine_ecs::{Component, Context, Dependency, EcsError, Entity, GroupId, TextureId, World};
use engine_math::{Transform2D, Vec2};
use engine_physics::{Collider, PhysicsBody, SolverConfig, notify_collisions};
use tracing::{info, warn};

use crate::config::AppConfig;

pub const FLOOR: GroupId = GroupId::new(0);
pub const WALLS: GroupId = GroupId::new(1);
pub const BALLS: GroupId = GroupId::new(2);
pub const PICKUPS: GroupId = GroupId::new(3);

/// Back to front.
pub const DEFAULT_LAYERS: [GroupId; 4] = [FLOOR, WALLS, PICKUPS, BALLS];
pub const DEFAULT_GRAVITY: f32 = 0.5;

pub const QUIT_KEY: char = 'q';
pub const PAUSE_KEY: char = 'p';

const ARENA_WIDTH: f32 = 640.0;
const ARENA_HEIGHT: f32 = 480.0;
const THICKNESS: f32 = 20.0;

const SOLID_TEXTURE: TextureId = TextureId(1);
const BALL_TEXTURE: TextureId = TextureId(2);
const PICKUP_TEXTURE: TextureId = TextureId(3);

/// Destroys its entity the first time any watched collider touches it.
#[derive(Debug, Default)]
pub struct Pickup {
    collected_by: Option<Entity>,
}

impl Component for Pickup {
    fn type_name() -> &'static str {
        "Pickup"
    }

    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::required::<Collider>()]
    }

    fn update(&mut self, ctx: &mut Context<'_>) {
        if self.collected_by.is_some() {
            return;
        }
        let world = ctx.world();
        let mut collector = None;
        let result = notify_collisions(world, ctx.entity(), |pickup, partner| {
            if collector.is_none() {
                info!(pickup = %pickup, by = %partner, "pickup collected");
                world.destroy(pickup);
                collector = Some(partner);
            }
        });
        match result {
            Ok(_) => self.collected_by = collector,
            Err(err) => warn!(entity = %ctx.entity(), %err, "pickup scan failed"),
        }
    }
}

/// A built demo world plus the handles the frame loop needs.
#[derive(Debug)]
pub struct Scene {
    pub world: World,
    pub controller: Entity,
    pub pickup: Entity,
    pub balls: Vec<Entity>,
    /// Set while the pause key is toggled on.
    pub paused: Rc<Cell<bool>>,
}

fn spawn_solid(
    world: &mut World,
    tag: &str,
    transform: Transform2D,
    group: GroupId,
    solver: SolverConfig,
) -> Result<Entity, EcsError> {
    let e = world.create_entity();
    world.add_component(e, transform.with_speed(0.0))?;
    world.add_component(e, PhysicsBody::new(0.0, 0.6).with_solver(solver))?;
    world.add_component(e, Collider::new(tag))?;
    world.add_component(e, Sprite::new(SOLID_TEXTURE))?;
    world.add_group(e, group)?;
    Ok(e)
}

fn spawn_ball(
    world: &mut World,
    transform: Transform2D,
    restitution: f32,
    config: &AppConfig,
) -> Result<Entity, EcsError> {
    let e = world.create_entity();
    world.add_component(e, transform)?;
    let body = world.add_component(
        e,
        PhysicsBody::new(1.0, restitution)
            .with_conflict_groups([FLOOR, WALLS, BALLS])
            .with_solver(config.solver),
    )?;
    body.set_free_fall_acceleration(config.gravity);
    world.add_component(e, Collider::new("ball"))?;
    world.add_component(e, Sprite::new(BALL_TEXTURE))?;
    world.add_group(e, BALLS)?;
    Ok(e)
}

/// Build the demo world described by `config`.
pub fn build(config: &AppConfig) -> Result<Scene, EcsError> {
    let mut world = World::with_capacity(config.capacity);
    let solver = config.solver;

    let half_w = ARENA_WIDTH / 2.0;
    let half_t = THICKNESS / 2.0;
    spawn_solid(
        &mut world,
        "floor",
        Transform2D::sized(half_w, -half_t, ARENA_WIDTH, THICKNESS),
        FLOOR,
        solver,
    )?;
    for (tag, x) in [("left wall", -half_t), ("right wall", ARENA_WIDTH + half_t)] {
        spawn_solid(
            &mut world,
            tag,
            Transform2D::sized(x, ARENA_HEIGHT / 2.0, THICKNESS, ARENA_HEIGHT),
            WALLS,
            solver,
        )?;
    }

    let mut balls = Vec::new();
    for (x, vx) in [(160.0, 0.8), (half_w, 0.0), (480.0, -0.8)] {
        let ball = Transform2D::circle(x, 300.0, 12.0).with_velocity(Vec2::new(vx, 0.0));
        balls.push(spawn_ball(&mut world, ball, 0.7, config)?);
    }
    let block = Transform2D::sized(240.0, 200.0, 24.0, 24.0).with_source(Vec2::new(24.0, 0.0));
    balls.push(spawn_ball(&mut world, block, 0.3, config)?);

    let pickup = world.create_entity();
    world.add_component(pickup, Transform2D::sized(half_w, 40.0, 16.0, 16.0).with_speed(0.0))?;
    world.add_component(
        pickup,
        Collider::new("pickup")
            .with_collisions([BALLS])
            .with_log_hits(true),
    )?;
    world.add_component(pickup, Pickup::default())?;
    world.add_component(pickup, Sprite::new(PICKUP_TEXTURE))?;
    world.add_group(pickup, PICKUPS)?;

    let paused = Rc::new(Cell::new(false));
    let controller = world.create_entity();
    let mut keys = KeyboardController::new();
    keys.set_quit_key(QUIT_KEY, world.run_flag());
    let toggle = Rc::clone(&paused);
    keys.set_key(
        PAUSE_KEY,
        move || {
            toggle.set(!toggle.get());
            info!(paused = toggle.get(), "pause toggled");
        },
        || {},
    );
    world.add_component(controller, keys)?;

    info!(
        entities = world.entity_count(),
        gravity = config.gravity,
        "demo scene built"
    );
    Ok(Scene {
        world,
        controller,
        pickup,
        balls,
        paused,
    })
}
