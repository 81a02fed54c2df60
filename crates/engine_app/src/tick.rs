//! Fixed-rate frame loop.
//!
//! Every tick runs the same lifecycle on the calling thread:
//!
//! 1. Dispatch scripted key events due this tick.
//! 2. `World::update` (skipped while paused).
//! 3. `World::draw_in_order` over the configured layers into the frame
//!    buffer.
//! 4. `World::refresh`, the only point where entities are reclaimed.
//!
//! The loop stops after `max_ticks`, or as soon as the world's run flag is
//! cleared, whichever comes first.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result};
use engine_defaults::KeyboardController;
use engine_ecs::{DrawCall, EcsError, Entity, GroupId, World};
use tracing::{debug, info, warn};

use crate::config::ScriptedKey;
use crate::scene::Scene;

/// Slowest accepted rate: one tick every ~11.5 days.
pub const MIN_TICK_RATE: f64 = 1e-6;

/// Configuration for the frame loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = until the run flag clears).
    pub max_ticks: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
        }
    }
}

/// The frame loop and the world it drives.
#[derive(Debug)]
pub struct TickLoop {
    tick_id: u64,
    config: TickConfig,
    world: World,
    layers: Vec<GroupId>,
    /// Draw calls of the most recent frame, in layer order.
    frame: Vec<DrawCall>,
    draw_calls: u64,
    controller: Option<Entity>,
    script: Vec<ScriptedKey>,
    paused: Rc<Cell<bool>>,
}

impl TickLoop {
    #[must_use]
    pub fn new(config: TickConfig, world: World, layers: Vec<GroupId>) -> Self {
        Self {
            tick_id: 0,
            config,
            world,
            layers,
            frame: Vec::new(),
            draw_calls: 0,
            controller: None,
            script: Vec::new(),
            paused: Rc::new(Cell::new(false)),
        }
    }

    /// Drive a built scene, feeding `script` to its keyboard controller.
    #[must_use]
    pub fn from_scene(
        scene: Scene,
        config: TickConfig,
        layers: Vec<GroupId>,
        script: Vec<ScriptedKey>,
    ) -> Self {
        debug!(bodies = scene.balls.len(), pickup = %scene.pickup, "driving scene");
        let mut tick_loop = Self::new(config, scene.world, layers);
        tick_loop.controller = Some(scene.controller);
        tick_loop.script = script;
        tick_loop.paused = scene.paused;
        tick_loop
    }

    /// Returns the number of ticks run so far.
    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[must_use]
    pub fn frame(&self) -> &[DrawCall] {
        &self.frame
    }

    /// Total draw calls issued since the loop started.
    #[must_use]
    pub fn draw_calls(&self) -> u64 {
        self.draw_calls
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    fn feed_input(&self) -> Result<usize, EcsError> {
        let Some(controller) = self.controller else {
            return Ok(0);
        };
        let due: Vec<_> = self
            .script
            .iter()
            .filter(|key| key.tick == self.tick_id)
            .collect();
        if due.is_empty() {
            return Ok(0);
        }
        let mut keys = self
            .world
            .component_mut::<KeyboardController<char>>(controller)?;
        Ok(due.into_iter().filter(|key| keys.handle(&key.event)).count())
    }

    /// Run one frame. Returns whether the world still wants to run.
    pub fn tick(&mut self) -> Result<bool, EcsError> {
        self.tick_id += 1;

        let handled = self.feed_input()?;
        if !self.paused.get() {
            self.world.update();
        }

        self.frame.clear();
        self.world.draw_in_order(&self.layers, &mut self.frame)?;
        self.draw_calls += self.frame.len() as u64;

        let reclaimed = self.world.refresh();
        debug!(
            tick_id = self.tick_id,
            keys = handled,
            draws = self.frame.len(),
            reclaimed,
            entities = self.world.entity_count(),
            "tick"
        );
        Ok(self.world.run_flag().is_running())
    }

    /// Run ticks at the configured rate until `max_ticks` or the run flag
    /// stops the loop. Returns the number of ticks run.
    pub fn run(&mut self) -> Result<u64> {
        let tick_duration = Duration::try_from_secs_f64(1.0 / self.config.tick_rate)
            .with_context(|| format!("invalid tick rate {}", self.config.tick_rate))?;
        let start_tick = self.tick_id;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            "starting tick loop"
        );

        loop {
            let start = Instant::now();

            if !self.tick()? {
                info!(tick_id = self.tick_id, "run flag cleared, stopping");
                break;
            }

            let ran = self.tick_id - start_tick;
            if self.config.max_ticks > 0 && ran >= self.config.max_ticks {
                info!(ticks = ran, "tick loop complete");
                break;
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!(
                    tick_id = self.tick_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }
        Ok(self.tick_id - start_tick)
    }
}
