//! Runner configuration.
//!
//! Everything has a default, so an empty JSON object is a valid config and
//! `--config` is optional. Command-line flags override the file.

use std::path::Path;

use anyhow::{Context as _, Result, ensure};
use engine_defaults::KeyEvent;
use engine_ecs::{Capacity, GroupId};
use engine_physics::SolverConfig;
use serde::{Deserialize, Serialize};

use crate::scene;
use crate::tick::{MIN_TICK_RATE, TickConfig};

/// A key event to feed the demo's keyboard controller on a given tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedKey {
    pub tick: u64,
    #[serde(flatten)]
    pub event: KeyEvent<char>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Target frames per second.
    pub tick_rate: f64,
    /// Stop after this many frames; `0` runs until the run flag clears.
    pub max_ticks: u64,
    pub capacity: Capacity,
    /// Groups drawn each frame, back to front.
    pub layers: Vec<GroupId>,
    pub solver: SolverConfig,
    /// Free-fall acceleration given to every falling body in the demo.
    pub gravity: f32,
    pub inputs: Vec<ScriptedKey>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let tick = TickConfig::default();
        Self {
            tick_rate: tick.tick_rate,
            max_ticks: tick.max_ticks,
            capacity: Capacity::default(),
            layers: scene::DEFAULT_LAYERS.to_vec(),
            solver: SolverConfig::default(),
            gravity: scene::DEFAULT_GRAVITY,
            inputs: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Read `path`, or fall back to the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Apply command-line overrides.
    #[must_use]
    pub fn with_overrides(mut self, ticks: Option<u64>, tick_rate: Option<f64>) -> Self {
        if let Some(ticks) = ticks {
            self.max_ticks = ticks;
        }
        if let Some(tick_rate) = tick_rate {
            self.tick_rate = tick_rate;
        }
        self
    }

    /// Reject values the frame loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.tick_rate.is_finite() && self.tick_rate >= MIN_TICK_RATE,
            "tick_rate must be a number of at least {MIN_TICK_RATE}, got {}",
            self.tick_rate
        );
        ensure!(!self.layers.is_empty(), "at least one draw layer is required");
        Ok(())
    }

    #[must_use]
    pub fn tick_config(&self) -> TickConfig {
        TickConfig {
            tick_rate: self.tick_rate,
            max_ticks: self.max_ticks,
        }
    }
}
