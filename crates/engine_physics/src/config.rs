//! Solver tuning.

use serde::{Deserialize, Serialize};

/// How an impulse is split between the two bodies of a contact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpulseWeighting {
    /// Each body takes `own mass / (mass_a + mass_b)` of the impulse.
    #[default]
    MassRatio,
    /// Each body takes `impulse * own inverse mass`.
    InverseMass,
}

/// Constants used when resolving a contact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Fraction of the remaining penetration removed per correction.
    pub percent: f32,
    /// Penetration tolerated without any positional correction.
    pub slop: f32,
    /// Impulse split rule.
    pub weighting: ImpulseWeighting,
}

impl SolverConfig {
    /// Default correction fraction.
    pub const DEFAULT_PERCENT: f32 = 0.2;
    /// Default penetration allowance.
    pub const DEFAULT_SLOP: f32 = 0.01;
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            percent: Self::DEFAULT_PERCENT,
            slop: Self::DEFAULT_SLOP,
            weighting: ImpulseWeighting::default(),
        }
    }
}
