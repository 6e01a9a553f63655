// Centralized configuration for simulation parameters

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ====================
// Force Strengths
// ====================
/// Gravitational constant, acts on mass (always attractive, ~1/r^2).
pub const GRAVITY_STRENGTH: f64 = 15.0;
/// Coulomb-like constant for the signed short-range charge (~1/r^3).
pub const CLOSE_CHARGE_STRENGTH: f64 = 150_000_000.0;
/// Constant for the always-attractive long-range charge (~r).
pub const FAR_CHARGE_STRENGTH: f64 = 7.5;

// ====================
// Environment
// ====================
/// Side length of the square environment, in the same units as particle radius.
pub const ENVIRONMENT_SIZE: i32 = 800;
pub const ALLOW_MERGE: bool = true;
pub const WALL_BOUNCE: bool = true;

// ====================
// Collision Tuning
// ====================
/// A bounce completes once the pair is this many combined radii apart.
pub const BOUNCE_COMPLETE_DIST_FACTOR: f64 = 1.5;
/// Colliding particles may only merge when max/min mass exceeds this ratio.
pub const MERGE_MASS_RATIO_THRESHOLD: f64 = 2.5;
/// Same-sign close charges summing (in magnitude) above this value block a merge.
pub const MERGE_CLOSE_CHARGE_THRESHOLD: f64 = 0.25;

// ====================
// Generation / History
// ====================
pub const DEFAULT_PARTICLE_COUNT: usize = 50;
pub const DEFAULT_AVERAGE_MASS: f64 = 250.0;
/// Standard deviation of generated masses as a fraction of the average mass.
pub const MASS_SPREAD_FACTOR: f64 = 0.55;
/// Generated masses never drop below max(MIN_GENERATED_MASS, MIN_MASS_FACTOR * average).
pub const MIN_GENERATED_MASS: f64 = 4.0;
pub const MIN_MASS_FACTOR: f64 = 0.2;
pub const MAX_MASS_FACTOR: f64 = 1.75;
pub const HISTORY_TRAIL: bool = true;
pub const HISTORY_LENGTH: usize = 15;

// ====================
// Application Loop
// ====================
/// Requested interval between ticks, in milliseconds.
pub const PHYSICS_LOOP_SPEED_MS: u64 = 75;
/// Factor applied to the measured tick time when a tick overruns its interval.
pub const LOOP_SPEED_BACKOFF: f64 = 1.05;

fn default_bounce_complete_dist_factor() -> f64 {
    BOUNCE_COMPLETE_DIST_FACTOR
}

fn default_merge_mass_ratio_threshold() -> f64 {
    MERGE_MASS_RATIO_THRESHOLD
}

fn default_merge_close_charge_threshold() -> f64 {
    MERGE_CLOSE_CHARGE_THRESHOLD
}

/// Engine configuration. Mutated only between ticks; every change goes through `validate`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub gravity_strength: f64,
    pub close_charge_strength: f64,
    pub far_charge_strength: f64,
    pub environment_size: i32,
    pub allow_merge: bool,
    pub wall_bounce: bool,
    #[serde(default = "default_bounce_complete_dist_factor")]
    pub bounce_complete_dist_factor: f64,
    #[serde(default = "default_merge_mass_ratio_threshold")]
    pub merge_mass_ratio_threshold: f64,
    #[serde(default = "default_merge_close_charge_threshold")]
    pub merge_close_charge_threshold: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity_strength: GRAVITY_STRENGTH,
            close_charge_strength: CLOSE_CHARGE_STRENGTH,
            far_charge_strength: FAR_CHARGE_STRENGTH,
            environment_size: ENVIRONMENT_SIZE,
            allow_merge: ALLOW_MERGE,
            wall_bounce: WALL_BOUNCE,
            bounce_complete_dist_factor: BOUNCE_COMPLETE_DIST_FACTOR,
            merge_mass_ratio_threshold: MERGE_MASS_RATIO_THRESHOLD,
            merge_close_charge_threshold: MERGE_CLOSE_CHARGE_THRESHOLD,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<()> {
        check_finite("gravity_strength", self.gravity_strength)?;
        check_finite("close_charge_strength", self.close_charge_strength)?;
        check_finite("far_charge_strength", self.far_charge_strength)?;
        check_environment_size(self.environment_size)?;
        check_positive("bounce_complete_dist_factor", self.bounce_complete_dist_factor)?;
        check_positive("merge_mass_ratio_threshold", self.merge_mass_ratio_threshold)?;
        check_positive("merge_close_charge_threshold", self.merge_close_charge_threshold)?;
        Ok(())
    }
}

/// Parameters of the last random generation, kept so snapshots and the
/// "regenerate while paused" controls can reuse them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationSettings {
    pub count: usize,
    pub average_mass: f64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            count: DEFAULT_PARTICLE_COUNT,
            average_mass: DEFAULT_AVERAGE_MASS,
        }
    }
}

/// Trail settings applied to every particle the engine creates or restores.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistorySettings {
    pub trail: bool,
    pub length: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            trail: HISTORY_TRAIL,
            length: HISTORY_LENGTH,
        }
    }
}

pub(crate) fn check_finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!("{name} must be finite, got {value}")))
    }
}

pub(crate) fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!("{name} must be > 0, got {value}")))
    }
}

pub(crate) fn check_environment_size(size: i32) -> Result<()> {
    if size > 0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "environment_size must be > 0, got {size}"
        )))
    }
}
