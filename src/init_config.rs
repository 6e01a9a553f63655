// init_config.rs
// Handles loading and parsing the initial engine and particle configuration from init_config.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use ultraviolet::DVec2;

use crate::config::{self, GenerationSettings, HistorySettings, SimConfig};
use crate::error::{Error, Result};
use crate::particle::Particle;
use crate::simulation::Simulation;

/// Picked up from the working directory when no config file is given.
pub const DEFAULT_INIT_CONFIG: &str = "init_config.toml";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct InitConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub particles: ParticlesConfig,
}

/// Engine overrides. Every omitted field keeps its default from `config`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SimulationConfig {
    pub gravity_strength: Option<f64>,
    pub close_charge_strength: Option<f64>,
    pub far_charge_strength: Option<f64>,
    pub environment_size: Option<i32>,
    pub allow_merge: Option<bool>,
    pub wall_bounce: Option<bool>,
    pub bounce_complete_dist_factor: Option<f64>,
    pub merge_mass_ratio_threshold: Option<f64>,
    pub merge_close_charge_threshold: Option<f64>,
    /// Requested tick interval in milliseconds.
    pub physics_loop_speed_ms: Option<u64>,
    /// Seed for particle generation. Omit for a different roster every run.
    pub seed: Option<u64>,
}

impl SimulationConfig {
    pub fn to_sim_config(&self) -> SimConfig {
        let d = SimConfig::default();
        SimConfig {
            gravity_strength: self.gravity_strength.unwrap_or(d.gravity_strength),
            close_charge_strength: self.close_charge_strength.unwrap_or(d.close_charge_strength),
            far_charge_strength: self.far_charge_strength.unwrap_or(d.far_charge_strength),
            environment_size: self.environment_size.unwrap_or(d.environment_size),
            allow_merge: self.allow_merge.unwrap_or(d.allow_merge),
            wall_bounce: self.wall_bounce.unwrap_or(d.wall_bounce),
            bounce_complete_dist_factor: self
                .bounce_complete_dist_factor
                .unwrap_or(d.bounce_complete_dist_factor),
            merge_mass_ratio_threshold: self
                .merge_mass_ratio_threshold
                .unwrap_or(d.merge_mass_ratio_threshold),
            merge_close_charge_threshold: self
                .merge_close_charge_threshold
                .unwrap_or(d.merge_close_charge_threshold),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ParticlesConfig {
    pub count: Option<usize>,
    pub average_mass: Option<f64>,
    pub history_trail: Option<bool>,
    pub history_length: Option<usize>,
    /// Explicit roster. When non-empty it replaces random generation.
    #[serde(default)]
    pub bodies: Vec<BodyConfig>,
}

impl ParticlesConfig {
    pub fn generation(&self) -> GenerationSettings {
        GenerationSettings {
            count: self.count.unwrap_or(config::DEFAULT_PARTICLE_COUNT),
            average_mass: self.average_mass.unwrap_or(config::DEFAULT_AVERAGE_MASS),
        }
    }

    pub fn history(&self) -> HistorySettings {
        HistorySettings {
            trail: self.history_trail.unwrap_or(config::HISTORY_TRAIL),
            length: self.history_length.unwrap_or(config::HISTORY_LENGTH),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct BodyConfig {
    pub mass: f64,
    #[serde(default)]
    pub close_charge: f64,
    #[serde(default)]
    pub far_charge: f64,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub vx: f64,
    #[serde(default)]
    pub vy: f64,
}

impl BodyConfig {
    pub fn to_particle(&self) -> Result<Particle> {
        config::check_positive("body mass", self.mass)?;
        for (name, value) in [
            ("close_charge", self.close_charge),
            ("far_charge", self.far_charge),
            ("x", self.x),
            ("y", self.y),
            ("vx", self.vx),
            ("vy", self.vy),
        ] {
            config::check_finite(name, value)?;
        }
        Ok(Particle::new(self.mass, self.close_charge, self.far_charge, DVec2::new(self.x, self.y))
            .with_velocity(DVec2::new(self.vx, self.vy)))
    }
}

impl InitConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn load_default() -> Result<Self> {
        Self::load_from_file(DEFAULT_INIT_CONFIG)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: InitConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn loop_speed_ms(&self) -> u64 {
        self.simulation
            .physics_loop_speed_ms
            .unwrap_or(config::PHYSICS_LOOP_SPEED_MS)
    }

    /// Build a ready-to-run engine: validated config, history settings, and either the
    /// explicit bodies or a random roster.
    pub fn build_simulation(&self) -> Result<Simulation> {
        if self.loop_speed_ms() == 0 {
            return Err(Error::InvalidConfig("physics_loop_speed_ms must be > 0".to_string()));
        }
        let mut sim = Simulation::with_config(self.simulation.to_sim_config(), self.simulation.seed)?;
        sim.set_history_settings(self.particles.history());

        let generation = self.particles.generation();
        if self.particles.bodies.is_empty() {
            sim.regenerate(generation.count, generation.average_mass)?;
        } else {
            let particles = self
                .particles
                .bodies
                .iter()
                .map(BodyConfig::to_particle)
                .collect::<Result<Vec<_>>>()?;
            log::info!("loaded {} bodies from init config", particles.len());
            sim.set_particles(particles);
            sim.set_generation(generation);
        }
        Ok(sim)
    }
}
