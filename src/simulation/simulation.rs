// simulation/simulation.rs
// Contains the Simulation struct and main methods (new, step, iterate, regenerate, reset)

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::collision::{self, MergeEvent};
use super::{boundary, forces, spawn};
use crate::config::{self, GenerationSettings, HistorySettings, SimConfig};
use crate::error::Result;
use crate::particle::Particle;

/// The particle engine: owns the roster and advances it one tick at a time.
///
/// Ticks are not reentrant. Callers serialize `step` with every setter; the app loop
/// does this by owning the `Simulation` on a single thread.
pub struct Simulation {
    pub frame: usize,
    config: SimConfig,
    particles: Vec<Particle>,
    initial_particles: Vec<Particle>,
    generation: GenerationSettings,
    history: HistorySettings,
    rng: StdRng,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation {
    /// Default configuration, empty roster, OS-seeded generator.
    pub fn new() -> Self {
        Self {
            frame: 0,
            config: SimConfig::default(),
            particles: Vec::new(),
            initial_particles: Vec::new(),
            generation: GenerationSettings::default(),
            history: HistorySettings::default(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Validated configuration and an optional seed for reproducible generation.
    pub fn with_config(config: SimConfig, seed: Option<u64>) -> Result<Self> {
        config.validate()?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            config,
            rng,
            ..Self::new()
        })
    }

    /// Advance one tick. Returns a summary when at least one merge happened.
    pub fn step(&mut self) -> Option<MergeEvent> {
        forces::accelerate(&mut self.particles, &self.config);
        self.iterate();
        // Stable, so equal masses keep their relative order between ticks.
        self.particles.sort_by(|a, b| b.mass().total_cmp(&a.mass()));
        let event = collision::aggregate_merges(&mut self.particles);
        if self.config.wall_bounce {
            boundary::reflect_walls(&mut self.particles, self.config.environment_size);
        }
        self.frame += 1;
        event
    }

    fn iterate(&mut self) {
        for p in &mut self.particles {
            p.update_position();
        }
    }

    /// Mass-descending after a tick without merges. Merge results are appended at the end
    /// and removals reorder the rest.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn generation(&self) -> GenerationSettings {
        self.generation
    }

    pub fn history_settings(&self) -> HistorySettings {
        self.history
    }

    pub fn total_mass(&self) -> f64 {
        self.particles.iter().map(Particle::mass).sum()
    }

    pub fn set_config(&mut self, config: SimConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn set_gravity_strength(&mut self, value: f64) -> Result<()> {
        config::check_finite("gravity_strength", value)?;
        self.config.gravity_strength = value;
        Ok(())
    }

    pub fn set_close_charge_strength(&mut self, value: f64) -> Result<()> {
        config::check_finite("close_charge_strength", value)?;
        self.config.close_charge_strength = value;
        Ok(())
    }

    pub fn set_far_charge_strength(&mut self, value: f64) -> Result<()> {
        config::check_finite("far_charge_strength", value)?;
        self.config.far_charge_strength = value;
        Ok(())
    }

    pub fn set_environment_size(&mut self, size: i32) -> Result<()> {
        config::check_environment_size(size)?;
        self.config.environment_size = size;
        Ok(())
    }

    pub fn set_allow_merge(&mut self, allow: bool) {
        self.config.allow_merge = allow;
    }

    pub fn set_wall_bounce(&mut self, bounce: bool) {
        self.config.wall_bounce = bounce;
    }

    /// Takes effect for every current particle and every particle created later.
    pub fn set_history_trail(&mut self, trail: bool) {
        self.history.trail = trail;
        for p in &mut self.particles {
            p.set_track_history(trail);
        }
    }

    /// Shrinking truncates existing trails immediately.
    pub fn set_history_length(&mut self, length: usize) {
        self.history.length = length;
        for p in &mut self.particles {
            p.set_history_size(length);
        }
    }

    pub fn set_history_settings(&mut self, settings: HistorySettings) {
        self.set_history_trail(settings.trail);
        self.set_history_length(settings.length);
    }

    /// Replace the roster with `count` freshly sampled particles around `average_mass`.
    /// The roster is untouched on error.
    pub fn regenerate(&mut self, count: usize, average_mass: f64) -> Result<()> {
        let particles =
            spawn::random_particles(&mut self.rng, count, average_mass, self.config.environment_size)?;
        self.generation = GenerationSettings { count, average_mass };
        self.set_particles(particles);
        Ok(())
    }

    /// Install `particles` as both the live roster and the reset target.
    pub fn set_particles(&mut self, particles: Vec<Particle>) {
        self.initial_particles = particles.iter().map(Particle::pristine_copy).collect();
        self.particles = particles;
        self.apply_history_settings();
        self.frame = 0;
    }

    /// Restore the roster saved at the last generation or load. Trails start empty.
    pub fn reset_to_initial(&mut self) {
        self.particles = self.initial_particles.iter().map(Particle::pristine_copy).collect();
        self.apply_history_settings();
        self.frame = 0;
        log::info!("reset to {} initial particles", self.particles.len());
    }

    /// Record the generation parameters without resampling (used by snapshot restore).
    pub(crate) fn set_generation(&mut self, generation: GenerationSettings) {
        self.generation = generation;
    }

    fn apply_history_settings(&mut self) {
        let HistorySettings { trail, length } = self.history;
        for p in &mut self.particles {
            p.clear_history();
            p.set_track_history(trail);
            p.set_history_size(length);
        }
    }
}
