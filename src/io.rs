use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use serde::{Deserialize, Serialize};
use std::io::{BufWriter, Cursor, Read, Write};
use std::path::Path;
use ultraviolet::DVec2;

use crate::config::{self, GenerationSettings, HistorySettings, SimConfig};
use crate::error::{Error, Result};
use crate::particle::Particle;
use crate::simulation::Simulation;

/// Persisted particle: fundamental properties only. Radius, colors, trail and
/// collision bookkeeping are rebuilt on load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleState {
    pub mass: f64,
    pub close_charge: f64,
    pub far_charge: f64,
    pub position: [f64; 2],
    pub velocity: [f64; 2],
}

impl ParticleState {
    fn from_particle(p: &Particle) -> Self {
        Self {
            mass: p.mass(),
            close_charge: p.close_charge(),
            far_charge: p.far_charge(),
            position: [p.pos.x, p.pos.y],
            velocity: [p.vel.x, p.vel.y],
        }
    }

    fn validate(&self, index: usize) -> Result<()> {
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(Error::MalformedSnapshot(format!(
                "particle {index}: mass must be finite and > 0, got {}",
                self.mass
            )));
        }
        let values = [self.close_charge, self.far_charge]
            .into_iter()
            .chain(self.position)
            .chain(self.velocity);
        for value in values {
            if !value.is_finite() {
                return Err(Error::MalformedSnapshot(format!(
                    "particle {index}: non-finite value {value}"
                )));
            }
        }
        Ok(())
    }

    fn into_particle(self) -> Particle {
        let [x, y] = self.position;
        let [vx, vy] = self.velocity;
        Particle::new(self.mass, self.close_charge, self.far_charge, DVec2::new(x, y))
            .with_velocity(DVec2::new(vx, vy))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    #[serde(flatten)]
    pub config: SimConfig,
    pub particles: Vec<ParticleState>,
}

/// Whole-program snapshot: engine plus the control settings that sit around it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub physics_engine: EngineState,
    #[serde(default = "default_number_of_particles")]
    pub number_of_particles: usize,
    #[serde(default = "default_average_mass")]
    pub average_mass: f64,
    #[serde(default = "default_history_trail")]
    pub history_trail: bool,
    #[serde(default = "default_history_length")]
    pub history_length: usize,
    #[serde(default = "default_physics_loop_speed")]
    pub physics_loop_speed: u64,
}

fn default_number_of_particles() -> usize {
    config::DEFAULT_PARTICLE_COUNT
}

fn default_average_mass() -> f64 {
    config::DEFAULT_AVERAGE_MASS
}

fn default_history_trail() -> bool {
    config::HISTORY_TRAIL
}

fn default_history_length() -> usize {
    config::HISTORY_LENGTH
}

fn default_physics_loop_speed() -> u64 {
    config::PHYSICS_LOOP_SPEED_MS
}

impl SimulationState {
    pub fn from_simulation(sim: &Simulation, physics_loop_speed: u64) -> Self {
        let generation = sim.generation();
        let history = sim.history_settings();
        Self {
            physics_engine: EngineState {
                config: *sim.config(),
                particles: sim.particles().iter().map(ParticleState::from_particle).collect(),
            },
            number_of_particles: generation.count,
            average_mass: generation.average_mass,
            history_trail: history.trail,
            history_length: history.length,
            physics_loop_speed,
        }
    }

    /// Check every field first; `sim` is only touched once the whole snapshot is known good.
    pub fn apply_to(self, sim: &mut Simulation) -> Result<()> {
        let SimulationState {
            physics_engine: EngineState { config, particles },
            number_of_particles,
            average_mass,
            history_trail,
            history_length,
            ..
        } = self;

        config
            .validate()
            .map_err(|e| Error::MalformedSnapshot(e.to_string()))?;
        for (i, p) in particles.iter().enumerate() {
            p.validate(i)?;
        }

        sim.set_config(config)?;
        sim.set_generation(GenerationSettings {
            count: number_of_particles,
            average_mass,
        });
        sim.set_history_settings(HistorySettings {
            trail: history_trail,
            length: history_length,
        });
        sim.set_particles(particles.into_iter().map(ParticleState::into_particle).collect());
        log::info!("restored {} particles from snapshot", sim.particles().len());
        Ok(())
    }
}

/// Write `sim` as pretty JSON (gzip-compressed when `path` ends in `.gz`).
pub fn save_state<P: AsRef<Path>>(path: P, sim: &Simulation, physics_loop_speed: u64) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let state = SimulationState::from_simulation(sim, physics_loop_speed);
    let use_gzip = path.extension().is_some_and(|e| e == "gz");

    // Write to a temporary file first so an interrupted save never truncates the target
    let tmp_path = path.with_extension({
        let mut os = path.extension().map(|e| e.to_os_string()).unwrap_or_default();
        os.push(".tmp");
        os
    });
    {
        let file = std::fs::File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        if use_gzip {
            let mut encoder = GzEncoder::new(writer, Compression::fast());
            serde_json::to_writer_pretty(&mut encoder, &state)?;
            writer = encoder.finish()?;
        } else {
            serde_json::to_writer_pretty(&mut writer, &state)?;
        }
        writer.flush()?;
    }
    std::fs::rename(&tmp_path, path)?;
    log::info!("saved {} particles to {}", state.physics_engine.particles.len(), path.display());
    Ok(())
}

pub fn load_state<P: AsRef<Path>>(path: P) -> Result<SimulationState> {
    let data = std::fs::read(path.as_ref())?;
    let state = match maybe_decompress_gzip(&data)? {
        Some(decoded) => serde_json::from_slice(&decoded)?,
        None => serde_json::from_slice(&data)?,
    };
    Ok(state)
}

fn maybe_decompress_gzip(data: &[u8]) -> std::io::Result<Option<Vec<u8>>> {
    if data.len() < 2 || data[0] != 0x1f || data[1] != 0x8b {
        return Ok(None);
    }

    let mut decoder = GzDecoder::new(Cursor::new(data));
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded)?;
    Ok(Some(decoded))
}
