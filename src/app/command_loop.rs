use crate::commands::SimCommand;
use crate::config::{self, check_positive};
use crate::error::{Error, Result};
use crate::io::{load_state, save_state};
use crate::simulation::{MergeEvent, Simulation};

/// Loop-owned settings that live outside the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopState {
    pub paused: bool,
    pub loop_speed_ms: u64,
    pub quit: bool,
}

impl Default for LoopState {
    fn default() -> Self {
        Self {
            paused: true,
            loop_speed_ms: config::PHYSICS_LOOP_SPEED_MS,
            quit: false,
        }
    }
}

/// What a command did, so the loop knows whether to republish the frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Handled {
    /// Settings only; the roster is as it was.
    Unchanged,
    /// The roster was replaced (regenerate, reset, load).
    Replaced,
    /// One tick ran.
    Stepped(Option<MergeEvent>),
}

/// Apply `cmd`. On `Err` neither the simulation nor `state` changed.
pub fn handle_command(cmd: SimCommand, simulation: &mut Simulation, state: &mut LoopState) -> Result<Handled> {
    log::debug!("command: {:?}", cmd);
    match cmd {
        SimCommand::SetGravityStrength(v) => simulation.set_gravity_strength(v)?,
        SimCommand::SetCloseChargeStrength(v) => simulation.set_close_charge_strength(v)?,
        SimCommand::SetFarChargeStrength(v) => simulation.set_far_charge_strength(v)?,
        SimCommand::SetAllowMerge(v) => simulation.set_allow_merge(v),
        SimCommand::SetWallBounce(v) => simulation.set_wall_bounce(v),
        SimCommand::SetHistoryTrail(v) => simulation.set_history_trail(v),
        SimCommand::SetHistoryLength(v) => simulation.set_history_length(v),
        SimCommand::SetEnvironmentSize(size) => {
            simulation.set_environment_size(size)?;
            return regenerate_if_paused(simulation, state);
        }
        SimCommand::SetParticleCount(count) => {
            let mut generation = simulation.generation();
            generation.count = count;
            simulation.set_generation(generation);
            return regenerate_if_paused(simulation, state);
        }
        SimCommand::SetAverageMass(average_mass) => {
            check_positive("average_mass", average_mass)?;
            let mut generation = simulation.generation();
            generation.average_mass = average_mass;
            simulation.set_generation(generation);
            return regenerate_if_paused(simulation, state);
        }
        SimCommand::SetLoopSpeed(ms) => {
            if ms == 0 {
                return Err(Error::InvalidConfig("loop speed must be > 0 ms".to_string()));
            }
            state.loop_speed_ms = ms;
        }
        SimCommand::Regenerate { count, average_mass } => {
            simulation.regenerate(count, average_mass)?;
            return Ok(Handled::Replaced);
        }
        SimCommand::ResetToInitial => {
            simulation.reset_to_initial();
            return Ok(Handled::Replaced);
        }
        SimCommand::SaveState { path } => save_state(&path, simulation, state.loop_speed_ms)?,
        SimCommand::LoadState { path } => {
            let snapshot = load_state(&path)?;
            let loop_speed = snapshot.physics_loop_speed;
            snapshot.apply_to(simulation)?;
            if loop_speed > 0 {
                state.loop_speed_ms = loop_speed;
            }
            log::info!("loaded {}", path.display());
            return Ok(Handled::Replaced);
        }
        SimCommand::PauseResume => {
            state.paused = !state.paused;
            log::info!("{}", if state.paused { "paused" } else { "running" });
        }
        SimCommand::StepOnce => {
            if state.paused {
                return Ok(Handled::Stepped(simulation.step()));
            }
        }
        SimCommand::Quit => state.quit = true,
    }
    Ok(Handled::Unchanged)
}

/// Mirrors the control panel: size and generation edits take effect immediately
/// while paused and at the next explicit regenerate while running.
fn regenerate_if_paused(simulation: &mut Simulation, state: &LoopState) -> Result<Handled> {
    if !state.paused {
        return Ok(Handled::Unchanged);
    }
    let generation = simulation.generation();
    simulation.regenerate(generation.count, generation.average_mass)?;
    Ok(Handled::Replaced)
}
