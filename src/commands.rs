// commands.rs
// Messages accepted by the simulation loop between ticks

use std::path::PathBuf;

/// Every external mutation of a running simulation goes through one of these.
#[derive(Clone, Debug, PartialEq)]
pub enum SimCommand {
    SetGravityStrength(f64),
    SetCloseChargeStrength(f64),
    SetFarChargeStrength(f64),
    /// Regenerates the roster when paused.
    SetEnvironmentSize(i32),
    SetAllowMerge(bool),
    SetWallBounce(bool),
    SetHistoryTrail(bool),
    SetHistoryLength(usize),
    /// Regenerates the roster when paused.
    SetParticleCount(usize),
    /// Regenerates the roster when paused.
    SetAverageMass(f64),
    /// Requested tick interval in milliseconds.
    SetLoopSpeed(u64),
    Regenerate { count: usize, average_mass: f64 },
    ResetToInitial,
    SaveState { path: PathBuf },
    LoadState { path: PathBuf },
    PauseResume,
    /// Advance exactly one tick; ignored while running.
    StepOnce,
    Quit,
}
