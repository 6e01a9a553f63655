use crate::commands::SimCommand;
use crate::error::{Error, Result};
use crate::frame::{FrameView, SharedFrame};
use crate::init_config::{InitConfig, DEFAULT_INIT_CONFIG};
use crate::io::load_state;
use crossbeam::channel::unbounded;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod command_loop;
pub mod simulation_loop;

use command_loop::LoopState;
use simulation_loop::LoopEvent;

/// Headless run parameters, usually parsed from the command line.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    pub config_path: Option<PathBuf>,
    pub load_path: Option<PathBuf>,
    /// Stop after this many ticks. Runs until the loop exits otherwise.
    pub ticks: Option<usize>,
    /// Snapshot written once the tick limit is reached.
    pub save_path: Option<PathBuf>,
}

pub fn run(options: RunOptions) -> Result<()> {
    let init = match &options.config_path {
        Some(path) => InitConfig::load_from_file(path)?,
        None if Path::new(DEFAULT_INIT_CONFIG).exists() => InitConfig::load_default()?,
        None => InitConfig::default(),
    };
    let mut simulation = init.build_simulation()?;
    let mut state = LoopState {
        loop_speed_ms: init.loop_speed_ms(),
        ..LoopState::default()
    };
    if let Some(path) = &options.load_path {
        let snapshot = load_state(path)?;
        state.loop_speed_ms = snapshot.physics_loop_speed.max(1);
        snapshot.apply_to(&mut simulation)?;
    }
    log::info!(
        "starting with {} particles, loop speed {} ms",
        simulation.particles().len(),
        state.loop_speed_ms
    );

    let shared: SharedFrame = Arc::new(Mutex::new(FrameView::capture(&simulation)));
    let (cmd_tx, cmd_rx) = unbounded();
    let (event_tx, event_rx) = unbounded();

    let loop_frame = shared.clone();
    let handle = std::thread::Builder::new()
        .name("simulation".to_string())
        .spawn(move || simulation_loop::run_simulation_loop(cmd_rx, event_tx, simulation, state, loop_frame))?;

    cmd_tx.send(SimCommand::PauseResume).map_err(|_| Error::Disconnected)?;

    let mut finishing = false;
    let mut failure: Option<String> = None;
    for event in event_rx.iter() {
        match event {
            LoopEvent::Ticked { frame, merge } => {
                if let Some(merge) = merge {
                    log::info!("{}", merge.status_text());
                }
                if !finishing && options.ticks.is_some_and(|limit| frame >= limit) {
                    finishing = true;
                    if let Some(path) = &options.save_path {
                        cmd_tx
                            .send(SimCommand::SaveState { path: path.clone() })
                            .map_err(|_| Error::Disconnected)?;
                    }
                    cmd_tx.send(SimCommand::Quit).map_err(|_| Error::Disconnected)?;
                }
            }
            LoopEvent::Replaced { frame } => log::debug!("roster replaced at frame {}", frame),
            LoopEvent::Failed(msg) => {
                log::warn!("{}", msg);
                if finishing {
                    failure = Some(msg);
                }
            }
            LoopEvent::Stopped => break,
        }
    }
    handle.join().map_err(|_| Error::Disconnected)?;

    let frame = shared.lock();
    log::info!("finished at frame {} with {} particles", frame.frame, frame.particles.len());
    match failure {
        Some(msg) => Err(Error::CommandFailed(msg)),
        None => Ok(()),
    }
}
