use crate::commands::SimCommand;
use crate::config::LOOP_SPEED_BACKOFF;
use crate::frame::{FrameView, SharedFrame};
use crate::simulation::{MergeEvent, Simulation};
use crossbeam::channel::{tick, Receiver, Sender};
use std::time::{Duration, Instant};

use super::command_loop::{self, Handled, LoopState};

/// Reported by the simulation thread to whoever drives it.
#[derive(Clone, Debug, PartialEq)]
pub enum LoopEvent {
    Ticked { frame: usize, merge: Option<MergeEvent> },
    /// The roster was regenerated, reset or loaded.
    Replaced { frame: usize },
    /// A command was rejected; the simulation is unchanged.
    Failed(String),
    Stopped,
}

pub fn render(simulation: &Simulation, shared: &SharedFrame) {
    FrameView::capture(simulation).publish(shared);
}

/// Interval that a tick of `elapsed` forces on a loop currently running at `current_ms`.
pub fn adapted_loop_speed(current_ms: u64, elapsed: Duration) -> u64 {
    let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
    if elapsed_ms > current_ms as f64 {
        (elapsed_ms * LOOP_SPEED_BACKOFF).ceil() as u64
    } else {
        current_ms
    }
}

/// Own `simulation` until `Quit` arrives or the command channel closes.
///
/// While paused the loop blocks on commands. While running, commands and ticks are
/// multiplexed; a tick that fires while the previous one is still running is dropped.
pub fn run_simulation_loop(
    rx: Receiver<SimCommand>,
    events: Sender<LoopEvent>,
    mut simulation: Simulation,
    mut state: LoopState,
    shared: SharedFrame,
) {
    let mut interval_ms = state.loop_speed_ms;
    let mut ticker = tick(Duration::from_millis(interval_ms));
    render(&simulation, &shared);

    while !state.quit {
        if state.paused {
            match rx.recv() {
                Ok(cmd) => apply(cmd, &mut simulation, &mut state, &events, &shared),
                Err(_) => break,
            }
            continue;
        }

        if state.loop_speed_ms != interval_ms {
            interval_ms = state.loop_speed_ms;
            ticker = tick(Duration::from_millis(interval_ms));
        }

        crossbeam::select! {
            recv(rx) -> msg => match msg {
                Ok(cmd) => apply(cmd, &mut simulation, &mut state, &events, &shared),
                Err(_) => break,
            },
            recv(ticker) -> _ => {
                let started = Instant::now();
                let merge = simulation.step();
                let elapsed = started.elapsed();
                render(&simulation, &shared);
                let _ = events.send(LoopEvent::Ticked { frame: simulation.frame, merge });

                let adapted = adapted_loop_speed(state.loop_speed_ms, elapsed);
                if adapted != state.loop_speed_ms {
                    log::warn!(
                        "tick took {:?}, slowing loop from {} ms to {} ms",
                        elapsed,
                        state.loop_speed_ms,
                        adapted
                    );
                    state.loop_speed_ms = adapted;
                }
            },
        }
    }

    log::info!("simulation loop stopped at frame {}", simulation.frame);
    let _ = events.send(LoopEvent::Stopped);
}

fn apply(
    cmd: SimCommand,
    simulation: &mut Simulation,
    state: &mut LoopState,
    events: &Sender<LoopEvent>,
    shared: &SharedFrame,
) {
    let event = match command_loop::handle_command(cmd, simulation, state) {
        Ok(Handled::Unchanged) => return,
        Ok(Handled::Replaced) => LoopEvent::Replaced { frame: simulation.frame },
        Ok(Handled::Stepped(merge)) => LoopEvent::Ticked { frame: simulation.frame, merge },
        Err(e) => {
            log::warn!("command rejected: {}", e);
            let _ = events.send(LoopEvent::Failed(e.to_string()));
            return;
        }
    };
    render(simulation, shared);
    let _ = events.send(event);
}
