//! Background polling loop.
//!
//! [`Poller`] runs a step closure on a named thread until asked to stop.
//! State machine: `Idle -> Running -> Stopping -> Idle`.
//!
//! - [`Poller::run`] spawns the thread (no-op when already running).
//! - [`Poller::stop`] raises the stop flag and joins the thread. On an idle
//!   poller it returns immediately.
//! - A step returning [`SpaceMouseError::TransportGone`] ends the loop
//!   normally; the poller goes back to `Idle` on its own and does not retry.
//! - Any other step error also ends the loop; it is logged and handed back by
//!   the next `stop()`, or by the next `run()` if that comes first (in which
//!   case no new thread is started).
//!
//! Cancellation is cooperative: the flag is checked between steps, so the
//! worst-case stop latency is one step (one read timeout).

use crate::error::{Result, SpaceMouseError};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Running,
    Stopping,
}

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const STOPPING: u8 = 2;

#[derive(Default)]
pub struct Poller {
    stop: Arc<AtomicBool>,
    state: Arc<AtomicU8>,
    handle: Option<JoinHandle<Result<()>>>,
}

impl Poller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PollerState {
        match self.state.load(Ordering::Acquire) {
            RUNNING => PollerState::Running,
            STOPPING => PollerState::Stopping,
            _ => PollerState::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == PollerState::Running
    }

    /// Start calling `step` in a loop on a thread named `name`.
    pub fn run<F>(&mut self, name: &str, mut step: F) -> Result<()>
    where
        F: FnMut() -> Result<()> + Send + 'static,
    {
        if self.is_running() {
            return Ok(());
        }
        // A thread that already exited on its own still owes its result.
        if let Some(finished) = self.handle.take() {
            join(finished)?;
        }

        self.stop.store(false, Ordering::Release);
        self.state.store(RUNNING, Ordering::Release);

        let stop = Arc::clone(&self.stop);
        let state = Arc::clone(&self.state);
        let thread_name = name.to_string();
        let spawned = thread::Builder::new()
            .name(format!("poller-{name}"))
            .spawn(move || {
                let outcome = poll_loop(&stop, &mut step);
                match &outcome {
                    Ok(()) => info!(device = %thread_name, "poller exited"),
                    Err(e) => error!(device = %thread_name, error = %e, "poller exited with error"),
                }
                state.store(IDLE, Ordering::Release);
                outcome
            });

        match spawned {
            Ok(handle) => {
                info!(device = %name, "poller started");
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.state.store(IDLE, Ordering::Release);
                Err(SpaceMouseError::Transport(format!(
                    "failed to spawn poller thread: {e}"
                )))
            }
        }
    }

    /// Signal the loop to stop and wait for the thread to exit.
    pub fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        if self.state.load(Ordering::Acquire) == RUNNING {
            self.state.store(STOPPING, Ordering::Release);
        }
        self.stop.store(true, Ordering::Release);
        let outcome = join(handle);
        self.state.store(IDLE, Ordering::Release);
        outcome
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!(error = %e, "poller error during drop");
        }
    }
}

fn poll_loop<F>(stop: &AtomicBool, step: &mut F) -> Result<()>
where
    F: FnMut() -> Result<()>,
{
    while !stop.load(Ordering::Acquire) {
        match step() {
            Ok(()) => {}
            Err(SpaceMouseError::TransportGone(reason)) => {
                info!(%reason, "transport gone, poller exiting");
                return Ok(());
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn join(handle: JoinHandle<Result<()>>) -> Result<()> {
    handle.join().map_err(|_| SpaceMouseError::PollerPanicked)?
}
