//! The single dispatcher between the command queue and the device.
//!
//! `CommandConsumer` owns the hardware link and the calibration state.
//! It alternates between two phases for its whole lifetime:
//!
//! 1. **Polling** (`Unknown`): send `get_status` every
//!    `calibration_poll` until the device reports calibration done.
//!    The queue is not touched; commands accumulate.
//! 2. **Draining** (`Calibrated`): pop and dispatch one command at a
//!    time. An empty queue is re-checked every `idle_poll`. Any
//!    dispatch that is not acknowledged demotes the state back to
//!    `Unknown`; the failed command is not requeued.
//!
//! The extent published to ingress is separate from the dispatch
//! phase: a demotion keeps translating against the last known canvas,
//! and only a status report of "not calibrated" clears it.
//!
//! Link calls block, so they run on the blocking pool and are awaited
//! one at a time. The loop exits when the shutdown signal is seen and
//! leaves whatever is still queued.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::error::BridgeError;
use crate::link::HardwareLink;
use crate::queue::CommandQueue;
use crate::shutdown::Shutdown;
use crate::state::{CalibrationState, DeviceStatus};

// ── ConsumerConfig ───────────────────────────────────────────────

/// Loop timing for [`CommandConsumer`].
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Delay between `get_status` polls while uncalibrated.
    pub calibration_poll: Duration,
    /// Delay before re-checking an empty queue.
    pub idle_poll: Duration,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            calibration_poll: Duration::from_secs(5),
            idle_poll: Duration::from_millis(100),
        }
    }
}

// ── CommandConsumer ──────────────────────────────────────────────

pub struct CommandConsumer<L> {
    link: Arc<L>,
    queue: CommandQueue,
    config: ConsumerConfig,
    state: CalibrationState,
    state_tx: watch::Sender<CalibrationState>,
}

impl<L: HardwareLink> CommandConsumer<L> {
    pub fn new(link: L, queue: CommandQueue, config: ConsumerConfig) -> Self {
        let (state_tx, _) = watch::channel(CalibrationState::Unknown);
        Self {
            link: Arc::new(link),
            queue,
            config,
            state: CalibrationState::Unknown,
            state_tx,
        }
    }

    /// Read-only view of the canvas used for coordinate translation.
    ///
    /// Survives dispatch failures; cleared when the device reports it
    /// is not calibrated.
    pub fn calibration(&self) -> watch::Receiver<CalibrationState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    /// Run the poll/drain loop until `shutdown` is triggered.
    pub async fn run(mut self, shutdown: Shutdown) {
        info!("command consumer started");

        while !shutdown.is_triggered() {
            if !self.state.is_calibrated() {
                info!("checking whether the plotter is calibrated");
                match self.poll_status().await {
                    Ok(true) => continue,
                    Ok(false) => {}
                    Err(e) => warn!("status poll failed: {e}"),
                }
                shutdown.sleep(self.config.calibration_poll).await;
                continue;
            }

            match self.queue.pop() {
                Some(command) => {
                    if let Err(e) = self.dispatch(command).await {
                        warn!("error sending command to plotter: {e}");
                    }
                }
                None => {
                    shutdown.sleep(self.config.idle_poll).await;
                }
            }
        }

        info!(pending = self.queue.len(), "command consumer stopped");
    }

    /// Ask the device for its status and apply it.
    ///
    /// Returns `true` if the state is now `Calibrated`.
    pub async fn poll_status(&mut self) -> Result<bool, BridgeError> {
        let response = self.round_trip(Command::GetStatus).await?;
        let status = DeviceStatus::parse(&response)?;
        info!(
            calibration_done = status.calibration_done,
            canvas_max_x = status.canvas_max_x,
            canvas_max_y = status.canvas_max_y,
            "plotter status"
        );

        if self.state.apply_status(&status) {
            info!("plotter calibrated, canvas is now {}", self.state);
        }
        let canvas = match status.extent() {
            Some(_) => self.state,
            None => CalibrationState::Unknown,
        };
        self.publish(canvas);
        Ok(self.state.is_calibrated())
    }

    /// Send one command. Any failure demotes calibration to `Unknown`.
    pub async fn dispatch(&mut self, command: Command) -> Result<(), BridgeError> {
        debug!(%command, "sending command to plotter");
        let outcome = match self.round_trip(command).await {
            Ok(response) if command.is_acknowledged_by(&response) => Ok(()),
            Ok(response) => Err(BridgeError::DeviceRejected {
                command: command.to_string(),
                response,
            }),
            Err(e) => Err(e),
        };

        if let Err(e) = &outcome {
            if e.demotes_calibration() && self.state.demote() {
                info!("calibration reset; re-checking plotter status");
            }
        }
        outcome
    }

    fn publish(&self, canvas: CalibrationState) {
        self.state_tx.send_if_modified(|current| {
            let changed = *current != canvas;
            *current = canvas;
            changed
        });
    }

    async fn round_trip(&self, command: Command) -> Result<String, BridgeError> {
        let link = Arc::clone(&self.link);
        let wire = command.to_string();
        let response = tokio::task::spawn_blocking(move || link.send(&wire)).await??;
        Ok(response)
    }
}
