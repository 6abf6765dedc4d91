//! # plotbot-core
//!
//! Coordination layer between drawing clients and a pen plotter.
//!
//! This crate contains:
//! - **Mapper**: `CanvasExtent` and the logical → device coordinate conversion
//! - **Command**: the device command vocabulary (`get_status`, `pen_up`, ...)
//! - **Queue**: `CommandQueue`, the shared FIFO between ingress and consumer
//! - **State**: the calibration state machine and device status payload
//! - **Link**: `HardwareLink`, one request/response round trip per command
//! - **Consumer**: `CommandConsumer`, the single dispatcher to the device
//! - **Ingress**: drawing event decoding and per-connection pen state
//! - **Shutdown**: cooperative shutdown signal and task coordinator
//! - **Error**: `BridgeError` / `LinkError` — typed, `thiserror`-based errors

pub mod command;
pub mod consumer;
pub mod error;
pub mod ingress;
pub mod link;
pub mod mapper;
pub mod queue;
pub mod shutdown;
pub mod state;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use command::Command;
pub use consumer::{CommandConsumer, ConsumerConfig};
pub use error::{BridgeError, LinkError};
pub use ingress::{DrawEvent, Ingress, Session};
pub use link::{HardwareLink, LinkConfig, TcpLink};
pub use mapper::{CanvasExtent, LOGICAL_HEIGHT, LOGICAL_WIDTH};
pub use queue::CommandQueue;
pub use shutdown::{Coordinator, Shutdown};
pub use state::{CalibrationState, DeviceStatus};
