//! Inbound drawing events.
//!
//! - [`DrawEvent`]: the JSON messages clients send.
//! - [`Session`]: per-connection pen state and event → command translation.
//! - [`Ingress`]: serves one websocket connection, enqueueing commands
//!   and acknowledging every event.

mod connection;
mod event;
mod session;

pub use connection::{ACK_REPLY, Ingress};
pub use event::DrawEvent;
pub use session::Session;
