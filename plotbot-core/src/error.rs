//! Domain-specific error types for the plotter bridge.
//!
//! Nothing here is fatal to the process: every variant is logged by
//! the component that observes it and the pipeline carries on.

use thiserror::Error;

/// Failure of a single hardware round trip.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The TCP connection to the device could not be established.
    #[error("cannot connect to device at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the command bytes failed.
    #[error("write to device at {addr} failed: {source}")]
    Write {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading the response failed or timed out.
    #[error("read from device at {addr} failed: {source}")]
    Read {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The device answered with bytes that are not UTF-8.
    #[error("device response is not valid utf-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// The canonical error type for the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    // ── Device ───────────────────────────────────────────────────
    /// The hardware link could not complete a round trip.
    #[error("link failure: {0}")]
    Link(#[from] LinkError),

    /// The round trip succeeded but the device did not acknowledge.
    #[error("device rejected `{command}`: {response:?}")]
    DeviceRejected { command: String, response: String },

    /// The `get_status` payload could not be decoded.
    #[error("malformed status response: {0}")]
    MalformedStatus(#[source] serde_json::Error),

    /// The blocking worker running a link call did not finish.
    #[error("link worker failed: {0}")]
    Task(String),

    // ── Ingress ──────────────────────────────────────────────────
    /// An inbound message failed to parse or lacked required fields.
    #[error("malformed event: {0}")]
    MalformedEvent(#[source] serde_json::Error),

    /// A coordinate-bearing event arrived before the canvas extent was known.
    #[error("device is not calibrated")]
    Uncalibrated,

    /// The websocket layer reported an error.
    #[error("transport error: {0}")]
    Transport(String),

    // ── Process ──────────────────────────────────────────────────
    /// The TCP/IO layer reported an error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<async_tungstenite::tungstenite::Error> for BridgeError {
    fn from(e: async_tungstenite::tungstenite::Error) -> Self {
        BridgeError::Transport(e.to_string())
    }
}

impl From<tokio::task::JoinError> for BridgeError {
    fn from(e: tokio::task::JoinError) -> Self {
        BridgeError::Task(e.to_string())
    }
}

impl BridgeError {
    /// Errors after which the device must be asked for its status again.
    pub fn demotes_calibration(&self) -> bool {
        matches!(
            self,
            BridgeError::Link(_) | BridgeError::DeviceRejected { .. } | BridgeError::Task(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let e = BridgeError::DeviceRejected {
            command: "pen_up".into(),
            response: "error".into(),
        };
        assert!(e.to_string().contains("pen_up"));
        assert!(e.to_string().contains("error"));

        let e = LinkError::Connect {
            addr: "127.0.0.1:1337".into(),
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        };
        assert!(e.to_string().contains("127.0.0.1:1337"));
    }

    #[test]
    fn from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broke");
        let e: BridgeError = io_err.into();
        assert!(matches!(e, BridgeError::Io(_)));
    }

    #[test]
    fn device_errors_demote() {
        let rejected = BridgeError::DeviceRejected {
            command: "pen_down".into(),
            response: String::new(),
        };
        assert!(rejected.demotes_calibration());
        assert!(!BridgeError::Uncalibrated.demotes_calibration());
    }
}
