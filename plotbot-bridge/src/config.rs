//! Configuration for the bridge service.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use plotbot_core::{BridgeError, ConsumerConfig, LinkConfig};

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Inbound websocket listener.
    pub network: NetworkConfig,
    /// Plotter endpoint.
    pub device: DeviceConfig,
    /// Consumer loop timing.
    pub timing: TimingConfig,
    /// Command queue behaviour.
    pub queue: QueueConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address the websocket listener binds to.
    pub bind_addr: String,
    /// Websocket listener port.
    pub ws_port: u16,
}

/// Plotter connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub host: String,
    pub port: u16,
    /// Connect timeout in milliseconds (0 = OS default).
    pub connect_timeout_ms: u64,
    /// Read/write timeout in milliseconds (0 = wait forever).
    pub io_timeout_ms: u64,
    /// Maximum response size in bytes.
    pub response_buffer: usize,
}

/// Consumer loop timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Interval between `get_status` polls while uncalibrated.
    pub calibration_poll_ms: u64,
    /// Interval between checks of an empty queue.
    pub idle_poll_ms: u64,
}

/// Command queue behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Clear the whole shared queue when any client disconnects.
    pub clear_on_disconnect: bool,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".into(),
            ws_port: 8766,
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 1337,
            connect_timeout_ms: 2000,
            io_timeout_ms: 5000,
            response_buffer: plotbot_core::link::DEFAULT_RESPONSE_BUFFER,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            calibration_poll_ms: 5000,
            idle_poll_ms: 100,
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            clear_on_disconnect: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl BridgeConfig {
    /// Load configuration from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write the default configuration to a file (for bootstrapping).
    pub fn write_default(path: &Path) -> std::io::Result<()> {
        let text = toml::to_string_pretty(&Self::default()).map_err(std::io::Error::other)?;
        std::fs::write(path, text)
    }

    /// Override the websocket port and/or the device address (`host:port`).
    pub fn apply_overrides(
        &mut self,
        ws_port: Option<u16>,
        device: Option<&str>,
    ) -> Result<(), BridgeError> {
        if let Some(port) = ws_port {
            self.network.ws_port = port;
        }
        if let Some(device) = device {
            let (host, port) = device
                .rsplit_once(':')
                .ok_or_else(|| BridgeError::Config(format!("device `{device}` is not host:port")))?;
            let port = port
                .parse()
                .map_err(|_| BridgeError::Config(format!("invalid device port in `{device}`")))?;
            if host.is_empty() {
                return Err(BridgeError::Config(format!("missing device host in `{device}`")));
            }
            self.device.host = host.to_string();
            self.device.port = port;
        }
        Ok(())
    }

    /// `bind_addr:ws_port`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.network.bind_addr, self.network.ws_port)
    }

    /// Convert device settings into a `LinkConfig`.
    pub fn to_link_config(&self) -> LinkConfig {
        let millis = |ms: u64| (ms > 0).then(|| Duration::from_millis(ms));
        LinkConfig {
            host: self.device.host.clone(),
            port: self.device.port,
            connect_timeout: millis(self.device.connect_timeout_ms),
            io_timeout: millis(self.device.io_timeout_ms),
            response_buffer: self.device.response_buffer.max(1),
        }
    }

    /// Convert timing settings into a `ConsumerConfig`.
    pub fn to_consumer_config(&self) -> ConsumerConfig {
        ConsumerConfig {
            calibration_poll: Duration::from_millis(self.timing.calibration_poll_ms.max(1)),
            idle_poll: Duration::from_millis(self.timing.idle_poll_ms.max(1)),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let text = toml::to_string_pretty(&BridgeConfig::default()).unwrap();
        assert!(text.contains("ws_port"));
        assert!(text.contains("calibration_poll_ms"));
        assert!(text.contains("clear_on_disconnect"));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg: BridgeConfig = toml::from_str("[device]\nport = 4242\n").unwrap();
        assert_eq!(cfg.device.port, 4242);
        assert_eq!(cfg.device.host, "127.0.0.1");
        assert_eq!(cfg.network.ws_port, 8766);
        assert_eq!(cfg.timing.idle_poll_ms, 100);
    }

    #[test]
    fn overrides() {
        let mut cfg = BridgeConfig::default();
        cfg.apply_overrides(Some(9000), Some("plotter.local:7000")).unwrap();
        assert_eq!(cfg.network.ws_port, 9000);
        assert_eq!(cfg.device.host, "plotter.local");
        assert_eq!(cfg.device.port, 7000);

        assert!(cfg.apply_overrides(None, Some("no-port")).is_err());
        assert!(cfg.apply_overrides(None, Some(":80")).is_err());
        assert!(cfg.apply_overrides(None, Some("host:http")).is_err());
    }

    #[test]
    fn zero_timeouts_disable() {
        let mut cfg = BridgeConfig::default();
        cfg.device.io_timeout_ms = 0;
        let link = cfg.to_link_config();
        assert_eq!(link.io_timeout, None);
        assert_eq!(link.connect_timeout, Some(Duration::from_secs(2)));
        assert_eq!(link.addr(), "127.0.0.1:1337");
    }

    #[test]
    fn consumer_timing() {
        let consumer = BridgeConfig::default().to_consumer_config();
        assert_eq!(consumer.calibration_poll, Duration::from_secs(5));
        assert_eq!(consumer.idle_poll, Duration::from_millis(100));
    }

    #[test]
    fn write_default_roundtrips() {
        let path = std::env::temp_dir().join(format!("plotbot-bridge-{}.toml", std::process::id()));
        BridgeConfig::write_default(&path).unwrap();
        let cfg = BridgeConfig::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(cfg.listen_addr(), "0.0.0.0:8766");
    }
}
