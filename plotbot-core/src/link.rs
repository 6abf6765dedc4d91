//! Request/response link to the plotter.
//!
//! Each command is one short-lived TCP connection: connect, write the
//! command bytes, read a single response chunk, close. Calls block, so
//! the consumer runs them on the blocking thread pool. Retry policy
//! belongs to the caller.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::trace;

use crate::error::LinkError;

/// Default size of the single response read.
pub const DEFAULT_RESPONSE_BUFFER: usize = 1024;

/// One blocking round trip to the device.
pub trait HardwareLink: Send + Sync + 'static {
    /// Send `command` and return the device's reply text.
    fn send(&self, command: &str) -> Result<String, LinkError>;
}

// ── LinkConfig ───────────────────────────────────────────────────

/// Where the device lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub host: String,
    pub port: u16,
    /// `None` waits for the OS connect timeout.
    pub connect_timeout: Option<Duration>,
    /// Read/write timeout; `None` blocks indefinitely.
    pub io_timeout: Option<Duration>,
    /// Maximum bytes read as the response.
    pub response_buffer: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 1337,
            connect_timeout: Some(Duration::from_secs(2)),
            io_timeout: Some(Duration::from_secs(5)),
            response_buffer: DEFAULT_RESPONSE_BUFFER,
        }
    }
}

impl LinkConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// `host:port`, as used in log lines and errors.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ── TcpLink ──────────────────────────────────────────────────────

/// `HardwareLink` over a fresh TCP connection per command.
#[derive(Debug, Clone)]
pub struct TcpLink {
    config: LinkConfig,
}

impl TcpLink {
    pub fn new(config: LinkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    fn connect(&self) -> Result<TcpStream, LinkError> {
        let addr = self.config.addr();
        let connect_err = |source| LinkError::Connect {
            addr: addr.clone(),
            source,
        };

        let candidates: Vec<SocketAddr> = (self.config.host.as_str(), self.config.port)
            .to_socket_addrs()
            .map_err(connect_err)?
            .collect();

        let mut last_err = std::io::Error::new(
            std::io::ErrorKind::AddrNotAvailable,
            "host resolved to no addresses",
        );
        for candidate in candidates {
            let attempt = match self.config.connect_timeout {
                Some(timeout) if !timeout.is_zero() => {
                    TcpStream::connect_timeout(&candidate, timeout)
                }
                _ => TcpStream::connect(candidate),
            };
            match attempt {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = e,
            }
        }
        Err(connect_err(last_err))
    }
}

impl HardwareLink for TcpLink {
    fn send(&self, command: &str) -> Result<String, LinkError> {
        let addr = self.config.addr();
        let mut stream = self.connect()?;

        let io_timeout = self.config.io_timeout.filter(|t| !t.is_zero());
        stream
            .set_read_timeout(io_timeout)
            .and_then(|_| stream.set_write_timeout(io_timeout))
            .map_err(|source| LinkError::Connect {
                addr: addr.clone(),
                source,
            })?;

        stream
            .write_all(command.as_bytes())
            .map_err(|source| LinkError::Write {
                addr: addr.clone(),
                source,
            })?;

        let mut buf = vec![0u8; self.config.response_buffer.max(1)];
        let n = stream
            .read(&mut buf)
            .map_err(|source| LinkError::Read { addr, source })?;
        buf.truncate(n);

        let response = String::from_utf8(buf)?;
        trace!(command, response = %response, "device round trip");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use tokio_test::{assert_err, assert_ok};

    /// One-shot fake device: accepts a connection, records the request,
    /// replies with `reply`.
    fn fake_device(reply: &'static [u8]) -> (LinkConfig, std::thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 1024];
            let n = stream.read(&mut buf).unwrap();
            stream.write_all(reply).unwrap();
            String::from_utf8_lossy(&buf[..n]).into_owned()
        });
        (LinkConfig::new("127.0.0.1", port), handle)
    }

    #[test]
    fn round_trip() {
        let (config, device) = fake_device(b"ok");
        let link = TcpLink::new(config);
        assert_eq!(assert_ok!(link.send("pen_up")), "ok");
        assert_eq!(device.join().unwrap(), "pen_up");
    }

    #[test]
    fn response_is_truncated_to_buffer() {
        let (mut config, device) = fake_device(b"okay then");
        config.response_buffer = 2;
        let link = TcpLink::new(config);
        assert_eq!(link.send("pen_down").unwrap(), "ok");
        device.join().unwrap();
    }

    #[test]
    fn non_utf8_response_fails() {
        let (config, device) = fake_device(&[0xff, 0xfe]);
        let err = assert_err!(TcpLink::new(config).send("get_status"));
        assert!(matches!(err, LinkError::InvalidUtf8(_)));
        device.join().unwrap();
    }

    #[test]
    fn refused_connection_is_connect_error() {
        // Bind then drop to get a port nobody listens on.
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let err = TcpLink::new(LinkConfig::new("127.0.0.1", port))
            .send("get_status")
            .unwrap_err();
        assert!(matches!(err, LinkError::Connect { .. }));
    }
}
