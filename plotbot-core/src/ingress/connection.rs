//! Websocket connection handler.

use std::net::SocketAddr;

use async_tungstenite::tungstenite::{Error as WsError, Message};
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::BridgeError;
use crate::ingress::{DrawEvent, Session};
use crate::queue::CommandQueue;
use crate::shutdown::Shutdown;
use crate::state::CalibrationState;

/// Reply sent for every processed event, whatever it produced.
pub const ACK_REPLY: &str = "ok";

/// Turns client events into queued commands.
///
/// Cheap to clone; every connection gets its own copy and its own
/// [`Session`], while the queue and calibration view are shared.
#[derive(Debug, Clone)]
pub struct Ingress {
    queue: CommandQueue,
    calibration: watch::Receiver<CalibrationState>,
    clear_on_disconnect: bool,
}

impl Ingress {
    pub fn new(queue: CommandQueue, calibration: watch::Receiver<CalibrationState>) -> Self {
        Self {
            queue,
            calibration,
            clear_on_disconnect: true,
        }
    }

    /// Whether a closing connection empties the shared queue (default `true`).
    ///
    /// The queue does not track which connection enqueued what, so a
    /// clear also drops commands from every other open connection.
    pub fn with_clear_on_disconnect(mut self, clear: bool) -> Self {
        self.clear_on_disconnect = clear;
        self
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    /// Decode one message, translate it and enqueue the result.
    ///
    /// Returns the number of commands enqueued. A `goToXY` before
    /// calibration enqueues nothing but is not an error.
    pub fn handle_message(&self, session: &mut Session, text: &str) -> Result<usize, BridgeError> {
        let event = DrawEvent::parse(text)?;
        debug!(?event, "received event");

        let extent = self.calibration.borrow().extent();
        match session.translate(&event, extent) {
            Ok(commands) => {
                let n = commands.len();
                self.queue.push_all(commands);
                Ok(n)
            }
            Err(BridgeError::Uncalibrated) => {
                warn!(?event, "plotter not calibrated yet; event dropped");
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    /// Connection-close bookkeeping. Returns the number of commands cleared.
    pub fn disconnect(&self) -> usize {
        if self.clear_on_disconnect {
            self.queue.clear()
        } else {
            0
        }
    }

    /// Perform the websocket handshake on a freshly accepted stream, then
    /// [`serve`](Self::serve) it.
    ///
    /// A handshake still pending at shutdown is abandoned. Handshake
    /// failures are logged here; everything after is logged by `serve`.
    pub async fn serve_tcp(
        &self,
        stream: TcpStream,
        peer: SocketAddr,
        shutdown: Shutdown,
    ) -> Result<(), BridgeError> {
        let handshake = tokio::select! {
            result = async_tungstenite::tokio::accept_async(stream) => result,
            _ = shutdown.wait() => {
                debug!(%peer, "handshake abandoned for shutdown");
                return Ok(());
            }
        };

        let socket = match handshake {
            Ok(socket) => socket,
            Err(e) => {
                warn!(%peer, "websocket handshake failed: {e}");
                return Err(e.into());
            }
        };
        self.serve(socket, peer, shutdown).await
    }

    /// Serve one client until it closes, misbehaves, or shutdown is set.
    ///
    /// The queue-clear side effect runs however the connection ends.
    pub async fn serve<S>(
        &self,
        mut socket: S,
        peer: SocketAddr,
        shutdown: Shutdown,
    ) -> Result<(), BridgeError>
    where
        S: Stream<Item = Result<Message, WsError>> + Sink<Message, Error = WsError> + Unpin,
    {
        info!(%peer, "client connected");
        let mut session = Session::new();

        let result = self.pump(&mut socket, &mut session, &shutdown).await;

        let cleared = self.disconnect();
        match &result {
            Ok(()) => info!(%peer, cleared, "client disconnected"),
            Err(e) => warn!(%peer, cleared, "client dropped: {e}"),
        }
        result
    }

    async fn pump<S>(
        &self,
        socket: &mut S,
        session: &mut Session,
        shutdown: &Shutdown,
    ) -> Result<(), BridgeError>
    where
        S: Stream<Item = Result<Message, WsError>> + Sink<Message, Error = WsError> + Unpin,
    {
        loop {
            let frame = tokio::select! {
                frame = socket.next() => frame,
                _ = shutdown.wait() => {
                    let _ = socket.close().await;
                    return Ok(());
                }
            };

            let message = match frame {
                None => return Ok(()),
                Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) => return Ok(()),
                Some(Err(e)) => return Err(e.into()),
                Some(Ok(message)) => message,
            };

            match message {
                Message::Close(_) => return Ok(()),
                Message::Text(_) | Message::Binary(_) => {}
                _ => continue,
            }

            let text = message.to_text()?;
            self.handle_message(session, text)?;
            socket.send(Message::text(ACK_REPLY)).await?;
        }
    }
}
