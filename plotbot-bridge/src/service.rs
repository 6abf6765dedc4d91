//! Bridge service core logic.
//!
//! Wires the pipeline together and runs it until shutdown:
//! websocket clients → `Ingress` → `CommandQueue` → `CommandConsumer`
//! → `TcpLink` → plotter.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{info, warn};

use plotbot_core::{
    BridgeError, CommandConsumer, CommandQueue, Coordinator, Ingress, Shutdown, TcpLink,
};

use crate::config::BridgeConfig;

// ── BridgeService ────────────────────────────────────────────────

/// The top-level bridge service.
///
/// Owns the shutdown signal. Everything else is built fresh by
/// [`run`](Self::run).
pub struct BridgeService {
    config: BridgeConfig,
    shutdown: Shutdown,
}

impl BridgeService {
    /// Create a new service with the given config.
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            shutdown: Shutdown::new(),
        }
    }

    /// Obtain a handle that can be used to stop the service from
    /// another task or a signal handler.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Signal the service to stop.
    pub fn stop(&self) {
        self.shutdown.trigger();
    }

    /// Whether shutdown has been requested.
    pub fn is_stopping(&self) -> bool {
        self.shutdown.is_triggered()
    }

    /// Bind the websocket listener and run until stopped.
    ///
    /// Failing to bind is the only fatal error.
    pub async fn run(&self) -> Result<(), BridgeError> {
        let addr: SocketAddr = self
            .config
            .listen_addr()
            .parse()
            .map_err(|e| BridgeError::Config(format!("bind address: {e}")))?;
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Run the pipeline on an already bound listener.
    ///
    /// 1. Spawns the command consumer.
    /// 2. Accepts websocket clients, one task each.
    /// 3. On shutdown, stops accepting and waits for every client
    ///    handler and the consumer to observe the signal.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), BridgeError> {
        let link = TcpLink::new(self.config.to_link_config());
        info!("plotter at {}", link.config().addr());

        let queue = CommandQueue::new();
        let consumer = CommandConsumer::new(link, queue.clone(), self.config.to_consumer_config());
        let ingress = Ingress::new(queue, consumer.calibration())
            .with_clear_on_disconnect(self.config.queue.clear_on_disconnect);

        let mut coordinator = Coordinator::new(self.shutdown.clone());
        let consumer_shutdown = coordinator.shutdown();
        coordinator.spawn("command consumer", consumer.run(consumer_shutdown));

        info!("websocket server listening on {}", listener.local_addr()?);
        let mut clients = JoinSet::new();

        while !self.is_stopping() {
            let accept = tokio::select! {
                result = listener.accept() => result,
                _ = self.shutdown.wait() => break,
            };

            let (stream, peer) = match accept {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("accept error: {e}");
                    continue;
                }
            };

            let ingress = ingress.clone();
            let shutdown = self.shutdown.clone();
            clients.spawn(async move {
                // Handshake and session outcomes are logged by `serve_tcp`.
                let _ = ingress.serve_tcp(stream, peer, shutdown).await;
            });

            // Reap finished sessions.
            while clients.try_join_next().is_some() {}
        }

        info!("shutting down websocket server");
        drop(listener);
        while clients.join_next().await.is_some() {}
        coordinator.shutdown_and_join().await;

        info!("plotbot bridge stopped");
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────
