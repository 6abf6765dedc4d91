//! plotbot-bridge — entry point.
//!
//! ```text
//! plotbot-bridge                        Run with plotbot-bridge.toml (or defaults)
//! plotbot-bridge --config <path>        Load a custom config TOML
//! plotbot-bridge --ws-port 9000         Override the websocket port
//! plotbot-bridge --device host:port     Override the plotter address
//! plotbot-bridge --gen-config           Write default config to stdout
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use plotbot_bridge::config::BridgeConfig;
use plotbot_bridge::service::BridgeService;
use plotbot_core::Shutdown;

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "plotbot-bridge", about = "Websocket drawing client to pen plotter bridge")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "plotbot-bridge.toml")]
    config: PathBuf,

    /// Websocket listener port (overrides the config file).
    #[arg(long)]
    ws_port: Option<u16>,

    /// Plotter address as host:port (overrides the config file).
    #[arg(long)]
    device: Option<String>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // --gen-config: dump defaults and exit.
    if cli.gen_config {
        let text = toml::to_string_pretty(&BridgeConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    // Load config.
    let mut config = BridgeConfig::load(&cli.config);
    config.apply_overrides(cli.ws_port, cli.device.as_deref())?;

    // Init tracing.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("plotbot-bridge v{}", env!("CARGO_PKG_VERSION"));
    info!("websocket: {}", config.listen_addr());
    info!("plotter: {}:{}", config.device.host, config.device.port);

    let service = BridgeService::new(config);
    tokio::spawn(shutdown_on_signal(service.shutdown_handle()));

    service.run().await?;
    Ok(())
}

/// SIGINT and SIGTERM both start a graceful shutdown.
async fn shutdown_on_signal(shutdown: Shutdown) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = match signal(SignalKind::terminate()) {
            Ok(term) => term,
            Err(e) => {
                tracing::warn!("cannot listen for SIGTERM: {e}");
                tokio::signal::ctrl_c().await.ok();
                info!("shutdown signal received, cleaning up");
                shutdown.trigger();
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = term.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
    }

    info!("shutdown signal received, cleaning up");
    shutdown.trigger();
}
