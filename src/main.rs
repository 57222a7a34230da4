//! Nexus Edge: origin-gated edge function gateway.
//!
//! The serverless-edge layer of the Nexus Support Hub, as one
//! long-running service.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌───────────────────────────────────────────────┐
//!                       │                  NEXUS EDGE                   │
//!                       │                                               │
//!   Browser request     │  ┌─────────┐   ┌─────────────┐   ┌─────────┐ │
//!   ────────────────────┼─▶│  http   │──▶│ origin gate │──▶│ handler │ │
//!                       │  │ server  │   │ (CORS/admit)│   │ signup/ │ │
//!                       │  └─────────┘   └─────────────┘   │ users/  │ │
//!                       │                                  │ assist/ │ │
//!                       │                                  │ relay   │ │
//!                       │                                  └────┬────┘ │
//!                       │                                       │      │
//!                       │                                       ▼      │
//!   Response            │                              ┌────────────┐  │     directory API
//!   ◀───────────────────┼──────────────────────────────│  upstream  │◀─┼──── model provider
//!                       │                              │  clients   │  │     relay target
//!                       │                              └────────────┘  │
//!                       │                                               │
//!                       │  ┌─────────────────────────────────────────┐  │
//!                       │  │          Cross-Cutting Concerns         │  │
//!                       │  │  config+reload │ health │ observability │  │
//!                       │  │  rate limits   │ admin  │ lifecycle     │  │
//!                       │  └─────────────────────────────────────────┘  │
//!                       └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use nexus_edge::admin::{self, AdminState};
use nexus_edge::config::loader::{load_config, load_default};
use nexus_edge::config::watcher::ConfigWatcher;
use nexus_edge::config::EdgeConfig;
use nexus_edge::http::HttpServer;
use nexus_edge::lifecycle::{signals, Shutdown};
use nexus_edge::observability::{logging, metrics};
use nexus_edge::origin::OriginGate;

#[derive(Parser)]
#[command(name = "nexus-edge")]
#[command(about = "Origin-gated edge function gateway", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Without it, defaults plus
    /// environment variables are used.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => load_default()?,
    };

    logging::init(&config.observability);

    if args.check {
        println!("configuration OK");
        return Ok(());
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "nexus-edge starting"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config.clone());
    let gate = server.gate();

    if gate.load().allowed().is_empty() {
        tracing::warn!(
            "No origin allowlist configured; all origins will be admitted (fail-open). \
             Set NEXUS_ALLOWED_ORIGINS or [origins].allowed for production deployments."
        );
    }

    let shutdown = Arc::new(Shutdown::new());

    // Signals: SIGINT/SIGTERM → shutdown, SIGHUP → reload.
    let (reload_tx, reload_rx) = mpsc::unbounded_channel();
    signals::spawn(shutdown.clone(), reload_tx);

    // Config file watcher, when a file is in use. Without one, the
    // update channel stays open but idle so SIGHUP reloads keep
    // working.
    let (config_updates, _watcher, _idle_tx) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (updates, Some(watcher.run()?), None)
        }
        None => {
            let (tx, rx) = mpsc::unbounded_channel::<EdgeConfig>();
            (rx, None, Some(tx))
        }
    };

    spawn_reload_task(gate.clone(), args.config.clone(), config_updates, reload_rx);

    if config.admin.enabled {
        let admin_state = AdminState {
            api_key: config.admin.api_key.clone(),
            gate: gate.clone(),
            upstreams: server.state().upstreams.clone(),
        };
        let admin_config = config.admin.clone();
        let admin_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            if let Err(e) = admin::serve(&admin_config, admin_state, admin_shutdown).await {
                tracing::error!(error = %e, "Admin API failed");
            }
        });
    }

    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Apply configuration updates to the live gate snapshot.
fn spawn_reload_task(
    gate: Arc<ArcSwap<OriginGate>>,
    config_path: Option<PathBuf>,
    mut config_updates: mpsc::UnboundedReceiver<EdgeConfig>,
    mut reload_requests: mpsc::UnboundedReceiver<()>,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                update = config_updates.recv() => {
                    match update {
                        Some(new_config) => apply_origin_reload(&gate, &new_config),
                        None => break,
                    }
                }
                request = reload_requests.recv() => {
                    match request {
                        Some(()) => {
                            let reloaded = match &config_path {
                                Some(path) => load_config(path),
                                None => load_default(),
                            };
                            match reloaded {
                                Ok(new_config) => apply_origin_reload(&gate, &new_config),
                                Err(e) => tracing::error!(
                                    "Reload failed: {}. Keeping current configuration.",
                                    e
                                ),
                            }
                        }
                        None => break,
                    }
                }
            }
        }
    });
}

/// Rebuild the origin sets and swap them in, but only when the
/// effective signature changed.
fn apply_origin_reload(gate: &Arc<ArcSwap<OriginGate>>, config: &EdgeConfig) {
    let next = OriginGate::from_lists(&config.origins.blocked, &config.origins.allowed);

    if next.signature() == gate.load().signature() {
        tracing::debug!("Origin sets unchanged after reload");
        return;
    }

    tracing::info!(
        allowed = next.allowed().len(),
        blocked = next.blocked().len(),
        "Origin sets updated"
    );
    gate.store(Arc::new(next));
}
