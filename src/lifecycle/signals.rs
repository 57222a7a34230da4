//! OS signal handling.
//!
//! Translates process signals into internal events: SIGINT/SIGTERM
//! trigger graceful shutdown, SIGHUP requests a configuration reload
//! without interrupting traffic.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::lifecycle::Shutdown;

/// Spawn the signal task.
///
/// Reload requests are delivered on `reload_tx`; the task exits once a
/// shutdown signal has been forwarded.
pub fn spawn(shutdown: Arc<Shutdown>, reload_tx: mpsc::UnboundedSender<()>) -> JoinHandle<()> {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut term = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    return;
                }
            };
            let mut hup = match signal(SignalKind::hangup()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGHUP handler");
                    return;
                }
            };

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("SIGINT received, shutting down");
                        shutdown.trigger();
                        break;
                    }
                    _ = term.recv() => {
                        tracing::info!("SIGTERM received, shutting down");
                        shutdown.trigger();
                        break;
                    }
                    _ = hup.recv() => {
                        tracing::info!("SIGHUP received, reloading configuration");
                        let _ = reload_tx.send(());
                    }
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = reload_tx;
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received, shutting down");
                shutdown.trigger();
            }
        }
    })
}
