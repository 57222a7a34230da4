//! Admin API, served on its own bind address.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::schema::AdminConfig;
use crate::origin::OriginGate;
use crate::upstream::Upstreams;

use self::auth::admin_auth_middleware;
use self::handlers::*;

/// State for the admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub api_key: String,
    pub gate: Arc<ArcSwap<OriginGate>>,
    pub upstreams: Arc<Upstreams>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/origins", get(get_origins))
        .route("/admin/upstreams", get(get_upstreams))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ))
        .with_state(state)
}

/// Serve the admin API until shutdown.
pub async fn serve(
    config: &AdminConfig,
    state: AdminState,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(&config.bind_address).await?;
    tracing::info!(address = %config.bind_address, "Admin API listening");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await
}
