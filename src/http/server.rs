//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all edge function handlers
//! - Wire up middleware (request ID, tracing, limits, rate limit, gate)
//! - Bind server to listener (plain TCP or TLS)
//! - Spawn the upstream health monitor
//! - Graceful shutdown

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    extract::State,
    middleware as axum_middleware,
    routing::{any, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer, set_header::SetResponseHeaderLayer, timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::schema::{EdgeConfig, HealthCheckConfig, RetryConfig};
use crate::http::middleware::{origin_gate_middleware, GateState};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::{assist, relay, signup, tls, users};
use crate::origin::OriginGate;
use crate::resilience::RetryBudget;
use crate::security::headers::standard_response_headers;
use crate::security::rate_limit::{rate_limit_middleware, RateLimiterState};
use crate::upstream::directory::DirectoryClient;
use crate::upstream::health::HealthMonitor;
use crate::upstream::provider::AssistClient;
use crate::upstream::Upstreams;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub directory: DirectoryClient,
    pub assist: AssistClient,
    pub relay_client: reqwest::Client,
    pub upstreams: Arc<Upstreams>,
    pub retry_config: RetryConfig,
    pub retry_budget: Arc<RetryBudget>,
    pub health_config: HealthCheckConfig,
    pub max_body_size: usize,
}

/// HTTP server for the edge gateway.
pub struct HttpServer {
    router: Router,
    config: EdgeConfig,
    gate: Arc<ArcSwap<OriginGate>>,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: EdgeConfig) -> Self {
        let gate = Arc::new(ArcSwap::from_pointee(OriginGate::from_lists(
            &config.origins.blocked,
            &config.origins.allowed,
        )));

        let upstreams = Arc::new(Upstreams::from_config(&config.upstreams));
        let directory = DirectoryClient::new(&config.upstreams.directory, &config.timeouts);
        let assist = AssistClient::new(&config.upstreams.assist, &config.timeouts);

        let relay_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .timeout(Duration::from_secs(config.timeouts.upstream_secs))
            .build()
            .unwrap_or_default();

        let retry_budget = Arc::new(RetryBudget::new(config.retries.budget_ratio, 10));

        let state = AppState {
            directory,
            assist,
            relay_client,
            upstreams,
            retry_config: config.retries.clone(),
            retry_budget,
            health_config: config.health_check.clone(),
            max_body_size: config.security.max_body_size,
        };

        let router = Self::build_router(&config, state.clone(), gate.clone());
        Self {
            router,
            config,
            gate,
            state,
        }
    }

    /// The live gate snapshot, for the reload task and the admin API.
    pub fn gate(&self) -> Arc<ArcSwap<OriginGate>> {
        self.gate.clone()
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &EdgeConfig, state: AppState, gate: Arc<ArcSwap<OriginGate>>) -> Router {
        let gate_state = GateState::new(
            gate,
            &config.origins.allow_methods,
            &config.origins.allow_headers,
        );

        let mut functions = Router::new()
            .route("/functions/signup", post(signup::handle))
            .route("/functions/create-user", post(users::handle))
            .route("/functions/assist", post(assist::handle))
            .route("/relay", any(relay::handle))
            .route("/relay/{*path}", any(relay::handle));

        if config.rate_limit.enabled {
            let limiter = Arc::new(RateLimiterState::new(&config.rate_limit));
            functions = functions.layer(axum_middleware::from_fn_with_state(
                limiter,
                rate_limit_middleware,
            ));
        }

        // The gate is outermost on the function routes: admission is
        // decided before anything else runs.
        let functions = functions.layer(axum_middleware::from_fn_with_state(
            gate_state,
            origin_gate_middleware,
        ));

        let mut router = Router::new()
            .merge(functions)
            .route("/healthz", get(healthz))
            .layer(axum_middleware::from_fn(
                crate::http::middleware::metrics::track_requests,
            ))
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    )))
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
                    .layer(propagate_request_id_layer()),
            );

        if config.security.enable_headers {
            for (name, value) in standard_response_headers() {
                router = router.layer(SetResponseHeaderLayer::if_not_present(name, value));
            }
        }

        router.with_state(state)
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if self.config.health_check.enabled {
            let monitor = HealthMonitor::new(
                self.state.upstreams.clone(),
                self.config.health_check.clone(),
            );
            let monitor_shutdown = shutdown.resubscribe();
            tokio::spawn(async move {
                monitor.run(monitor_shutdown).await;
            });
        }

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        match &self.config.listener.tls {
            Some(tls_config) => {
                let rustls = tls::load_tls_config(
                    Path::new(&tls_config.cert_path),
                    Path::new(&tls_config.key_path),
                )
                .await?;

                let handle = axum_server::Handle::new();
                let shutdown_handle = handle.clone();
                tokio::spawn(async move {
                    let _ = shutdown.recv().await;
                    shutdown_handle.graceful_shutdown(Some(Duration::from_secs(10)));
                });

                axum_server::from_tcp_rustls(listener.into_std()?, rustls)
                    .handle(handle)
                    .serve(app)
                    .await?;
            }
            None => {
                axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        let _ = shutdown.recv().await;
                    })
                    .await?;
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Ungated liveness/readiness endpoint: infrastructure surface, not a
/// browser one.
async fn healthz(State(state): State<AppState>) -> Json<Value> {
    let upstreams: Vec<Value> = state
        .upstreams
        .all()
        .iter()
        .filter(|u| u.is_configured())
        .map(|u| json!({ "name": u.name, "healthy": u.is_healthy() }))
        .collect();

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "upstreams": upstreams,
    }))
}
