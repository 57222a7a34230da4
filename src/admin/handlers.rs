use axum::{extract::State, Json};
use serde::Serialize;

use crate::admin::AdminState;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

/// Diagnostics view of the live origin sets.
#[derive(Serialize)]
pub struct OriginDiagnostics {
    /// Denied hosts, sorted.
    pub blocked_hosts: Vec<String>,
    /// Permitted origins, in configured order.
    pub allowed_origins: Vec<String>,
    /// True when no allowlist is configured (every origin admitted).
    pub fail_open: bool,
    pub signature: String,
}

#[derive(Serialize)]
pub struct UpstreamStatus {
    pub name: &'static str,
    pub configured: bool,
    pub healthy: bool,
    pub state: String,
}

pub async fn get_status() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

pub async fn get_origins(State(state): State<AdminState>) -> Json<OriginDiagnostics> {
    let gate = state.gate.load_full();

    Json(OriginDiagnostics {
        blocked_hosts: gate.blocked().iter().map(str::to_owned).collect(),
        allowed_origins: gate.allowed().iter().map(str::to_owned).collect(),
        fail_open: gate.allowed().is_empty(),
        signature: gate.signature(),
    })
}

pub async fn get_upstreams(State(state): State<AdminState>) -> Json<Vec<UpstreamStatus>> {
    let statuses = state
        .upstreams
        .all()
        .iter()
        .map(|u| UpstreamStatus {
            name: u.name,
            configured: u.is_configured(),
            healthy: u.is_healthy(),
            state: format!("{:?}", u.state()),
        })
        .collect();

    Json(statuses)
}
