//! Origin gate middleware.
//!
//! Every edge function delegates cross-origin admission here before any
//! credentials, secrets, or upstream calls are touched. Preflights are
//! answered without invoking business logic, and rejections carry CORS
//! headers so browsers surface the structured reason instead of a
//! generic network error.

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::response::reject;
use crate::observability::metrics;
use crate::origin::OriginGate;

/// State required by the gate middleware.
#[derive(Clone)]
pub struct GateState {
    /// Live gate snapshot, swapped on configuration reload.
    gate: Arc<ArcSwap<OriginGate>>,
    /// Pre-rendered `Access-Control-Allow-Methods` value.
    allow_methods: HeaderValue,
    /// Pre-rendered `Access-Control-Allow-Headers` value.
    allow_headers: HeaderValue,
}

impl GateState {
    pub fn new(gate: Arc<ArcSwap<OriginGate>>, methods: &[String], headers: &[String]) -> Self {
        Self {
            gate,
            allow_methods: HeaderValue::from_str(&methods.join(", "))
                .unwrap_or_else(|_| HeaderValue::from_static("GET, POST, OPTIONS")),
            allow_headers: HeaderValue::from_str(&headers.join(", "))
                .unwrap_or_else(|_| HeaderValue::from_static("content-type")),
        }
    }

    fn apply_cors(&self, response: &mut Response, allow_origin: &str) {
        let headers = response.headers_mut();
        if let Ok(value) = HeaderValue::from_str(allow_origin) {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            self.allow_methods.clone(),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            self.allow_headers.clone(),
        );
        // The allow-origin value depends on the request origin.
        headers.insert(header::VARY, HeaderValue::from_static("Origin"));
    }
}

pub async fn origin_gate_middleware(
    State(state): State<GateState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let gate = state.gate.load_full();
    let allow_origin = gate.resolve_allow_origin(origin.as_deref()).to_string();

    // 1. Preflight short-circuits before any business logic.
    if req.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        state.apply_cors(&mut response, &allow_origin);
        return response;
    }

    // 2. Rejections still carry CORS headers so the browser can read
    //    the structured reason.
    if !gate.is_allowed(origin.as_deref()) {
        tracing::warn!(
            origin = origin.as_deref().unwrap_or("<none>"),
            "Origin rejected"
        );
        metrics::record_origin_rejected();
        let mut response = reject(StatusCode::FORBIDDEN, "origin_not_allowed");
        state.apply_cors(&mut response, &allow_origin);
        return response;
    }

    // 3. Admitted: run the handler, attach CORS headers on the way out.
    let mut response = next.run(req).await;
    state.apply_cors(&mut response, &allow_origin);
    response
}
