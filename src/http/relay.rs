//! Generic pass-through relay.
//!
//! Forwards gated requests to the configured relay upstream: method,
//! path, query, and body survive the hop; hop-by-hop headers do not.
//! Idempotent requests are retried on transport errors and gateway
//! statuses, under the shared retry budget.

use axum::{
    body::Body,
    extract::State,
    http::{Request, Response as HttpResponse, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::request::{request_id, X_REQUEST_ID};
use crate::http::response::reject;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::resilience::{calculate_backoff, is_retryable};
use crate::security::headers::{filter_forwarded, is_hop_by_hop};

pub async fn handle(State(state): State<AppState>, req: Request<Body>) -> Response {
    let Some(base) = state.upstreams.relay.base_url().cloned() else {
        return reject(StatusCode::SERVICE_UNAVAILABLE, "relay_disabled");
    };

    let request_id = request_id(req.headers()).to_string();
    let method = req.method().clone();

    // Map /relay/{*path} onto the upstream base, keeping the query.
    let stripped = req.uri().path().strip_prefix("/relay").unwrap_or("");
    let mut url = base.clone();
    url.set_path(&format!("{}{}", base.path().trim_end_matches('/'), stripped));
    url.set_query(req.uri().query());

    let mut headers = filter_forwarded(req.headers());
    if let Some(id) = req.headers().get(X_REQUEST_ID) {
        headers.insert(X_REQUEST_ID, id.clone());
    }

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        target = %url,
        "Relaying request"
    );

    // Buffer the body so retried attempts can replay it.
    let body_bytes = match axum::body::to_bytes(req.into_body(), state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(_) => return reject(StatusCode::PAYLOAD_TOO_LARGE, "body_too_large"),
    };

    state.retry_budget.record_request();
    let max_attempts = if state.retry_config.enabled && method.is_idempotent() {
        state.retry_config.max_attempts
    } else {
        1
    };

    let mut attempts = 0;
    loop {
        attempts += 1;

        let upstream_req = state
            .relay_client
            .request(method.clone(), url.clone())
            .headers(headers.clone())
            .body(body_bytes.clone());

        match upstream_req.send().await {
            Ok(response) => {
                let status = response.status();

                if attempts < max_attempts
                    && is_retryable(&method, Some(status), false)
                    && state.retry_budget.try_acquire()
                {
                    let backoff = calculate_backoff(
                        attempts,
                        state.retry_config.base_delay_ms,
                        state.retry_config.max_delay_ms,
                    );
                    tracing::info!(
                        request_id = %request_id,
                        attempt = attempts,
                        delay = ?backoff,
                        status = %status,
                        "Retrying relayed request"
                    );
                    metrics::record_relay_retry();
                    tokio::time::sleep(backoff).await;
                    continue;
                }

                // Passive health: only gateway-class statuses count as
                // upstream failures.
                if matches!(
                    status,
                    StatusCode::BAD_GATEWAY
                        | StatusCode::SERVICE_UNAVAILABLE
                        | StatusCode::GATEWAY_TIMEOUT
                ) {
                    state
                        .upstreams
                        .relay
                        .mark_failure(state.health_config.unhealthy_threshold as usize);
                } else {
                    state
                        .upstreams
                        .relay
                        .mark_success(state.health_config.healthy_threshold as usize);
                }

                let mut builder = HttpResponse::builder().status(status);
                if let Some(headers_mut) = builder.headers_mut() {
                    for (name, value) in response.headers() {
                        if !is_hop_by_hop(name) {
                            headers_mut.append(name.clone(), value.clone());
                        }
                    }
                }

                let bytes = match response.bytes().await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::error!(request_id = %request_id, error = %e, "Relay body read failed");
                        return reject(StatusCode::BAD_GATEWAY, "relay_failed");
                    }
                };

                return builder
                    .body(Body::from(bytes))
                    .map(IntoResponse::into_response)
                    .unwrap_or_else(|_| reject(StatusCode::BAD_GATEWAY, "relay_failed"));
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    attempt = attempts,
                    error = %e,
                    "Relay upstream error"
                );

                if attempts < max_attempts
                    && is_retryable(&method, None, true)
                    && state.retry_budget.try_acquire()
                {
                    let backoff = calculate_backoff(
                        attempts,
                        state.retry_config.base_delay_ms,
                        state.retry_config.max_delay_ms,
                    );
                    tracing::info!(
                        request_id = %request_id,
                        attempt = attempts,
                        delay = ?backoff,
                        "Retrying after network error"
                    );
                    metrics::record_relay_retry();
                    tokio::time::sleep(backoff).await;
                    continue;
                }

                state
                    .upstreams
                    .relay
                    .mark_failure(state.health_config.unhealthy_threshold as usize);
                return reject(StatusCode::BAD_GATEWAY, "relay_failed");
            }
        }
    }
}
