//! AI assist edge function.
//!
//! Proxies one chat turn to the hosted model provider. Prompt assembly
//! lives in the provider client; this handler is request/response
//! plumbing plus input validation.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::http::response::reject;
use crate::http::server::AppState;
use crate::upstream::provider::{ChatMessage, MessageRole};

#[derive(Debug, Deserialize)]
pub struct AssistRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub ticket_subject: Option<String>,
}

pub async fn handle(State(state): State<AppState>, Json(request): Json<AssistRequest>) -> Response {
    if !state.assist.is_configured() {
        return reject(StatusCode::SERVICE_UNAVAILABLE, "assist_unconfigured");
    }

    if request.messages.is_empty() {
        return reject(StatusCode::BAD_REQUEST, "empty_conversation");
    }
    // The system turn is ours to set; clients only send the dialogue.
    if request
        .messages
        .iter()
        .any(|m| m.role == MessageRole::System)
    {
        return reject(StatusCode::BAD_REQUEST, "reserved_role");
    }

    match state
        .assist
        .complete(&request.messages, request.ticket_subject.as_deref())
        .await
    {
        Ok(reply) => (StatusCode::OK, Json(json!({ "ok": true, "reply": reply }))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Assist call failed");
            reject(StatusCode::BAD_GATEWAY, "assist_unavailable")
        }
    }
}
