//! Assist model provider client.
//!
//! Wraps the hosted chat-completion API behind the assist function.
//! Prompt assembly happens here so it can be unit tested without a
//! network.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use crate::config::schema::{AssistConfig, TimeoutConfig};
use crate::upstream::error::{UpstreamError, UpstreamResult};

const UPSTREAM: &str = "assist";

/// Standing instructions for the triage assistant.
const TRIAGE_PREAMBLE: &str = "You are the first-line support assistant for a ticketing \
help desk. Answer concisely, ask for missing details one question at a time, and recommend \
escalation to a human agent whenever the issue involves billing disputes, account security, \
or possible data loss.";

/// A single turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Client for the hosted model provider.
#[derive(Debug, Clone)]
pub struct AssistClient {
    client: reqwest::Client,
    base_url: Option<Url>,
    api_key: String,
    model: String,
    history_window: usize,
}

impl AssistClient {
    pub fn new(config: &AssistConfig, timeouts: &TimeoutConfig) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.upstream_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: Url::parse(&config.base_url).ok(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            history_window: config.history_window.max(1),
        }
    }

    /// Both a base URL and an API key are required.
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some() && !self.api_key.is_empty()
    }

    /// Build the provider payload: triage preamble (with the ticket
    /// subject woven in), then the trailing history window.
    pub fn build_payload(&self, messages: &[ChatMessage], ticket_subject: Option<&str>) -> Value {
        let mut system = TRIAGE_PREAMBLE.to_string();
        if let Some(subject) = ticket_subject {
            system.push_str(&format!(
                " The ticket under discussion is titled {:?}.",
                subject
            ));
        }

        let start = messages.len().saturating_sub(self.history_window);
        let mut payload_messages = vec![json!({ "role": "system", "content": system })];
        payload_messages.extend(
            messages[start..]
                .iter()
                .map(|m| json!({ "role": m.role, "content": m.content })),
        );

        json!({ "model": self.model, "messages": payload_messages })
    }

    /// Run one chat turn and return the assistant's reply text.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        ticket_subject: Option<&str>,
    ) -> UpstreamResult<String> {
        if self.api_key.is_empty() {
            return Err(UpstreamError::NotConfigured { upstream: UPSTREAM });
        }
        let Some(base) = self.base_url.as_ref() else {
            return Err(UpstreamError::NotConfigured { upstream: UPSTREAM });
        };
        let url = base
            .join("/v1/chat/completions")
            .map_err(|e| UpstreamError::Decode {
                upstream: UPSTREAM,
                message: e.to_string(),
            })?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&self.build_payload(messages, ticket_subject))
            .send()
            .await
            .map_err(|e| UpstreamError::transport(UPSTREAM, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                upstream: UPSTREAM,
                status: status.as_u16(),
            });
        }

        let body: Value = response.json().await.map_err(|e| UpstreamError::Decode {
            upstream: UPSTREAM,
            message: e.to_string(),
        })?;

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| UpstreamError::Decode {
                upstream: UPSTREAM,
                message: "missing choices[0].message.content".to_string(),
            })
    }
}
