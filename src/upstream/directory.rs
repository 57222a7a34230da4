//! Directory admin API client.
//!
//! The directory service owns companies and users. The edge gateway is
//! the only caller of its privileged admin surface; every call carries
//! the service key, and user-facing authorization decisions are made
//! here from the identity the directory resolves.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::config::schema::{DirectoryConfig, TimeoutConfig};
use crate::upstream::error::{UpstreamError, UpstreamResult};

/// Header carrying the privileged service key.
pub const SERVICE_KEY_HEADER: &str = "x-service-key";

const UPSTREAM: &str = "directory";

/// Roles a user can hold within a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Agent,
}

impl Role {
    /// Whether this role may create users in its company.
    pub fn can_manage_users(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

#[derive(Debug, Deserialize)]
pub struct CompanyRecord {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct UserRecord {
    pub id: String,
}

/// The identity behind a user bearer token.
#[derive(Debug, Deserialize)]
pub struct CallerIdentity {
    pub user_id: String,
    pub company_id: String,
    pub role: Role,
}

/// Payload for creating a user within a company.
#[derive(Debug, Serialize)]
pub struct NewUser<'a> {
    pub company_id: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub full_name: &'a str,
    pub role: Role,
}

/// Client for the directory admin API.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    client: reqwest::Client,
    base_url: Option<Url>,
    service_key: String,
}

impl DirectoryClient {
    pub fn new(config: &DirectoryConfig, timeouts: &TimeoutConfig) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.upstream_secs))
            .build()
            .unwrap_or_default();

        let base_url = Url::parse(&config.base_url).ok();

        Self {
            client,
            base_url,
            service_key: config.service_key.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    fn url(&self, path: &str) -> UpstreamResult<Url> {
        let base = self
            .base_url
            .as_ref()
            .ok_or(UpstreamError::NotConfigured { upstream: UPSTREAM })?;
        base.join(path).map_err(|e| UpstreamError::Decode {
            upstream: UPSTREAM,
            message: e.to_string(),
        })
    }

    /// Create a company (tenant).
    pub async fn create_company(&self, name: &str) -> UpstreamResult<CompanyRecord> {
        let url = self.url("/admin/companies")?;
        let response = self
            .client
            .post(url)
            .header(SERVICE_KEY_HEADER, &self.service_key)
            .json(&json!({ "name": name }))
            .send()
            .await
            .map_err(|e| UpstreamError::transport(UPSTREAM, e))?;

        Self::decode(response).await
    }

    /// Create a user within an existing company.
    pub async fn create_user(&self, user: &NewUser<'_>) -> UpstreamResult<UserRecord> {
        let url = self.url("/admin/users")?;
        let response = self
            .client
            .post(url)
            .header(SERVICE_KEY_HEADER, &self.service_key)
            .json(user)
            .send()
            .await
            .map_err(|e| UpstreamError::transport(UPSTREAM, e))?;

        Self::decode(response).await
    }

    /// Resolve a user bearer token to its identity.
    pub async fn resolve_token(&self, token: &str) -> UpstreamResult<CallerIdentity> {
        let url = self.url("/admin/identity")?;
        let response = self
            .client
            .get(url)
            .header(SERVICE_KEY_HEADER, &self.service_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| UpstreamError::transport(UPSTREAM, e))?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> UpstreamResult<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                upstream: UPSTREAM,
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(|e| UpstreamError::Decode {
            upstream: UPSTREAM,
            message: e.to_string(),
        })
    }
}
