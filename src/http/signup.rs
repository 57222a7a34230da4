//! Tenant signup edge function.
//!
//! Creates a company and its first (admin) user through the directory's
//! privileged admin API.

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
use crate::upstream::directory::{NewUser, Role};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub company_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: String,
}

pub async fn handle(State(state): State<AppState>, Json(request): Json<SignupRequest>) -> Response {
    if !state.directory.is_configured() {
        return reject(StatusCode::SERVICE_UNAVAILABLE, "directory_unconfigured");
    }

    // Validate before any upstream call.
    if request.company_name.trim().is_empty() || request.email.trim().is_empty() {
        return reject(StatusCode::BAD_REQUEST, "missing_fields");
    }
    if !request.email.contains('@') {
        return reject(StatusCode::BAD_REQUEST, "invalid_email");
    }
    if request.password.chars().count() < 8 {
        return reject(StatusCode::BAD_REQUEST, "password_too_short");
    }

    let company = match state.directory.create_company(request.company_name.trim()).await {
        Ok(company) => company,
        Err(e) => {
            tracing::error!(error = %e, "Company creation failed");
            return reject(StatusCode::BAD_GATEWAY, "directory_unavailable");
        }
    };

    let new_user = NewUser {
        company_id: &company.id,
        email: request.email.trim(),
        password: &request.password,
        full_name: request.full_name.trim(),
        role: Role::Admin,
    };

    match state.directory.create_user(&new_user).await {
        Ok(user) => {
            tracing::info!(company_id = %company.id, user_id = %user.id, "Tenant signed up");
            (
                StatusCode::CREATED,
                Json(json!({
                    "ok": true,
                    "company_id": company.id,
                    "user_id": user.id,
                })),
            )
                .into_response()
        }
        Err(e) if e.is_conflict() => reject(StatusCode::CONFLICT, "email_exists"),
        Err(e) => {
            // The company row exists without its first user; the
            // directory reconciles orphaned companies on its side.
            tracing::error!(
                error = %e,
                company_id = %company.id,
                "User creation failed after company creation"
            );
            reject(StatusCode::BAD_GATEWAY, "directory_unavailable")
        }
    }
}
