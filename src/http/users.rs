//! Manager-initiated user creation edge function.
//!
//! The caller's bearer token is resolved against the directory; only
//! managers and admins may create users, and only inside their own
//! company.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::http::response::reject;
use crate::http::server::AppState;
use crate::upstream::directory::{NewUser, Role};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    pub role: Role,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

pub async fn handle(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateUserRequest>,
) -> Response {
    if !state.directory.is_configured() {
        return reject(StatusCode::SERVICE_UNAVAILABLE, "directory_unconfigured");
    }

    let Some(token) = bearer_token(&headers) else {
        return reject(StatusCode::UNAUTHORIZED, "missing_token");
    };

    if request.email.trim().is_empty() || !request.email.contains('@') {
        return reject(StatusCode::BAD_REQUEST, "invalid_email");
    }
    if request.password.chars().count() < 8 {
        return reject(StatusCode::BAD_REQUEST, "password_too_short");
    }
    // Admins are created through signup only.
    if request.role == Role::Admin {
        return reject(StatusCode::FORBIDDEN, "role_not_assignable");
    }

    let caller = match state.directory.resolve_token(token).await {
        Ok(caller) => caller,
        Err(e) if e.is_unauthorized() => {
            return reject(StatusCode::UNAUTHORIZED, "invalid_token");
        }
        Err(e) => {
            tracing::error!(error = %e, "Token resolution failed");
            return reject(StatusCode::BAD_GATEWAY, "directory_unavailable");
        }
    };

    if !caller.role.can_manage_users() {
        tracing::warn!(
            user_id = %caller.user_id,
            role = ?caller.role,
            "User creation denied: insufficient role"
        );
        return reject(StatusCode::FORBIDDEN, "insufficient_role");
    }

    let new_user = NewUser {
        company_id: &caller.company_id,
        email: request.email.trim(),
        password: &request.password,
        full_name: request.full_name.trim(),
        role: request.role,
    };

    match state.directory.create_user(&new_user).await {
        Ok(user) => {
            tracing::info!(
                company_id = %caller.company_id,
                user_id = %user.id,
                created_by = %caller.user_id,
                "User created"
            );
            (
                StatusCode::CREATED,
                Json(json!({
                    "ok": true,
                    "user_id": user.id,
                    "company_id": caller.company_id,
                })),
            )
                .into_response()
        }
        Err(e) if e.is_conflict() => reject(StatusCode::CONFLICT, "email_exists"),
        Err(e) => {
            tracing::error!(error = %e, "User creation failed");
            reject(StatusCode::BAD_GATEWAY, "directory_unavailable")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
    }
}
