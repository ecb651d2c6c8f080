//! Error response handling for the auth HTTP surface.
//!
//! This module implements `IntoResponse` for `AuthError`, producing the
//! `{success, message}` JSON envelope used across the API. Server-side
//! failures are logged with their detail and answered with a generic
//! message; the detail reaches the client only in debug builds.

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AuthError;

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let message = client_message(&self);

        let body = json!({
            "success": false,
            "message": message,
        });

        let mut headers = HeaderMap::new();
        if status == StatusCode::UNAUTHORIZED {
            let www_auth = build_www_authenticate_header(&message);
            if let Ok(value) = HeaderValue::from_str(&www_auth) {
                headers.insert(header::WWW_AUTHENTICATE, value);
            }
        }

        (status, headers, Json(body)).into_response()
    }
}

/// Maps an error to its HTTP status per the taxonomy: validation 400,
/// authentication 401, authorization 403, not-found 404, conflict 409,
/// everything else 500.
#[must_use]
pub fn status_for(error: &AuthError) -> StatusCode {
    match error {
        AuthError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        AuthError::Unauthorized { .. } | AuthError::TokenExpired | AuthError::TokenRevoked => {
            StatusCode::UNAUTHORIZED
        }
        AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
        AuthError::NotFound { .. } => StatusCode::NOT_FOUND,
        AuthError::Conflict { .. } => StatusCode::CONFLICT,
        AuthError::Storage { .. }
        | AuthError::IdentityProvider { .. }
        | AuthError::Configuration { .. }
        | AuthError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Returns the message to expose to the client.
///
/// Client errors carry their diagnostic; server errors are logged and
/// replaced with a generic message outside debug builds.
fn client_message(error: &AuthError) -> String {
    if error.is_server_error() {
        tracing::error!(category = %error.category(), error = %error, "Request failed");
        if cfg!(debug_assertions) {
            error.to_string()
        } else {
            "Internal server error".to_string()
        }
    } else {
        match error {
            AuthError::TokenExpired => "Token has expired".to_string(),
            AuthError::TokenRevoked => "Token has been revoked".to_string(),
            AuthError::InvalidRequest { message }
            | AuthError::Unauthorized { message }
            | AuthError::Forbidden { message }
            | AuthError::NotFound { message }
            | AuthError::Conflict { message } => message.clone(),
            // Server errors are handled above.
            _ => error.to_string(),
        }
    }
}

/// Builds the WWW-Authenticate header value for 401 responses.
fn build_www_authenticate_header(description: &str) -> String {
    let escaped = description.replace('\"', "\\\"");
    format!("Bearer realm=\"mediq\", error_description=\"{escaped}\"")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_unauthorized_response() {
        let response = AuthError::unauthorized("Missing Authorization header").into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let www_auth = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(www_auth.contains("Bearer"));
        assert!(www_auth.contains("realm=\"mediq\""));
    }

    #[tokio::test]
    async fn test_forbidden_response_has_no_challenge() {
        let response = AuthError::forbidden("Admin access required").into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!response.headers().contains_key(header::WWW_AUTHENTICATE));
    }

    #[tokio::test]
    async fn test_envelope_body() {
        let response = AuthError::conflict("an account with this email already exists")
            .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "an account with this email already exists");
    }

    #[tokio::test]
    async fn test_status_mapping() {
        assert_eq!(
            status_for(&AuthError::invalid_request("x")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&AuthError::TokenExpired), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&AuthError::TokenRevoked), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(&AuthError::forbidden("x")), StatusCode::FORBIDDEN);
        assert_eq!(status_for(&AuthError::not_found("x")), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&AuthError::conflict("x")), StatusCode::CONFLICT);
        assert_eq!(
            status_for(&AuthError::storage("x")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&AuthError::identity_provider("x")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_token_expired_message() {
        let response = AuthError::TokenExpired.into_response();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Token has expired");
    }

    #[test]
    fn test_www_authenticate_escaping() {
        let header = build_www_authenticate_header("bad \"token\"");
        assert!(header.contains("\\\"token\\\""));
    }
}
