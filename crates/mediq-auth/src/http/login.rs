//! Login handler.
//!
//! Login is a token exchange, not a password check: the client obtains a
//! token from the identity provider and presents it here. Verification
//! resolves the local record, stamps the login time, and lazily repairs any
//! divergence between the token's embedded claims and the local record,
//! the only reconciliation mechanism between the two stores.

use axum::{Json, extract::State};

use crate::error::AuthError;
use crate::identity::IdentityProvider;
use crate::middleware::AuthState;
use crate::storage::UserStore;

use super::types::{LoginRequest, UserEnvelope};

/// Handler for `POST /auth/login`.
///
/// # Errors
///
/// - 400 if the token is missing from the body
/// - 401 if the token is expired, revoked or invalid
/// - 404 if the verified identity has no local record
/// - 403 if the account is deactivated
/// - 500 on store or provider failure
pub async fn login_handler(
    State(auth): State<AuthState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<UserEnvelope>, AuthError> {
    let token = req
        .id_token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::invalid_request("idToken is required"))?;

    let verified = auth.identity.verify_token(token).await.map_err(|e| {
        tracing::debug!(error = %e, "Login token verification failed");
        AuthError::from(e)
    })?;

    let mut record = auth
        .users
        .find_by_subject(&verified.subject)
        .await?
        .ok_or_else(|| {
            tracing::warn!(subject = %verified.subject, "Login for identity with no local record");
            AuthError::not_found("No account exists for this identity")
        })?;

    if !record.active {
        tracing::debug!(user_id = %record.id, "Login rejected for deactivated account");
        return Err(AuthError::forbidden("Account is deactivated"));
    }

    record.touch_login();
    auth.users.update(&record).await?;

    // Lazy repair: the local record is authoritative for role/verification.
    let local_claims = record.role_claims();
    if verified.claims != Some(local_claims) {
        tracing::info!(
            user_id = %record.id,
            role = %local_claims.role,
            is_verified = local_claims.is_verified,
            "Resyncing identity provider claims"
        );
        auth.identity
            .set_claims(&verified.subject, local_claims)
            .await?;
    }

    tracing::debug!(user_id = %record.id, "Login successful");

    Ok(Json(UserEnvelope::new(&record, "Login successful")))
}
