//! Bearer token authentication extractors.
//!
//! This module provides Axum extractors that verify a bearer credential
//! against the identity provider, resolve it to a local user record, and
//! attach the principal to the request context.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use mediq_auth::middleware::{AuthState, BearerAuth};
//!
//! async fn profile_handler(BearerAuth(user): BearerAuth) -> String {
//!     format!("Hello, {}!", user.record.name)
//! }
//!
//! let app = Router::new()
//!     .route("/auth/profile", get(profile_handler))
//!     .with_state(auth_state);
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::identity::{IdentityProvider, RoleClaims, VerifiedToken};
use crate::storage::{Role, UserRecord, UserStore};

// =============================================================================
// Auth State
// =============================================================================

/// State required for bearer token authentication.
///
/// Constructed explicitly at startup and included in the application state;
/// the extractors reach it via `FromRef`. There is no ambient/global client
/// state anywhere in the crate.
#[derive(Clone)]
pub struct AuthState {
    /// Identity provider handle.
    pub identity: Arc<dyn IdentityProvider>,

    /// User record store handle.
    pub users: Arc<dyn UserStore>,

    /// Auth policy configuration.
    pub config: AuthConfig,
}

impl AuthState {
    /// Creates a new auth state with default configuration.
    pub fn new(identity: Arc<dyn IdentityProvider>, users: Arc<dyn UserStore>) -> Self {
        Self {
            identity,
            users,
            config: AuthConfig::default(),
        }
    }

    /// Replaces the auth configuration.
    #[must_use]
    pub fn with_config(mut self, config: AuthConfig) -> Self {
        self.config = config;
        self
    }
}

// =============================================================================
// Principal
// =============================================================================

/// The authenticated principal attached to a request.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    /// The resolved local record.
    pub record: UserRecord,

    /// The verified credential the principal presented.
    pub token: VerifiedToken,
}

impl AuthedUser {
    /// Local record identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.record.id
    }

    /// External identity reference.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.record.subject
    }

    /// Account role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.record.role()
    }

    /// Returns `true` if the token's embedded claims diverge from the local
    /// record. Login uses this to trigger the lazy claims resync.
    #[must_use]
    pub fn claims_drifted(&self) -> bool {
        self.token.claims != Some(self.record.role_claims())
    }

    /// The claims the identity provider should carry for this principal.
    #[must_use]
    pub fn role_claims(&self) -> RoleClaims {
        self.record.role_claims()
    }
}

// =============================================================================
// Bearer Auth Extractor
// =============================================================================

/// Axum extractor that authenticates a bearer credential.
///
/// This extractor:
/// 1. Extracts the `Authorization: Bearer <token>` header
/// 2. Verifies the token against the identity provider
/// 3. Resolves the subject to a local user record
/// 4. Rejects if the record is absent or inactive
///
/// # Errors
///
/// Returns `AuthError` (which implements `IntoResponse`) with the same
/// failure mapping as the login flow: 401 for missing/expired/revoked/invalid
/// credentials, 404 if no local record exists for a verified identity, 403
/// if the record is inactive.
pub struct BearerAuth(pub AuthedUser);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let token = bearer_token(parts)
            .ok_or_else(|| AuthError::unauthorized("Missing Authorization header"))?;

        let verified = auth_state.identity.verify_token(&token).await.map_err(|e| {
            tracing::debug!(error = %e, "Token verification failed");
            AuthError::from(e)
        })?;

        let record = auth_state
            .users
            .find_by_subject(&verified.subject)
            .await?
            .ok_or_else(|| {
                tracing::warn!(subject = %verified.subject, "Verified identity has no local record");
                AuthError::not_found("No account exists for this identity")
            })?;

        if !record.active {
            tracing::debug!(user_id = %record.id, "Inactive account rejected");
            return Err(AuthError::forbidden("Account is deactivated"));
        }

        tracing::debug!(
            user_id = %record.id,
            role = %record.role(),
            "Bearer credential resolved"
        );

        Ok(BearerAuth(AuthedUser {
            record,
            token: verified,
        }))
    }
}

/// Extracts the bearer token from the `Authorization` header.
fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
}

// =============================================================================
// Optional Bearer Auth Extractor
// =============================================================================

/// Axum extractor that optionally authenticates a bearer credential.
///
/// Unlike [`BearerAuth`], this extractor never rejects: a missing header, a
/// bad token, a missing record or an inactive account all resolve to `None`.
/// Used by routes that personalize behavior for logged-in users without
/// requiring login.
pub struct OptionalBearerAuth(pub Option<AuthedUser>);

impl<S> FromRequestParts<S> for OptionalBearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match BearerAuth::from_request_parts(parts, state).await {
            Ok(BearerAuth(user)) => Ok(OptionalBearerAuth(Some(user))),
            Err(e) => {
                tracing::debug!(error = %e, "Optional auth proceeding unauthenticated");
                Ok(OptionalBearerAuth(None))
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
