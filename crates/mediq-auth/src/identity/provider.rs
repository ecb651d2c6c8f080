//! Identity provider adapter contract.
//!
//! Six operations, consumed by the registration flow, the authentication
//! middleware and the profile lifecycle. Implementations wrap an external
//! identity service; `mediq-auth-memory` provides an in-process one for
//! development and tests.

use serde::{Deserialize, Serialize};

use super::error::IdentityError;
use crate::storage::Role;

// =============================================================================
// Claims
// =============================================================================

/// Custom claims mirrored into the identity provider.
///
/// Embedded in verified tokens so downstream services can authorize without a
/// store round trip. The local record is authoritative; login lazily repairs
/// any divergence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleClaims {
    /// Account role.
    pub role: Role,

    /// Verification state.
    #[serde(rename = "isVerified")]
    pub is_verified: bool,
}

/// The result of verifying a bearer token against the identity provider.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    /// The subject (external identity reference) the token was issued to.
    pub subject: String,

    /// Email recorded for the account at the provider, if any.
    pub email: Option<String>,

    /// Custom claims embedded in the token. `None` if claims were never
    /// issued for this account.
    pub claims: Option<RoleClaims>,
}

// =============================================================================
// Requests
// =============================================================================

/// Input for creating an identity provider account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Login email address.
    pub email: String,

    /// Initial password. Never persisted locally.
    pub password: String,

    /// Display name mirrored to the provider.
    pub display_name: String,
}

/// A partial update to an identity provider account.
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    /// New display name, if changing.
    pub display_name: Option<String>,

    /// New password, if rotating.
    pub password: Option<String>,
}

impl AccountUpdate {
    /// An update that only changes the display name.
    #[must_use]
    pub fn display_name(name: impl Into<String>) -> Self {
        Self {
            display_name: Some(name.into()),
            password: None,
        }
    }

    /// An update that only rotates the password.
    #[must_use]
    pub fn password(password: impl Into<String>) -> Self {
        Self {
            display_name: None,
            password: Some(password.into()),
        }
    }
}

// =============================================================================
// Provider Trait
// =============================================================================

/// The identity provider contract.
///
/// All operations are single network calls with no retries; transient
/// failures surface immediately as [`IdentityError::Unavailable`].
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates a provider account and returns the assigned subject reference.
    ///
    /// # Errors
    ///
    /// [`IdentityError::EmailExists`] if the email is taken,
    /// [`IdentityError::InvalidEmail`] / [`IdentityError::WeakPassword`] if
    /// the provider rejects the credentials, or
    /// [`IdentityError::Unavailable`] on any other failure.
    async fn create_account(&self, account: &NewAccount) -> Result<String, IdentityError>;

    /// Verifies a bearer token and returns the subject and embedded claims.
    ///
    /// # Errors
    ///
    /// [`IdentityError::TokenExpired`], [`IdentityError::TokenRevoked`] or
    /// [`IdentityError::InvalidToken`] per the credential's state.
    async fn verify_token(&self, token: &str) -> Result<VerifiedToken, IdentityError>;

    /// Replaces the custom claims carried for a subject.
    ///
    /// # Errors
    ///
    /// [`IdentityError::NotFound`] if no account exists for the subject.
    async fn set_claims(&self, subject: &str, claims: RoleClaims) -> Result<(), IdentityError>;

    /// Applies a partial update to the provider account.
    ///
    /// # Errors
    ///
    /// [`IdentityError::NotFound`] if no account exists for the subject, or
    /// [`IdentityError::WeakPassword`] if a rotated password is rejected.
    async fn update_account(
        &self,
        subject: &str,
        update: &AccountUpdate,
    ) -> Result<(), IdentityError>;

    /// Hard-deletes the provider account.
    ///
    /// # Errors
    ///
    /// [`IdentityError::NotFound`] if no account exists for the subject.
    async fn delete_account(&self, subject: &str) -> Result<(), IdentityError>;

    /// Revokes every outstanding session/token for the subject.
    ///
    /// Tokens issued before this call must subsequently fail verification
    /// with [`IdentityError::TokenRevoked`].
    ///
    /// # Errors
    ///
    /// [`IdentityError::NotFound`] if no account exists for the subject.
    async fn revoke_sessions(&self, subject: &str) -> Result<(), IdentityError>;
}
