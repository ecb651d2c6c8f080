//! Authorization gates.
//!
//! Pure role/ownership predicates layered on top of the authenticated
//! principal, each packaged as an Axum extractor so routes compose them
//! declaratively. Failing a gate yields 403 when a principal is present and
//! 401 (from the underlying [`BearerAuth`]) when it is not, never another
//! status.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::AuthError;
use crate::storage::{Role, RoleProfile};

use super::auth::{AuthState, AuthedUser, BearerAuth};

// =============================================================================
// Role Gates
// =============================================================================

/// Gate requiring `role = doctor`.
pub struct DoctorAuth(pub AuthedUser);

impl<S> FromRequestParts<S> for DoctorAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BearerAuth(user) = BearerAuth::from_request_parts(parts, state).await?;
        if user.role() != Role::Doctor {
            tracing::debug!(user_id = %user.id(), role = %user.role(), "Doctor gate denied");
            return Err(AuthError::forbidden("Doctor access required"));
        }
        Ok(Self(user))
    }
}

/// Gate requiring a verified doctor.
pub struct VerifiedDoctorAuth(pub AuthedUser);

impl<S> FromRequestParts<S> for VerifiedDoctorAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let DoctorAuth(user) = DoctorAuth::from_request_parts(parts, state).await?;
        if !matches!(user.record.profile, RoleProfile::Doctor { verified: true, .. }) {
            tracing::debug!(user_id = %user.id(), "Verified-doctor gate denied: unverified");
            return Err(AuthError::forbidden("Verified doctor access required"));
        }
        Ok(Self(user))
    }
}

/// Gate requiring `role = patient`.
pub struct PatientAuth(pub AuthedUser);

impl<S> FromRequestParts<S> for PatientAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BearerAuth(user) = BearerAuth::from_request_parts(parts, state).await?;
        if user.role() != Role::Patient {
            tracing::debug!(user_id = %user.id(), role = %user.role(), "Patient gate denied");
            return Err(AuthError::forbidden("Patient access required"));
        }
        Ok(Self(user))
    }
}

/// Gate requiring `role = admin` on an active account.
///
/// Admins are structurally verified (the role union carries no flag for
/// them) and [`BearerAuth`] already rejects inactive accounts, so this gate
/// reduces to a role check on top of it.
pub struct AdminAuth(pub AuthedUser);

impl<S> FromRequestParts<S> for AdminAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BearerAuth(user) = BearerAuth::from_request_parts(parts, state).await?;
        if user.role() != Role::Admin {
            tracing::debug!(user_id = %user.id(), role = %user.role(), "Admin gate denied");
            return Err(AuthError::forbidden("Admin access required"));
        }
        tracing::debug!(user_id = %user.id(), "Admin access granted");
        Ok(Self(user))
    }
}

// =============================================================================
// Ownership Gate
// =============================================================================

/// Requires the principal to be the owner of the target record, or an admin.
///
/// # Errors
///
/// Returns [`AuthError::Forbidden`] if the principal is neither.
pub fn require_owner_or_admin(user: &AuthedUser, target: Uuid) -> Result<(), AuthError> {
    if user.id() == target || user.role() == Role::Admin {
        return Ok(());
    }
    tracing::debug!(
        user_id = %user.id(),
        target = %target,
        "Owner-or-admin gate denied"
    );
    Err(AuthError::forbidden(
        "Only the account owner or an admin may perform this action",
    ))
}

// Tests for these extractors and gates live in `tests/gates.rs` as an
// integration test: they exercise this module through `mediq-auth-memory`,
// which depends back on `mediq-auth`, so an inline unit-test module would link
// two distinct instances of this crate and the trait impls would not match.
