//! Doctor verification handler.
//!
//! The only legitimate write path for a doctor's verified flag. Admin-gated
//! by route wiring; storage itself does not police the caller. This is a procedural
//! guarantee, as documented in the design notes.

use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::error::AuthError;
use crate::identity::IdentityProvider;
use crate::middleware::{AdminAuth, AuthState};
use crate::storage::{RoleProfile, UserStore};

use super::types::{DoctorEnvelope, VerifyDoctorRequest};

/// Handler for `PUT /auth/verify-doctor/{doctorId}`.
///
/// Flips the target doctor's verified flag and re-issues provider claims to
/// match.
///
/// # Errors
///
/// - 400 if `isVerified` is missing or the target is not a doctor
/// - 404 if no record with the given id exists
/// - 500 on store or provider failure
pub async fn verify_doctor_handler(
    State(auth): State<AuthState>,
    AdminAuth(admin): AdminAuth,
    Path(doctor_id): Path<Uuid>,
    Json(req): Json<VerifyDoctorRequest>,
) -> Result<Json<DoctorEnvelope>, AuthError> {
    let requested = req
        .is_verified
        .ok_or_else(|| AuthError::invalid_request("isVerified is required"))?;

    let mut record = auth
        .users
        .find_by_id(doctor_id)
        .await?
        .ok_or_else(|| AuthError::not_found("No account exists with this id"))?;

    let RoleProfile::Doctor { verified, .. } = &mut record.profile else {
        return Err(AuthError::invalid_request("Target account is not a doctor"));
    };
    *verified = requested;

    record.touch();
    auth.users.update(&record).await?;

    auth.identity
        .set_claims(&record.subject, record.role_claims())
        .await?;

    tracing::info!(
        admin_id = %admin.id(),
        doctor_id = %record.id,
        is_verified = requested,
        "Doctor verification updated"
    );

    Ok(Json(DoctorEnvelope::new(
        &record,
        if requested {
            "Doctor verified"
        } else {
            "Doctor verification revoked"
        },
    )))
}
