//! Profile lifecycle handlers: get, update, change-password, logout, delete.
//!
//! Operations that touch both the identity provider and the local store do
//! so as two sequential, non-atomic calls. Write ordering matters and is
//! noted per handler; there is no compensating transaction anywhere here.

use axum::{Json, extract::State};

use crate::error::AuthError;
use crate::identity::{AccountUpdate, IdentityProvider};
use crate::middleware::{AuthState, BearerAuth};
use crate::storage::{MAX_NAME_LEN, RoleProfile, Specialization, UserStore};

use super::types::{ChangePasswordRequest, MessageEnvelope, UpdateProfileRequest, UserEnvelope};

/// Handler for `GET /auth/profile`.
///
/// Returns the already-resolved principal, sanitized.
pub async fn get_profile_handler(BearerAuth(user): BearerAuth) -> Json<UserEnvelope> {
    Json(UserEnvelope::new(&user.record, "Profile fetched"))
}

/// Handler for `PUT /auth/profile`.
///
/// Applies the local write first, then mirrors the display name to the
/// identity provider if it changed. A dual write with no compensation.
///
/// # Errors
///
/// - 400 if the new name is empty/over-long, or the specialization is not in
///   the closed set
/// - 500 on store or provider failure
pub async fn update_profile_handler(
    State(auth): State<AuthState>,
    BearerAuth(user): BearerAuth,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserEnvelope>, AuthError> {
    let mut record = user.record.clone();
    let mut name_changed = false;

    if let Some(name) = req.name.as_deref() {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::invalid_request("name must not be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(AuthError::invalid_request(format!(
                "name must be at most {MAX_NAME_LEN} characters"
            )));
        }
        if name != record.name {
            record.name = name.to_string();
            name_changed = true;
        }
    }

    // Specialization changes apply to doctors only; the field is ignored for
    // other roles. An unknown value is rejected either way.
    if let Some(requested) = req.specialization.as_deref() {
        let requested: Specialization = requested
            .parse()
            .map_err(|_| AuthError::invalid_request("unknown specialization"))?;
        if let RoleProfile::Doctor { specialization, .. } = &mut record.profile {
            *specialization = requested;
        }
    }

    if let Some(picture) = req.profile_picture.as_deref() {
        record.profile_picture = Some(picture.to_string());
    }

    record.touch();
    auth.users.update(&record).await?;

    if name_changed {
        auth.identity
            .update_account(user.subject(), &AccountUpdate::display_name(&record.name))
            .await?;
    }

    tracing::debug!(user_id = %record.id, "Profile updated");

    Ok(Json(UserEnvelope::new(&record, "Profile updated")))
}

/// Handler for `PUT /auth/change-password`.
///
/// The password change is delegated entirely to the identity provider (no
/// local password storage); all outstanding sessions are then revoked so
/// the old credential cannot continue to authenticate.
///
/// # Errors
///
/// - 400 if the new password is shorter than the configured minimum
/// - 500 on provider failure
pub async fn change_password_handler(
    State(auth): State<AuthState>,
    BearerAuth(user): BearerAuth,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageEnvelope>, AuthError> {
    let min = auth.config.password_min_length;
    let password = req
        .new_password
        .as_deref()
        .filter(|p| p.chars().count() >= min)
        .ok_or_else(|| {
            AuthError::invalid_request(format!("password must be at least {min} characters"))
        })?;

    auth.identity
        .update_account(user.subject(), &AccountUpdate::password(password))
        .await?;

    auth.identity.revoke_sessions(user.subject()).await?;

    tracing::info!(user_id = %user.id(), "Password rotated and sessions revoked");

    Ok(Json(MessageEnvelope::new("Password updated")))
}

/// Handler for `POST /auth/logout`.
///
/// Revokes all refresh sessions at the identity provider; no local state
/// changes.
///
/// # Errors
///
/// - 500 on provider failure
pub async fn logout_handler(
    State(auth): State<AuthState>,
    BearerAuth(user): BearerAuth,
) -> Result<Json<MessageEnvelope>, AuthError> {
    auth.identity.revoke_sessions(user.subject()).await?;

    tracing::debug!(user_id = %user.id(), "Logged out");

    Ok(Json(MessageEnvelope::new("Logged out")))
}

/// Handler for `DELETE /auth/account`.
///
/// Hard-deletes the identity provider account, then soft-deletes the local
/// record (inactive, email mangled so the address can be reused). If the
/// local write fails after the provider delete, the record is left pointing
/// at a deleted identity, a documented gap surfaced as a 500.
///
/// # Errors
///
/// - 500 on provider or store failure
pub async fn delete_account_handler(
    State(auth): State<AuthState>,
    BearerAuth(user): BearerAuth,
) -> Result<Json<MessageEnvelope>, AuthError> {
    auth.identity.delete_account(user.subject()).await?;

    let mut record = user.record.clone();
    record.soft_delete();
    if let Err(e) = auth.users.update(&record).await {
        tracing::error!(
            user_id = %record.id,
            error = %e,
            "Soft delete failed after provider account deletion"
        );
        return Err(e);
    }

    tracing::info!(user_id = %record.id, "Account deleted");

    Ok(Json(MessageEnvelope::new("Account deleted")))
}
