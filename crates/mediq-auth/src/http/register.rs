//! Registration handler.
//!
//! Two-phase creation: the identity provider account first, then the local
//! record. There is no compensating transaction between the phases: a
//! failure after the provider write leaves an orphaned provider account,
//! which is logged and surfaced per the error taxonomy but not rolled back.

use axum::{Json, extract::State, http::StatusCode};

use crate::error::AuthError;
use crate::identity::{IdentityProvider, NewAccount};
use crate::middleware::AuthState;
use crate::storage::{
    MAX_NAME_LEN, RoleProfile, Specialization, UserRecord, UserStore, is_valid_email,
};

use super::types::{RegisterRequest, UserEnvelope};

/// Handler for `POST /auth/register`.
///
/// # Errors
///
/// - 400 if a required field is missing, the role is not `patient`/`doctor`,
///   a doctor field is absent, or the provider rejects email/password
/// - 409 if the email is already registered locally or at the provider
/// - 500 on any other provider or storage failure
pub async fn register_handler(
    State(auth): State<AuthState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserEnvelope>), AuthError> {
    let input = validate_registration(&req)?;

    // Pre-check. Not a lock: the store's unique index is what actually
    // guarantees exclusion under concurrent submission.
    if auth.users.find_by_email(&input.email).await?.is_some() {
        return Err(AuthError::conflict(
            "an account with this email already exists",
        ));
    }

    let subject = auth
        .identity
        .create_account(&NewAccount {
            email: input.email.clone(),
            password: input.password,
            display_name: input.name.clone(),
        })
        .await?;

    let record = UserRecord::new(subject.clone(), input.name, input.email, input.profile);

    if let Err(e) = auth.users.create(&record).await {
        // Phase two failed after phase one succeeded; the provider account
        // is now orphaned (known consistency gap, no rollback).
        tracing::warn!(
            subject = %subject,
            error = %e,
            "Local record creation failed after provider account creation"
        );
        return Err(e);
    }

    auth.identity
        .set_claims(&subject, record.role_claims())
        .await?;

    tracing::info!(
        user_id = %record.id,
        role = %record.role(),
        "User registered"
    );

    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope::new(&record, "Registration successful")),
    ))
}

/// Validated registration input.
struct RegistrationInput {
    name: String,
    email: String,
    password: String,
    profile: RoleProfile,
}

/// Boundary validation for the registration payload.
///
/// This is the request-side half of the conditional-required check; the
/// storage layer independently re-validates via [`UserRecord::validate`].
fn validate_registration(req: &RegisterRequest) -> Result<RegistrationInput, AuthError> {
    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    let email = req.email.as_deref().map(str::trim).unwrap_or_default();
    let password = req.password.as_deref().unwrap_or_default();
    let role = req.role.as_deref().map(str::trim).unwrap_or_default();

    if name.is_empty() || email.is_empty() || password.is_empty() || role.is_empty() {
        return Err(AuthError::invalid_request(
            "name, email, password and role are required",
        ));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(AuthError::invalid_request(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }

    let email = email.to_ascii_lowercase();
    if !is_valid_email(&email) {
        return Err(AuthError::invalid_request("email address is malformed"));
    }

    // Only patient and doctor are registrable; admin accounts are seeded
    // out-of-band.
    let profile = match role.to_ascii_lowercase().as_str() {
        "patient" => RoleProfile::Patient,
        "doctor" => {
            let specialization = req
                .specialization
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty());
            let license = req
                .license_number
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty());
            let registration = req
                .medical_council_registration
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty());

            let (Some(specialization), Some(license), Some(registration)) =
                (specialization, license, registration)
            else {
                return Err(AuthError::invalid_request(
                    "doctors must provide specialization, license number and medical council registration",
                ));
            };

            let specialization: Specialization = specialization
                .parse()
                .map_err(|_| AuthError::invalid_request("unknown specialization"))?;

            RoleProfile::doctor(specialization, license, registration)
        }
        _ => {
            return Err(AuthError::invalid_request(
                "role must be either patient or doctor",
            ));
        }
    };

    Ok(RegistrationInput {
        name: name.to_string(),
        email,
        password: password.to_string(),
        profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor_request() -> RegisterRequest {
        RegisterRequest {
            name: Some("Dr. Asha Rao".to_string()),
            email: Some("asha@hospital.example".to_string()),
            password: Some("pw12345".to_string()),
            role: Some("doctor".to_string()),
            specialization: Some("cardiology".to_string()),
            license_number: Some("L-1001".to_string()),
            medical_council_registration: Some("MC-2002".to_string()),
        }
    }

    #[test]
    fn test_missing_required_fields() {
        for strip in ["name", "email", "password", "role"] {
            let mut req = doctor_request();
            match strip {
                "name" => req.name = None,
                "email" => req.email = None,
                "password" => req.password = None,
                _ => req.role = None,
            }
            let err = validate_registration(&req).map(|_| ()).unwrap_err();
            assert!(matches!(err, AuthError::InvalidRequest { .. }), "{strip}");
        }
    }

    #[test]
    fn test_invalid_role_rejected() {
        for role in ["admin", "nurse", ""] {
            let mut req = doctor_request();
            req.role = Some(role.to_string());
            assert!(validate_registration(&req).is_err(), "role={role}");
        }
    }

    #[test]
    fn test_doctor_fields_required_for_doctors_only() {
        for strip in [
            "specialization",
            "license_number",
            "medical_council_registration",
        ] {
            let mut req = doctor_request();
            match strip {
                "specialization" => req.specialization = None,
                "license_number" => req.license_number = Some("   ".to_string()),
                _ => req.medical_council_registration = None,
            }
            let err = validate_registration(&req).map(|_| ()).unwrap_err();
            assert!(matches!(err, AuthError::InvalidRequest { .. }), "{strip}");
        }

        // The same payload without doctor fields is fine for a patient.
        let req = RegisterRequest {
            role: Some("patient".to_string()),
            specialization: None,
            license_number: None,
            medical_council_registration: None,
            ..doctor_request()
        };
        let input = validate_registration(&req).unwrap();
        assert_eq!(input.profile, RoleProfile::Patient);
    }

    #[test]
    fn test_unknown_specialization_rejected() {
        let mut req = doctor_request();
        req.specialization = Some("astrology".to_string());
        assert!(validate_registration(&req).is_err());
    }

    #[test]
    fn test_email_normalized_and_checked() {
        let mut req = doctor_request();
        req.email = Some("Asha@Hospital.Example".to_string());
        let input = validate_registration(&req).unwrap();
        assert_eq!(input.email, "asha@hospital.example");

        req.email = Some("not-an-email".to_string());
        assert!(validate_registration(&req).is_err());
    }

    #[test]
    fn test_doctor_profile_is_unverified() {
        let input = validate_registration(&doctor_request()).unwrap();
        assert!(matches!(
            input.profile,
            RoleProfile::Doctor {
                verified: false,
                specialization: Specialization::Cardiology,
                ..
            }
        ));
    }

    #[test]
    fn test_name_length_boundary() {
        let mut req = doctor_request();
        req.name = Some("x".repeat(MAX_NAME_LEN));
        assert!(validate_registration(&req).is_ok());

        req.name = Some("x".repeat(MAX_NAME_LEN + 1));
        assert!(validate_registration(&req).is_err());
    }
}
