//! Request and response types for the auth HTTP surface.
//!
//! All responses use the `{success, message?, user?/doctor?}` JSON envelope.
//! Request fields that the contract requires are still `Option` here so a
//! missing field maps to a 400 from the handler rather than a body-decode
//! rejection.

use serde::{Deserialize, Serialize};

use crate::storage::{UserProfile, UserRecord};

// =============================================================================
// Requests
// =============================================================================

/// Body of `POST /auth/register`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name.
    pub name: Option<String>,

    /// Login email address.
    pub email: Option<String>,

    /// Initial password, forwarded to the identity provider.
    pub password: Option<String>,

    /// Requested role: `patient` or `doctor`.
    pub role: Option<String>,

    /// Doctor-only: medical specialization.
    pub specialization: Option<String>,

    /// Doctor-only: practice license number.
    pub license_number: Option<String>,

    /// Doctor-only: medical council registration identifier.
    pub medical_council_registration: Option<String>,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Identity-provider-issued token obtained client-side.
    pub id_token: Option<String>,
}

/// Body of `PUT /auth/profile`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    /// New display name.
    pub name: Option<String>,

    /// New specialization. Applied only to doctor accounts.
    pub specialization: Option<String>,

    /// New profile picture URL.
    pub profile_picture: Option<String>,
}

/// Body of `PUT /auth/change-password`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Replacement password.
    pub new_password: Option<String>,
}

/// Body of `PUT /auth/verify-doctor/{doctorId}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyDoctorRequest {
    /// Desired verification state.
    pub is_verified: Option<bool>,
}

// =============================================================================
// Responses
// =============================================================================

/// Success envelope carrying a user profile.
#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    /// Always `true` on this envelope.
    pub success: bool,

    /// Human-readable outcome description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// The sanitized profile.
    pub user: UserProfile,
}

impl UserEnvelope {
    /// Builds a success envelope from a record.
    #[must_use]
    pub fn new(record: &UserRecord, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            user: UserProfile::from(record),
        }
    }
}

/// Success envelope carrying a doctor profile (verification workflow).
#[derive(Debug, Serialize)]
pub struct DoctorEnvelope {
    /// Always `true` on this envelope.
    pub success: bool,

    /// Human-readable outcome description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// The sanitized doctor profile.
    pub doctor: UserProfile,
}

impl DoctorEnvelope {
    /// Builds a success envelope from a doctor record.
    #[must_use]
    pub fn new(record: &UserRecord, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            doctor: UserProfile::from(record),
        }
    }
}

/// Success envelope with no payload.
#[derive(Debug, Serialize)]
pub struct MessageEnvelope {
    /// Always `true` on this envelope.
    pub success: bool,

    /// Human-readable outcome description.
    pub message: String,
}

impl MessageEnvelope {
    /// Builds a success envelope.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RoleProfile;

    #[test]
    fn test_register_request_tolerates_missing_fields() {
        let req: RegisterRequest = serde_json::from_str("{}").unwrap();
        assert!(req.name.is_none());
        assert!(req.role.is_none());

        let req: RegisterRequest = serde_json::from_str(
            r#"{"name":"A","email":"a@x.com","password":"pw12345","role":"doctor",
                "specialization":"cardiology","licenseNumber":"L1",
                "medicalCouncilRegistration":"M1"}"#,
        )
        .unwrap();
        assert_eq!(req.license_number.as_deref(), Some("L1"));
        assert_eq!(req.medical_council_registration.as_deref(), Some("M1"));
    }

    #[test]
    fn test_envelope_shapes() {
        let record = UserRecord::new("s", "P", "p@x.com", RoleProfile::Patient);

        let json = serde_json::to_value(UserEnvelope::new(&record, "ok")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["user"]["role"], "patient");

        let json = serde_json::to_value(DoctorEnvelope::new(&record, "ok")).unwrap();
        assert!(json.get("user").is_none());
        assert_eq!(json["doctor"]["email"], "p@x.com");

        let json = serde_json::to_value(MessageEnvelope::new("done")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "done");
    }
}
