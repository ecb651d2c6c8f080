//! User record model and storage trait.
//!
//! The user record is the local half of the identity split: credentials live
//! with the external identity provider, while role, verification and activity
//! state live here, keyed by the provider-assigned subject reference.
//!
//! Role-conditional fields are modeled as a tagged union ([`RoleProfile`]) so
//! a doctor record without credentials is unrepresentable; [`UserRecord::validate`]
//! is the independent storage-layer re-check that implementations must run
//! before every write.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::AuthResult;
use crate::identity::RoleClaims;

/// Maximum length of a display name, in characters.
pub const MAX_NAME_LEN: usize = 100;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));

/// Returns `true` if `email` matches the accepted address shape.
///
/// Intentionally simple: one `@`, no whitespace, a dotted domain. Anything
/// stricter belongs to the identity provider.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

// =============================================================================
// Roles
// =============================================================================

/// The role of a user account.
///
/// `Patient` and `Doctor` are the registrable roles. `Admin` accounts are
/// provisioned out-of-band at server startup and cannot be created through
/// registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A patient account, self-verified at creation.
    Patient,
    /// A doctor account, requiring admin verification.
    Doctor,
    /// An administrative account, seeded from configuration.
    Admin,
}

impl Role {
    /// Returns the lowercase wire form of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Medical specializations a doctor can register under.
///
/// This is a closed set; profile updates carrying anything else are rejected
/// at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Specialization {
    Cardiology,
    Dermatology,
    Endocrinology,
    Gastroenterology,
    GeneralMedicine,
    Neurology,
    Oncology,
    Orthopedics,
    Pediatrics,
    Psychiatry,
    Radiology,
    Urology,
}

impl Specialization {
    /// All accepted specializations, in wire order.
    pub const ALL: &'static [Specialization] = &[
        Self::Cardiology,
        Self::Dermatology,
        Self::Endocrinology,
        Self::Gastroenterology,
        Self::GeneralMedicine,
        Self::Neurology,
        Self::Oncology,
        Self::Orthopedics,
        Self::Pediatrics,
        Self::Psychiatry,
        Self::Radiology,
        Self::Urology,
    ];

    /// Returns the kebab-case wire form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cardiology => "cardiology",
            Self::Dermatology => "dermatology",
            Self::Endocrinology => "endocrinology",
            Self::Gastroenterology => "gastroenterology",
            Self::GeneralMedicine => "general-medicine",
            Self::Neurology => "neurology",
            Self::Oncology => "oncology",
            Self::Orthopedics => "orthopedics",
            Self::Pediatrics => "pediatrics",
            Self::Psychiatry => "psychiatry",
            Self::Radiology => "radiology",
            Self::Urology => "urology",
        }
    }
}

impl std::fmt::Display for Specialization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Specialization {
    type Err = ValidationError;

    /// Parses the kebab-case wire form, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|sp| sp.as_str() == lowered)
            .ok_or(ValidationError::UnknownSpecialization)
    }
}

// =============================================================================
// Role Profile
// =============================================================================

/// Role-specific profile data.
///
/// Exactly one variant holds per record; the doctor credentials exist only
/// inside the `Doctor` variant, so the conditional-required invariant is
/// carried by the type itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleProfile {
    /// Patient profile. Patients are self-verified at creation.
    Patient,

    /// Doctor profile. `verified` starts `false` and may only be flipped by
    /// the admin-gated verification workflow.
    Doctor {
        /// Medical specialization from the closed set.
        specialization: Specialization,
        /// Practice license number.
        #[serde(rename = "licenseNumber")]
        license_number: String,
        /// Medical council registration identifier.
        #[serde(rename = "medicalCouncilRegistration")]
        medical_council_registration: String,
        /// Whether an admin has verified the doctor's credentials.
        #[serde(default)]
        verified: bool,
    },

    /// Admin profile, seeded out-of-band.
    Admin,
}

impl RoleProfile {
    /// Builds an unverified doctor profile.
    #[must_use]
    pub fn doctor(
        specialization: Specialization,
        license_number: impl Into<String>,
        medical_council_registration: impl Into<String>,
    ) -> Self {
        Self::Doctor {
            specialization,
            license_number: license_number.into(),
            medical_council_registration: medical_council_registration.into(),
            verified: false,
        }
    }

    /// Returns the role tag of this profile.
    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Self::Patient => Role::Patient,
            Self::Doctor { .. } => Role::Doctor,
            Self::Admin => Role::Admin,
        }
    }

    /// Returns the verification state of this profile.
    ///
    /// Patients and admins are self-verified by construction; only doctors
    /// carry an explicit flag.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        match self {
            Self::Patient | Self::Admin => true,
            Self::Doctor { verified, .. } => *verified,
        }
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Errors raised by the storage-layer pre-write validation hook.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Display name is empty after trimming.
    #[error("display name must not be empty")]
    EmptyName,

    /// Display name exceeds [`MAX_NAME_LEN`] characters.
    #[error("display name must be at most {MAX_NAME_LEN} characters")]
    NameTooLong,

    /// Email does not match the accepted address shape.
    #[error("email address is malformed")]
    InvalidEmail,

    /// A doctor credential field is empty.
    #[error("doctor record is missing {field}")]
    MissingDoctorField {
        /// Name of the missing field.
        field: &'static str,
    },

    /// Specialization is not in the closed set.
    #[error("unknown specialization")]
    UnknownSpecialization,
}

impl From<ValidationError> for crate::AuthError {
    fn from(err: ValidationError) -> Self {
        Self::invalid_request(err.to_string())
    }
}

// =============================================================================
// User Record
// =============================================================================

/// A user profile record.
///
/// Keyed locally by `id` and externally by `subject`, the opaque reference
/// assigned by the identity provider at account creation. `subject` is never
/// reassigned after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Local record identifier.
    pub id: Uuid,

    /// External identity reference. Immutable once set.
    pub subject: String,

    /// Display name, trimmed, at most [`MAX_NAME_LEN`] characters.
    pub name: String,

    /// Email address, stored lowercase, unique across the store.
    pub email: String,

    /// Role-specific profile data.
    #[serde(flatten)]
    pub profile: RoleProfile,

    /// Optional profile picture URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,

    /// Whether the account is active. Cleared on soft delete.
    pub active: bool,

    /// When the user last logged in.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_login_at: Option<OffsetDateTime>,

    /// When the record was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the record was last saved. Bumped on every mutating save after
    /// creation.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl UserRecord {
    /// Creates a new active record.
    ///
    /// The name is trimmed and the email lowercased; validation is deferred
    /// to [`UserRecord::validate`] so the boundary and the storage layer can
    /// check independently.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        profile: RoleProfile,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            subject: subject.into(),
            name: name.into().trim().to_string(),
            email: email.into().trim().to_ascii_lowercase(),
            profile,
            profile_picture: None,
            active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the role tag of this record.
    #[must_use]
    pub fn role(&self) -> Role {
        self.profile.role()
    }

    /// Returns `true` if the account is verified.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.profile.is_verified()
    }

    /// Returns `true` if the account is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns `true` if this account may act in a medical-advice capacity:
    /// an active, admin-verified doctor. False for every other combination
    /// and for all non-doctor roles.
    #[must_use]
    pub fn can_provide_medical_advice(&self) -> bool {
        matches!(self.profile, RoleProfile::Doctor { verified: true, .. }) && self.active
    }

    /// Returns the custom claims the identity provider should carry for this
    /// record.
    #[must_use]
    pub fn role_claims(&self) -> RoleClaims {
        RoleClaims {
            role: self.role(),
            is_verified: self.is_verified(),
        }
    }

    /// Bumps the `updated_at` timestamp. Call before any mutating save that
    /// is not the initial creation.
    pub fn touch(&mut self) {
        self.updated_at = OffsetDateTime::now_utc();
    }

    /// Records a successful login.
    pub fn touch_login(&mut self) {
        self.last_login_at = Some(OffsetDateTime::now_utc());
        self.touch();
    }

    /// Soft-deletes the record: clears `active` and mangles the email with a
    /// uniqueness-preserving suffix so the original address can be reused by
    /// a new registration.
    pub fn soft_delete(&mut self) {
        let id = self.id.simple().to_string();
        self.email = format!("{}.deleted.{}", self.email, &id[..8]);
        self.active = false;
        self.touch();
    }

    /// Storage-layer pre-write validation hook.
    ///
    /// Store implementations must run this before every insert and update,
    /// independently of boundary validation.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing the first violated invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(ValidationError::NameTooLong);
        }
        // Mangled emails from soft deletes still match the address shape.
        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        if let RoleProfile::Doctor {
            license_number,
            medical_council_registration,
            ..
        } = &self.profile
        {
            if license_number.trim().is_empty() {
                return Err(ValidationError::MissingDoctorField {
                    field: "license number",
                });
            }
            if medical_council_registration.trim().is_empty() {
                return Err(ValidationError::MissingDoctorField {
                    field: "medical council registration",
                });
            }
        }
        Ok(())
    }
}

// =============================================================================
// Sanitized Profile View
// =============================================================================

/// The sanitized, client-facing view of a user record.
///
/// Carries no identity-provider subject and no internal state beyond what the
/// API contract exposes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Local record identifier.
    pub id: Uuid,

    /// Display name.
    pub name: String,

    /// Email address.
    pub email: String,

    /// Account role.
    pub role: Role,

    /// Doctor specialization, present for doctors only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<Specialization>,

    /// Doctor license number, present for doctors only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,

    /// Doctor medical council registration, present for doctors only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_council_registration: Option<String>,

    /// Verification state.
    pub is_verified: bool,

    /// Activity state.
    pub is_active: bool,

    /// Profile picture URL, if set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,

    /// Last login time, if the user has ever logged in.
    #[serde(skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
    pub last_login_at: Option<OffsetDateTime>,

    /// Record creation time.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&UserRecord> for UserProfile {
    fn from(record: &UserRecord) -> Self {
        let (specialization, license_number, medical_council_registration) = match &record.profile {
            RoleProfile::Doctor {
                specialization,
                license_number,
                medical_council_registration,
                ..
            } => (
                Some(*specialization),
                Some(license_number.clone()),
                Some(medical_council_registration.clone()),
            ),
            _ => (None, None, None),
        };

        Self {
            id: record.id,
            name: record.name.clone(),
            email: record.email.clone(),
            role: record.role(),
            specialization,
            license_number,
            medical_council_registration,
            is_verified: record.is_verified(),
            is_active: record.active,
            profile_picture: record.profile_picture.clone(),
            last_login_at: record.last_login_at,
            created_at: record.created_at,
        }
    }
}

// =============================================================================
// User Store Trait
// =============================================================================

/// Storage operations for user records.
///
/// Implementations must enforce uniqueness of `email` (case-insensitive;
/// emails are stored lowercase) and `subject` at write time (the pre-check
/// performed by the registration flow is not a lock), and must run
/// [`UserRecord::validate`] before every write.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a record by its local identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<UserRecord>>;

    /// Finds a record by its external identity reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_subject(&self, subject: &str) -> AuthResult<Option<UserRecord>>;

    /// Finds a record by email, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<UserRecord>>;

    /// Inserts a new record.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Conflict`](crate::AuthError::Conflict) if a record
    /// with the same email or subject already exists,
    /// [`AuthError::InvalidRequest`](crate::AuthError::InvalidRequest) if
    /// validation fails, or a storage error.
    async fn create(&self, record: &UserRecord) -> AuthResult<()>;

    /// Updates an existing record in place.
    ///
    /// The subject of a stored record is never reassigned; implementations
    /// must reject an update that changes it.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotFound`](crate::AuthError::NotFound) if no
    /// record with this id exists, a conflict if the new email collides, a
    /// validation error, or a storage error.
    async fn update(&self, record: &UserRecord) -> AuthResult<()>;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor_record() -> UserRecord {
        UserRecord::new(
            "sub-1",
            "Dr. Asha Rao",
            "asha@hospital.example",
            RoleProfile::doctor(Specialization::Cardiology, "L-1001", "MC-2002"),
        )
    }

    #[test]
    fn test_new_record_normalizes_input() {
        let record = UserRecord::new("sub-1", "  Rohan Mehta  ", "Rohan@X.COM", RoleProfile::Patient);
        assert_eq!(record.name, "Rohan Mehta");
        assert_eq!(record.email, "rohan@x.com");
        assert!(record.active);
        assert!(record.last_login_at.is_none());
    }

    #[test]
    fn test_role_defaults() {
        let patient = UserRecord::new("s", "P", "p@x.com", RoleProfile::Patient);
        assert!(patient.is_verified());
        assert_eq!(patient.role(), Role::Patient);

        let doctor = doctor_record();
        assert!(!doctor.is_verified());
        assert_eq!(doctor.role(), Role::Doctor);

        let admin = UserRecord::new("s", "A", "a@x.com", RoleProfile::Admin);
        assert!(admin.is_verified());
        assert_eq!(admin.role(), Role::Admin);
    }

    #[test]
    fn test_medical_advice_predicate_exhaustive() {
        // All verified x active combinations for a doctor.
        for verified in [false, true] {
            for active in [false, true] {
                let mut record = doctor_record();
                if let RoleProfile::Doctor { verified: v, .. } = &mut record.profile {
                    *v = verified;
                }
                record.active = active;
                assert_eq!(
                    record.can_provide_medical_advice(),
                    verified && active,
                    "verified={verified} active={active}"
                );
            }
        }

        // Patients and admins never qualify, regardless of activity.
        for active in [false, true] {
            let mut patient = UserRecord::new("s", "P", "p@x.com", RoleProfile::Patient);
            patient.active = active;
            assert!(!patient.can_provide_medical_advice());

            let mut admin = UserRecord::new("s", "A", "a@x.com", RoleProfile::Admin);
            admin.active = active;
            assert!(!admin.can_provide_medical_advice());
        }
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        let mut record = doctor_record();
        record.name = "   ".to_string();
        assert_eq!(record.validate(), Err(ValidationError::EmptyName));

        record.name = "x".repeat(MAX_NAME_LEN + 1);
        assert_eq!(record.validate(), Err(ValidationError::NameTooLong));

        record.name = "x".repeat(MAX_NAME_LEN);
        assert_eq!(record.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_bad_email() {
        let mut record = doctor_record();
        record.email = "not-an-email".to_string();
        assert_eq!(record.validate(), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_validate_rejects_empty_doctor_fields() {
        let mut record = doctor_record();
        if let RoleProfile::Doctor { license_number, .. } = &mut record.profile {
            *license_number = "  ".to_string();
        }
        assert_eq!(
            record.validate(),
            Err(ValidationError::MissingDoctorField {
                field: "license number"
            })
        );

        let mut record = doctor_record();
        if let RoleProfile::Doctor {
            medical_council_registration,
            ..
        } = &mut record.profile
        {
            medical_council_registration.clear();
        }
        assert!(matches!(
            record.validate(),
            Err(ValidationError::MissingDoctorField { .. })
        ));
    }

    #[test]
    fn test_soft_delete_mangles_email() {
        let mut record = doctor_record();
        let original = record.email.clone();
        record.soft_delete();

        assert!(!record.active);
        assert_ne!(record.email, original);
        assert!(record.email.starts_with(&original));
        // Mangled address still passes the storage-layer shape check.
        assert_eq!(record.validate(), Ok(()));
    }

    #[test]
    fn test_touch_login_bumps_timestamps() {
        let mut record = doctor_record();
        let created = record.updated_at;
        record.touch_login();
        assert!(record.last_login_at.is_some());
        assert!(record.updated_at >= created);
    }

    #[test]
    fn test_specialization_parse() {
        assert_eq!(
            "Cardiology".parse::<Specialization>(),
            Ok(Specialization::Cardiology)
        );
        assert_eq!(
            "general-medicine".parse::<Specialization>(),
            Ok(Specialization::GeneralMedicine)
        );
        assert_eq!(
            "astrology".parse::<Specialization>(),
            Err(ValidationError::UnknownSpecialization)
        );
    }

    #[test]
    fn test_role_claims_mirror_record() {
        let mut record = doctor_record();
        let claims = record.role_claims();
        assert_eq!(claims.role, Role::Doctor);
        assert!(!claims.is_verified);

        if let RoleProfile::Doctor { verified, .. } = &mut record.profile {
            *verified = true;
        }
        assert!(record.role_claims().is_verified);
    }

    #[test]
    fn test_profile_serialization_shape() {
        let record = doctor_record();
        let profile = UserProfile::from(&record);
        let json = serde_json::to_value(&profile).unwrap();

        assert_eq!(json["role"], "doctor");
        assert_eq!(json["specialization"], "cardiology");
        assert_eq!(json["licenseNumber"], "L-1001");
        assert_eq!(json["medicalCouncilRegistration"], "MC-2002");
        assert_eq!(json["isVerified"], false);
        assert_eq!(json["isActive"], true);
        // The identity-provider subject must never appear in the view.
        assert!(json.get("subject").is_none());

        let patient = UserRecord::new("s", "P", "p@x.com", RoleProfile::Patient);
        let json = serde_json::to_value(UserProfile::from(&patient)).unwrap();
        assert_eq!(json["role"], "patient");
        assert!(json.get("specialization").is_none());
        assert!(json.get("licenseNumber").is_none());
    }

    #[test]
    fn test_record_roundtrip() {
        let record = doctor_record();
        let json = serde_json::to_string(&record).unwrap();
        let back: UserRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.profile, record.profile);
        assert_eq!(back.email, record.email);
        assert_eq!(back.subject, record.subject);
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("a x@y.com"));
        assert!(!is_valid_email("@x.com"));
    }
}
