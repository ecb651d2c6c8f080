//! # mediq-auth
//!
//! Authentication and authorization module for the MediQ platform.
//!
//! This crate provides:
//! - An identity-provider adapter contract with a closed error enum
//! - The user record model with role-conditional invariants
//! - Bearer authentication extractors and role/ownership gates
//! - HTTP handlers for registration, login, profile lifecycle and doctor
//!   verification
//!
//! ## Overview
//!
//! Credentials live with an external identity provider; the local store owns
//! role, verification and activity state, keyed by the provider-assigned
//! subject reference. Every dual write across the two systems is two
//! sequential calls with no distributed transaction; the consistency
//! posture is documented in `DESIGN.md`.
//!
//! ## Modules
//!
//! - [`config`] - Auth policy configuration
//! - [`error`] - Error taxonomy
//! - [`http`] - Axum HTTP handlers for the `/auth` surface
//! - [`identity`] - Identity provider adapter contract
//! - [`middleware`] - Authentication extractors and authorization gates
//! - [`storage`] - User record model and storage trait

pub mod config;
pub mod error;
pub mod http;
pub mod identity;
pub mod middleware;
pub mod storage;

pub use config::AuthConfig;
pub use error::{AuthError, ErrorCategory};
pub use http::{
    change_password_handler, delete_account_handler, get_profile_handler, login_handler,
    logout_handler, register_handler, update_profile_handler, verify_doctor_handler,
};
pub use identity::{
    AccountUpdate, IdentityError, IdentityProvider, NewAccount, RoleClaims, VerifiedToken,
};
pub use middleware::{
    AdminAuth, AuthState, AuthedUser, BearerAuth, DoctorAuth, OptionalBearerAuth, PatientAuth,
    VerifiedDoctorAuth, require_owner_or_admin,
};
pub use storage::{
    Role, RoleProfile, Specialization, UserProfile, UserRecord, UserStore, ValidationError,
};

/// Type alias for authentication/authorization results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use mediq_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::AuthConfig;
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::http::{
        change_password_handler, delete_account_handler, get_profile_handler, login_handler,
        logout_handler, register_handler, update_profile_handler, verify_doctor_handler,
    };
    pub use crate::identity::{
        AccountUpdate, IdentityError, IdentityProvider, NewAccount, RoleClaims, VerifiedToken,
    };
    pub use crate::middleware::{
        AdminAuth, AuthState, AuthedUser, BearerAuth, DoctorAuth, OptionalBearerAuth, PatientAuth,
        VerifiedDoctorAuth, require_owner_or_admin,
    };
    pub use crate::storage::{
        Role, RoleProfile, Specialization, UserProfile, UserRecord, UserStore, ValidationError,
    };
}
