//! HTTP middleware for authentication and authorization.
//!
//! - [`auth`] - Bearer token extractors resolving the local principal
//! - [`gates`] - Role/ownership predicates layered on the principal
//! - [`error`] - `IntoResponse` mapping of [`AuthError`](crate::AuthError)

pub mod auth;
pub mod error;
pub mod gates;

pub use auth::{AuthState, AuthedUser, BearerAuth, OptionalBearerAuth};
pub use gates::{AdminAuth, DoctorAuth, PatientAuth, VerifiedDoctorAuth, require_owner_or_admin};
