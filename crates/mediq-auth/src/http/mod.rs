//! HTTP handlers for the `/auth` surface.
//!
//! # Available Handlers
//!
//! - [`register`] - `POST /auth/register`
//! - [`login`] - `POST /auth/login`
//! - [`profile`] - `GET`/`PUT /auth/profile`, `PUT /auth/change-password`,
//!   `POST /auth/logout`, `DELETE /auth/account`
//! - [`verify`] - `PUT /auth/verify-doctor/{doctorId}`

pub mod login;
pub mod profile;
pub mod register;
pub mod types;
pub mod verify;

pub use login::login_handler;
pub use profile::{
    change_password_handler, delete_account_handler, get_profile_handler, logout_handler,
    update_profile_handler,
};
pub use register::register_handler;
pub use types::{
    ChangePasswordRequest, DoctorEnvelope, LoginRequest, MessageEnvelope, RegisterRequest,
    UpdateProfileRequest, UserEnvelope, VerifyDoctorRequest,
};
pub use verify::verify_doctor_handler;
