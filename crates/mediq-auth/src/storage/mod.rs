//! Storage traits for user profile data.
//!
//! This module defines the interface for persisting and retrieving user
//! records. Implementations are provided by storage backends (e.g.,
//! `mediq-auth-memory` for development and tests).

pub mod user;

pub use user::{
    MAX_NAME_LEN, Role, RoleProfile, Specialization, UserProfile, UserRecord, UserStore,
    ValidationError, is_valid_email,
};
