//! Identity provider error type.
//!
//! A closed tagged enum covering every outcome the adapter contract can
//! produce. The [`From`] conversion into [`AuthError`] is the single place
//! where provider failures meet the HTTP error taxonomy.

use crate::AuthError;

/// Errors returned by an [`IdentityProvider`](super::IdentityProvider).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// An account with this email already exists at the provider.
    #[error("email is already registered with the identity provider")]
    EmailExists,

    /// The provider rejected the email address as malformed.
    #[error("identity provider rejected the email address")]
    InvalidEmail,

    /// The provider rejected the password as too weak.
    #[error("identity provider rejected the password")]
    WeakPassword,

    /// The presented token has expired.
    #[error("token expired")]
    TokenExpired,

    /// The presented token belongs to a revoked session.
    #[error("token revoked")]
    TokenRevoked,

    /// The presented token is malformed or otherwise unverifiable.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// No provider account exists for the given subject.
    #[error("no identity provider account for subject")]
    NotFound,

    /// The provider failed in a way not covered above.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

impl From<IdentityError> for AuthError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::EmailExists => {
                Self::conflict("an account with this email already exists")
            }
            IdentityError::InvalidEmail => Self::invalid_request("email address is malformed"),
            IdentityError::WeakPassword => {
                Self::invalid_request("password was rejected as too weak")
            }
            IdentityError::TokenExpired => Self::TokenExpired,
            IdentityError::TokenRevoked => Self::TokenRevoked,
            IdentityError::InvalidToken(message) => Self::unauthorized(message),
            // A missing upstream account during a profile operation means the
            // two stores have diverged; surface as a server-side failure.
            IdentityError::NotFound => {
                Self::identity_provider("identity provider account is missing")
            }
            IdentityError::Unavailable(message) => Self::identity_provider(message),
        }
    }
}
