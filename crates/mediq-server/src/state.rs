//! Application state.

use axum::extract::FromRef;
use mediq_auth::middleware::AuthState;

/// Shared state for the HTTP application.
///
/// Constructed once at startup with explicitly injected backend handles;
/// extractors project the pieces they need via `FromRef`.
#[derive(Clone)]
pub struct AppState {
    /// Authentication state (identity provider + user store + policy).
    pub auth: AuthState,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
