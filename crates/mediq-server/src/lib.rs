//! # mediq-server
//!
//! HTTP server for the MediQ authentication service: configuration loading,
//! tracing setup, startup seeding and router construction over the
//! `mediq-auth` handlers with in-memory backends.

use std::sync::Arc;

use axum::Router;

use mediq_auth::middleware::AuthState;
use mediq_auth_memory::{MemoryIdentityProvider, MemoryUserStore};

pub mod bootstrap;
pub mod config;
pub mod observability;
pub mod routes;
pub mod state;

pub use config::{ConfigError, DEFAULT_CONFIG_PATH, ServerConfig, load_config};
pub use state::AppState;

/// Handles to the backends an application was built over.
///
/// Exposed so tests and tooling can mint tokens and inspect provider state
/// directly.
pub struct Backends {
    /// The identity provider handle.
    pub identity: Arc<MemoryIdentityProvider>,

    /// The user store handle.
    pub users: Arc<MemoryUserStore>,
}

/// Builds the application router, seeding configured admin accounts.
///
/// # Errors
///
/// Returns an error if admin seeding fails.
pub async fn build_app(config: &ServerConfig) -> anyhow::Result<Router> {
    let (router, _backends) = build_app_with_backends(config).await?;
    Ok(router)
}

/// Builds the application router and returns the backend handles alongside.
///
/// # Errors
///
/// Returns an error if admin seeding fails.
pub async fn build_app_with_backends(
    config: &ServerConfig,
) -> anyhow::Result<(Router, Backends)> {
    let identity = Arc::new(MemoryIdentityProvider::new());
    let users = Arc::new(MemoryUserStore::new());

    let auth = AuthState::new(identity.clone(), users.clone()).with_config(config.auth.clone());

    bootstrap::seed_admins(&auth, &config.seed.admins).await?;

    let router = routes::build_router(AppState { auth });

    Ok((router, Backends { identity, users }))
}
