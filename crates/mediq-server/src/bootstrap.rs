//! Startup seeding.
//!
//! Admin accounts are not registrable through the HTTP surface; they are
//! ensured to exist here, once, at process start. Seeding is idempotent: an
//! existing local record with the configured email is left untouched.

use mediq_auth::identity::{IdentityError, IdentityProvider, NewAccount};
use mediq_auth::middleware::AuthState;
use mediq_auth::storage::{RoleProfile, UserRecord, UserStore};
use mediq_auth::{AuthError, AuthResult};

use crate::config::AdminSeed;

/// Ensures each configured admin account exists.
///
/// # Errors
///
/// Returns an error on store or provider failure. A provider account that
/// already exists without a local record is logged and skipped rather than
/// adopted; resolving that divergence is an operator task.
pub async fn seed_admins(auth: &AuthState, admins: &[AdminSeed]) -> AuthResult<()> {
    for admin in admins {
        let email = admin.email.trim().to_ascii_lowercase();

        if auth.users.find_by_email(&email).await?.is_some() {
            tracing::debug!(email = %email, "Admin already present, skipping seed");
            continue;
        }

        let subject = match auth
            .identity
            .create_account(&NewAccount {
                email: email.clone(),
                password: admin.password.clone(),
                display_name: admin.name.clone(),
            })
            .await
        {
            Ok(subject) => subject,
            Err(IdentityError::EmailExists) => {
                tracing::warn!(
                    email = %email,
                    "Provider account exists without a local admin record, skipping seed"
                );
                continue;
            }
            Err(e) => return Err(AuthError::from(e)),
        };

        let record = UserRecord::new(subject.clone(), admin.name.clone(), email, RoleProfile::Admin);
        auth.users.create(&record).await?;
        auth.identity
            .set_claims(&subject, record.role_claims())
            .await?;

        tracing::info!(user_id = %record.id, email = %record.email, "Admin account seeded");
    }

    Ok(())
}
