//! In-memory identity provider.
//!
//! Issues opaque bearer tokens of the form `{subject}.{generation}.{expiry}`
//! bound to a per-account revocation generation: revoking sessions bumps the
//! generation and every outstanding token stops verifying. Provider-side
//! credential rules mirror the external service this stands in for: a
//! well-formed email, a password of at least six characters, one account per
//! address.

use std::collections::HashMap;
use std::sync::RwLock;

use time::OffsetDateTime;
use uuid::Uuid;

use mediq_auth::identity::{
    AccountUpdate, IdentityError, IdentityProvider, NewAccount, RoleClaims, VerifiedToken,
};
use mediq_auth::storage::is_valid_email;

/// Provider-side minimum password length.
const PROVIDER_MIN_PASSWORD: usize = 6;

/// Default token lifetime in seconds.
const TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Clone)]
struct AccountEntry {
    email: String,
    password: String,
    display_name: String,
    claims: Option<RoleClaims>,
    /// Bumped on session revocation; tokens carry the generation they were
    /// issued under.
    generation: u64,
}

/// An in-memory [`IdentityProvider`].
#[derive(Debug, Default)]
pub struct MemoryIdentityProvider {
    accounts: RwLock<HashMap<String, AccountEntry>>,
}

impl MemoryIdentityProvider {
    /// Creates a provider with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh token for the subject, valid for one hour.
    ///
    /// This stands in for the client-side credential exchange against the
    /// real provider; the backend itself never calls it.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::NotFound`] if no account exists.
    pub fn issue_token(&self, subject: &str) -> Result<String, IdentityError> {
        self.issue_token_with_lifetime(subject, TOKEN_LIFETIME_SECS)
    }

    /// Issues a token with an explicit lifetime in seconds (negative for an
    /// already-expired token).
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::NotFound`] if no account exists.
    pub fn issue_token_with_lifetime(
        &self,
        subject: &str,
        lifetime_secs: i64,
    ) -> Result<String, IdentityError> {
        let accounts = self.lock_read()?;
        let entry = accounts.get(subject).ok_or(IdentityError::NotFound)?;
        let expiry = OffsetDateTime::now_utc().unix_timestamp() + lifetime_secs;
        Ok(format!("{subject}.{}.{expiry}", entry.generation))
    }

    /// Looks up the subject registered for an email address.
    #[must_use]
    pub fn subject_for_email(&self, email: &str) -> Option<String> {
        let accounts = self.accounts.read().ok()?;
        accounts
            .iter()
            .find(|(_, entry)| entry.email.eq_ignore_ascii_case(email))
            .map(|(subject, _)| subject.clone())
    }

    /// Returns `true` if an account exists for the subject.
    #[must_use]
    pub fn account_exists(&self, subject: &str) -> bool {
        self.accounts
            .read()
            .map(|a| a.contains_key(subject))
            .unwrap_or(false)
    }

    /// Returns the claims currently carried for the subject, if any.
    #[must_use]
    pub fn claims_for(&self, subject: &str) -> Option<RoleClaims> {
        let accounts = self.accounts.read().ok()?;
        accounts.get(subject).and_then(|entry| entry.claims)
    }

    /// Returns the display name carried for the subject, if any.
    #[must_use]
    pub fn display_name_for(&self, subject: &str) -> Option<String> {
        let accounts = self.accounts.read().ok()?;
        accounts.get(subject).map(|entry| entry.display_name.clone())
    }

    /// Checks an email/password pair, standing in for the client-side
    /// credential exchange against the real provider.
    #[must_use]
    pub fn verify_password(&self, email: &str, password: &str) -> bool {
        self.accounts
            .read()
            .map(|accounts| {
                accounts
                    .values()
                    .any(|e| e.email.eq_ignore_ascii_case(email) && e.password == password)
            })
            .unwrap_or(false)
    }

    fn lock_read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, AccountEntry>>, IdentityError> {
        self.accounts
            .read()
            .map_err(|_| IdentityError::Unavailable("account table lock poisoned".to_string()))
    }

    fn lock_write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, AccountEntry>>, IdentityError> {
        self.accounts
            .write()
            .map_err(|_| IdentityError::Unavailable("account table lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn create_account(&self, account: &NewAccount) -> Result<String, IdentityError> {
        let email = account.email.trim().to_ascii_lowercase();
        if !is_valid_email(&email) {
            return Err(IdentityError::InvalidEmail);
        }
        if account.password.chars().count() < PROVIDER_MIN_PASSWORD {
            return Err(IdentityError::WeakPassword);
        }

        let mut accounts = self.lock_write()?;
        if accounts
            .values()
            .any(|entry| entry.email.eq_ignore_ascii_case(&email))
        {
            return Err(IdentityError::EmailExists);
        }

        let subject = Uuid::new_v4().simple().to_string();
        accounts.insert(
            subject.clone(),
            AccountEntry {
                email,
                password: account.password.clone(),
                display_name: account.display_name.clone(),
                claims: None,
                generation: 0,
            },
        );

        tracing::debug!(subject = %subject, "Provider account created");
        Ok(subject)
    }

    async fn verify_token(&self, token: &str) -> Result<VerifiedToken, IdentityError> {
        let mut parts = token.split('.');
        let (Some(subject), Some(generation), Some(expiry), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(IdentityError::InvalidToken("malformed token".to_string()));
        };
        let generation: u64 = generation
            .parse()
            .map_err(|_| IdentityError::InvalidToken("malformed token".to_string()))?;
        let expiry: i64 = expiry
            .parse()
            .map_err(|_| IdentityError::InvalidToken("malformed token".to_string()))?;

        let accounts = self.lock_read()?;
        let Some(entry) = accounts.get(subject) else {
            return Err(IdentityError::InvalidToken("unknown subject".to_string()));
        };

        if expiry < OffsetDateTime::now_utc().unix_timestamp() {
            return Err(IdentityError::TokenExpired);
        }
        if generation != entry.generation {
            return Err(IdentityError::TokenRevoked);
        }

        Ok(VerifiedToken {
            subject: subject.to_string(),
            email: Some(entry.email.clone()),
            claims: entry.claims,
        })
    }

    async fn set_claims(&self, subject: &str, claims: RoleClaims) -> Result<(), IdentityError> {
        let mut accounts = self.lock_write()?;
        let entry = accounts.get_mut(subject).ok_or(IdentityError::NotFound)?;
        entry.claims = Some(claims);
        Ok(())
    }

    async fn update_account(
        &self,
        subject: &str,
        update: &AccountUpdate,
    ) -> Result<(), IdentityError> {
        if let Some(password) = &update.password
            && password.chars().count() < PROVIDER_MIN_PASSWORD
        {
            return Err(IdentityError::WeakPassword);
        }

        let mut accounts = self.lock_write()?;
        let entry = accounts.get_mut(subject).ok_or(IdentityError::NotFound)?;

        if let Some(display_name) = &update.display_name {
            entry.display_name = display_name.clone();
        }
        if let Some(password) = &update.password {
            entry.password = password.clone();
        }
        Ok(())
    }

    async fn delete_account(&self, subject: &str) -> Result<(), IdentityError> {
        let mut accounts = self.lock_write()?;
        accounts
            .remove(subject)
            .map(|_| ())
            .ok_or(IdentityError::NotFound)
    }

    async fn revoke_sessions(&self, subject: &str) -> Result<(), IdentityError> {
        let mut accounts = self.lock_write()?;
        let entry = accounts.get_mut(subject).ok_or(IdentityError::NotFound)?;
        entry.generation += 1;
        tracing::debug!(subject = %subject, generation = entry.generation, "Sessions revoked");
        Ok(())
    }
}
