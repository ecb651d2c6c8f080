//! In-memory user record store.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use mediq_auth::storage::{UserRecord, UserStore};
use mediq_auth::{AuthError, AuthResult};

/// An in-memory [`UserStore`] backed by a `HashMap` under an `RwLock`.
///
/// Uniqueness of `email` and `subject` is enforced at write time under the
/// write lock, which is what makes concurrent duplicate registrations
/// mutually exclusive. The pre-write validation hook
/// ([`UserRecord::validate`]) runs on every insert and update.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    records: RwLock<HashMap<Uuid, UserRecord>>,
}

impl MemoryUserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    /// Returns `true` if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<UserRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| AuthError::storage("user store lock poisoned"))?;
        Ok(records.get(&id).cloned())
    }

    async fn find_by_subject(&self, subject: &str) -> AuthResult<Option<UserRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| AuthError::storage("user store lock poisoned"))?;
        Ok(records.values().find(|r| r.subject == subject).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<UserRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| AuthError::storage("user store lock poisoned"))?;
        Ok(records
            .values()
            .find(|r| r.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, record: &UserRecord) -> AuthResult<()> {
        record.validate()?;

        let mut records = self
            .records
            .write()
            .map_err(|_| AuthError::storage("user store lock poisoned"))?;

        if records.contains_key(&record.id) {
            return Err(AuthError::conflict("a record with this id already exists"));
        }
        if records
            .values()
            .any(|r| r.email.eq_ignore_ascii_case(&record.email))
        {
            return Err(AuthError::conflict(
                "an account with this email already exists",
            ));
        }
        if records.values().any(|r| r.subject == record.subject) {
            return Err(AuthError::conflict(
                "an account with this identity already exists",
            ));
        }

        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn update(&self, record: &UserRecord) -> AuthResult<()> {
        record.validate()?;

        let mut records = self
            .records
            .write()
            .map_err(|_| AuthError::storage("user store lock poisoned"))?;

        let Some(existing) = records.get(&record.id) else {
            return Err(AuthError::not_found("no record exists with this id"));
        };

        // The external identity reference is immutable once set.
        if existing.subject != record.subject {
            return Err(AuthError::internal(
                "attempted to reassign an identity reference",
            ));
        }

        if records
            .values()
            .any(|r| r.id != record.id && r.email.eq_ignore_ascii_case(&record.email))
        {
            return Err(AuthError::conflict(
                "an account with this email already exists",
            ));
        }

        records.insert(record.id, record.clone());
        Ok(())
    }
}
