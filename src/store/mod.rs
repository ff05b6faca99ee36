//! Credential storage.
//!
//! The auth service only sees the [`UserStore`] trait; Postgres is the one
//! production backend. Implementations translate between rows and
//! [`UserRecord`] and nothing else: they do not decide whether an error means
//! "duplicate" or "offline".

pub mod postgres;
pub use self::postgres::PgUserStore;

#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// A row of the `users` table.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"***")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up an account by its (already normalized) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Insert a new account and return the stored row.
    async fn insert(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRecord, StoreError>;
}
