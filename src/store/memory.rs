use super::{StoreError, UserRecord, UserStore};
use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use tokio::sync::Barrier;

/// Test double that keeps rows in a vector and rejects duplicate emails the
/// way the `UNIQUE` constraint does.
#[derive(Debug, Default)]
pub(crate) struct MemoryUserStore {
    rows: Mutex<Vec<UserRecord>>,
    offline: AtomicBool,
    lookup_barrier: Option<Arc<Barrier>>,
}

impl MemoryUserStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Hold every lookup until `callers` lookups are in flight, so that many
    /// registrations of the same email all pass the existence check.
    pub(crate) fn racing(callers: usize) -> Self {
        Self {
            lookup_barrier: Some(Arc::new(Barrier::new(callers))),
            ..Self::default()
        }
    }

    /// Make every subsequent call fail like a lost connection.
    pub(crate) fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub(crate) fn rows(&self) -> Vec<UserRecord> {
        self.rows.lock().map(|rows| rows.clone()).unwrap_or_default()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        self.check_online()?;
        let found = self
            .rows
            .lock()
            .map_err(|_| StoreError::Database(sqlx::Error::PoolClosed))?
            .iter()
            .find(|row| row.email == email)
            .cloned();

        if let Some(barrier) = &self.lookup_barrier {
            barrier.wait().await;
        }

        Ok(found)
    }

    async fn insert(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRecord, StoreError> {
        self.check_online()?;
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| StoreError::Database(sqlx::Error::PoolClosed))?;
        if rows.iter().any(|row| row.email == email) {
            return Err(StoreError::Database(sqlx::Error::Protocol(format!(
                "duplicate key value violates unique constraint \"users_email_key\": {email}"
            ))));
        }

        let record = UserRecord {
            id: i64::try_from(rows.len()).unwrap_or(i64::MAX) + 1,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        };
        rows.push(record.clone());
        Ok(record)
    }
}
