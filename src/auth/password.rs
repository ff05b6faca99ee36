//! bcrypt hashing, run on the blocking pool so request tasks never stall on
//! the key schedule.

use super::AuthError;
use std::sync::Arc;
use tokio::task;
use tracing::warn;

/// Work factor used unless configured otherwise.
pub const DEFAULT_COST: u32 = 10;

pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

/// bcrypt only reads this many bytes of a password.
pub const MAX_PASSWORD_BYTES: usize = 72;

const DUMMY_PASSWORD: &str = "healthmate-dummy-password";

#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    // Verified against when the email is unknown, so both login failures cost
    // one bcrypt verification.
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    /// # Errors
    /// Returns [`AuthError::Config`] if `cost` is outside bcrypt's 4..=31 range.
    pub fn new(cost: u32) -> Result<Self, AuthError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(AuthError::Config(format!(
                "bcrypt cost must be between {MIN_COST} and {MAX_COST}, got {cost}"
            )));
        }

        let dummy_hash =
            bcrypt::hash(DUMMY_PASSWORD, cost).map_err(|e| AuthError::Hash(e.to_string()))?;

        Ok(Self {
            cost,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    /// Salt and hash `password`.
    ///
    /// # Errors
    /// Returns [`AuthError::Hash`] if bcrypt fails or the blocking task panics.
    pub async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_string();
        let cost = self.cost;

        task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AuthError::Hash(e.to_string()))?
            .map_err(|e| AuthError::Hash(e.to_string()))
    }

    /// Check `password` against a stored hash. An unparsable hash counts as a
    /// mismatch.
    pub async fn verify(&self, password: &str, hash: &str) -> bool {
        let password = password.to_string();
        let hash = hash.to_string();

        match task::spawn_blocking(move || bcrypt::verify(password, &hash)).await {
            Ok(Ok(matched)) => matched,
            Ok(Err(e)) => {
                warn!("Stored password hash could not be verified: {e}");
                false
            }
            Err(e) => {
                warn!("Password verification task failed: {e}");
                false
            }
        }
    }

    /// Spend the same time as a real verification, discarding the result.
    pub async fn verify_dummy(&self, password: &str) {
        let hash = Arc::clone(&self.dummy_hash);
        let _ = self.verify(password, &hash).await;
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}
