//! Registration and login.

mod error;
pub use self::error::AuthError;

pub mod password;
pub use self::password::{PasswordHasher, MAX_PASSWORD_BYTES};

pub mod token;
pub use self::token::{TokenClaims, TokenIssuer};

use crate::store::{UserRecord, UserStore};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

/// Account fields that may leave the service.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<UserRecord> for PublicUser {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: PublicUser,
}

#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
}

impl AuthService {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher, tokens: TokenIssuer) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    #[must_use]
    pub const fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Create an account.
    ///
    /// # Errors
    /// - [`AuthError::Validation`] if a field is empty or the email is malformed
    /// - [`AuthError::DuplicateEmail`] if the email is already registered
    /// - [`AuthError::Storage`] / [`AuthError::Hash`] on infrastructure failures
    #[instrument(skip(self, name, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<PublicUser, AuthError> {
        let name = name.trim();
        let email = normalize_email(email);

        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Name, email and password are required".to_string(),
            ));
        }

        if !valid_email(&email) {
            return Err(AuthError::Validation("Invalid email".to_string()));
        }

        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AuthError::Validation(format!(
                "Password must be at most {MAX_PASSWORD_BYTES} bytes"
            )));
        }

        if self.store.find_by_email(&email).await?.is_some() {
            debug!("Email already registered");
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self.hasher.hash(password).await?;

        // Not atomic with the lookup above; the UNIQUE constraint on
        // users.email rejects the second of two concurrent inserts.
        let record = self.store.insert(name, &email, &password_hash).await?;

        info!(user_id = record.id, "User registered");

        Ok(record.into())
    }

    /// Check credentials and issue a bearer token.
    ///
    /// Unknown email and wrong password both return
    /// [`AuthError::InvalidCredentials`].
    ///
    /// # Errors
    /// - [`AuthError::Validation`] if a field is empty
    /// - [`AuthError::InvalidCredentials`] if the email/password pair does not match
    /// - [`AuthError::Storage`] / [`AuthError::Token`] on infrastructure failures
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let email = normalize_email(email);

        if email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        // bcrypt would compare only the first 72 bytes and accept any suffix.
        if password.len() > MAX_PASSWORD_BYTES {
            debug!("Login failed: password too long");
            return Err(AuthError::InvalidCredentials);
        }

        let Some(record) = self.store.find_by_email(&email).await? else {
            self.hasher.verify_dummy(password).await;
            debug!("Login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &record.password_hash).await {
            debug!("Login failed: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(record.id, &record.email)?;

        info!(user_id = record.id, "Login successful");

        Ok(LoginOutcome {
            token,
            user: record.into(),
        })
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("hasher", &self.hasher)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}
