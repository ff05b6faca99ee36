use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("email already registered")]
    DuplicateEmail,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("token error: {0}")]
    Token(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AuthError {
    /// True when the failure was caused by the caller's input rather than by
    /// the service or its dependencies.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::DuplicateEmail | Self::InvalidCredentials
        )
    }
}
