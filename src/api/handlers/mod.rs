pub mod health;
pub use self::health::health;

pub mod user_register;
pub use self::user_register::register;

pub mod user_login;
pub use self::user_login::login;

// common types and functions for the handlers
use crate::auth::AuthError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

/// Body of every error response.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub message: String,
}

impl Message {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub(crate) fn message_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(Message::new(message))).into_response()
}

/// Map a service error to a response. Server-side failures are logged and
/// replaced by `server_message` so no internals reach the client.
pub(crate) fn error_response(err: &AuthError, server_message: &str) -> Response {
    if !err.is_client_error() {
        error!("{server_message}: {err}");
        return message_response(StatusCode::INTERNAL_SERVER_ERROR, server_message);
    }

    match err {
        AuthError::Validation(reason) => message_response(StatusCode::BAD_REQUEST, reason.clone()),
        AuthError::DuplicateEmail => {
            message_response(StatusCode::BAD_REQUEST, "Email already registered")
        }
        _ => message_response(StatusCode::UNAUTHORIZED, "Invalid email or password"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use axum::body::to_bytes;

    async fn body_message(response: Response) -> anyhow::Result<Message> {
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    #[tokio::test]
    async fn storage_errors_do_not_leak_details() -> anyhow::Result<()> {
        let err = AuthError::Storage(StoreError::Database(sqlx::Error::Protocol(
            "connection refused at 10.0.0.5".to_string(),
        )));
        let response = error_response(&err, "Server error during login");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let message = body_message(response).await?;
        assert_eq!(message, Message::new("Server error during login"));
        Ok(())
    }

    #[tokio::test]
    async fn client_errors_map_to_4xx() -> anyhow::Result<()> {
        let response = error_response(&AuthError::DuplicateEmail, "unused");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_message(response).await?,
            Message::new("Email already registered")
        );

        let response = error_response(&AuthError::InvalidCredentials, "unused");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_message(response).await?,
            Message::new("Invalid email or password")
        );

        let response = error_response(&AuthError::Validation("Invalid email".to_string()), "x");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }
}
