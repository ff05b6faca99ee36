use super::{error_response, message_response};
use crate::auth::{AuthService, PublicUser};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Default)]
pub struct UserLogin {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

impl std::fmt::Debug for UserLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserLogin")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserLoggedIn {
    pub message: String,
    /// Bearer token carrying `userId` and `email`.
    pub token: String,
    pub user: PublicUser,
}

#[utoipa::path(
    post,
    path= "/api/login",
    request_body = UserLogin,
    responses (
        (status = 200, description = "Login successful", body = UserLoggedIn, content_type = "application/json"),
        (status = 400, description = "Missing fields", body = super::Message),
        (status = 401, description = "Invalid email or password", body = super::Message),
        (status = 500, description = "Storage failure", body = super::Message),
    ),
    tag= "auth"
)]
#[instrument(skip(auth, payload))]
pub async fn login(
    auth: Extension<Arc<AuthService>>,
    payload: Option<Json<UserLogin>>,
) -> Response {
    let Some(Json(user)) = payload else {
        return message_response(StatusCode::BAD_REQUEST, "Missing payload");
    };

    debug!("user: {:?}", user);

    match auth
        .login(
            user.email.as_deref().unwrap_or_default(),
            user.password.as_deref().unwrap_or_default(),
        )
        .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(UserLoggedIn {
                message: "Login successful!".to_string(),
                token: outcome.token,
                user: outcome.user,
            }),
        )
            .into_response(),
        Err(e) => error_response(&e, "Server error during login"),
    }
}
