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
pub struct UserRegister {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

impl std::fmt::Debug for UserRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRegister")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserRegistered {
    pub message: String,
    pub user: PublicUser,
}

#[utoipa::path(
    post,
    path= "/api/register",
    request_body = UserRegister,
    responses (
        (status = 201, description = "Registration successful", body = UserRegistered, content_type = "application/json"),
        (status = 400, description = "Missing fields or email already registered", body = super::Message),
        (status = 500, description = "Storage failure", body = super::Message),
    ),
    tag= "auth"
)]
#[instrument(skip(auth, payload))]
pub async fn register(
    auth: Extension<Arc<AuthService>>,
    payload: Option<Json<UserRegister>>,
) -> Response {
    let Some(Json(user)) = payload else {
        return message_response(StatusCode::BAD_REQUEST, "Missing payload");
    };

    debug!("user: {:?}", user);

    match auth
        .register(
            user.name.as_deref().unwrap_or_default(),
            user.email.as_deref().unwrap_or_default(),
            user.password.as_deref().unwrap_or_default(),
        )
        .await
    {
        Ok(user) => (
            StatusCode::CREATED,
            Json(UserRegistered {
                message: "User registered successfully!".to_string(),
                user,
            }),
        )
            .into_response(),
        Err(e) => error_response(&e, "Server error during registration"),
    }
}
