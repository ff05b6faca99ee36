#![allow(clippy::needless_for_each)]

use super::handlers::{
    health, health::__path_health, user_login, user_login::__path_login, user_register,
    user_register::__path_register, Message,
};
use crate::auth::PublicUser;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(health, register, login),
    components(schemas(
        health::Health,
        user_register::UserRegister,
        user_register::UserRegistered,
        user_login::UserLogin,
        user_login::UserLoggedIn,
        PublicUser,
        Message
    )),
    tags(
        (name = "auth", description = "Account registration and login"),
        (name = "health", description = "Liveness and database status")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = env!("CARGO_PKG_NAME").to_string();
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();
    doc.info.description = Some(env!("CARGO_PKG_DESCRIPTION").to_string());
    doc
}
