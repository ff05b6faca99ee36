use crate::{
    api,
    auth::{AuthService, PasswordHasher, TokenIssuer},
    cli::telemetry,
};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use std::{fmt, sync::Arc, time::Duration};
use tracing::info;
use url::Url;

pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub jwt_secret: SecretString,
    pub token_ttl_seconds: u64,
    pub bcrypt_cost: u32,
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("port", &self.port)
            .field("dsn", &redact_dsn(&self.dsn))
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// Hide the password part of a connection string.
fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut url) => {
            if url.password().is_some() && url.set_password(Some("****")).is_err() {
                return "[invalid dsn]".to_string();
            }
            url.to_string()
        }
        Err(_) => "[invalid dsn]".to_string(),
    }
}

/// Run the HTTP server until a shutdown signal arrives.
/// # Errors
/// Returns an error on invalid configuration or if the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let dsn = Url::parse(&args.dsn).context("Invalid database connection string")?;
    if !matches!(dsn.scheme(), "postgres" | "postgresql") {
        return Err(anyhow!("Unsupported database scheme: {}", dsn.scheme()));
    }

    info!("Connecting to database: {}", redact_dsn(&args.dsn));

    let hasher = PasswordHasher::new(args.bcrypt_cost)?;
    let tokens = TokenIssuer::new(
        &args.jwt_secret,
        Duration::from_secs(args.token_ttl_seconds),
    )?;

    let store = api::connect(&args.dsn).await?;
    let auth = Arc::new(AuthService::new(Arc::new(store.clone()), hasher, tokens));

    let result = api::new(args.port, store, auth).await;

    telemetry::shutdown_tracer();

    result
}
