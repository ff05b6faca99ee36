//! # `HealthMate` (account registration and login)
//!
//! `healthmate` exposes two JSON endpoints, `POST /api/register` and
//! `POST /api/login`, backed by a single Postgres `users` table.
//!
//! ## Credentials
//!
//! Passwords are stored only as salted bcrypt hashes. A successful login
//! returns an HS256 JWT carrying `userId` and `email`, valid for seven days by
//! default and signed with a secret supplied at startup.
//!
//! bcrypt reads at most 72 bytes of a password, so longer passwords are
//! refused at registration and never match at login.
//!
//! Login failures never say whether the email exists: an unknown email and a
//! wrong password produce the same `401` body.
//!
//! ## Registration race
//!
//! Registration checks for an existing email and then inserts. The two steps
//! are not atomic, so the `UNIQUE` constraint on `users.email` is the only
//! thing stopping two concurrent registrations of the same address. The losing
//! request surfaces as a storage error.

pub mod api;
pub mod auth;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
