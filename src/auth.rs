//! Credential storage and the login check.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use rusqlite::Connection;
use std::sync::OnceLock;

use crate::store::{self, Role, StoreError};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Who is logged in and what they may do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated(Session),
    /// Unknown username and wrong password are deliberately indistinguishable.
    Rejected,
}

pub fn hash_password(plain: &str) -> Result<String, StoreError> {
    if plain.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(StoreError::invalid(
            "password",
            format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
        ));
    }
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| StoreError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// An unparsable stored hash counts as a mismatch.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is malformed");
            false
        }
    }
}

// Same algorithm and cost as `Argon2::default()`; matches no password.
const FALLBACK_DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$ElNFFWTwSw07oQw2tUW6gA$zwmfEUNJsD2I5g71vYHJlrVvyL4EhNdvTYkv9eyL5JI";

// Verified against when the username is unknown so both rejection paths
// cost one argon2 run.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| {
        hash_password("not-a-real-password").unwrap_or_else(|e| {
            tracing::warn!(error = %e, "dummy hash generation failed, using fallback");
            FALLBACK_DUMMY_HASH.to_string()
        })
    })
}

pub fn login(conn: &Connection, username: &str, password: &str) -> Result<LoginOutcome, StoreError> {
    let Some(user) = store::find_user(conn, username)? else {
        let _ = verify_password(password, dummy_hash());
        tracing::info!("login rejected");
        return Ok(LoginOutcome::Rejected);
    };

    if !verify_password(password, &user.password_hash) {
        tracing::info!("login rejected");
        return Ok(LoginOutcome::Rejected);
    }

    tracing::info!(username = %user.username, role = %user.role, "login accepted");
    Ok(LoginOutcome::Authenticated(Session {
        user_id: user.id,
        username: user.username,
        role: user.role,
    }))
}
