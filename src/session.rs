//! Password hashing and session cookie helpers.

use crate::constants::SESSION_USER_ID;
use crate::error::{BoardError, BoardResult};
use actix_session::Session;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hashes a password into an Argon2id PHC string.
pub fn hash_password(password: &str) -> BoardResult<String> {
    Argon2::default()
        .hash_password(password.as_bytes(), &SaltString::generate(&mut OsRng))
        .map(|hash| hash.to_string())
        .map_err(|e| {
            log::error!("Failed to hash password: {}", e);
            BoardError::PasswordHash(e.to_string())
        })
}

/// Checks a password against a stored PHC string. Malformed hashes never verify.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::warn!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

/// Marks the session as belonging to `user_id`.
pub fn log_in(session: &Session, user_id: i32) -> BoardResult<()> {
    session.renew();
    session
        .insert(SESSION_USER_ID, user_id)
        .map_err(|e| BoardError::Session(e.to_string()))
}

/// Returns the user id stored in the session, if any.
pub fn session_user_id(session: &Session) -> Option<i32> {
    match session.get::<i32>(SESSION_USER_ID) {
        Ok(id) => id,
        Err(e) => {
            log::debug!("Discarding unreadable session value: {}", e);
            None
        }
    }
}

/// Forgets the authenticated user.
pub fn log_out(session: &Session) {
    session.purge();
}
