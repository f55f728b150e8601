//! Password verification using Argon2id.

use argon2::{Argon2, PasswordVerifier};

use crate::error::AuthError;

/// Check `password` against a stored Argon2id PHC hash.
///
/// The comparison inside the Argon2 verifier is constant-time. When a
/// `pepper` is configured it is prepended to the password, matching the
/// way the store hashed it.
///
/// A mismatch is reported as [`AuthError::InvalidPassword`]; a hash that
/// cannot be parsed is a [`AuthError::Crypto`] error.
pub fn verify_password(password: &str, hash: &str, pepper: Option<&str>) -> Result<(), AuthError> {
    let parsed = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    let candidate = match pepper {
        Some(p) => format!("{p}{password}"),
        None => password.to_owned(),
    };

    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(()),
        Err(argon2::password_hash::Error::Password) => Err(AuthError::InvalidPassword),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}
