//! Authentication error types.

use nspire_core::error::NspireError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email and password required")]
    MissingCredentials,

    #[error("no account found for this email")]
    UserNotFound,

    #[error("invalid password")]
    InvalidPassword,

    #[error("no CRM contact found for this account")]
    ContactNotFound,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("membership could not be verified")]
    VerificationFailed,

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for NspireError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => NspireError::MissingCredentials,
            AuthError::UserNotFound => NspireError::UserNotFound,
            AuthError::InvalidPassword => NspireError::InvalidPassword,
            AuthError::ContactNotFound => NspireError::ContactNotFound,
            AuthError::TokenExpired => NspireError::TokenExpired,
            AuthError::TokenInvalid(msg) => NspireError::TokenInvalid(msg),
            AuthError::VerificationFailed => NspireError::VerificationFailed,
            AuthError::Crypto(msg) => NspireError::Crypto(msg),
        }
    }
}
