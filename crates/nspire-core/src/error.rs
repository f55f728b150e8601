//! Error types for the NSPIRE membership gateway.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NspireError {
    #[error("Email and password required")]
    MissingCredentials,

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("No account found for this email")]
    UserNotFound,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("No account found in our system")]
    ContactNotFound,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    #[error("CRM request timed out after retry")]
    UpstreamTimeout,

    #[error("CRM request failed{}: {message}", status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    #[error("Unable to verify membership status")]
    VerificationFailed,

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl NspireError {
    /// Machine-readable code returned to API callers.
    pub fn code(&self) -> &'static str {
        match self {
            NspireError::MissingCredentials => "MISSING_CREDENTIALS",
            NspireError::Validation { .. } => "INVALID_REQUEST",
            NspireError::UserNotFound => "USER_NOT_FOUND",
            NspireError::InvalidPassword => "INVALID_PASSWORD",
            NspireError::ContactNotFound => "GHL_CONTACT_NOT_FOUND",
            NspireError::TokenExpired | NspireError::TokenInvalid(_) => "TOKEN_INVALID",
            NspireError::VerificationFailed => "VERIFICATION_FAILED",
            NspireError::UpstreamTimeout
            | NspireError::Upstream { .. }
            | NspireError::NotFound { .. }
            | NspireError::AlreadyExists { .. }
            | NspireError::Crypto(_)
            | NspireError::Internal(_) => "SERVER_ERROR",
        }
    }

    /// HTTP status class for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            NspireError::MissingCredentials | NspireError::Validation { .. } => 400,
            NspireError::InvalidPassword => 401,
            NspireError::UserNotFound
            | NspireError::ContactNotFound
            | NspireError::TokenExpired
            | NspireError::TokenInvalid(_) => 403,
            NspireError::VerificationFailed => 503,
            _ => 500,
        }
    }
}

pub type NspireResult<T> = Result<T, NspireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_failures_carry_distinct_codes() {
        assert_eq!(NspireError::UserNotFound.code(), "USER_NOT_FOUND");
        assert_eq!(NspireError::InvalidPassword.code(), "INVALID_PASSWORD");
        assert_eq!(NspireError::ContactNotFound.code(), "GHL_CONTACT_NOT_FOUND");
        assert_eq!(NspireError::MissingCredentials.status_code(), 400);
    }

    #[test]
    fn validation_is_a_bad_request() {
        let err = NspireError::Validation {
            message: "email is required".into(),
        };
        assert_eq!(err.code(), "INVALID_REQUEST");
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn upstream_failures_are_server_errors() {
        let err = NspireError::Upstream {
            status: Some(502),
            message: "bad gateway".into(),
        };
        assert_eq!(err.code(), "SERVER_ERROR");
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.to_string(), "CRM request failed (502): bad gateway");
    }

    #[test]
    fn verification_failure_is_service_unavailable() {
        assert_eq!(NspireError::VerificationFailed.status_code(), 503);
    }
}
