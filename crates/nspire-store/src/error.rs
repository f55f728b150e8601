//! Store-specific error types and conversions.

use nspire_core::error::NspireError;

/// Store-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("password hash error: {0}")]
    Hash(String),

    #[error("identity store lock poisoned")]
    Poisoned,

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("invalid identity: {0}")]
    Invalid(String),
}

impl From<StoreError> for NspireError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => NspireError::NotFound { entity, id },
            StoreError::AlreadyExists { entity } => NspireError::AlreadyExists { entity },
            StoreError::Hash(msg) => NspireError::Crypto(msg),
            StoreError::Invalid(message) => NspireError::Validation { message },
            other => NspireError::Internal(other.to_string()),
        }
    }
}
