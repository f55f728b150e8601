//! CRM-specific error types and conversions.

use nspire_core::error::NspireError;

/// Longest slice of an error body carried in [`CrmError::Status`].
const BODY_EXCERPT_CHARS: usize = 200;

/// CRM-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum CrmError {
    #[error("GHL API request timed out")]
    Timeout,

    #[error("GHL API error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("GHL transport error: {0}")]
    Transport(String),

    #[error("GHL response could not be decoded: {0}")]
    Decode(String),

    #[error("GHL client misconfigured: {0}")]
    Config(String),
}

impl CrmError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CrmError::Timeout
        } else if err.is_decode() {
            CrmError::Decode(err.to_string())
        } else {
            CrmError::Transport(err.to_string())
        }
    }

    pub(crate) fn status(status: u16, body: &str) -> Self {
        CrmError::Status {
            status,
            body: body.chars().take(BODY_EXCERPT_CHARS).collect(),
        }
    }
}

impl From<serde_json::Error> for CrmError {
    fn from(err: serde_json::Error) -> Self {
        CrmError::Decode(err.to_string())
    }
}

impl From<CrmError> for NspireError {
    fn from(err: CrmError) -> Self {
        match err {
            CrmError::Timeout => NspireError::UpstreamTimeout,
            CrmError::Status { status, body } => NspireError::Upstream {
                status: Some(status),
                message: body,
            },
            CrmError::Config(msg) => NspireError::Internal(msg),
            other => NspireError::Upstream {
                status: None,
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_body_is_truncated() {
        let long = "x".repeat(1000);
        match CrmError::status(500, &long) {
            CrmError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body.len(), BODY_EXCERPT_CHARS);
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[test]
    fn timeout_maps_to_upstream_timeout() {
        let err: NspireError = CrmError::Timeout.into();
        assert!(matches!(err, NspireError::UpstreamTimeout));
    }
}
