//! API error type and its JSON rendering.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nspire_core::error::NspireError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Access token required")]
    TokenMissing,

    #[error(transparent)]
    Core(#[from] NspireError),
}

/// Error response JSON.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    /// Present on membership failures so clients can lock content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse {
                    error: self.to_string(),
                    code: "TOKEN_MISSING",
                    active: None,
                },
            ),
            ApiError::Core(err) => {
                let status = StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let error = match err {
                    NspireError::TokenExpired | NspireError::TokenInvalid(_) => {
                        "Invalid or expired token".to_string()
                    }
                    _ if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE => {
                        tracing::error!(error = %err, "request failed");
                        "Internal server error".to_string()
                    }
                    other => other.to_string(),
                };
                let active = matches!(err, NspireError::VerificationFailed).then_some(false);
                (
                    status,
                    ErrorResponse {
                        error,
                        code: err.code(),
                        active,
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
