//! Service banner and fallback.

use axum::Json;
use axum::http::{Method, StatusCode, Uri};
use chrono::Utc;
use serde_json::{Value, json};

pub async fn service_info() -> Json<Value> {
    Json(json!({
        "service": "NSPIRE Training App - Authentication Backend",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "timestamp": Utc::now(),
        "endpoints": {
            "login": "POST /api/login",
            "membershipStatus": "GET /api/membership/status",
            "activityLog": "POST /api/activity/login",
            "health": "GET /api/health",
        }
    }))
}

pub async fn not_found(method: Method, uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Endpoint not found",
            "path": uri.path(),
            "method": method.as_str(),
        })),
    )
}
