//! `POST /api/activity/login`
//!
//! Always answers 200; the CRM outcome is never visible to the client.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::{Extension, Json};
use nspire_auth::{ActivityInput, SessionClaims};
use nspire_core::gateway::CrmGateway;
use nspire_core::repository::IdentityRepository;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::handlers::client_ip;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRequest {
    #[serde(default)]
    pub device_info: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub success: bool,
}

pub async fn log_activity<R, C>(
    State(state): State<Arc<AppState<R, C>>>,
    Extension(claims): Extension<SessionClaims>,
    headers: HeaderMap,
    payload: std::result::Result<Json<ActivityRequest>, JsonRejection>,
) -> Json<ActivityResponse>
where
    R: IdentityRepository + 'static,
    C: CrmGateway,
{
    let request = payload.map(|Json(r)| r).unwrap_or_default();

    let dispatched = state.auth.record_activity(
        &claims,
        ActivityInput {
            action: request.action,
            device_info: request.device_info,
            ip_address: client_ip(&headers),
        },
    );
    debug!(user_id = %claims.sub, dispatched, "activity recorded");

    Json(ActivityResponse { success: true })
}
