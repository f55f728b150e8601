//! `GET /api/health`

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use nspire_core::gateway::CrmGateway;
use nspire_core::repository::IdentityRepository;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub services: ServiceHealth,
    pub environment: EnvironmentInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealth {
    /// `connected` or `disconnected`.
    pub ghl: &'static str,
    /// Whether GHL credentials are configured.
    pub ghl_configured: bool,
    /// Whether a session signing secret is configured.
    pub jwt: bool,
    pub database: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentInfo {
    pub renew_url: Option<String>,
    pub support_email: Option<String>,
}

pub async fn health_check<R, C>(State(state): State<Arc<AppState<R, C>>>) -> Json<HealthResponse>
where
    R: IdentityRepository + 'static,
    C: CrmGateway,
{
    let reachable = state.auth.crm_reachable().await;

    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        services: ServiceHealth {
            ghl: if reachable { "connected" } else { "disconnected" },
            ghl_configured: state.config.crm.is_configured(),
            jwt: !state.auth.config().jwt_secret.is_empty(),
            database: "demo_mode",
        },
        environment: EnvironmentInfo {
            renew_url: state.config.renew_url.clone(),
            support_email: state.config.support_email.clone(),
        },
    })
}
