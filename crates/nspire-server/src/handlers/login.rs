//! `POST /api/login`

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use nspire_auth::LoginInput;
use nspire_core::error::NspireError;
use nspire_core::gateway::CrmGateway;
use nspire_core::repository::IdentityRepository;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::handlers::{client_ip, user_agent};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub active: bool,
    pub plan: String,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub renew_url: Option<String>,
    pub user_id: String,
    /// Server-side handling time in milliseconds.
    pub login_time: u64,
}

pub async fn login<R, C>(
    State(state): State<Arc<AppState<R, C>>>,
    headers: HeaderMap,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>>
where
    R: IdentityRepository + 'static,
    C: CrmGateway,
{
    let started = Instant::now();

    let Json(request) = payload.map_err(|rejection| {
        debug!(error = %rejection, "unreadable login body");
        NspireError::MissingCredentials
    })?;

    let input = LoginInput {
        email: request.email.unwrap_or_default(),
        password: request.password.unwrap_or_default(),
        ip_address: client_ip(&headers),
        user_agent: user_agent(&headers),
    };

    let output = state.auth.login(input).await.inspect_err(|e| {
        info!(
            code = e.code(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "login failed"
        );
    })?;

    let login_time = started.elapsed().as_millis() as u64;
    info!(user_id = %output.user_id, elapsed_ms = login_time, "login handled");

    Ok(Json(LoginResponse {
        token: output.token,
        active: output.membership.active,
        plan: output.membership.plan,
        trial_ends_at: output.membership.trial_ends_at,
        renew_url: state.config.renew_url.clone(),
        user_id: output.user_id,
        login_time,
    }))
}
