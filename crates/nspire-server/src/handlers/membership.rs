//! `GET /api/membership/status`

use std::sync::Arc;

use axum::extract::State;
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use nspire_auth::{SessionClaims, StatusView};
use nspire_core::gateway::CrmGateway;
use nspire_core::repository::IdentityRepository;
use serde::Serialize;

use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub active: bool,
    pub plan: String,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub grace_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    /// Replacement token the client must store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_verified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grace_hours_remaining: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo: Option<bool>,
}

impl From<StatusView> for StatusResponse {
    fn from(view: StatusView) -> Self {
        let grace_mode = view.is_grace();
        let (membership, cached, new_token, last_verified, grace_hours_remaining, demo) =
            match view {
                StatusView::Cached {
                    membership,
                    last_verified_at,
                } => (membership, Some(true), None, Some(last_verified_at), None, None),
                StatusView::Refreshed {
                    membership,
                    token,
                    last_verified_at,
                } => (membership, None, Some(token), Some(last_verified_at), None, None),
                StatusView::Grace {
                    membership,
                    grace_hours_remaining,
                } => (membership, None, None, None, Some(grace_hours_remaining), None),
                StatusView::Demo { membership } => (membership, None, None, None, None, Some(true)),
            };

        Self {
            active: membership.active,
            plan: membership.plan,
            trial_ends_at: membership.trial_ends_at,
            grace_mode,
            cached,
            new_token,
            last_verified,
            grace_hours_remaining,
            demo,
        }
    }
}

pub async fn status<R, C>(
    State(state): State<Arc<AppState<R, C>>>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<Json<StatusResponse>>
where
    R: IdentityRepository + 'static,
    C: CrmGateway,
{
    let view = state.auth.check_status(&claims).await?;
    Ok(Json(view.into()))
}
