//! Request middleware: request ids and bearer-token sessions.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use nspire_core::gateway::CrmGateway;
use nspire_core::repository::IdentityRepository;
use tracing::{Instrument, debug, info_span};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Tag every request with an id, echoed back as `x-request-id` and
/// attached to the request's tracing span.
pub async fn request_id(req: Request, next: Next) -> Response {
    let id = Uuid::new_v4().to_string();
    let span = info_span!("request", request_id = %id, method = %req.method(), path = %req.uri().path());

    let mut resp = next.run(req).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        resp.headers_mut().insert("x-request-id", value);
    }
    resp
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Reject requests without a valid session token; otherwise make the
/// verified [`SessionClaims`](nspire_auth::SessionClaims) available as a
/// request extension.
pub async fn require_session<R, C>(
    State(state): State<Arc<AppState<R, C>>>,
    mut req: Request,
    next: Next,
) -> Result<Response>
where
    R: IdentityRepository + 'static,
    C: CrmGateway,
{
    let token = bearer_token(req.headers()).ok_or(ApiError::TokenMissing)?;
    let claims = state.auth.authenticate(token).map_err(|e| {
        debug!(error = %e, "session token rejected");
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers("bearer   abc.def ")), Some("abc.def"));
    }

    #[test]
    fn other_schemes_and_blank_tokens_are_ignored() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
