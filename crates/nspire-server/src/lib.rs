//! NSPIRE Server — HTTP surface for member login, membership status
//! checks, activity logging and health reporting.

use std::any::Any;
use std::sync::Arc;

use axum::Json;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{
    AUTHORIZATION, CONTENT_TYPE, REFERRER_POLICY, STRICT_TRANSPORT_SECURITY,
    X_CONTENT_TYPE_OPTIONS, X_DNS_PREFETCH_CONTROL, X_FRAME_OPTIONS, X_XSS_PROTECTION,
};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use nspire_core::gateway::CrmGateway;
use nspire_core::repository::IdentityRepository;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

use config::ServerConfig;
use error::ErrorResponse;
use state::AppState;

/// Largest request body accepted, in bytes.
pub const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Hardening headers added to every response that does not set them.
fn security_headers() -> [(HeaderName, &'static str); 8] {
    [
        (X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (X_FRAME_OPTIONS, "SAMEORIGIN"),
        (REFERRER_POLICY, "no-referrer"),
        (STRICT_TRANSPORT_SECURITY, "max-age=15552000; includeSubDomains"),
        (X_DNS_PREFETCH_CONTROL, "off"),
        (X_XSS_PROTECTION, "0"),
        (HeaderName::from_static("cross-origin-opener-policy"), "same-origin"),
        (HeaderName::from_static("x-permitted-cross-domain-policies"), "none"),
    ]
}

/// Build the application router.
pub fn create_router<R, C>(state: Arc<AppState<R, C>>) -> Router
where
    R: IdentityRepository + 'static,
    C: CrmGateway,
{
    let session_routes = Router::new()
        .route(
            "/membership/status",
            get(handlers::membership::status::<R, C>),
        )
        .route(
            "/activity/login",
            post(handlers::activity::log_activity::<R, C>),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::require_session::<R, C>,
        ));

    let api = Router::new()
        .route("/login", post(handlers::login::login::<R, C>))
        .route("/health", get(handlers::health::health_check::<R, C>))
        .merge(session_routes);

    let mut router = Router::new()
        .route("/", get(handlers::root::service_info))
        .nest("/api", api)
        .fallback(handlers::root::not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES));

    for (name, value) in security_headers() {
        router = router.layer(SetResponseHeaderLayer::if_not_present(
            name,
            HeaderValue::from_static(value),
        ));
    }

    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .layer(from_fn(middleware::request_id))
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    // A wildcard origin cannot be combined with credentials.
    if config.cors_origin.trim() == "*" {
        return base.allow_origin(AllowOrigin::any());
    }

    match HeaderValue::from_str(&config.cors_origin) {
        Ok(origin) => base.allow_origin(origin).allow_credentials(true),
        Err(e) => {
            tracing::warn!(origin = %config.cors_origin, error = %e, "invalid CORS origin, cross-origin requests disabled");
            base
        }
    }
}

fn handle_panic(_err: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("request handler panicked");
    let body = ErrorResponse {
        error: "Internal server error".into(),
        code: "SERVER_ERROR",
        active: None,
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
