//! End-to-end tests for the HTTP surface, driven through the router
//! with an in-process CRM double.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use nspire_auth::token::{self, SessionSubject};
use nspire_auth::{AuthConfig, AuthService};
use nspire_core::error::{NspireError, NspireResult};
use nspire_core::gateway::CrmGateway;
use nspire_core::models::identity::{CreateIdentity, IdentityKind};
use nspire_core::models::subscription::{CrmTimestamp, RawSubscription, SubscriptionStatus};
use nspire_core::repository::IdentityRepository;
use nspire_server::config::ServerConfig;
use nspire_server::create_router;
use nspire_server::state::AppState;
use nspire_store::{InMemoryIdentityRepository, seed_demo_identities};
use serde_json::{Value, json};
use tower::ServiceExt;

const MEMBER_EMAIL: &str = "member@example.com";
const MEMBER_PASSWORD: &str = "member-pass";
const CONTACT_ID: &str = "contact_member";

struct StubCrm {
    subscriptions: Vec<RawSubscription>,
    down: AtomicBool,
}

impl StubCrm {
    fn active() -> Self {
        Self {
            subscriptions: vec![RawSubscription {
                id: Some("sub_1".into()),
                status: Some("active".into()),
                price_name: Some("Standard".into()),
                created_at: Some(CrmTimestamp::At(Utc::now() - Duration::days(10))),
                ..Default::default()
            }],
            down: AtomicBool::new(false),
        }
    }

    fn check(&self) -> NspireResult<()> {
        if self.down.load(Ordering::SeqCst) {
            return Err(NspireError::UpstreamTimeout);
        }
        Ok(())
    }
}

impl CrmGateway for StubCrm {
    async fn search_contact_by_email(&self, _email: &str) -> NspireResult<Option<String>> {
        self.check()?;
        Ok(Some(CONTACT_ID.into()))
    }

    async fn list_subscriptions(&self, _contact_id: &str) -> NspireResult<Vec<RawSubscription>> {
        self.check()?;
        Ok(self.subscriptions.clone())
    }

    async fn log_activity(&self, _contact_id: &str, _activity: &str) -> NspireResult<()> {
        self.check()
    }

    async fn test_connection(&self) -> bool {
        !self.down.load(Ordering::SeqCst)
    }
}

struct TestApp {
    router: Router,
    crm: Arc<StubCrm>,
    auth: AuthConfig,
}

async fn test_app() -> TestApp {
    test_app_with(|_| {}).await
}

async fn test_app_with(customize: impl FnOnce(&mut ServerConfig)) -> TestApp {
    let auth = AuthConfig {
        jwt_secret: "api-test-secret".into(),
        ..Default::default()
    };
    let mut config = ServerConfig {
        renew_url: Some("https://example.com/renew".into()),
        support_email: Some("support@example.com".into()),
        auth: auth.clone(),
        ..Default::default()
    };
    customize(&mut config);

    let identities = InMemoryIdentityRepository::new();
    seed_demo_identities(&identities).await.unwrap();
    identities
        .create(CreateIdentity {
            email: MEMBER_EMAIL.into(),
            password: MEMBER_PASSWORD.into(),
            crm_contact_id: Some(CONTACT_ID.into()),
            kind: IdentityKind::Member,
        })
        .await
        .unwrap();

    let crm = Arc::new(StubCrm::active());
    let service = AuthService::new(identities, Arc::clone(&crm), auth.clone());
    let router = create_router(Arc::new(AppState::new(config, service)));

    TestApp { router, crm, auth }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn login_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authorized(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Sign a token whose status snapshot is `age` old.
fn aged_token(app: &TestApp, membership: SubscriptionStatus, age: Duration) -> String {
    let subject = SessionSubject {
        user_id: "user_1".into(),
        email: MEMBER_EMAIL.into(),
        crm_contact_id: CONTACT_ID.into(),
    };
    token::issue_session_token(&subject, &membership, Utc::now() - age, &app.auth).unwrap()
}

fn active_membership() -> SubscriptionStatus {
    SubscriptionStatus {
        active: true,
        plan: "Standard".into(),
        trial_ends_at: None,
        raw_status: Some("active".into()),
        current_period_end: None,
    }
}

async fn login_token(app: &TestApp) -> String {
    let body = json!({ "email": MEMBER_EMAIL, "password": MEMBER_PASSWORD }).to_string();
    let (status, body) = send(&app.router, login_request(&body)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn member_login_returns_token_and_membership() {
    let app = test_app().await;
    let body = json!({ "email": MEMBER_EMAIL, "password": MEMBER_PASSWORD }).to_string();

    let (status, body) = send(&app.router, login_request(&body)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["active"], true);
    assert_eq!(body["plan"], "Standard");
    assert_eq!(body["trialEndsAt"], Value::Null);
    assert_eq!(body["renewUrl"], "https://example.com/renew");
    assert!(body["userId"].is_string());
    assert!(body["loginTime"].is_u64());
}

#[tokio::test]
async fn demo_login_skips_crm() {
    let app = test_app().await;
    app.crm.down.store(true, Ordering::SeqCst);

    let body = json!({ "email": "demo@nspire.app", "password": "demo123" }).to_string();
    let (status, body) = send(&app.router, login_request(&body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], true);
    assert_eq!(body["plan"], "Demo Access");
}

#[tokio::test]
async fn login_errors_map_to_codes() {
    let app = test_app().await;
    let cases = [
        (json!({}).to_string(), StatusCode::BAD_REQUEST, "MISSING_CREDENTIALS"),
        (
            json!({ "email": MEMBER_EMAIL, "password": "" }).to_string(),
            StatusCode::BAD_REQUEST,
            "MISSING_CREDENTIALS",
        ),
        ("{not json".to_string(), StatusCode::BAD_REQUEST, "MISSING_CREDENTIALS"),
        (
            json!({ "email": "nobody@example.com", "password": "x" }).to_string(),
            StatusCode::FORBIDDEN,
            "USER_NOT_FOUND",
        ),
        (
            json!({ "email": MEMBER_EMAIL, "password": "wrong" }).to_string(),
            StatusCode::UNAUTHORIZED,
            "INVALID_PASSWORD",
        ),
    ];

    for (request, expected_status, expected_code) in cases {
        let (status, body) = send(&app.router, login_request(&request)).await;
        assert_eq!(status, expected_status, "{request}");
        assert_eq!(body["code"], expected_code, "{request}");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn login_during_crm_outage_is_server_error() {
    let app = test_app().await;
    app.crm.down.store(true, Ordering::SeqCst);

    let body = json!({ "email": MEMBER_EMAIL, "password": MEMBER_PASSWORD }).to_string();
    let (status, body) = send(&app.router, login_request(&body)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "SERVER_ERROR");
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn status_requires_token() {
    let app = test_app().await;

    let (status, body) = send(&app.router, get("/api/membership/status")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "TOKEN_MISSING");

    let (status, body) = send(
        &app.router,
        authorized("GET", "/api/membership/status", "not-a-jwt", None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "TOKEN_INVALID");
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn fresh_token_status_is_cached() {
    let app = test_app().await;
    let token = login_token(&app).await;
    app.crm.down.store(true, Ordering::SeqCst);

    let (status, body) = send(
        &app.router,
        authorized("GET", "/api/membership/status", &token, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], true);
    assert_eq!(body["plan"], "Standard");
    assert_eq!(body["cached"], true);
    assert_eq!(body["graceMode"], false);
    assert!(body["lastVerified"].is_string());
    assert!(body.get("newToken").is_none());
}

#[tokio::test]
async fn stale_token_is_refreshed() {
    let app = test_app().await;
    let token = aged_token(&app, active_membership(), Duration::hours(2));

    let (status, body) = send(
        &app.router,
        authorized("GET", "/api/membership/status", &token, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["graceMode"], false);
    assert!(body["newToken"].as_str().is_some_and(|t| t != token));
    assert!(body.get("cached").is_none());
}

#[tokio::test]
async fn outage_within_grace_keeps_access() {
    let app = test_app().await;
    app.crm.down.store(true, Ordering::SeqCst);
    let token = aged_token(&app, active_membership(), Duration::hours(2));

    let (status, body) = send(
        &app.router,
        authorized("GET", "/api/membership/status", &token, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], true);
    assert_eq!(body["graceMode"], true);
    let remaining = body["graceHoursRemaining"].as_f64().unwrap();
    assert!(remaining > 165.0 && remaining <= 166.0, "{remaining}");
    assert!(body.get("newToken").is_none());
}

#[tokio::test]
async fn outage_for_inactive_member_is_verification_failure() {
    let app = test_app().await;
    app.crm.down.store(true, Ordering::SeqCst);
    let token = aged_token(&app, SubscriptionStatus::none(), Duration::hours(2));

    let (status, body) = send(
        &app.router,
        authorized("GET", "/api/membership/status", &token, None),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "VERIFICATION_FAILED");
    assert_eq!(body["active"], false);
}

#[tokio::test]
async fn activity_always_succeeds() {
    let app = test_app().await;
    let token = login_token(&app).await;
    app.crm.down.store(true, Ordering::SeqCst);

    let (status, body) = send(
        &app.router,
        authorized(
            "POST",
            "/api/activity/login",
            &token,
            Some(json!({ "deviceInfo": "iPad", "action": "Opened lesson" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, body) = send(
        &app.router,
        authorized("POST", "/api/activity/login", &token, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn health_reports_services() {
    let app = test_app().await;

    let (status, body) = send(&app.router, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["ghl"], "connected");
    assert_eq!(body["services"]["jwt"], true);
    assert_eq!(body["services"]["database"], "demo_mode");
    assert_eq!(body["environment"]["supportEmail"], "support@example.com");

    app.crm.down.store(true, Ordering::SeqCst);
    let (status, body) = send(&app.router, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["services"]["ghl"], "disconnected");
}

#[tokio::test]
async fn root_and_unknown_paths() {
    let app = test_app().await;

    let (status, body) = send(&app.router, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert!(body["endpoints"].is_object());

    let (status, body) = send(&app.router, get("/api/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Endpoint not found");
    assert_eq!(body["path"], "/api/nope");
    assert_eq!(body["method"], "GET");
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = test_app().await;
    let response = app.router.clone().oneshot(get("/api/health")).await.unwrap();
    let id = response.headers().get("x-request-id").unwrap();
    assert!(!id.is_empty());
}

fn from_origin(origin: &str) -> Request<Body> {
    Request::builder()
        .uri("/api/health")
        .header(header::ORIGIN, origin)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn configured_origin_allows_credentials() {
    let app = test_app_with(|c| c.cors_origin = "https://app.example.com".into()).await;
    let response = app
        .router
        .clone()
        .oneshot(from_origin("https://app.example.com"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://app.example.com"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}

#[tokio::test]
async fn wildcard_origin_serves_without_credentials() {
    let app = test_app_with(|c| c.cors_origin = "*".into()).await;
    let response = app
        .router
        .clone()
        .oneshot(from_origin("https://anywhere.example"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let app = test_app().await;
    for uri in ["/api/health", "/api/nope"] {
        let response = app.router.clone().oneshot(get(uri)).await.unwrap();
        let headers = response.headers();
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff", "{uri}");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "SAMEORIGIN", "{uri}");
        assert_eq!(headers[header::REFERRER_POLICY], "no-referrer", "{uri}");
        assert!(headers.contains_key(header::STRICT_TRANSPORT_SECURITY), "{uri}");
    }
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = test_app().await;
    let body = vec![b' '; nspire_server::BODY_LIMIT_BYTES + 1];
    let request = Request::builder()
        .method("POST")
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
