//! Session token issuance and verification.
//!
//! Session tokens are self-contained HS256 JWTs. Besides the identity
//! they carry a snapshot of the member's subscription status and the
//! instant that snapshot was taken, which drives both the freshness
//! window and the grace period. There is no server-side session table.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use nspire_core::models::subscription::SubscriptionStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Contact id embedded in demo sessions in place of a CRM contact.
pub const DEMO_CONTACT_ID: &str = "demo_contact";

/// JWT claims embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    /// Internal user ID.
    pub sub: String,
    pub email: String,
    /// CRM contact the membership was verified against.
    pub crm_contact_id: String,
    pub membership: SubscriptionStatus,
    /// When `membership` was last confirmed with the CRM.
    pub last_verified_at: DateTime<Utc>,
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID (UUID string).
    pub jti: String,
}

impl SessionClaims {
    pub fn is_demo(&self) -> bool {
        self.crm_contact_id == DEMO_CONTACT_ID
    }

    pub fn subject(&self) -> SessionSubject {
        SessionSubject {
            user_id: self.sub.clone(),
            email: self.email.clone(),
            crm_contact_id: self.crm_contact_id.clone(),
        }
    }
}

/// Who a session belongs to. Stays constant across refreshes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSubject {
    pub user_id: String,
    pub email: String,
    pub crm_contact_id: String,
}

fn require_secret(config: &AuthConfig) -> Result<&[u8], AuthError> {
    if config.jwt_secret.is_empty() {
        return Err(AuthError::Crypto("session signing secret is not configured".into()));
    }
    Ok(config.jwt_secret.as_bytes())
}

/// Issue a signed session token whose status snapshot was taken at
/// `verified_at`.
pub fn issue_session_token(
    subject: &SessionSubject,
    membership: &SubscriptionStatus,
    verified_at: DateTime<Utc>,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let secret = require_secret(config)?;
    let now = Utc::now();
    let claims = SessionClaims {
        sub: subject.user_id.clone(),
        email: subject.email.clone(),
        crm_contact_id: subject.crm_contact_id.clone(),
        membership: membership.clone(),
        last_verified_at: verified_at,
        iss: config.jwt_issuer.clone(),
        iat: now.timestamp(),
        exp: (now + config.session_lifetime()).timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Decode and verify a session token (signature, expiry, issuer).
///
/// Purely stateless: nothing is looked up.
pub fn decode_session_token(token: &str, config: &AuthConfig) -> Result<SessionClaims, AuthError> {
    let secret = require_secret(config)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

    jsonwebtoken::decode::<SessionClaims>(token, &DecodingKey::from_secret(secret), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}
