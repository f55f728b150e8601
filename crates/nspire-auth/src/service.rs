//! Authentication service: login and membership re-verification.
//!
//! Session state lives entirely in the caller-held token. A status check
//! either trusts the embedded snapshot (inside the freshness window),
//! refreshes it from the CRM and hands back a new token, or, when the
//! CRM is unavailable, honors a previously active membership for a
//! bounded grace period measured from the last successful verification.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use nspire_core::error::{NspireError, NspireResult};
use nspire_core::gateway::CrmGateway;
use nspire_core::models::subscription::SubscriptionStatus;
use nspire_core::repository::IdentityRepository;
use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::subscription;
use crate::token::{self, DEMO_CONTACT_ID, SessionClaims, SessionSubject};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed session token.
    pub token: String,
    pub user_id: String,
    pub membership: SubscriptionStatus,
    /// Session token lifetime in seconds.
    pub expires_in: u64,
}

/// Outcome of a membership status check.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusView {
    /// The embedded snapshot is still fresh; no CRM call was made.
    Cached {
        membership: SubscriptionStatus,
        last_verified_at: DateTime<Utc>,
    },
    /// The CRM was consulted; the caller must replace its token.
    Refreshed {
        membership: SubscriptionStatus,
        token: String,
        last_verified_at: DateTime<Utc>,
    },
    /// The CRM was unreachable but the member is inside the grace period.
    /// The original token stays in use so its clock keeps running.
    Grace {
        membership: SubscriptionStatus,
        grace_hours_remaining: f64,
    },
    /// Demo sessions never consult the CRM.
    Demo { membership: SubscriptionStatus },
}

impl StatusView {
    pub fn membership(&self) -> &SubscriptionStatus {
        match self {
            StatusView::Cached { membership, .. }
            | StatusView::Refreshed { membership, .. }
            | StatusView::Grace { membership, .. }
            | StatusView::Demo { membership } => membership,
        }
    }

    pub fn is_grace(&self) -> bool {
        matches!(self, StatusView::Grace { .. })
    }
}

/// Client-reported activity to forward to the CRM.
#[derive(Debug, Default)]
pub struct ActivityInput {
    pub action: Option<String>,
    pub device_info: Option<String>,
    pub ip_address: Option<String>,
}

/// Authentication service.
///
/// Generic over the identity store and CRM gateway so that the auth
/// layer has no dependency on either concrete implementation.
pub struct AuthService<R: IdentityRepository, C: CrmGateway> {
    identities: R,
    crm: Arc<C>,
    config: AuthConfig,
}

impl<R: IdentityRepository, C: CrmGateway> AuthService<R, C> {
    pub fn new(identities: R, crm: Arc<C>, config: AuthConfig) -> Self {
        Self {
            identities,
            crm,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Verify a bearer token and return its claims.
    pub fn authenticate(&self, token: &str) -> NspireResult<SessionClaims> {
        Ok(token::decode_session_token(token, &self.config)?)
    }

    /// Whether the CRM currently answers.
    pub async fn crm_reachable(&self) -> bool {
        self.crm.test_connection().await
    }

    /// Authenticate a member by email + password and issue a session
    /// token carrying their current subscription status.
    ///
    /// CRM failures are returned as-is; the grace period only applies to
    /// tokens that were already issued.
    pub async fn login(&self, input: LoginInput) -> NspireResult<LoginOutput> {
        let email = input.email.trim();
        if email.is_empty() || input.password.is_empty() {
            return Err(AuthError::MissingCredentials.into());
        }

        // 1. Look up identity.
        let identity = match self.identities.get_by_email(email).await {
            Ok(identity) => identity,
            Err(NspireError::NotFound { .. }) => {
                info!(email, "login rejected: unknown email");
                return Err(AuthError::UserNotFound.into());
            }
            Err(e) => return Err(e),
        };

        // 2. Verify password.
        if let Err(e) = password::verify_password(
            &input.password,
            &identity.password_hash,
            self.config.pepper.as_deref(),
        ) {
            info!(user_id = %identity.id, "login rejected: {e}");
            return Err(e.into());
        }

        // 3. Demo accounts bypass the CRM entirely.
        if identity.is_demo() {
            let membership = SubscriptionStatus::demo();
            let subject = SessionSubject {
                user_id: identity.id.to_string(),
                email: identity.email.clone(),
                crm_contact_id: DEMO_CONTACT_ID.into(),
            };
            let token =
                token::issue_session_token(&subject, &membership, Utc::now(), &self.config)?;
            info!(user_id = %identity.id, "demo login succeeded");
            return Ok(LoginOutput {
                token,
                user_id: subject.user_id,
                membership,
                expires_in: self.config.session_lifetime_secs,
            });
        }

        // 4. Resolve the CRM contact.
        let contact_id = match identity.crm_contact_id.clone() {
            Some(id) => id,
            None => {
                debug!(user_id = %identity.id, "looking up CRM contact by email");
                self.crm
                    .search_contact_by_email(&identity.email)
                    .await?
                    .ok_or_else(|| {
                        info!(user_id = %identity.id, "login rejected: no CRM contact");
                        AuthError::ContactNotFound
                    })?
            }
        };

        // 5. Fetch and normalize the subscription.
        let membership = self.fetch_status(&contact_id).await?;

        // 6. Issue the session token.
        let subject = SessionSubject {
            user_id: identity.id.to_string(),
            email: identity.email.clone(),
            crm_contact_id: contact_id.clone(),
        };
        let token = token::issue_session_token(&subject, &membership, Utc::now(), &self.config)?;

        // 7. Record the login without waiting on the CRM.
        self.spawn_activity_log(
            contact_id,
            format!(
                "Login - IP: {} - Device: {}",
                input.ip_address.as_deref().unwrap_or("Unknown"),
                input.user_agent.as_deref().unwrap_or("Unknown"),
            ),
        );

        info!(
            user_id = %identity.id,
            active = membership.active,
            plan = %membership.plan,
            "login succeeded"
        );

        Ok(LoginOutput {
            token,
            user_id: subject.user_id,
            membership,
            expires_in: self.config.session_lifetime_secs,
        })
    }

    /// Decide whether to trust, refresh, or grace the status embedded in
    /// an existing session.
    ///
    /// Returns `NspireError::VerificationFailed` when the CRM cannot be
    /// reached and the grace period does not apply.
    pub async fn check_status(&self, claims: &SessionClaims) -> NspireResult<StatusView> {
        if claims.is_demo() {
            return Ok(StatusView::Demo {
                membership: SubscriptionStatus::demo(),
            });
        }

        let now = Utc::now();
        let age = now - claims.last_verified_at;

        if age < self.config.freshness_window() {
            debug!(
                user_id = %claims.sub,
                age_minutes = age.num_minutes(),
                "using cached membership"
            );
            return Ok(StatusView::Cached {
                membership: claims.membership.clone(),
                last_verified_at: claims.last_verified_at,
            });
        }

        match self.fetch_status(&claims.crm_contact_id).await {
            Ok(membership) => {
                let token =
                    token::issue_session_token(&claims.subject(), &membership, now, &self.config)?;
                info!(
                    user_id = %claims.sub,
                    active = membership.active,
                    plan = %membership.plan,
                    "membership re-verified"
                );
                Ok(StatusView::Refreshed {
                    membership,
                    token,
                    last_verified_at: now,
                })
            }
            Err(e) => {
                let age_hours = age.num_milliseconds() as f64 / MILLIS_PER_HOUR;
                let grace_hours = self.config.grace_period_hours as f64;

                if claims.membership.active && age_hours <= grace_hours {
                    warn!(
                        user_id = %claims.sub,
                        age_hours,
                        error = %e,
                        "CRM verification failed, granting grace access"
                    );
                    Ok(StatusView::Grace {
                        membership: claims.membership.clone(),
                        grace_hours_remaining: (grace_hours - age_hours).max(0.0),
                    })
                } else {
                    warn!(
                        user_id = %claims.sub,
                        age_hours,
                        was_active = claims.membership.active,
                        error = %e,
                        "CRM verification failed outside grace period"
                    );
                    Err(AuthError::VerificationFailed.into())
                }
            }
        }
    }

    /// Forward client activity to the CRM without waiting for it.
    ///
    /// Returns `false` when nothing was dispatched (demo sessions).
    pub fn record_activity(&self, claims: &SessionClaims, input: ActivityInput) -> bool {
        if claims.is_demo() || claims.crm_contact_id.is_empty() {
            return false;
        }

        let activity = format!(
            "{} - Device: {} - IP: {}",
            input.action.as_deref().unwrap_or("App Activity"),
            input.device_info.as_deref().unwrap_or("Unknown"),
            input.ip_address.as_deref().unwrap_or("Unknown"),
        );
        self.spawn_activity_log(claims.crm_contact_id.clone(), activity);
        true
    }

    async fn fetch_status(&self, contact_id: &str) -> NspireResult<SubscriptionStatus> {
        let subscriptions = self.crm.list_subscriptions(contact_id).await?;
        if subscriptions.is_empty() {
            debug!(contact_id, "no subscriptions found");
        }
        Ok(subscription::resolve_status(&subscriptions))
    }

    /// Launch activity logging on a detached task. The join handle is
    /// dropped on purpose: the outcome must never reach the caller.
    fn spawn_activity_log(&self, contact_id: String, activity: String) {
        let crm = Arc::clone(&self.crm);
        tokio::spawn(async move {
            if let Err(e) = crm.log_activity(&contact_id, &activity).await {
                warn!(contact_id, error = %e, "activity logging failed (non-critical)");
            }
        });
    }
}
