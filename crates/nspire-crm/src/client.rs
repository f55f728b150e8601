//! GoHighLevel API client.

use chrono::Utc;
use nspire_core::error::NspireResult;
use nspire_core::gateway::CrmGateway;
use nspire_core::models::subscription::RawSubscription;
use reqwest::Method;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::config::CrmConfig;
use crate::error::CrmError;

#[derive(Debug, Deserialize)]
struct ContactSearchResponse {
    #[serde(default)]
    contacts: Vec<ContactSummary>,
}

#[derive(Debug, Deserialize)]
struct ContactSummary {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionListResponse {
    #[serde(default)]
    subscriptions: Vec<RawSubscription>,
}

/// Pick the candidate whose email matches exactly, ignoring case.
///
/// The remote search is fuzzy; a prefix or partial hit must not be
/// mistaken for the user's own contact.
fn find_exact_match(contacts: &[ContactSummary], email: &str) -> Option<String> {
    let wanted = email.trim().to_lowercase();
    contacts
        .iter()
        .find(|c| {
            c.email
                .as_deref()
                .is_some_and(|e| e.trim().to_lowercase() == wanted)
        })
        .and_then(|c| c.id.clone())
}

/// HTTP client for the GoHighLevel API.
#[derive(Clone)]
pub struct GhlClient {
    http: reqwest::Client,
    config: CrmConfig,
}

impl GhlClient {
    /// Build a client. Fails if the token or location id is missing.
    pub fn new(config: CrmConfig) -> Result<Self, CrmError> {
        if config.token.trim().is_empty() {
            return Err(CrmError::Config("GHL API token is required".into()));
        }
        if config.location_id.trim().is_empty() {
            return Err(CrmError::Config("GHL location id is required".into()));
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| CrmError::Config(e.to_string()))?;

        info!(
            base_url = %config.base_url,
            timeout_ms = config.timeout_ms,
            "GHL client initialized"
        );

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &CrmConfig {
        &self.config
    }

    /// Issue a request, retrying exactly once if the first attempt times
    /// out. Any other failure is returned immediately.
    async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Vec<u8>, CrmError> {
        match self.send_once(method.clone(), endpoint, query, body).await {
            Err(CrmError::Timeout) => {
                warn!(%method, endpoint, "GHL request timed out, retrying once");
                self.send_once(method, endpoint, query, body)
                    .await
                    .inspect_err(|e| warn!(endpoint, error = %e, "GHL retry failed"))
            }
            other => other,
        }
    }

    async fn send_once(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Vec<u8>, CrmError> {
        let url = format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        );

        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(&self.config.token)
            .header("Version", &self.config.api_version)
            .header(ACCEPT, "application/json")
            .timeout(self.config.timeout());
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, endpoint, "GHL API request");

        let response = request.send().await.map_err(CrmError::from_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CrmError::status(status.as_u16(), &text));
        }

        let bytes = response.bytes().await.map_err(CrmError::from_reqwest)?;
        debug!(%method, endpoint, status = status.as_u16(), "GHL API success");
        Ok(bytes.to_vec())
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<T, CrmError> {
        let bytes = self.execute(method, endpoint, query, body).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn search_contact(&self, email: &str) -> Result<Option<String>, CrmError> {
        let body = json!({
            "locationId": self.config.location_id,
            "query": email,
        });
        let response: ContactSearchResponse = self
            .execute_json(Method::POST, "/contacts/search", &[], Some(&body))
            .await?;

        debug!(
            candidates = response.contacts.len(),
            "GHL contact search returned"
        );

        let found = find_exact_match(&response.contacts, email);
        match &found {
            Some(contact_id) => debug!(contact_id, "exact contact match found"),
            None => debug!("no exact contact match"),
        }
        Ok(found)
    }

    async fn subscriptions(&self, contact_id: &str) -> Result<Vec<RawSubscription>, CrmError> {
        let response: SubscriptionListResponse = self
            .execute_json(
                Method::GET,
                "/payments/subscriptions",
                &[("contact", contact_id)],
                None,
            )
            .await?;

        debug!(
            contact_id,
            count = response.subscriptions.len(),
            "GHL subscriptions listed"
        );
        Ok(response.subscriptions)
    }

    async fn add_note(&self, contact_id: &str, activity: &str) -> Result<(), CrmError> {
        let body = json!({
            "body": format!(
                "NSPIRE App Activity: {activity}\nTimestamp: {}",
                Utc::now().to_rfc3339()
            ),
            "userId": contact_id,
        });
        let endpoint = format!("/contacts/{contact_id}/notes");
        self.execute(Method::POST, &endpoint, &[], Some(&body))
            .await
            .map(|_| ())
    }
}

impl CrmGateway for GhlClient {
    async fn search_contact_by_email(&self, email: &str) -> NspireResult<Option<String>> {
        Ok(self
            .search_contact(email)
            .await
            .inspect_err(|e| warn!(error = %e, "GHL contact search failed"))?)
    }

    async fn list_subscriptions(&self, contact_id: &str) -> NspireResult<Vec<RawSubscription>> {
        Ok(self
            .subscriptions(contact_id)
            .await
            .inspect_err(|e| warn!(contact_id, error = %e, "GHL subscription listing failed"))?)
    }

    async fn log_activity(&self, contact_id: &str, activity: &str) -> NspireResult<()> {
        self.add_note(contact_id, activity).await?;
        debug!(contact_id, activity, "activity logged");
        Ok(())
    }

    async fn test_connection(&self) -> bool {
        let endpoint = format!("/locations/{}", self.config.location_id);
        match self.execute(Method::GET, &endpoint, &[], None).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "GHL connection test failed");
                false
            }
        }
    }
}
