//! CRM client configuration.

use std::time::Duration;

/// Configuration for connecting to the GoHighLevel API.
#[derive(Clone)]
pub struct CrmConfig {
    /// API base URL, without trailing slash.
    pub base_url: String,
    /// Private integration token sent as a bearer credential.
    pub token: String,
    /// Location (sub-account) the token belongs to.
    pub location_id: String,
    /// Per-call timeout in milliseconds (default: 1200).
    pub timeout_ms: u64,
    /// Value of the `Version` header required by the API.
    pub api_version: String,
}

impl CrmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Whether both the token and the location id are set.
    pub fn is_configured(&self) -> bool {
        !self.token.trim().is_empty() && !self.location_id.trim().is_empty()
    }
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://services.leadconnectorhq.com".into(),
            token: String::new(),
            location_id: String::new(),
            timeout_ms: 1200,
            api_version: "2021-07-28".into(),
        }
    }
}

// Hand-written so the token never ends up in logs.
impl std::fmt::Debug for CrmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrmConfig")
            .field("base_url", &self.base_url)
            .field("token", &if self.token.is_empty() { "<unset>" } else { "<redacted>" })
            .field("location_id", &self.location_id)
            .field("timeout_ms", &self.timeout_ms)
            .field("api_version", &self.api_version)
            .finish()
    }
}
