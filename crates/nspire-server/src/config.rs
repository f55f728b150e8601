//! Server configuration loaded from the environment.

use std::env;
use std::str::FromStr;

use nspire_auth::AuthConfig;
use nspire_auth::config::MAX_WINDOW_SECS;
use nspire_crm::CrmConfig;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen port (`PORT`, default 3001).
    pub port: u16,
    /// Allowed browser origin (`FRONTEND_URL`).
    pub cors_origin: String,
    /// Where members renew their subscription (`RENEW_URL`).
    pub renew_url: Option<String>,
    /// Support contact shown by the health endpoint (`SUPPORT_EMAIL`).
    pub support_email: Option<String>,
    pub auth: AuthConfig,
    pub crm: CrmConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            cors_origin: "http://localhost:8080".into(),
            renew_url: None,
            support_email: None,
            auth: AuthConfig::default(),
            crm: CrmConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Numeric settings that fail to parse fall back to their defaults;
    /// an unparseable `PORT` is an error.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let number = |key: &str, default: u64| parse_or(get(key), default);
        // Durations given in coarse units; out-of-range values use the default.
        let seconds = |key: &str, default: u64, unit: u64| {
            number(key, default)
                .checked_mul(unit)
                .filter(|secs| *secs <= MAX_WINDOW_SECS)
                .unwrap_or(default * unit)
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse()?,
            None => defaults.port,
        };

        let auth = AuthConfig {
            jwt_secret: get("JWT_SECRET").unwrap_or_default(),
            jwt_issuer: get("JWT_ISSUER").unwrap_or(defaults.auth.jwt_issuer),
            session_lifetime_secs: seconds("SESSION_TTL_HOURS", 24, 3_600),
            freshness_window_secs: seconds("FRESHNESS_WINDOW_MINUTES", 60, 60),
            grace_period_hours: seconds("GRACE_TTL_HOURS", defaults.auth.grace_period_hours, 3_600)
                / 3_600,
            pepper: get("PASSWORD_PEPPER"),
        };

        let crm = CrmConfig {
            base_url: get("GHL_API_BASE").unwrap_or(defaults.crm.base_url),
            token: get("GHL_TOKEN").unwrap_or_default(),
            location_id: get("GHL_LOCATION_ID").unwrap_or_default(),
            timeout_ms: number("LOGIN_TIMEOUT_MS", defaults.crm.timeout_ms),
            api_version: defaults.crm.api_version,
        };

        Ok(Self {
            port,
            cors_origin: get("FRONTEND_URL").unwrap_or(defaults.cors_origin),
            renew_url: get("RENEW_URL"),
            support_email: get("SUPPORT_EMAIL"),
            auth,
            crm,
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> anyhow::Result<ServerConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.cors_origin, "http://localhost:8080");
        assert_eq!(config.auth.session_lifetime_secs, 86_400);
        assert_eq!(config.auth.freshness_window_secs, 3_600);
        assert_eq!(config.auth.grace_period_hours, 168);
        assert_eq!(config.crm.timeout_ms, 1200);
        assert_eq!(config.crm.base_url, "https://services.leadconnectorhq.com");
        assert!(config.auth.jwt_secret.is_empty());
        assert_eq!(config.renew_url, None);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = load(&[
            ("PORT", "8081"),
            ("JWT_SECRET", "s3cret"),
            ("SESSION_TTL_HOURS", "12"),
            ("GRACE_TTL_HOURS", "72"),
            ("FRESHNESS_WINDOW_MINUTES", "15"),
            ("LOGIN_TIMEOUT_MS", "2500"),
            ("GHL_TOKEN", "pit-abc"),
            ("GHL_LOCATION_ID", "loc_1"),
            ("RENEW_URL", "https://example.com/renew"),
            ("FRONTEND_URL", "https://app.example.com"),
        ])
        .unwrap();

        assert_eq!(config.port, 8081);
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.auth.session_lifetime_secs, 43_200);
        assert_eq!(config.auth.grace_period_hours, 72);
        assert_eq!(config.auth.freshness_window_secs, 900);
        assert_eq!(config.crm.timeout_ms, 2500);
        assert!(config.crm.is_configured());
        assert_eq!(config.renew_url.as_deref(), Some("https://example.com/renew"));
        assert_eq!(config.cors_origin, "https://app.example.com");
    }

    #[test]
    fn malformed_numbers_fall_back() {
        let config = load(&[("GRACE_TTL_HOURS", "a week"), ("LOGIN_TIMEOUT_MS", "-5")]).unwrap();
        assert_eq!(config.auth.grace_period_hours, 168);
        assert_eq!(config.crm.timeout_ms, 1200);
    }

    #[test]
    fn overflowing_durations_fall_back() {
        let huge = u64::MAX.to_string();
        let config = load(&[
            ("SESSION_TTL_HOURS", huge.as_str()),
            ("FRESHNESS_WINDOW_MINUTES", huge.as_str()),
            ("GRACE_TTL_HOURS", huge.as_str()),
        ])
        .unwrap();
        assert_eq!(config.auth.session_lifetime_secs, 86_400);
        assert_eq!(config.auth.freshness_window_secs, 3_600);
        assert_eq!(config.auth.grace_period_hours, 168);

        let config = load(&[("SESSION_TTL_HOURS", "100000000000")]).unwrap();
        assert_eq!(config.auth.session_lifetime_secs, 86_400);
    }

    #[test]
    fn malformed_port_is_an_error() {
        assert!(load(&[("PORT", "eighty")]).is_err());
    }
}
