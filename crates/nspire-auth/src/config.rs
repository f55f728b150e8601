//! Authentication configuration.

use chrono::Duration;

/// Upper bound for any configured window (100 years). Larger values are
/// clamped so token arithmetic cannot overflow.
pub const MAX_WINDOW_SECS: u64 = 100 * 365 * 86_400;

fn clamped(secs: u64) -> Duration {
    Duration::seconds(secs.min(MAX_WINDOW_SECS) as i64)
}

/// Configuration for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens (HS256).
    pub jwt_secret: String,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Session token lifetime in seconds (default: 86_400 = 24 hours).
    pub session_lifetime_secs: u64,
    /// How long an embedded membership status is trusted without asking
    /// the CRM again, in seconds (default: 3600 = 60 minutes).
    pub freshness_window_secs: u64,
    /// How long after the last successful verification an active
    /// membership survives CRM outages, in hours (default: 168 = 7 days).
    pub grace_period_hours: u64,
    /// Optional pepper prepended to passwords before Argon2id verification.
    pub pepper: Option<String>,
}

impl AuthConfig {
    pub fn freshness_window(&self) -> Duration {
        clamped(self.freshness_window_secs)
    }

    pub fn session_lifetime(&self) -> Duration {
        clamped(self.session_lifetime_secs)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: "nspire".into(),
            session_lifetime_secs: 86_400,
            freshness_window_secs: 3_600,
            grace_period_hours: 168,
            pepper: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_windows_are_clamped() {
        let config = AuthConfig {
            session_lifetime_secs: u64::MAX,
            freshness_window_secs: u64::MAX,
            ..Default::default()
        };
        let max = Duration::seconds(MAX_WINDOW_SECS as i64);
        assert_eq!(config.session_lifetime(), max);
        assert_eq!(config.freshness_window(), max);
        assert_eq!(AuthConfig::default().session_lifetime(), Duration::hours(24));
    }
}
