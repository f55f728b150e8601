//! Subscription domain model.
//!
//! [`RawSubscription`] mirrors the loosely-typed record returned by the
//! CRM payments API; [`SubscriptionStatus`] is the canonical shape the
//! rest of the system reasons about and embeds in session tokens.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Plan name reported when a contact has no subscription at all.
pub const NO_SUBSCRIPTION_PLAN: &str = "none";

/// Raw status reported when a contact has no subscription at all.
pub const NO_SUBSCRIPTION_STATUS: &str = "no_subscription";

/// Plan name granted to demo identities.
pub const DEMO_PLAN: &str = "Demo Access";

/// Epoch values at or above this magnitude are treated as milliseconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// A timestamp as reported by the CRM.
///
/// The CRM is inconsistent about timestamp encoding (RFC 3339 strings,
/// bare dates, epoch seconds or epoch milliseconds). Values that cannot
/// be interpreted are kept as [`CrmTimestamp::Unparseable`] so callers
/// can decide how to treat them instead of silently losing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrmTimestamp {
    At(DateTime<Utc>),
    Unparseable(String),
}

impl CrmTimestamp {
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            CrmTimestamp::At(at) => Some(*at),
            CrmTimestamp::Unparseable(_) => None,
        }
    }

    pub fn parse_str(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(at) = DateTime::parse_from_rfc3339(trimmed) {
            return CrmTimestamp::At(at.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
            return CrmTimestamp::At(naive.and_utc());
        }
        if let Some(midnight) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
        {
            return CrmTimestamp::At(midnight.and_utc());
        }
        if let Ok(epoch) = trimmed.parse::<i64>() {
            return Self::from_epoch(epoch);
        }
        CrmTimestamp::Unparseable(raw.to_string())
    }

    pub fn from_epoch(value: i64) -> Self {
        let at = if value.abs() >= EPOCH_MILLIS_THRESHOLD {
            DateTime::from_timestamp_millis(value)
        } else {
            DateTime::from_timestamp(value, 0)
        };
        match at {
            Some(at) => CrmTimestamp::At(at),
            None => CrmTimestamp::Unparseable(value.to_string()),
        }
    }

    /// Interpret a raw JSON value. Empty strings, zero and `null` mean
    /// the CRM has no value for the field.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(CrmTimestamp::parse_str(&s)),
            Value::Number(n) => match n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)) {
                Some(0) => None,
                Some(epoch) => Some(CrmTimestamp::from_epoch(epoch)),
                None => Some(CrmTimestamp::Unparseable(n.to_string())),
            },
            other => Some(CrmTimestamp::Unparseable(other.to_string())),
        }
    }
}

impl From<DateTime<Utc>> for CrmTimestamp {
    fn from(at: DateTime<Utc>) -> Self {
        CrmTimestamp::At(at)
    }
}

fn optional_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<CrmTimestamp>, D::Error> {
    Ok(CrmTimestamp::from_json(Value::deserialize(deserializer)?))
}

/// Subscription record as returned by the CRM.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSubscription {
    #[serde(default)]
    pub id: Option<String>,
    /// Alternate spelling of `id` used by some endpoints.
    #[serde(default, rename = "_id")]
    pub object_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub price_name: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub plan_name: Option<String>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub trial_end: Option<CrmTimestamp>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub current_period_end: Option<CrmTimestamp>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub created_at: Option<CrmTimestamp>,
    /// Older records spell the creation time in snake case; some carry both.
    #[serde(default, rename = "created_at", deserialize_with = "optional_timestamp")]
    pub created_at_legacy: Option<CrmTimestamp>,
}

impl RawSubscription {
    /// Creation time, preferring `createdAt` over `created_at`.
    pub fn created(&self) -> Option<&CrmTimestamp> {
        self.created_at.as_ref().or(self.created_at_legacy.as_ref())
    }
}

/// Canonical membership status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatus {
    pub active: bool,
    pub plan: String,
    #[serde(default)]
    pub trial_ends_at: Option<DateTime<Utc>>,
    /// Status string exactly as the CRM reported it.
    #[serde(default, rename = "status")]
    pub raw_status: Option<String>,
    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,
}

impl SubscriptionStatus {
    /// The value used when a contact has no subscription.
    pub fn none() -> Self {
        Self {
            active: false,
            plan: NO_SUBSCRIPTION_PLAN.into(),
            trial_ends_at: None,
            raw_status: Some(NO_SUBSCRIPTION_STATUS.into()),
            current_period_end: None,
        }
    }

    /// The fixed status granted to demo identities.
    pub fn demo() -> Self {
        Self {
            active: true,
            plan: DEMO_PLAN.into(),
            trial_ends_at: None,
            raw_status: None,
            current_period_end: None,
        }
    }
}
