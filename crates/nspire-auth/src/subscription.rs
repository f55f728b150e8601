//! Subscription normalization.
//!
//! Turns loosely-typed CRM subscription records into the canonical
//! [`SubscriptionStatus`]. Everything here is pure; the `_at` variants
//! take the reference instant explicitly.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use nspire_core::models::subscription::{CrmTimestamp, RawSubscription, SubscriptionStatus};

/// Raw statuses that grant access.
const ACTIVE_STATUSES: [&str; 2] = ["active", "trialing"];

/// Status assumed when the CRM omits one.
const DEFAULT_STATUS: &str = "inactive";

/// Plan reported when no name field is populated.
const UNKNOWN_PLAN: &str = "unknown";

pub fn is_active_status(status: &str) -> bool {
    ACTIVE_STATUSES
        .iter()
        .any(|s| s.eq_ignore_ascii_case(status.trim()))
}

/// A missing period end never expires. One the CRM sent but that could
/// not be parsed is never "within" anything.
pub fn is_within_period(period_end: Option<&CrmTimestamp>, now: DateTime<Utc>) -> bool {
    match period_end {
        None => true,
        Some(CrmTimestamp::At(end)) => now < *end,
        Some(CrmTimestamp::Unparseable(_)) => false,
    }
}

fn resolve_plan(raw: &RawSubscription) -> String {
    [&raw.price_name, &raw.product_name, &raw.plan_name]
        .into_iter()
        .flatten()
        .map(|name| name.trim())
        .find(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_PLAN)
        .to_string()
}

pub fn normalize_at(raw: Option<&RawSubscription>, now: DateTime<Utc>) -> SubscriptionStatus {
    let Some(raw) = raw else {
        return SubscriptionStatus::none();
    };

    let status = raw.status.as_deref().unwrap_or(DEFAULT_STATUS);
    let active =
        is_active_status(status) && is_within_period(raw.current_period_end.as_ref(), now);

    SubscriptionStatus {
        active,
        plan: resolve_plan(raw),
        trial_ends_at: raw.trial_end.as_ref().and_then(CrmTimestamp::instant),
        raw_status: raw.status.clone(),
        current_period_end: raw
            .current_period_end
            .as_ref()
            .and_then(CrmTimestamp::instant),
    }
}

pub fn normalize(raw: Option<&RawSubscription>) -> SubscriptionStatus {
    normalize_at(raw, Utc::now())
}

/// Milliseconds since the epoch of the record's creation; missing or
/// unparseable timestamps count as the epoch itself.
fn created_millis(raw: &RawSubscription) -> i64 {
    raw.created()
        .and_then(CrmTimestamp::instant)
        .map(|at| at.timestamp_millis())
        .unwrap_or(0)
}

/// Pick the most recently created subscription.
///
/// Ties keep the CRM's original order (the sort is stable), so the first
/// of several equally-recent records wins.
pub fn select_latest(subscriptions: &[RawSubscription]) -> Option<&RawSubscription> {
    let mut ordered: Vec<&RawSubscription> = subscriptions.iter().collect();
    ordered.sort_by_key(|s| Reverse(created_millis(s)));
    ordered.into_iter().next()
}

/// Select the latest subscription and normalize it.
pub fn resolve_status_at(
    subscriptions: &[RawSubscription],
    now: DateTime<Utc>,
) -> SubscriptionStatus {
    normalize_at(select_latest(subscriptions), now)
}

pub fn resolve_status(subscriptions: &[RawSubscription]) -> SubscriptionStatus {
    resolve_status_at(subscriptions, Utc::now())
}
