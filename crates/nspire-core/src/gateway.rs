//! CRM gateway abstraction.
//!
//! Implementations talk to the external CRM. Every call is expected to
//! enforce its own timeout; timeouts surface as
//! [`NspireError::UpstreamTimeout`](crate::error::NspireError::UpstreamTimeout)
//! and other failures as `NspireError::Upstream`.

use crate::error::NspireResult;
use crate::models::subscription::RawSubscription;

pub trait CrmGateway: Send + Sync + 'static {
    /// Resolve a contact id by exact, case-insensitive email match.
    fn search_contact_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = NspireResult<Option<String>>> + Send;

    /// List every subscription attached to a contact, in CRM order.
    fn list_subscriptions(
        &self,
        contact_id: &str,
    ) -> impl Future<Output = NspireResult<Vec<RawSubscription>>> + Send;

    /// Append an activity note to a contact.
    ///
    /// Callers dispatch this on a detached task and never let its
    /// outcome reach the user.
    fn log_activity(
        &self,
        contact_id: &str,
        activity: &str,
    ) -> impl Future<Output = NspireResult<()>> + Send;

    /// Cheap reachability probe used by health checks.
    fn test_connection(&self) -> impl Future<Output = bool> + Send;
}
