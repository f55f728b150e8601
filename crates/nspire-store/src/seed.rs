//! Demo account provisioning.

use nspire_core::error::NspireResult;
use nspire_core::models::identity::{CreateIdentity, IdentityKind};
use nspire_core::repository::IdentityRepository;
use tracing::info;

/// Bypass account that never touches the CRM.
pub const DEMO_EMAIL: &str = "demo@nspire.app";
const DEMO_PASSWORD: &str = "demo123";

/// Regular member whose contact id is resolved through the CRM.
pub const TEST_EMAIL: &str = "test@nspire.app";
const TEST_PASSWORD: &str = "test123";

/// Provision the demo and test accounts.
pub async fn seed_demo_identities<R: IdentityRepository>(repo: &R) -> NspireResult<()> {
    repo.create(CreateIdentity {
        email: DEMO_EMAIL.into(),
        password: DEMO_PASSWORD.into(),
        crm_contact_id: None,
        kind: IdentityKind::Demo,
    })
    .await?;

    repo.create(CreateIdentity {
        email: TEST_EMAIL.into(),
        password: TEST_PASSWORD.into(),
        crm_contact_id: None,
        kind: IdentityKind::Member,
    })
    .await?;

    info!(demo = DEMO_EMAIL, test = TEST_EMAIL, "demo identities seeded");
    Ok(())
}
