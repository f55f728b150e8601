//! Identity domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IdentityKind {
    /// A paying (or trialing) member whose status lives in the CRM.
    Member,
    /// Pre-provisioned bypass account for environments without CRM access.
    Demo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    /// Lower-cased login email.
    pub email: String,
    /// Argon2id PHC-format hash.
    pub password_hash: String,
    /// CRM contact id, when already known at provisioning time.
    pub crm_contact_id: Option<String>,
    pub kind: IdentityKind,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    pub fn is_demo(&self) -> bool {
        self.kind == IdentityKind::Demo
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIdentity {
    pub email: String,
    /// Raw password (will be hashed with Argon2id before storage).
    pub password: String,
    pub crm_contact_id: Option<String>,
    pub kind: IdentityKind,
}

/// Normalize an email for use as a lookup key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
