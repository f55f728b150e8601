//! Repository trait definitions for identity lookup.
//!
//! The auth service is generic over these traits so that it has no
//! dependency on any particular credential store.

use crate::error::NspireResult;
use crate::models::identity::{CreateIdentity, Identity};

pub trait IdentityRepository: Send + Sync {
    fn create(&self, input: CreateIdentity) -> impl Future<Output = NspireResult<Identity>> + Send;
    /// Case-insensitive lookup. Returns `NspireError::NotFound` when no
    /// identity is registered for `email`.
    fn get_by_email(&self, email: &str) -> impl Future<Output = NspireResult<Identity>> + Send;
}
