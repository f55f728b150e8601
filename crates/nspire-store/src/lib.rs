//! NSPIRE Store — credential storage.
//!
//! This crate provides:
//! - An in-memory [`IdentityRepository`](nspire_core::repository::IdentityRepository)
//!   implementation ([`InMemoryIdentityRepository`])
//! - Argon2id password hashing ([`hash_password`])
//! - Demo account provisioning ([`seed_demo_identities`])
//! - Error types ([`StoreError`])

mod error;
mod identity;
mod seed;

pub use error::StoreError;
pub use identity::{InMemoryIdentityRepository, hash_password};
pub use seed::{DEMO_EMAIL, TEST_EMAIL, seed_demo_identities};
