//! In-memory implementation of [`IdentityRepository`].
//!
//! Password hashing uses Argon2id with OWASP-recommended parameters
//! (memory: 19 MiB, iterations: 2, parallelism: 1). Salt is randomly
//! generated per hash. An optional pepper (server-side secret) can be
//! provided at construction time.

use std::collections::HashMap;
use std::sync::RwLock;

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::Utc;
use nspire_core::error::NspireResult;
use nspire_core::models::identity::{CreateIdentity, Identity, normalize_email};
use nspire_core::repository::IdentityRepository;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;

/// Hash a password with Argon2id using OWASP-recommended parameters.
///
/// If a pepper is provided, it is prepended to the password before
/// hashing. The salt is randomly generated for each call.
pub fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, StoreError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| StoreError::Hash(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| StoreError::Hash(e.to_string()))?;

    Ok(hash.to_string())
}

/// Identity store held entirely in process memory, keyed by lower-cased
/// email. Stands in for a persistent user database.
#[derive(Default)]
pub struct InMemoryIdentityRepository {
    identities: RwLock<HashMap<String, Identity>>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl InMemoryIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pepper(pepper: String) -> Self {
        Self {
            identities: RwLock::default(),
            pepper: Some(pepper),
        }
    }

    pub fn len(&self) -> usize {
        self.identities.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IdentityRepository for InMemoryIdentityRepository {
    async fn create(&self, input: CreateIdentity) -> NspireResult<Identity> {
        let email = normalize_email(&input.email);
        if email.is_empty() {
            return Err(StoreError::Invalid("email is required".into()).into());
        }
        if input.password.is_empty() {
            return Err(StoreError::Invalid("password is required".into()).into());
        }
        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;

        let identity = Identity {
            id: Uuid::new_v4(),
            email: email.clone(),
            password_hash,
            crm_contact_id: input.crm_contact_id.filter(|id| !id.trim().is_empty()),
            kind: input.kind,
            created_at: Utc::now(),
        };

        let mut identities = self
            .identities
            .write()
            .map_err(|_| StoreError::Poisoned)?;
        if identities.contains_key(&email) {
            return Err(StoreError::AlreadyExists {
                entity: "identity".into(),
            }
            .into());
        }
        identities.insert(email, identity.clone());

        debug!(user_id = %identity.id, kind = ?identity.kind, "identity provisioned");
        Ok(identity)
    }

    async fn get_by_email(&self, email: &str) -> NspireResult<Identity> {
        let key = normalize_email(email);
        let identities = self
            .identities
            .read()
            .map_err(|_| StoreError::Poisoned)?;

        identities.get(&key).cloned().ok_or_else(|| {
            StoreError::NotFound {
                entity: "identity".into(),
                id: key.clone(),
            }
            .into()
        })
    }
}
