//! NSPIRE Auth — member login, signed session tokens, subscription
//! normalization and time-windowed status re-verification with a
//! grace period on CRM failure.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod subscription;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{ActivityInput, AuthService, LoginInput, LoginOutput, StatusView};
pub use token::SessionClaims;
