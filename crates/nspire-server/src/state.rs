//! Shared application state.

use nspire_auth::AuthService;
use nspire_core::gateway::CrmGateway;
use nspire_core::repository::IdentityRepository;

use crate::config::ServerConfig;

/// State shared by every handler.
pub struct AppState<R: IdentityRepository, C: CrmGateway> {
    pub config: ServerConfig,
    pub auth: AuthService<R, C>,
}

impl<R: IdentityRepository, C: CrmGateway> AppState<R, C> {
    pub fn new(config: ServerConfig, auth: AuthService<R, C>) -> Self {
        Self { config, auth }
    }
}
