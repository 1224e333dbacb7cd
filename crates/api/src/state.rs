//! Application state

use std::sync::Arc;
use std::time::Instant;

use crate::{
    auth::{CookiePolicy, CredentialStore, TokenService},
    config::Config,
    store::Stores,
};

/// Shared application state. Immutable after startup; cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tokens: TokenService,
    pub credentials: CredentialStore,
    pub stores: Stores,
    pub cookies: CookiePolicy,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, stores: Stores) -> Self {
        Self {
            tokens: TokenService::from_config(&config),
            credentials: CredentialStore::new(stores.admins.clone()),
            cookies: CookiePolicy::from_config(&config),
            config: Arc::new(config),
            stores,
            started_at: Instant::now(),
        }
    }
}
