pub mod types;
pub mod config;
pub mod error;
pub mod response;
pub mod validation;
pub mod identity;
pub mod auth;
pub mod store;
pub mod dynamo;
pub mod users;
pub mod tables;
pub mod reservations;
pub mod router;

#[cfg(test)]
pub(crate) mod testing;

use crate::config::Config;
use crate::identity::IdentityProvider;
use crate::store::ItemStore;
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub identity: Arc<dyn IdentityProvider>,
    pub store: Arc<dyn ItemStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn ItemStore>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            identity,
            store,
        })
    }
}
