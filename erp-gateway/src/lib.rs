pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

use service_core::store::KeyValueStore;
use services::{BackendClient, PermissionService, TokenBroker};
use std::sync::Arc;

/// Shared application state, built once in `main`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KeyValueStore>,
    pub broker: Arc<TokenBroker>,
    pub backend: Arc<BackendClient>,
    pub permissions: PermissionService,
}

impl AppState {
    pub fn new(store: Arc<dyn KeyValueStore>, settings: &config::Settings) -> Self {
        let broker = Arc::new(TokenBroker::new(settings.identity.clone(), store.clone()));
        let backend = Arc::new(BackendClient::new(
            settings.backend.clone(),
            broker.clone(),
        ));
        let permissions = PermissionService::new(store.clone(), backend.clone())
            .with_admin_roles(settings.access.admin_roles.clone());

        Self {
            store,
            broker,
            backend,
            permissions,
        }
    }
}
