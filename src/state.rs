use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::identity::IdentityBridge;
use crate::auth::jwt::TokenVerifier;
use crate::cache::ServiceCatalogCache;
use crate::catalog::ServiceCatalog;
use crate::config::CacheConfig;
use crate::events::EventBus;

/// Everything handlers need, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub catalog: Arc<ServiceCatalog>,
    pub identity: IdentityBridge,
    pub events: EventBus,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, cache: &CacheConfig, verifier: TokenVerifier) -> Self {
        let catalog = ServiceCatalog::new(db.clone(), ServiceCatalogCache::from_config(cache));

        Self {
            identity: IdentityBridge::new(db.clone()),
            catalog: Arc::new(catalog),
            events: EventBus::new(),
            verifier: Arc::new(verifier),
            db,
        }
    }
}
