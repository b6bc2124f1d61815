//! Cache-then-resolve access lookups.

use crate::models::access::CachedAuth;
use crate::services::backend_client::BackendClient;
use crate::services::permission_cache::PermissionCache;
use async_trait::async_trait;
use service_core::error::AppError;
use service_core::store::KeyValueStore;
use std::sync::Arc;

/// Source of truth for a user's role and grants.
#[async_trait]
pub trait PermissionResolver: Send + Sync {
    async fn resolve(&self, user_id: &str) -> Result<CachedAuth, AppError>;
}

#[async_trait]
impl PermissionResolver for BackendClient {
    async fn resolve(&self, user_id: &str) -> Result<CachedAuth, AppError> {
        self.fetch_access(user_id).await
    }
}

#[derive(Clone)]
pub struct PermissionService {
    store: Arc<dyn KeyValueStore>,
    resolver: Arc<dyn PermissionResolver>,
    admin_roles: Arc<[String]>,
}

impl PermissionService {
    pub fn new(store: Arc<dyn KeyValueStore>, resolver: Arc<dyn PermissionResolver>) -> Self {
        Self {
            store,
            resolver,
            admin_roles: Arc::from(Vec::new()),
        }
    }

    /// Roles allowed through every [`check`](Self::check).
    pub fn with_admin_roles(mut self, roles: Vec<String>) -> Self {
        self.admin_roles = Arc::from(roles);
        self
    }

    pub fn cache_for(&self, user_id: &str) -> PermissionCache {
        PermissionCache::for_user(self.store.clone(), user_id)
    }

    /// Cached access for `user_id`, resolving and caching on a miss.
    pub async fn access(&self, user_id: &str) -> Result<CachedAuth, AppError> {
        let cache = self.cache_for(user_id);
        if let Some(auth) = cache.load().await {
            return Ok(auth);
        }

        tracing::debug!(user_id = %user_id, "Resolving permissions");
        let auth = self.resolver.resolve(user_id).await?;
        cache.save(&auth).await;
        Ok(auth)
    }

    pub async fn invalidate(&self, user_id: &str) {
        self.cache_for(user_id).clear().await;
    }

    /// Whether the user holds every requested grant.
    pub async fn check(
        &self,
        user_id: &str,
        module: Option<&str>,
        feature: Option<&str>,
    ) -> Result<bool, AppError> {
        let auth = self.access(user_id).await?;
        if auth.has_role_in(&self.admin_roles) {
            return Ok(true);
        }
        let module_ok = module.is_none_or(|m| auth.has_module(m));
        let feature_ok = feature.is_none_or(|f| auth.has_feature(f));
        Ok(module_ok && feature_ok)
    }
}
