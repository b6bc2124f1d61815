//! Local cache of a user's resolved permissions.
//!
//! Entries are wrapped in a [`CacheEnvelope`] carrying the save time and the
//! schema version. [`PermissionCache::load`] only hands back data that is both
//! current-version and younger than [`CACHE_TTL_MS`]; anything else is purged
//! and reported as a miss, so callers re-resolve on `None`.

use crate::models::access::{CacheEnvelope, CachedAuth};
use chrono::Utc;
use service_core::store::KeyValueStore;
use std::sync::Arc;
use std::time::Duration;

/// Fixed storage key; per-user caches append `:{user_id}`.
pub const CACHE_KEY: &str = "erp_auth_cache";

/// Bump on any breaking change to [`CachedAuth`].
pub const CACHE_VERSION: &str = "2";

pub const CACHE_TTL_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Clone)]
pub struct PermissionCache {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl PermissionCache {
    /// Cache under the fixed [`CACHE_KEY`].
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            key: CACHE_KEY.to_string(),
        }
    }

    /// Cache scoped to one user of a shared store.
    pub fn for_user(store: Arc<dyn KeyValueStore>, user_id: &str) -> Self {
        Self {
            store,
            key: format!("{}:{}", CACHE_KEY, user_id),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Persist `data`, replacing any existing entry.
    pub async fn save(&self, data: &CachedAuth) {
        let envelope = CacheEnvelope {
            data: data.clone(),
            ts: Utc::now().timestamp_millis(),
            version: CACHE_VERSION.to_string(),
        };

        let json = match serde_json::to_string(&envelope) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "Failed to serialize permission cache");
                return;
            }
        };

        let ttl = Duration::from_millis(CACHE_TTL_MS as u64);
        if let Err(e) = self.store.set(&self.key, &json, Some(ttl)).await {
            tracing::warn!(key = %self.key, error = %e, "Failed to save permission cache");
        }
    }

    /// Cached permissions, or `None` when absent, unreadable, outdated or expired.
    pub async fn load(&self) -> Option<CachedAuth> {
        let raw = match self.store.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to read permission cache");
                self.clear().await;
                return None;
            }
        };

        let envelope: CacheEnvelope = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Discarding malformed permission cache");
                self.clear().await;
                return None;
            }
        };

        if envelope.version != CACHE_VERSION {
            tracing::debug!(
                key = %self.key,
                cached = %envelope.version,
                expected = CACHE_VERSION,
                "Permission cache version mismatch"
            );
            self.clear().await;
            return None;
        }

        let age = Utc::now().timestamp_millis() - envelope.ts;
        if age >= CACHE_TTL_MS {
            tracing::debug!(key = %self.key, age_ms = age, "Permission cache expired");
            self.clear().await;
            return None;
        }

        Some(envelope.data)
    }

    pub async fn clear(&self) {
        if let Err(e) = self.store.delete(&self.key).await {
            tracing::warn!(key = %self.key, error = %e, "Failed to clear permission cache");
        }
    }
}
