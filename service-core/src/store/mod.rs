//! Key-value persistence shared by the gateway caches.
//!
//! Values are opaque strings (JSON documents in practice). Backends may
//! expire entries on their own when a TTL is supplied, but callers must still
//! validate freshness of whatever they read back.

mod memory;
mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, anyhow::Error>;

    /// Overwrite `key`. `ttl` of `None` keeps the entry until deleted.
    async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), anyhow::Error>;

    async fn delete(&self, key: &str) -> Result<(), anyhow::Error>;

    async fn health_check(&self) -> Result<(), anyhow::Error>;
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreSettings {
    #[default]
    Memory,
    Redis {
        url: String,
    },
}

/// Build the configured store backend.
pub async fn connect(settings: &StoreSettings) -> Result<Arc<dyn KeyValueStore>, anyhow::Error> {
    match settings {
        StoreSettings::Memory => {
            tracing::info!("Using in-memory key-value store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreSettings::Redis { url } => Ok(Arc::new(RedisStore::new(url).await?)),
    }
}
