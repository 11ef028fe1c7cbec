//! Cache Registry
//!
//! Hands out one shared `Cache` per namespace so that every write touching a
//! namespace goes through the same write serializer. Reads never register a
//! namespace.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::cache::{
    Cache, CacheOptions, Clock, KeyValueStore, SystemClock, MAX_NAMESPACE_LENGTH,
};
use crate::error::{CacheError, Result};

/// Lazily created caches over one store, keyed by namespace.
pub struct CacheRegistry {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    default_ttl: Option<u64>,
    caches: RwLock<HashMap<String, Arc<Cache>>>,
}

impl CacheRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>, default_ttl: Option<u64>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), default_ttl)
    }

    pub fn with_clock(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        default_ttl: Option<u64>,
    ) -> Self {
        Self {
            store,
            clock,
            default_ttl,
            caches: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cache for `namespace`, registering it on first use.
    ///
    /// Only for writers: the registered handle owns the namespace's serializer.
    pub async fn cache(&self, namespace: &str) -> Result<Arc<Cache>> {
        validate_namespace(namespace)?;

        if let Some(cache) = self.caches.read().await.get(namespace) {
            return Ok(cache.clone());
        }

        let mut caches = self.caches.write().await;
        let cache = caches.entry(namespace.to_string()).or_insert_with(|| {
            info!("Opening cache namespace '{}'", namespace);
            Arc::new(self.open(namespace))
        });
        Ok(cache.clone())
    }

    /// Returns a cache for reading `namespace` without registering it.
    ///
    /// Hands back the registered cache when there is one, so its counters see
    /// the read. Otherwise builds a throwaway handle over the same store.
    pub async fn reader(&self, namespace: &str) -> Result<Arc<Cache>> {
        validate_namespace(namespace)?;

        match self.caches.read().await.get(namespace) {
            Some(cache) => Ok(cache.clone()),
            None => Ok(Arc::new(self.open(namespace))),
        }
    }

    /// Snapshot of every namespace opened so far.
    pub async fn caches(&self) -> Vec<Arc<Cache>> {
        self.caches.read().await.values().cloned().collect()
    }

    fn open(&self, namespace: &str) -> Cache {
        Cache::with_clock(
            self.store.clone(),
            self.clock.clone(),
            CacheOptions::new(namespace).with_default_ttl(self.default_ttl),
        )
    }
}

fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty() {
        return Err(CacheError::InvalidRequest(
            "Namespace cannot be empty".to_string(),
        ));
    }
    if namespace.len() > MAX_NAMESPACE_LENGTH {
        return Err(CacheError::InvalidRequest(format!(
            "Namespace exceeds maximum length of {} bytes",
            MAX_NAMESPACE_LENGTH
        )));
    }
    Ok(())
}
