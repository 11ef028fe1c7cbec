//! Namespaced TTL Cache Module
//!
//! Public facade combining the raw store accessor, the valid-key index and the
//! write serializer into `get`/`set`/`keys`.
//!
//! A key is visible only while the index lists it. Writing the value record
//! and updating the index are two separate store writes; if the process stops
//! between them the key simply never becomes visible.

use std::sync::Arc;

use tracing::debug;

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::index::ValidKeyIndex;
use crate::cache::raw::{RawStore, SetValue};
use crate::cache::serializer::WriteSerializer;
use crate::cache::stats::{CacheStats, StatsCounters};
use crate::cache::storage::KeyValueStore;
use crate::error::Result;

// == Public Constants ==
/// Default TTL in seconds applied when a cache is created without one
pub const DEFAULT_SECONDS_UNTIL_EXPIRATION: u64 = 300;

// == Cache Options ==
/// Settings captured when a cache is created. Never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheOptions {
    /// Scope for every key of this cache
    pub namespace: String,
    /// TTL for items set without their own, None = never expire
    pub default_seconds_until_expiration: Option<u64>,
}

impl CacheOptions {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            default_seconds_until_expiration: Some(DEFAULT_SECONDS_UNTIL_EXPIRATION),
        }
    }

    pub fn with_default_ttl(mut self, seconds: Option<u64>) -> Self {
        self.default_seconds_until_expiration = seconds;
        self
    }
}

// == Set Options ==
/// Per-item expiration choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Ttl {
    /// Use the cache's default
    #[default]
    Default,
    /// Never expire, whatever the default says
    Never,
    /// Expire after this many seconds
    Seconds(u64),
}

/// Options for a single `set`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    pub seconds_until_expiration: Ttl,
}

impl SetOptions {
    pub fn ttl_secs(seconds: u64) -> Self {
        Self {
            seconds_until_expiration: Ttl::Seconds(seconds),
        }
    }

    pub fn never_expire() -> Self {
        Self {
            seconds_until_expiration: Ttl::Never,
        }
    }
}

// == Cache ==
/// Handle to one namespace of a store.
///
/// Share a single handle (e.g. behind an `Arc`) between all tasks writing the
/// namespace: index updates are only serialized per handle.
pub struct Cache {
    options: CacheOptions,
    raw: RawStore,
    index: ValidKeyIndex,
    serializer: WriteSerializer,
    stats: StatsCounters,
}

/// Creates a cache over `store` that reads the system clock.
pub fn create_cache(store: Arc<dyn KeyValueStore>, options: CacheOptions) -> Cache {
    Cache::with_clock(store, Arc::new(SystemClock), options)
}

impl Cache {
    // == Constructor ==
    /// Creates a cache with an explicit clock.
    pub fn with_clock(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        options: CacheOptions,
    ) -> Self {
        let raw = RawStore::new(store, clock, options.namespace.clone());
        Self {
            index: ValidKeyIndex::new(raw.clone()),
            raw,
            options,
            serializer: WriteSerializer::new(),
            stats: StatsCounters::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.options.namespace
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    // == Set ==
    /// Stores `value` under `key`, or invalidates the key for a tombstone.
    ///
    /// Returns once both the value record and the index have been written.
    pub async fn set(
        &self,
        key: &str,
        value: impl Into<SetValue>,
        options: SetOptions,
    ) -> Result<()> {
        let value = value.into();
        let seconds = match options.seconds_until_expiration {
            Ttl::Default => self.options.default_seconds_until_expiration,
            Ttl::Never => None,
            Ttl::Seconds(seconds) => Some(seconds),
        };

        let entry = self.raw.raw_set(key, &value, seconds)?;
        self.serializer
            .run_exclusive(|| async move { self.index.write_entry(entry) })
            .await?;

        match value {
            SetValue::Value(_) => self.stats.record_set(),
            SetValue::Tombstone => self.stats.record_invalidation(),
        }
        debug!(namespace = %self.namespace(), key, ttl = ?seconds, "set complete");
        Ok(())
    }

    // == Invalidate ==
    /// Removes `key` from the cache.
    pub async fn invalidate(&self, key: &str) -> Result<()> {
        self.set(key, SetValue::Tombstone, SetOptions::default()).await
    }

    // == Get ==
    /// Returns the value for `key` if the index currently lists it.
    ///
    /// A value record that exists without an index entry is never returned.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = if self.index.contains(key)? {
            self.raw.raw_get(key)?
        } else {
            None
        };

        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        Ok(value)
    }

    // == Keys ==
    /// Returns currently valid keys in index order.
    ///
    /// Expired keys found along the way have their value records purged.
    pub async fn keys(&self) -> Result<Vec<String>> {
        Ok(self
            .index
            .read_valid()?
            .into_iter()
            .map(|entry| entry.key)
            .collect())
    }

    // == Stats ==
    /// Returns current counters and the live key count.
    pub async fn stats(&self) -> Result<CacheStats> {
        let live_keys = self.index.read_valid()?.len();
        Ok(self.stats.snapshot(live_keys))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::MockClock;
    use crate::cache::raw::namespaced_key;
    use crate::cache::storage::MemoryStore;
    use crate::error::CacheError;

    fn cache_with(default_ttl: Option<u64>) -> (Cache, Arc<MemoryStore>, MockClock) {
        let store = Arc::new(MemoryStore::new());
        let clock = MockClock::new(1_700_000_000_000);
        let cache = Cache::with_clock(
            store.clone(),
            Arc::new(clock.clone()),
            CacheOptions::new("test").with_default_ttl(default_ttl),
        );
        (cache, store, clock)
    }

    #[test]
    fn test_options_default_ttl() {
        let options = CacheOptions::new("ns");
        assert_eq!(options.default_seconds_until_expiration, Some(300));
        assert_eq!(SetOptions::default().seconds_until_expiration, Ttl::Default);
    }

    #[tokio::test]
    async fn test_get_unknown_key() {
        let (cache, _, _) = cache_with(Some(300));
        assert_eq!(cache.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let (cache, _, _) = cache_with(Some(300));

        cache.set("k", "v", SetOptions::default()).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_default_ttl_applies() {
        let (cache, _, clock) = cache_with(Some(10));

        cache.set("a", "x", SetOptions::default()).await.unwrap();
        clock.advance_secs(9);
        assert_eq!(cache.get("a").await.unwrap(), Some("x".to_string()));

        clock.advance_ms(1_001);
        assert_eq!(cache.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_never_expire_overrides_default() {
        let (cache, _, clock) = cache_with(Some(10));

        cache
            .set("forever", "x", SetOptions::never_expire())
            .await
            .unwrap();
        clock.advance_secs(100_000);

        assert_eq!(cache.get("forever").await.unwrap(), Some("x".to_string()));
    }

    #[tokio::test]
    async fn test_no_default_ttl() {
        let (cache, _, clock) = cache_with(None);

        cache.set("k", "v", SetOptions::default()).await.unwrap();
        clock.advance_secs(1_000_000);

        assert_eq!(cache.keys().await.unwrap(), vec!["k"]);
    }

    #[tokio::test]
    async fn test_invalidate() {
        let (cache, store, _) = cache_with(Some(300));

        cache.set("k", "v", SetOptions::default()).await.unwrap();
        cache.invalidate("k").await.unwrap();

        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.keys().await.unwrap().is_empty());
        assert!(store
            .get_item(&namespaced_key("test", "k"))
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_orphaned_value_record_is_invisible() {
        let (cache, store, _) = cache_with(Some(300));

        // A value record whose index write never happened
        store
            .set_item(
                &namespaced_key("test", "ghost"),
                r#"{"expiresAtMse":null,"value":"boo"}"#,
            )
            .unwrap();

        assert_eq!(cache.get("ghost").await.unwrap(), None);
        assert!(cache.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = Arc::new(MemoryStore::with_quota(16));
        let cache = create_cache(store, CacheOptions::new("q"));

        let result = cache
            .set("key", "a value far too large", SetOptions::default())
            .await;
        assert!(matches!(result, Err(CacheError::QuotaExceeded(_))));
        assert!(cache.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupted_index_propagates() {
        let (cache, store, _) = cache_with(Some(300));
        store.set_item("nscache:i:test", "{oops").unwrap();

        assert!(matches!(cache.keys().await, Err(CacheError::Parse(_))));
        assert!(matches!(cache.get("k").await, Err(CacheError::Parse(_))));
    }

    #[tokio::test]
    async fn test_stats_counts() {
        let (cache, _, _) = cache_with(Some(300));

        cache.set("a", "1", SetOptions::default()).await.unwrap();
        cache.set("b", "2", SetOptions::default()).await.unwrap();
        cache.invalidate("b").await.unwrap();
        cache.get("a").await.unwrap();
        cache.get("b").await.unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.sets, 2);
        assert_eq!(stats.invalidations, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.live_keys, 1);
    }
}
