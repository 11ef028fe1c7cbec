//! Cache Module
//!
//! Namespaced TTL caching on top of a plain string key-value store, with a
//! persisted index of valid keys deciding what callers can see.

mod clock;
mod index;
mod raw;
mod record;
mod serializer;
mod stats;
mod storage;
mod ttl_cache;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{current_timestamp_ms, Clock, MockClock, SystemClock};
pub use index::ValidKeyIndex;
pub use raw::{index_key, namespaced_key, RawStore, SetValue, KEY_PREFIX};
pub use record::{decode, encode, is_expired, KeyMetadata, Record};
pub use serializer::WriteSerializer;
pub use stats::{CacheStats, StatsCounters};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use ttl_cache::{
    create_cache, Cache, CacheOptions, SetOptions, Ttl, DEFAULT_SECONDS_UNTIL_EXPIRATION,
};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed namespace length in bytes
pub const MAX_NAMESPACE_LENGTH: usize = 64;
