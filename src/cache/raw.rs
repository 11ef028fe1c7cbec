//! Raw Store Accessor Module
//!
//! Namespaces keys and performs the primitive record operations against the
//! underlying store. A missing or expired record reads as absent.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::cache::clock::Clock;
use crate::cache::record::{self, KeyMetadata};
use crate::cache::storage::KeyValueStore;
use crate::error::Result;

// == Public Constants ==
/// Fixed prefix for every raw key the cache writes
pub const KEY_PREFIX: &str = "nscache";

// == Set Value ==
/// What `set` writes: a value, or a tombstone that invalidates the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetValue {
    Value(String),
    Tombstone,
}

impl From<String> for SetValue {
    fn from(value: String) -> Self {
        SetValue::Value(value)
    }
}

impl From<&str> for SetValue {
    fn from(value: &str) -> Self {
        SetValue::Value(value.to_string())
    }
}

impl From<Option<String>> for SetValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(SetValue::Tombstone, SetValue::Value)
    }
}

// == Key Composition ==
/// Escapes the separator so a namespace can never bleed into the key part.
fn escape_namespace(namespace: &str) -> String {
    namespace.replace('\\', "\\\\").replace(':', "\\:")
}

/// Raw key of a user value record.
pub fn namespaced_key(namespace: &str, key: &str) -> String {
    format!("{}:v:{}:{}", KEY_PREFIX, escape_namespace(namespace), key)
}

/// Raw key of the namespace's valid-key index. Lives outside the value key space.
pub fn index_key(namespace: &str) -> String {
    format!("{}:i:{}", KEY_PREFIX, escape_namespace(namespace))
}

// == Raw Store ==
/// Record-level access to one namespace of the store.
#[derive(Clone)]
pub struct RawStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    namespace: String,
}

impl RawStore {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, namespace: String) -> Self {
        Self {
            store,
            clock,
            namespace,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Current time, sampled fresh on every call.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    // == Raw Set ==
    /// Writes or deletes the value record for `key`.
    ///
    /// Returns the index entry describing the write. A tombstone removes the
    /// record and yields an entry that is already expired, which the index
    /// treats as an instruction to drop the key.
    pub fn raw_set(
        &self,
        key: &str,
        value: &SetValue,
        seconds_until_expiration: Option<u64>,
    ) -> Result<KeyMetadata> {
        let raw_key = namespaced_key(&self.namespace, key);

        match value {
            SetValue::Tombstone => {
                self.store.remove_item(&raw_key)?;
                debug!(namespace = %self.namespace, key, "removed value record");
                Ok(KeyMetadata::invalidated(key))
            }
            SetValue::Value(value) => {
                let expires_at_mse =
                    self.write_record(&raw_key, value, seconds_until_expiration)?;
                debug!(namespace = %self.namespace, key, ?expires_at_mse, "wrote value record");
                Ok(KeyMetadata {
                    key: key.to_string(),
                    expires_at_mse,
                })
            }
        }
    }

    // == Raw Get ==
    /// Reads the value record for `key`.
    ///
    /// Expired records read as None but are left in place.
    pub fn raw_get(&self, key: &str) -> Result<Option<String>> {
        self.read_record(&namespaced_key(&self.namespace, key))
    }

    // == Index Record ==
    /// Reads the stored index entries, without any expiry filtering.
    pub fn read_index(&self) -> Result<Vec<KeyMetadata>> {
        Ok(self
            .read_record(&index_key(&self.namespace))?
            .unwrap_or_default())
    }

    /// Persists the index entries. The index record never expires.
    pub fn write_index(&self, entries: &[KeyMetadata]) -> Result<()> {
        self.write_record(&index_key(&self.namespace), &entries, None)?;
        Ok(())
    }

    fn write_record<T: Serialize>(
        &self,
        raw_key: &str,
        value: &T,
        seconds_until_expiration: Option<u64>,
    ) -> Result<Option<u64>> {
        let expires_at_mse = seconds_until_expiration
            .map(|secs| self.now_ms().saturating_add(secs.saturating_mul(1000)));
        let encoded = record::encode(value, expires_at_mse)?;
        self.store.set_item(raw_key, &encoded)?;
        Ok(expires_at_mse)
    }

    fn read_record<T: DeserializeOwned>(&self, raw_key: &str) -> Result<Option<T>> {
        let Some(raw) = self.store.get_item(raw_key)? else {
            return Ok(None);
        };

        let record = record::decode::<T>(&raw)?;
        if record::is_expired(record.expires_at_mse, self.now_ms()) {
            return Ok(None);
        }
        Ok(Some(record.value))
    }
}
