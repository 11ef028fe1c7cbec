//! Valid-Key Index Module
//!
//! Keeps the ordered list of keys a namespace currently considers live. The
//! list is itself a record in the store, so every mutation is a
//! read-modify-write that callers must run through the `WriteSerializer`.
//!
//! Order of entries:
//! - Untouched keys keep their insertion order
//! - A key that is set again moves to the end
//! - An invalidated or expired key is dropped

use tracing::{debug, warn};

use crate::cache::raw::{RawStore, SetValue};
use crate::cache::record::KeyMetadata;
use crate::error::Result;

// == Valid-Key Index ==
#[derive(Clone)]
pub struct ValidKeyIndex {
    raw: RawStore,
}

impl ValidKeyIndex {
    pub fn new(raw: RawStore) -> Self {
        Self { raw }
    }

    // == Read Valid ==
    /// Returns the non-expired entries in stored order.
    ///
    /// Every expired entry found has its value record deleted as a side
    /// effect. Failures of that cleanup are logged and otherwise ignored; the
    /// entry is retried on the next read.
    pub fn read_valid(&self) -> Result<Vec<KeyMetadata>> {
        self.read_valid_except(None)
    }

    /// Same as `read_valid`, but never purges the value record of `keep`.
    ///
    /// Used by `write_entry`, whose caller has already written a fresh value
    /// record for the key being replaced.
    fn read_valid_except(&self, keep: Option<&str>) -> Result<Vec<KeyMetadata>> {
        let now = self.raw.now_ms();
        let (expired, valid): (Vec<_>, Vec<_>) = self
            .raw
            .read_index()?
            .into_iter()
            .partition(|entry| entry.is_expired(now));

        for entry in expired.iter().filter(|e| Some(e.key.as_str()) != keep) {
            match self.raw.raw_set(&entry.key, &SetValue::Tombstone, None) {
                Ok(_) => debug!(
                    namespace = %self.raw.namespace(),
                    key = %entry.key,
                    "purged expired key"
                ),
                Err(e) => warn!(
                    namespace = %self.raw.namespace(),
                    key = %entry.key,
                    error = %e,
                    "failed to purge expired key"
                ),
            }
        }

        Ok(valid)
    }

    // == Contains ==
    /// Checks whether `key` is currently valid.
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.read_valid()?.iter().any(|entry| entry.key == key))
    }

    // == Write Entry ==
    /// Replaces the index entry for `entry.key`.
    ///
    /// Any existing entry for the key is removed and, unless `entry` is
    /// already expired, the new entry is appended at the end. Must only be
    /// called from inside `WriteSerializer::run_exclusive`.
    pub fn write_entry(&self, entry: KeyMetadata) -> Result<()> {
        let mut entries = self.read_valid_except(Some(entry.key.as_str()))?;
        entries.retain(|existing| existing.key != entry.key);

        if !entry.is_expired(self.raw.now_ms()) {
            entries.push(entry);
        }

        self.raw.write_index(&entries)?;
        debug!(
            namespace = %self.raw.namespace(),
            entries = entries.len(),
            "index rewritten"
        );
        Ok(())
    }
}
