//! Record Codec Module
//!
//! Defines how values and index metadata are encoded into the store's string
//! format, and what it means for a record to be expired.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// == Record ==
/// A persisted value together with its absolute expiration deadline.
///
/// Records never judge their own expiry; readers compare `expires_at_mse`
/// against a freshly sampled clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<T> {
    /// Expiration timestamp (Unix milliseconds), None = never expires
    pub expires_at_mse: Option<u64>,
    /// The stored value
    pub value: T,
}

// == Key Metadata ==
/// One entry of the valid-key index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetadata {
    /// The user-facing cache key
    pub key: String,
    /// Same deadline as the key's value record
    pub expires_at_mse: Option<u64>,
}

impl KeyMetadata {
    /// Entry that is already expired, used to drop a key from the index.
    pub fn invalidated(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            expires_at_mse: Some(0),
        }
    }

    /// Checks the entry against the given time.
    pub fn is_expired(&self, now: u64) -> bool {
        is_expired(self.expires_at_mse, now)
    }
}

// == Encode ==
/// Serializes a value and its deadline into the store's string format.
pub fn encode<T: Serialize>(value: &T, expires_at_mse: Option<u64>) -> Result<String> {
    let record = Record {
        expires_at_mse,
        value,
    };
    Ok(serde_json::to_string(&record)?)
}

// == Decode ==
/// Parses a stored string back into a record.
///
/// Malformed input is reported as `CacheError::Parse`.
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<Record<T>> {
    Ok(serde_json::from_str(raw)?)
}

// == Is Expired ==
/// Returns true once `now` has moved past the deadline.
///
/// A record whose deadline equals `now` is still valid; `None` never expires.
pub fn is_expired(expires_at_mse: Option<u64>, now: u64) -> bool {
    match expires_at_mse {
        Some(deadline) => deadline < now,
        None => false,
    }
}
