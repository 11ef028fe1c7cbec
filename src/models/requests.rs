//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::{Deserialize, Deserializer};

use crate::cache::{SetOptions, SetValue, Ttl, MAX_KEY_LENGTH};

/// Request body for the SET operation (PUT /:namespace/set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: The value to store; `null` invalidates the key
/// - `ttl`: TTL in seconds; omitted = namespace default, `null` = never expire
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store, None = tombstone
    #[serde(default)]
    pub value: Option<String>,
    /// Outer None = field omitted, inner None = explicit null
    #[serde(default, deserialize_with = "present")]
    pub ttl: Option<Option<u64>>,
}

/// Marks a field as present even when its value is `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<u64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<u64>::deserialize(deserializer).map(Some)
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            ));
        }
        None
    }

    /// The value to write, as the cache understands it.
    pub fn set_value(&self) -> SetValue {
        self.value.clone().into()
    }

    /// The expiration choice, as the cache understands it.
    pub fn set_options(&self) -> SetOptions {
        let seconds_until_expiration = match self.ttl {
            None => Ttl::Default,
            Some(None) => Ttl::Never,
            Some(Some(seconds)) => Ttl::Seconds(seconds),
        };
        SetOptions {
            seconds_until_expiration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_request_deserialize() {
        let json = r#"{"key": "test", "value": "hello"}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, "test");
        assert_eq!(req.value.as_deref(), Some("hello"));
        assert!(req.ttl.is_none());
        assert_eq!(req.set_options(), SetOptions::default());
    }

    #[test]
    fn test_set_request_with_ttl() {
        let json = r#"{"key": "test", "value": "hello", "ttl": 60}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.ttl, Some(Some(60)));
        assert_eq!(req.set_options(), SetOptions::ttl_secs(60));
    }

    #[test]
    fn test_set_request_null_ttl_never_expires() {
        let json = r#"{"key": "test", "value": "hello", "ttl": null}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.ttl, Some(None));
        assert_eq!(req.set_options(), SetOptions::never_expire());
    }

    #[test]
    fn test_set_request_null_value_is_tombstone() {
        let json = r#"{"key": "test", "value": null}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.set_value(), SetValue::Tombstone);

        let json = r#"{"key": "test"}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.set_value(), SetValue::Tombstone);
    }

    #[test]
    fn test_validate_empty_key() {
        let req = SetRequest {
            key: "".to_string(),
            value: Some("test".to_string()),
            ttl: None,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_valid_request() {
        let req = SetRequest {
            key: "valid_key".to_string(),
            value: Some("test".to_string()),
            ttl: Some(Some(60)),
        };
        assert!(req.validate().is_none());
    }
}
