//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in seconds for items set without an explicit TTL, None = never expire
    pub default_ttl: Option<u64>,
    /// HTTP server port
    pub server_port: u16,
    /// Interval in seconds between expiry sweeps
    pub sweep_interval: u64,
    /// JSON file backing the store, None = in-memory store
    pub store_path: Option<PathBuf>,
    /// Byte quota for the store, None = unlimited
    pub store_quota_bytes: Option<usize>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL` - Default TTL in seconds, or `none` (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL` - Expiry sweep frequency in seconds (default: 30)
    /// - `STORE_PATH` - Path of the JSON store file (default: in-memory)
    /// - `STORE_QUOTA_BYTES` - Store quota in bytes (default: unlimited)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            default_ttl: match env::var("DEFAULT_TTL") {
                Ok(v) => parse_ttl(&v).unwrap_or(defaults.default_ttl),
                Err(_) => defaults.default_ttl,
            },
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            sweep_interval: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.sweep_interval),
            store_path: env::var("STORE_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            store_quota_bytes: env::var("STORE_QUOTA_BYTES")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }
}

/// Parses a TTL setting: a number of seconds, or `none`/`never` for no expiration.
///
/// Returns None when the value is not understood.
fn parse_ttl(raw: &str) -> Option<Option<u64>> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("none") || trimmed.eq_ignore_ascii_case("never") {
        return Some(None);
    }
    trimmed.parse().ok().map(Some)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: Some(300),
            server_port: 3000,
            sweep_interval: 30,
            store_path: None,
            store_quota_bytes: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.default_ttl, Some(300));
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.sweep_interval, 30);
        assert!(config.store_path.is_none());
        assert!(config.store_quota_bytes.is_none());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("DEFAULT_TTL");
        env::remove_var("SERVER_PORT");
        env::remove_var("SWEEP_INTERVAL");
        env::remove_var("STORE_PATH");
        env::remove_var("STORE_QUOTA_BYTES");

        let config = Config::from_env();
        assert_eq!(config.default_ttl, Some(300));
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.sweep_interval, 30);
        assert!(config.store_path.is_none());
    }

    #[test]
    fn test_parse_ttl() {
        assert_eq!(parse_ttl("60"), Some(Some(60)));
        assert_eq!(parse_ttl(" none "), Some(None));
        assert_eq!(parse_ttl("NEVER"), Some(None));
        assert_eq!(parse_ttl("soon"), None);
    }
}
