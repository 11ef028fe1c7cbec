//! nscache - Namespaced TTL cache over a plain key-value store
//!
//! Values live in a synchronous, string-only store with no enumeration or
//! expiry of its own. Each namespace keeps a persisted index of valid keys,
//! which alone decides what `get` and `keys` return.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod tasks;

pub use api::AppState;
pub use cache::{create_cache, Cache, CacheOptions, SetOptions, SetValue, Ttl};
pub use config::Config;
pub use error::{CacheError, Result};
pub use registry::CacheRegistry;
pub use tasks::spawn_sweep_task;
