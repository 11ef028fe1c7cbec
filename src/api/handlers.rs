//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{KeyValueStore, MAX_KEY_LENGTH};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, GetResponse, HealthResponse, KeysResponse, SetRequest, SetResponse,
    StatsResponse,
};
use crate::registry::CacheRegistry;

/// Application state shared across all handlers.
///
/// Holds the registry so every write to a namespace reaches the same cache
/// handle and therefore the same write serializer.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<CacheRegistry>,
}

impl AppState {
    /// Creates a new AppState around an existing registry.
    pub fn new(registry: CacheRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Creates a new AppState from configuration over the given store.
    pub fn from_config(config: &Config, store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(CacheRegistry::new(store, config.default_ttl))
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidRequest(format!(
            "Key must be between 1 and {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}

/// Handler for PUT /:namespace/set
///
/// Stores a value, or invalidates the key when `value` is null.
pub async fn set_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    // Validate request
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let cache = state.registry.cache(&namespace).await?;
    cache
        .set(&req.key, req.set_value(), req.set_options())
        .await?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /:namespace/get/:key
///
/// Retrieves a value by key; 404 when the key is not currently valid.
pub async fn get_handler(
    State(state): State<AppState>,
    Path((namespace, key)): Path<(String, String)>,
) -> Result<Json<GetResponse>> {
    validate_key(&key)?;

    let cache = state.registry.reader(&namespace).await?;
    match cache.get(&key).await? {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /:namespace/del/:key
///
/// Invalidates a key. Invalidating an unknown key succeeds.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path((namespace, key)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    validate_key(&key)?;

    let cache = state.registry.cache(&namespace).await?;
    cache.invalidate(&key).await?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /:namespace/keys
///
/// Lists valid keys in index order.
pub async fn keys_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<KeysResponse>> {
    let cache = state.registry.reader(&namespace).await?;
    let keys = cache.keys().await?;

    Ok(Json(KeysResponse::new(namespace, keys)))
}

/// Handler for GET /:namespace/stats
///
/// Returns counters for the namespace.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<StatsResponse>> {
    let cache = state.registry.reader(&namespace).await?;
    let stats = cache.stats().await?;

    Ok(Json(StatsResponse::new(namespace, &stats)))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
