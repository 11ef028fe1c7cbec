//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::{delete, get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_handler, get_handler, health_handler, keys_handler, set_handler, stats_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /:namespace/set` - Store or invalidate a key
/// - `GET /:namespace/get/:key` - Retrieve a value by key
/// - `DELETE /:namespace/del/:key` - Invalidate a key
/// - `GET /:namespace/keys` - List valid keys
/// - `GET /:namespace/stats` - Get namespace statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/:namespace/set", put(set_handler))
        .route("/:namespace/get/:key", get(get_handler))
        .route("/:namespace/del/:key", delete(delete_handler))
        .route("/:namespace/keys", get(keys_handler))
        .route("/:namespace/stats", get(stats_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
