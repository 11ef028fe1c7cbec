//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `PUT /:namespace/set` - Store or invalidate a key
//! - `GET /:namespace/get/:key` - Retrieve a value by key
//! - `DELETE /:namespace/del/:key` - Invalidate a key
//! - `GET /:namespace/keys` - List valid keys in index order
//! - `GET /:namespace/stats` - Get namespace statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
