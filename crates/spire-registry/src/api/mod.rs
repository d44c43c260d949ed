//! HTTP surface of the entry API

pub mod error;
pub mod handlers;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use handlers::AppState;

/// Path prefix shared by every entry API route
pub const ENTRY_API_PREFIX: &str = "/v1/entry";

/// Entry API method names, one route each under [`ENTRY_API_PREFIX`]
pub mod method {
    pub const LIST: &str = "list";
    pub const GET: &str = "get";
    pub const BATCH_CREATE: &str = "batch_create";
    pub const BATCH_UPDATE: &str = "batch_update";
    pub const BATCH_DELETE: &str = "batch_delete";
}

/// Route of an entry API method
pub fn entry_route(method: &str) -> String {
    format!("{}/{}", ENTRY_API_PREFIX, method)
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(&entry_route(method::LIST), post(handlers::list_entries))
        .route(&entry_route(method::GET), post(handlers::get_entry))
        .route(&entry_route(method::BATCH_CREATE), post(handlers::batch_create_entry))
        .route(&entry_route(method::BATCH_UPDATE), post(handlers::batch_update_entry))
        .route(&entry_route(method::BATCH_DELETE), post(handlers::batch_delete_entry))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_routes() {
        assert_eq!(entry_route(method::LIST), "/v1/entry/list");
        assert_eq!(entry_route(method::BATCH_DELETE), "/v1/entry/batch_delete");
    }
}
