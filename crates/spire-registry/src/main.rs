//! Development Registry Server Binary
//!
//! Serves an in-memory SPIRE entry registry over HTTP for local development
//! and acceptance testing of the provider.
//!
//! Development only: the registry is unauthenticated, so it binds to the
//! loopback interface and is never reachable from other hosts.
//!
//! # Environment Variables
//!
//! - `SPIRE_REGISTRY_PORT`: Loopback port to listen on (default: 8081)
//! - `SPIRE_REGISTRY_LOG_LEVEL`: Log level (default: info)

use std::env;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use spire_registry::{create_router, AppState, EntryService, MemoryRegistry};

#[tokio::main]
async fn main() {
    // Initialize logging
    let log_level = env::var("SPIRE_REGISTRY_LOG_LEVEL")
        .unwrap_or_else(|_| "info".into())
        .parse()
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    // Configuration
    let port: u16 = env::var("SPIRE_REGISTRY_PORT")
        .unwrap_or_else(|_| "8081".into())
        .parse()
        .expect("SPIRE_REGISTRY_PORT must be a valid port number");

    let service: Arc<dyn EntryService> = Arc::new(MemoryRegistry::new());
    let app = create_router(Arc::new(AppState { service }));

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    info!(addr = %addr, "Development registry listening");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
