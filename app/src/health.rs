//! Liveness endpoint for container orchestration.

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::net::SocketAddr;
use tracing::{info, warn};

async fn root_handler() -> &'static str {
    "pokemate companion is alive"
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Serve the liveness endpoints. A failed bind is logged and the
/// companion keeps running without them.
pub async fn serve(port: u16) {
    let app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            warn!("Health endpoint disabled, could not bind {addr}: {e}");
            return;
        }
    };

    info!("Health endpoint listening on {addr}");
    if let Err(e) = axum::serve(listener, app).await {
        warn!("Health endpoint stopped: {e}");
    }
}
