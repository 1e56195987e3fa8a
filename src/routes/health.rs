// src/routes/health.rs
//! Liveness endpoints for the weather API.
//!
//! `GET /` answers with a fixed greeting and touches nothing. `GET /health`
//! also pings the database so orchestrators can tell a running process from a
//! usable one. Both always return 200; the body says whether the store
//! answered.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::warn;

use super::SharedStore;

#[derive(Serialize)]
struct Greeting {
    message: &'static str,
}

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
}

/// Handle `GET /`.
async fn index() -> Json<Greeting> {
    Json(Greeting {
        message: "Hello World",
    })
}

/// Handle `GET /health`.
async fn health(State(store): State<SharedStore>) -> Json<HealthResponse> {
    // ---
    let response = match store.ping().await {
        Ok(()) => HealthResponse {
            status: "ok",
            database: "connected",
        },
        Err(e) => {
            warn!("Health check could not reach database: {}", e);
            HealthResponse {
                status: "degraded",
                database: "unreachable",
            }
        }
    };
    Json(response)
}

pub fn router() -> Router<SharedStore> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
}
