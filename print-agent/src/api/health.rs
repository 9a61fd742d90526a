//! Health check route
//!
//! ```json
//! { "status": "healthy", "connectedClients": 2 }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use shared::HealthStatus;

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus::healthy(state.clients.count()))
}
