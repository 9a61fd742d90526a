//! API routes
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | / , /ws | GET | WebSocket upgrade, print job protocol |
//! | /health | GET | Liveness and connected client count |
//! | /printers | GET | Printers known to the OS spooler |

pub mod health;
pub mod printers;
pub mod ws;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::AppState;

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(ws::router())
        .merge(health::router())
        .merge(printers::router())
}

/// Build the application with middleware and state
pub fn router(state: AppState) -> Router {
    build_router()
        // Browser front end runs on another origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
