//! Printer listing route
//!
//! Returns the printer names registered with the OS spooler as a JSON
//! array of strings. The spooler is queried on every call.

use axum::{Json, Router, extract::State, routing::get};

use crate::core::{AppState, Result};

pub fn router() -> Router<AppState> {
    Router::new().route("/printers", get(list_printers))
}

async fn list_printers(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let printers = state.dispatcher.list_printers().await?;
    tracing::debug!(count = printers.len(), "Listed printers");
    Ok(Json(printers))
}
