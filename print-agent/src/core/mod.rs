//! Core module: configuration, state, server and errors
//!
//! - [`Config`] - agent configuration
//! - [`AppState`] - state shared by handlers
//! - [`ClientRegistry`] - connected WebSocket clients
//! - [`Server`] - HTTP / WebSocket server
//! - [`ServerError`] - server errors

pub mod config;
pub mod error;
pub mod registry;
pub mod server;
pub mod state;

pub use config::{Config, ReceiptOptions};
pub use error::{Result, ServerError};
pub use registry::{ClientGuard, ClientInfo, ClientRegistry};
pub use server::Server;
pub use state::AppState;
