//! Data models
//!
//! Shared between the print agent and the browser front end (JSON, camelCase).

pub mod print_job;
pub mod ticket;

// Re-exports
pub use print_job::*;
pub use ticket::*;
