//! Shared types for the print agent
//!
//! Wire contracts exchanged between the browser front end and the local
//! print agent: print requests, ticket data and print results.

pub mod models;
pub mod response;

// Re-exports
pub use models::{PaymentInfo, PrintJobKind, PrintRequest, TicketData, TicketLine};
pub use response::{HealthStatus, PrintResult};
pub use serde::{Deserialize, Serialize};
