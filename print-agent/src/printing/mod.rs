//! Ticket printing
//!
//! - [`TicketRenderer`] - tickets to ESC/POS bytes
//! - [`PrinterDispatcher`] - target resolution and delivery
//! - [`JobProcessor`] - parse, render, dispatch, report

pub mod dispatcher;
pub mod job;
pub mod renderer;

pub use dispatcher::{DispatchError, DispatchResult, PrintTarget, PrinterDispatcher};
pub use job::{JobError, JobProcessor, JobState, PrintJob};
pub use renderer::{PaperProfile, TicketRenderer, chars_per_line};
