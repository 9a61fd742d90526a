//! Print job processing
//!
//! One inbound text frame becomes one [`PrintJob`], which is validated,
//! rendered and dispatched, always ending in a [`PrintResult`]:
//!
//! ```text
//! Received → Validated → Rendered → Dispatched → Completed
//!     └──────────┴───────────┴───────────┴──────→ Failed
//! ```

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use pos_printer::CodePage;
use shared::{PrintJobKind, PrintRequest, PrintResult, TicketData};
use thiserror::Error;
use tracing::{Instrument, debug, error, field, info, info_span, warn};
use uuid::Uuid;

use super::dispatcher::{DispatchError, PrinterDispatcher};
use super::renderer::TicketRenderer;
use crate::core::{Config, ReceiptOptions};

/// Job failure; `Display` is the message sent back to the client
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid print job format")]
    InvalidFormat,

    #[error("Unknown print job type: {0}")]
    UnknownType(String),

    #[error("Missing print data")]
    MissingData,

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("Error: {0}")]
    Unexpected(String),
}

/// Stage of a job in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Received,
    Validated,
    Rendered,
    Dispatched,
    Completed,
    Failed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::Rendered => "rendered",
            Self::Dispatched => "dispatched",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A validated print job
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub kind: PrintJobKind,
    pub target_printer: Option<String>,
    pub ticket: Option<TicketData>,
    pub paper_width: Option<u16>,
}

impl PrintJob {
    /// Parse and validate one inbound text frame
    pub fn parse(text: &str) -> Result<Self, JobError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| JobError::InvalidJson(e.to_string()))?;
        let request: PrintRequest =
            serde_json::from_value(value).map_err(|_| JobError::InvalidFormat)?;
        Self::from_request(request)
    }

    pub fn from_request(request: PrintRequest) -> Result<Self, JobError> {
        let kind = PrintJobKind::parse(&request.kind)
            .ok_or_else(|| JobError::UnknownType(request.kind.clone()))?;
        let target_printer = request.target_printer().map(str::to_string);

        let ticket = if kind.requires_ticket() {
            let data = request
                .data
                .filter(|d| !d.is_null())
                .ok_or(JobError::MissingData)?;
            let ticket: TicketData =
                serde_json::from_value(data).map_err(|_| JobError::InvalidFormat)?;
            Some(ticket)
        } else {
            None
        };

        Ok(Self {
            kind,
            target_printer,
            ticket,
            paper_width: request.paper_width,
        })
    }
}

/// Renders and dispatches jobs; shared by all client sessions
pub struct JobProcessor {
    paper_width: u16,
    code_page: CodePage,
    receipt: ReceiptOptions,
    dispatcher: Arc<PrinterDispatcher>,
}

impl JobProcessor {
    pub fn new(config: &Config, dispatcher: Arc<PrinterDispatcher>) -> Self {
        Self {
            paper_width: config.paper_width,
            code_page: config.code_page,
            receipt: config.receipt.clone(),
            dispatcher,
        }
    }

    /// Process one inbound text frame into a result
    ///
    /// Never fails and never panics outward: every fault ends as a failed
    /// [`PrintResult`].
    pub async fn process_text(&self, text: &str) -> PrintResult {
        let job_id = Uuid::new_v4().to_string();
        let span = info_span!(
            "print_job",
            job_id = %job_id,
            kind = field::Empty,
            printer = field::Empty
        );

        let outcome = AssertUnwindSafe(self.run(text))
            .catch_unwind()
            .instrument(span.clone())
            .await
            .unwrap_or_else(|panic| Err(JobError::Unexpected(panic_message(panic.as_ref()))));

        span.in_scope(|| match outcome {
            Ok(message) => {
                info!(state = %JobState::Completed, %message, "Print job completed");
                PrintResult::ok(job_id, message)
            }
            Err(JobError::Unexpected(reason)) => {
                error!(state = %JobState::Failed, %reason, "Print job crashed");
                PrintResult::failed(job_id, JobError::Unexpected(reason).to_string())
            }
            Err(e) => {
                warn!(state = %JobState::Failed, error = %e, "Print job failed");
                PrintResult::failed(job_id, e.to_string())
            }
        })
    }

    /// Result for a frame that is not a job at all (e.g. binary)
    pub fn reject(&self, error: JobError) -> PrintResult {
        let job_id = Uuid::new_v4().to_string();
        warn!(job_id = %job_id, error = %error, "Rejected frame");
        PrintResult::failed(job_id, error.to_string())
    }

    async fn run(&self, text: &str) -> Result<String, JobError> {
        let span = tracing::Span::current();
        debug!(state = %JobState::Received, len = text.len());

        let job = PrintJob::parse(text)?;
        span.record("kind", job.kind.as_str());
        span.record("printer", job.target_printer.as_deref().unwrap_or("<default>"));
        debug!(state = %JobState::Validated);

        let data = self.render(&job);
        debug!(state = %JobState::Rendered, bytes = data.len());

        let target = self
            .dispatcher
            .deliver(&data, job.target_printer.as_deref())
            .await?;
        debug!(state = %JobState::Dispatched, target = %target);

        Ok(match job.kind {
            PrintJobKind::OpenDrawer => format!("Cash drawer opened via {}", target),
            _ => format!("Printed to {}", target),
        })
    }

    /// Render a validated job into ESC/POS bytes
    ///
    /// Receipt and kitchen jobs honour the request's paper width; test and
    /// drawer jobs use the configured default.
    pub fn render(&self, job: &PrintJob) -> Vec<u8> {
        let width = match job.kind {
            PrintJobKind::Receipt | PrintJobKind::Kitchen => {
                job.paper_width.unwrap_or(self.paper_width)
            }
            PrintJobKind::Test | PrintJobKind::OpenDrawer => self.paper_width,
        };
        let renderer = TicketRenderer::new(width, self.code_page, self.receipt.clone());
        match &job.ticket {
            Some(ticket) => renderer.render(ticket, job.kind),
            None => renderer.render(&TicketData::default(), job.kind),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
