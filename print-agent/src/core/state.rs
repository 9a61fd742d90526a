//! Application state shared by every handler

use std::sync::Arc;

use pos_printer::{Spooler, system_spooler};

use super::{ClientRegistry, Config};
use crate::printing::{JobProcessor, PrinterDispatcher};

/// Cloned into each axum handler; all members are shared handles
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<JobProcessor>,
    pub dispatcher: Arc<PrinterDispatcher>,
    pub clients: ClientRegistry,
}

impl AppState {
    /// State backed by the host OS spooler
    pub fn new(config: &Config) -> Self {
        Self::with_spooler(config, system_spooler())
    }

    /// State backed by the given spooler
    pub fn with_spooler(config: &Config, spooler: Arc<dyn Spooler>) -> Self {
        let dispatcher = Arc::new(PrinterDispatcher::new(spooler, config.network_timeout()));
        let processor = Arc::new(JobProcessor::new(config, Arc::clone(&dispatcher)));

        Self {
            processor,
            dispatcher,
            clients: ClientRegistry::new(),
        }
    }
}
