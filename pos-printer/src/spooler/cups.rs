//! CUPS spooler backend (Linux / macOS)

use super::Spooler;
use crate::error::{PrintError, PrintResult};
use printers::common::base::job::PrinterJobOptions;
use printers::common::base::printer::Printer as CupsPrinter;
use tracing::{info, instrument, warn};

/// Bypass CUPS filters so ESC/POS bytes reach the device untouched
const RAW_PROPERTIES: &[(&str, &str)] = &[("document-format", "application/vnd.cups-raw")];

/// Submits raw jobs through CUPS
#[derive(Debug, Default)]
pub struct CupsSpooler;

impl CupsSpooler {
    /// Find a queue by display name or CUPS system name
    fn find(name: &str) -> Option<CupsPrinter> {
        printers::get_printers()
            .into_iter()
            .find(|p| p.name == name || p.system_name == name)
    }
}

fn raw_job_options(document: &str) -> PrinterJobOptions<'_> {
    PrinterJobOptions {
        name: Some(document),
        raw_properties: RAW_PROPERTIES,
    }
}

impl Spooler for CupsSpooler {
    fn default_printer(&self) -> PrintResult<Option<String>> {
        Ok(printers::get_default_printer().map(|p| p.name))
    }

    fn list_printers(&self) -> PrintResult<Vec<String>> {
        Ok(printers::get_printers().into_iter().map(|p| p.name).collect())
    }

    #[instrument(skip(self, data), fields(data_len = data.len()))]
    fn submit_raw(&self, printer: &str, document: &str, data: &[u8]) -> PrintResult<()> {
        let queue =
            Self::find(printer).ok_or_else(|| PrintError::PrinterNotFound(printer.to_string()))?;

        // CUPS receives the buffer as one document; a failed submission leaves no job behind
        match queue.print(data, raw_job_options(document)) {
            Ok(job_id) => {
                info!(queue = %queue.system_name, job_id, "Raw job submitted to CUPS");
                Ok(())
            }
            Err(e) => {
                warn!(queue = %queue.system_name, error = %e, "CUPS submission failed");
                Err(PrintError::Spooler(format!("CUPS print error: {}", e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_job_options() {
        let options = raw_job_options("POS Ticket");
        assert_eq!(options.name, Some("POS Ticket"));
        assert_eq!(
            options.raw_properties,
            &[("document-format", "application/vnd.cups-raw")]
        );
    }
}
