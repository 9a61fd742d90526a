//! OS print spooler access
//!
//! One backend per platform, selected at build time:
//! - Windows: Win32 spooler API (`WindowsSpooler`)
//! - Linux / macOS: CUPS (`CupsSpooler`)
//! - anything else: every call fails with [`PrintError::Unsupported`]

use crate::error::PrintResult;
use std::sync::Arc;

#[cfg(unix)]
mod cups;
#[cfg(windows)]
mod win32;

#[cfg(unix)]
pub use cups::CupsSpooler as SystemSpooler;
#[cfg(windows)]
pub use win32::WindowsSpooler as SystemSpooler;
#[cfg(not(any(unix, windows)))]
pub use unsupported::UnsupportedSpooler as SystemSpooler;

/// Host print spooler
///
/// All calls block; async callers go through `spawn_blocking`.
pub trait Spooler: Send + Sync {
    /// Name of the OS default printer, if one is configured
    fn default_printer(&self) -> PrintResult<Option<String>>;

    /// Names of the printers registered with the spooler
    fn list_printers(&self) -> PrintResult<Vec<String>>;

    /// Submit `data` as a single raw (untyped) job
    ///
    /// Either the whole job is queued or nothing is left in the spooler.
    fn submit_raw(&self, printer: &str, document: &str, data: &[u8]) -> PrintResult<()>;
}

/// Spooler backend for the current platform
pub fn system_spooler() -> Arc<dyn Spooler> {
    Arc::new(SystemSpooler::default())
}

#[cfg(not(any(unix, windows)))]
mod unsupported {
    use super::Spooler;
    use crate::error::{PrintError, PrintResult};

    #[derive(Debug, Default)]
    pub struct UnsupportedSpooler;

    impl Spooler for UnsupportedSpooler {
        fn default_printer(&self) -> PrintResult<Option<String>> {
            Ok(None)
        }

        fn list_printers(&self) -> PrintResult<Vec<String>> {
            Ok(Vec::new())
        }

        fn submit_raw(&self, _printer: &str, _document: &str, _data: &[u8]) -> PrintResult<()> {
            Err(PrintError::Unsupported)
        }
    }
}
