//! Error types for the printer library

use thiserror::Error;

/// Printer error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// Network connection error
    #[error("Connection failed: {0}")]
    Connection(String),

    /// IO error during printing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Connect did not complete in time (carries the address)
    #[error("Connection timeout: {0}")]
    Timeout(String),

    /// Invalid printer configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Named printer is not registered with the spooler
    #[error("Printer not found: {0}")]
    PrinterNotFound(String),

    /// Spooler rejected or failed the job
    #[error("Spooler error: {0}")]
    Spooler(String),

    /// No spooler backend on this platform
    #[error("Local printing not supported on this platform")]
    Unsupported,
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
