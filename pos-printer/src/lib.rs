//! # pos-printer
//!
//! ESC/POS thermal printer library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - ESC/POS command building
//! - Single-byte code page encoding and fixed-width fields
//! - Network printing (raw TCP, port 9100)
//! - Local printing through the OS spooler (Win32 or CUPS)
//!
//! Ticket layout (WHAT to print) lives in the print agent.
//!
//! ## Example
//!
//! ```ignore
//! use pos_printer::{CodePage, EscPosBuilder, NetworkPrinter, Printer};
//!
//! let mut builder = EscPosBuilder::new(48, CodePage::Wpc1252);
//! builder.center();
//! builder.double_size();
//! builder.line("KITCHEN ORDER");
//! builder.reset_size();
//! builder.sep_double();
//! builder.cut_partial();
//!
//! let printer = NetworkPrinter::new("192.168.1.100", 9100)?;
//! printer.print(&builder.build()).await?;
//! ```

mod encoding;
mod error;
mod escpos;
mod printer;
mod spooler;

// Re-exports
pub use encoding::{CodePage, encode_text, fit_left, fit_right, text_width};
pub use error::{PrintError, PrintResult};
pub use escpos::{DRAWER_KICK, EscPosBuilder, INIT, PARTIAL_CUT};
pub use printer::{DEFAULT_PORT, NetworkPrinter, Printer, SpoolPrinter};
pub use spooler::{Spooler, SystemSpooler, system_spooler};
