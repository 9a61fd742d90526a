//! Print Agent - local ESC/POS print service
//!
//! Runs next to the point-of-sale browser front end, accepts print jobs
//! over WebSocket and sends them to thermal printers, either raw over TCP
//! or through the OS print spooler.
//!
//! # Module structure
//!
//! ```text
//! print-agent/src/
//! ├── core/          # config, state, client registry, server, errors
//! ├── printing/      # renderer, dispatcher, job processing
//! ├── api/           # WebSocket, health and printer routes
//! └── utils/         # logging
//! ```

pub mod api;
pub mod core;
pub mod printing;
pub mod utils;

// Re-export public types
pub use crate::core::{AppState, ClientRegistry, Config, ReceiptOptions, Server, ServerError};
pub use printing::{JobError, JobProcessor, PrinterDispatcher, TicketRenderer};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

pub fn print_banner() {
    println!(
        r#"
    ____       _       __     ___                    __
   / __ \_____(_)___  / /_   /   | ____ ____  ____  / /_
  / /_/ / ___/ / __ \/ __/  / /| |/ __ `/ _ \/ __ \/ __/
 / ____/ /  / / / / / /_   / ___ / /_/ /  __/ / / / /_
/_/   /_/  /_/_/ /_/\__/  /_/  |_\__, /\___/_/ /_/\__/
                                /____/
    "#
    );
}
