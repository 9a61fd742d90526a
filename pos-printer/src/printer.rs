//! Printer adapters for sending ESC/POS data
//!
//! Supports:
//! - Network printers (raw TCP, port 9100)
//! - Local printers through the OS spooler

use crate::error::{PrintError, PrintResult};
use crate::spooler::Spooler;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{info, instrument};

/// Raw printing port used by most network receipt printers
pub const DEFAULT_PORT: u16 = 9100;

/// Document name shown in the spooler queue
const SPOOL_DOCUMENT_NAME: &str = "POS Ticket";

/// Trait for printer adapters
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Send raw ESC/POS data to the printer
    async fn print(&self, data: &[u8]) -> PrintResult<()>;
}

/// Network printer (raw TCP)
///
/// Most thermal printers support raw TCP printing on port 9100.
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    host: String,
    port: u16,
    timeout: Duration,
}

impl NetworkPrinter {
    /// Create a new network printer
    pub fn new(host: &str, port: u16) -> PrintResult<Self> {
        let host = host.trim();
        if host.is_empty() {
            return Err(PrintError::InvalidConfig(format!(
                "Invalid address: :{}",
                port
            )));
        }

        Ok(Self {
            host: host.to_string(),
            port,
            timeout: Duration::from_secs(5),
        })
    }

    /// Create from an address string (e.g., "192.168.1.100:9100", "[fe80::1]:9100")
    ///
    /// The port falls back to 9100 when it is missing or does not parse.
    pub fn from_addr(addr: &str) -> PrintResult<Self> {
        let addr = addr.trim();
        let (host, port) = match addr.strip_prefix('[').and_then(|rest| rest.split_once(']')) {
            Some((host, rest)) => (host, rest.strip_prefix(':')),
            None => match addr.rsplit_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (addr, None),
            },
        };
        let port = port
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);
        Self::new(host, port)
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the printer host
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Get the printer port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port` form used in logs and messages
    pub fn addr(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    async fn connect(&self) -> PrintResult<TcpStream> {
        let connect = TcpStream::connect((self.host.as_str(), self.port));
        within_timeout(&self.addr(), self.timeout, connect).await
    }
}

/// Bound a connection attempt, naming the address in either failure
async fn within_timeout<T>(
    addr: &str,
    timeout: Duration,
    connect: impl Future<Output = std::io::Result<T>>,
) -> PrintResult<T> {
    tokio::time::timeout(timeout, connect)
        .await
        .map_err(|_| PrintError::Timeout(addr.to_string()))?
        .map_err(|e| PrintError::Connection(format!("{}: {}", addr, e)))
}

impl Printer for NetworkPrinter {
    #[instrument(skip(self, data), fields(addr = %self.addr(), data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        info!("Connecting to printer");

        let mut stream = self.connect().await?;

        info!("Connected, sending {} bytes", data.len());

        stream.write_all(data).await.map_err(|e| {
            PrintError::Io(std::io::Error::new(
                e.kind(),
                format!("Write failed: {}", e),
            ))
        })?;

        stream.flush().await?;
        stream.shutdown().await?;

        info!("Print job sent successfully");
        Ok(())
    }
}

/// Local printer addressed by its spooler queue name
///
/// Spooler calls block, so they run on the blocking thread pool.
#[derive(Clone)]
pub struct SpoolPrinter {
    name: String,
    spooler: Arc<dyn Spooler>,
}

impl SpoolPrinter {
    /// Create a printer for the named spooler queue
    pub fn new(name: &str, spooler: Arc<dyn Spooler>) -> Self {
        Self {
            name: name.to_string(),
            spooler,
        }
    }

    /// Get the printer name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for SpoolPrinter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpoolPrinter")
            .field("name", &self.name)
            .finish()
    }
}

impl Printer for SpoolPrinter {
    #[instrument(skip(self, data), fields(printer = %self.name, data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        let name = self.name.clone();
        let data = data.to_vec();
        let spooler = Arc::clone(&self.spooler);

        tokio::task::spawn_blocking(move || {
            spooler.submit_raw(&name, SPOOL_DOCUMENT_NAME, &data)
        })
        .await
        .map_err(|e| PrintError::Spooler(format!("Task join failed: {}", e)))??;

        info!("Print job spooled successfully");
        Ok(())
    }
}
