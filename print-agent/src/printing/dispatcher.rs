//! Printer dispatcher
//!
//! Resolves a job's target printer and hands the rendered bytes to the
//! matching transport:
//!
//! - no target: the OS default printer
//! - `host:port`: raw TCP network printer
//! - anything else: local spooler queue of that name

use pos_printer::{NetworkPrinter, PrintError, Printer, SpoolPrinter, Spooler};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("No printer configured")]
    NoPrinter,

    #[error(transparent)]
    Print(#[from] PrintError),

    #[error("Spooler task failed: {0}")]
    Task(String),
}

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Resolved delivery target
#[derive(Debug, Clone)]
pub enum PrintTarget {
    Network(NetworkPrinter),
    Spool(SpoolPrinter),
}

impl PrintTarget {
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    async fn send(&self, data: &[u8]) -> DispatchResult<()> {
        match self {
            Self::Network(printer) => printer.print(data).await?,
            Self::Spool(printer) => printer.print(data).await?,
        }
        Ok(())
    }
}

impl fmt::Display for PrintTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(printer) => f.write_str(&printer.addr()),
            Self::Spool(printer) => f.write_str(printer.name()),
        }
    }
}

/// Routes rendered jobs to printers
///
/// Holds no per-job state; printer lists come fresh from the spooler.
pub struct PrinterDispatcher {
    spooler: Arc<dyn Spooler>,
    network_timeout: Duration,
}

impl PrinterDispatcher {
    pub fn new(spooler: Arc<dyn Spooler>, network_timeout: Duration) -> Self {
        Self {
            spooler,
            network_timeout,
        }
    }

    /// Resolve the target printer without sending anything
    pub async fn resolve(&self, target: Option<&str>) -> DispatchResult<PrintTarget> {
        let name = match target {
            Some(name) => name.to_string(),
            None => self.default_printer().await?.ok_or(DispatchError::NoPrinter)?,
        };

        if name.contains(':') {
            let printer = NetworkPrinter::from_addr(&name)?.with_timeout(self.network_timeout);
            Ok(PrintTarget::Network(printer))
        } else {
            Ok(PrintTarget::Spool(SpoolPrinter::new(
                &name,
                Arc::clone(&self.spooler),
            )))
        }
    }

    /// Deliver `data` to the target, one attempt, no retry
    ///
    /// Returns the resolved target on success.
    #[instrument(skip(self, data), fields(data_len = data.len()))]
    pub async fn deliver(&self, data: &[u8], target: Option<&str>) -> DispatchResult<PrintTarget> {
        let resolved = self.resolve(target).await?;
        info!(printer = %resolved, network = resolved.is_network(), "Dispatching");
        resolved.send(data).await?;
        Ok(resolved)
    }

    /// Printer names registered with the OS spooler
    pub async fn list_printers(&self) -> DispatchResult<Vec<String>> {
        let spooler = Arc::clone(&self.spooler);
        tokio::task::spawn_blocking(move || spooler.list_printers())
            .await
            .map_err(|e| DispatchError::Task(e.to_string()))?
            .map_err(DispatchError::from)
    }

    async fn default_printer(&self) -> DispatchResult<Option<String>> {
        let spooler = Arc::clone(&self.spooler);
        let name = tokio::task::spawn_blocking(move || spooler.default_printer())
            .await
            .map_err(|e| DispatchError::Task(e.to_string()))??;
        Ok(name.filter(|n| !n.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pos_printer::PrintResult;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    struct FakeSpooler {
        default: Option<String>,
        installed: Vec<String>,
        submitted: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl FakeSpooler {
        fn new(default: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                default: default.map(str::to_string),
                installed: vec!["EPSON-TM88".to_string(), "Kitchen".to_string()],
                submitted: Mutex::new(Vec::new()),
            })
        }
    }

    impl Spooler for FakeSpooler {
        fn default_printer(&self) -> PrintResult<Option<String>> {
            Ok(self.default.clone())
        }

        fn list_printers(&self) -> PrintResult<Vec<String>> {
            Ok(self.installed.clone())
        }

        fn submit_raw(&self, printer: &str, _document: &str, data: &[u8]) -> PrintResult<()> {
            if !self.installed.iter().any(|p| p == printer) {
                return Err(PrintError::PrinterNotFound(printer.to_string()));
            }
            self.submitted
                .lock()
                .push((printer.to_string(), data.to_vec()));
            Ok(())
        }
    }

    fn dispatcher(spooler: Arc<FakeSpooler>) -> PrinterDispatcher {
        PrinterDispatcher::new(spooler, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_address_routes_to_network() {
        let d = dispatcher(FakeSpooler::new(None));
        let target = d.resolve(Some("192.168.1.5:9100")).await.unwrap();
        assert!(target.is_network());
        assert_eq!(target.to_string(), "192.168.1.5:9100");
    }

    #[tokio::test]
    async fn test_bad_port_defaults_to_9100() {
        let d = dispatcher(FakeSpooler::new(None));
        let target = d.resolve(Some("192.168.1.5:abc")).await.unwrap();
        assert_eq!(target.to_string(), "192.168.1.5:9100");
    }

    #[tokio::test]
    async fn test_name_routes_to_spooler() {
        let spooler = FakeSpooler::new(None);
        let d = dispatcher(spooler.clone());

        let target = d.deliver(b"ticket", Some("EPSON-TM88")).await.unwrap();
        assert!(!target.is_network());
        assert_eq!(target.to_string(), "EPSON-TM88");

        let submitted = spooler.submitted.lock();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].0, "EPSON-TM88");
        assert_eq!(submitted[0].1, b"ticket".to_vec());
    }

    #[tokio::test]
    async fn test_no_target_uses_default() {
        let spooler = FakeSpooler::new(Some("Kitchen"));
        let d = dispatcher(spooler.clone());

        let target = d.deliver(b"x", None).await.unwrap();
        assert_eq!(target.to_string(), "Kitchen");
        assert_eq!(spooler.submitted.lock()[0].0, "Kitchen");
    }

    #[tokio::test]
    async fn test_no_default_printer() {
        let d = dispatcher(FakeSpooler::new(None));
        let err = d.deliver(b"x", None).await.unwrap_err();
        assert!(matches!(err, DispatchError::NoPrinter));
        assert_eq!(err.to_string(), "No printer configured");
    }

    #[tokio::test]
    async fn test_unknown_spool_printer() {
        let d = dispatcher(FakeSpooler::new(None));
        let err = d.deliver(b"x", Some("Nowhere")).await.unwrap_err();
        assert_eq!(err.to_string(), "Printer not found: Nowhere");
    }

    #[tokio::test]
    async fn test_network_delivery() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let reader = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            socket.read_to_end(&mut buf).await.unwrap();
            buf
        });

        let d = dispatcher(FakeSpooler::new(None));
        let target = d.deliver(b"\x1B\x40", Some(addr.to_string().as_str())).await.unwrap();

        assert!(target.is_network());
        assert_eq!(reader.await.unwrap(), b"\x1B\x40".to_vec());
    }

    #[tokio::test]
    async fn test_list_printers() {
        let d = dispatcher(FakeSpooler::new(None));
        assert_eq!(d.list_printers().await.unwrap(), vec!["EPSON-TM88", "Kitchen"]);
    }
}
