use pos_printer::CodePage;

/// Print agent configuration
///
/// # Environment variables
///
/// Every field can be overridden through the environment (a `.env` file
/// in the working directory is loaded first):
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | PRINT_AGENT_BIND | 127.0.0.1 | Listen address |
/// | PRINT_AGENT_PORT | 9100 | Listen port (HTTP + WebSocket) |
/// | PAPER_WIDTH | 80 | Default paper width in mm (58 or 80) |
/// | CODE_PAGE | wpc1252 | Printer code page (wpc1252, pc866, wpc1250, wpc1251) |
/// | API_BASE_URL | http://localhost:5000 | Backend base URL for printer sync |
/// | RECEIPT_BRAND | RESTAURANT | Receipt brand line |
/// | RECEIPT_SUBTITLE | Order Receipt | Receipt subtitle |
/// | RECEIPT_FOOTER | Thank you for your visit! | Receipt footer |
/// | CURRENCY | $ | Currency label on money lines |
/// | NETWORK_TIMEOUT_MS | 5000 | Network printer connect timeout |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | Graceful shutdown bound |
/// | LOG_LEVEL | info | Log filter (RUST_LOG wins when set) |
/// | LOG_DIR | - | Directory for daily rolling log files |
///
/// # Example
///
/// ```ignore
/// PRINT_AGENT_PORT=9200 PAPER_WIDTH=58 cargo run -p print-agent
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address
    pub bind_addr: String,
    /// Listen port
    pub port: u16,
    /// Paper width used when a job does not carry one
    pub paper_width: u16,
    /// Printer code page
    pub code_page: CodePage,
    /// Backend base URL (consumed by the front end's printer sync, not by the agent)
    pub api_base_url: String,
    /// Receipt texts
    pub receipt: ReceiptOptions,
    /// Network printer connect timeout (ms)
    pub network_timeout_ms: u64,
    /// Graceful shutdown bound (ms)
    pub shutdown_timeout_ms: u64,
    /// Log level / filter directive
    pub log_level: String,
    /// Log file directory
    pub log_dir: Option<String>,
}

/// Fixed texts printed on customer receipts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptOptions {
    pub brand: String,
    pub subtitle: String,
    pub footer: String,
    pub currency: String,
}

impl Default for ReceiptOptions {
    fn default() -> Self {
        Self {
            brand: "RESTAURANT".into(),
            subtitle: "Order Receipt".into(),
            footer: "Thank you for your visit!".into(),
            currency: "$".into(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Missing or unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let receipt = ReceiptOptions {
            brand: std::env::var("RECEIPT_BRAND").unwrap_or(defaults.receipt.brand),
            subtitle: std::env::var("RECEIPT_SUBTITLE").unwrap_or(defaults.receipt.subtitle),
            footer: std::env::var("RECEIPT_FOOTER").unwrap_or(defaults.receipt.footer),
            currency: std::env::var("CURRENCY").unwrap_or(defaults.receipt.currency),
        };

        Self {
            bind_addr: std::env::var("PRINT_AGENT_BIND").unwrap_or(defaults.bind_addr),
            port: env_parse("PRINT_AGENT_PORT").unwrap_or(defaults.port),
            paper_width: env_parse("PAPER_WIDTH").unwrap_or(defaults.paper_width),
            code_page: env_parse("CODE_PAGE").unwrap_or(defaults.code_page),
            api_base_url: std::env::var("API_BASE_URL").unwrap_or(defaults.api_base_url),
            receipt,
            network_timeout_ms: env_parse("NETWORK_TIMEOUT_MS")
                .unwrap_or(defaults.network_timeout_ms),
            shutdown_timeout_ms: env_parse("SHUTDOWN_TIMEOUT_MS")
                .unwrap_or(defaults.shutdown_timeout_ms),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
        }
    }

    /// `bind_addr:port`
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn network_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.network_timeout_ms)
    }

    pub fn shutdown_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.shutdown_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".into(),
            port: 9100,
            paper_width: 80,
            code_page: CodePage::default(),
            api_base_url: "http://localhost:5000".into(),
            receipt: ReceiptOptions::default(),
            network_timeout_ms: 5000,
            shutdown_timeout_ms: 10000,
            log_level: "info".into(),
            log_dir: None,
        }
    }
}
