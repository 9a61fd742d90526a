//! Print Job Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of print job requested by the front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrintJobKind {
    /// Customer receipt with prices and payment
    Receipt,
    /// Kitchen copy (items and notes only)
    Kitchen,
    /// Diagnostic page
    Test,
    /// Cash drawer kick, nothing is printed
    OpenDrawer,
}

impl PrintJobKind {
    /// Parse the wire `type` value (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "receipt" => Some(Self::Receipt),
            "kitchen" => Some(Self::Kitchen),
            "test" => Some(Self::Test),
            "drawer" => Some(Self::OpenDrawer),
            _ => None,
        }
    }

    /// Wire name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Receipt => "receipt",
            Self::Kitchen => "kitchen",
            Self::Test => "test",
            Self::OpenDrawer => "drawer",
        }
    }

    /// Receipt and kitchen jobs carry ticket data
    pub fn requires_ticket(&self) -> bool {
        matches!(self, Self::Receipt | Self::Kitchen)
    }
}

impl fmt::Display for PrintJobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client -> agent message (one JSON object per text frame)
///
/// `kind` stays a raw string so an unknown value can be reported back
/// verbatim; `data` stays raw JSON until the kind is known to need it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub printer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Paper width in mm (58 or 80); absent means the agent default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_width: Option<u16>,
}

impl PrintRequest {
    /// Target printer, with blank names treated as absent
    pub fn target_printer(&self) -> Option<&str> {
        self.printer_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}
