//! Ticket Model
//!
//! Order data rendered onto a receipt or kitchen copy. Values are rendered
//! as given; totals are computed upstream.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order ticket
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketData {
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub table_number: String,
    #[serde(default)]
    pub is_take_away: bool,
    /// Creation time as sent by the front end (ISO-8601 or similar)
    #[serde(default)]
    pub created_at: String,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(default)]
    pub lines: Vec<TicketLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentInfo>,
}

/// Ticket line item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketLine {
    pub name: String,
    pub quantity: i32,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub line_total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TicketLine {
    /// Notes worth printing (non-blank)
    pub fn printable_notes(&self) -> Option<&str> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

/// Payment summary printed on receipts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    #[serde(default)]
    pub provider: String,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub change: Decimal,
}
