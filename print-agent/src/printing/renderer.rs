//! Ticket renderer
//!
//! Renders tickets into ESC/POS bytes for thermal printers. Rendering is a
//! pure function of its inputs: no I/O, no clock.

use chrono::{DateTime, NaiveDateTime};
use pos_printer::{CodePage, DRAWER_KICK, EscPosBuilder, fit_left, fit_right};
use rust_decimal::{Decimal, RoundingStrategy};
use shared::{PrintJobKind, TicketData, TicketLine};

use crate::core::ReceiptOptions;

/// Quantity column width
const QTY_WIDTH: usize = 3;
/// Unit price column width
const PRICE_WIDTH: usize = 7;
/// Line total column width
const TOTAL_WIDTH: usize = 8;
/// Printed money precision
const DECIMAL_PLACES: u32 = 2;

/// Characters per line for a paper width in mm
pub fn chars_per_line(paper_width_mm: u16) -> usize {
    if paper_width_mm == 80 { 48 } else { 32 }
}

/// Paper geometry derived from the paper width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaperProfile {
    pub width_mm: u16,
    pub chars_per_line: usize,
}

impl PaperProfile {
    pub fn from_width(width_mm: u16) -> Self {
        Self {
            width_mm,
            chars_per_line: chars_per_line(width_mm),
        }
    }

    /// Name column width in the item table
    pub fn name_width(&self) -> usize {
        self.chars_per_line - (QTY_WIDTH + PRICE_WIDTH + TOTAL_WIDTH)
    }
}

/// Ticket renderer
///
/// Common widths:
/// - 58mm paper: 32 characters
/// - 80mm paper: 48 characters
pub struct TicketRenderer {
    profile: PaperProfile,
    code_page: CodePage,
    options: ReceiptOptions,
}

impl TicketRenderer {
    /// Create a renderer for the given paper width in mm
    pub fn new(paper_width_mm: u16, code_page: CodePage, options: ReceiptOptions) -> Self {
        Self {
            profile: PaperProfile::from_width(paper_width_mm),
            code_page,
            options,
        }
    }

    /// Render a job of the given kind
    ///
    /// Test and drawer jobs ignore the ticket.
    pub fn render(&self, ticket: &TicketData, kind: PrintJobKind) -> Vec<u8> {
        match kind {
            PrintJobKind::Receipt => self.render_receipt(ticket),
            PrintJobKind::Kitchen => self.render_kitchen(ticket),
            PrintJobKind::Test => self.render_test_page(),
            PrintJobKind::OpenDrawer => Self::drawer_kick().to_vec(),
        }
    }

    /// Cash drawer pulse, independent of paper and ticket
    pub fn drawer_kick() -> [u8; 5] {
        DRAWER_KICK
    }

    fn builder(&self) -> EscPosBuilder {
        EscPosBuilder::new(self.profile.chars_per_line, self.code_page)
    }

    /// Customer receipt
    pub fn render_receipt(&self, ticket: &TicketData) -> Vec<u8> {
        let mut b = self.builder();

        // Brand
        b.center();
        b.bold();
        b.double_size();
        b.line(&self.options.brand);
        b.reset_size();
        b.bold_off();
        b.line(&self.options.subtitle);

        // Order header
        b.left();
        b.bold();
        b.line_fixed(&format!("Order: {}", ticket.order_number));
        b.bold_off();
        if ticket.is_take_away {
            b.line_fixed("TAKEAWAY");
        } else {
            b.line_fixed(&format!("Table: {}", ticket.table_number));
        }
        if let Some(date) = format_timestamp(&ticket.created_at, "%Y-%m-%d %H:%M") {
            b.line_fixed(&format!("Date: {}", date));
        }
        b.sep_double();

        // Items
        b.line(&self.item_row("Item", "Qty", "Price", "Total"));
        b.sep_single();
        for item in &ticket.lines {
            self.render_receipt_item(&mut b, item);
        }
        b.sep_single();

        // Total
        b.right();
        b.bold();
        b.double_height();
        b.line(&format!("TOTAL: {}", self.money(ticket.total)));
        b.reset_size();
        b.bold_off();
        b.left();

        if let Some(payment) = &ticket.payment {
            b.line_lr("Payment:", &payment.provider);
            b.line_lr("Paid:", &self.money(payment.amount));
            if payment.change > Decimal::ZERO {
                b.line_lr("Change:", &self.money(payment.change));
            }
        }

        // Footer
        b.center();
        b.line(&self.options.footer);
        b.left();
        b.newline();
        b.newline();
        b.cut_partial();

        b.build()
    }

    fn render_receipt_item(&self, b: &mut EscPosBuilder, item: &TicketLine) {
        b.line(&self.item_row(
            &item.name,
            &item.quantity.to_string(),
            &amount(item.unit_price),
            &amount(item.line_total),
        ));
        if let Some(notes) = item.printable_notes() {
            b.line_fixed(&format!("   * {}", notes));
        }
    }

    /// One row of the 4-column item table, exactly `chars_per_line` wide
    fn item_row(&self, name: &str, qty: &str, price: &str, total: &str) -> String {
        format!(
            "{}{}{}{}",
            fit_left(name, self.profile.name_width()),
            fit_right(qty, QTY_WIDTH),
            fit_right(price, PRICE_WIDTH),
            fit_right(total, TOTAL_WIDTH)
        )
    }

    fn money(&self, value: Decimal) -> String {
        format!("{} {}", self.options.currency, amount(value))
    }

    /// Kitchen copy: no prices, large quantities and names
    pub fn render_kitchen(&self, ticket: &TicketData) -> Vec<u8> {
        let mut b = self.builder();

        // Header
        b.center();
        b.bold();
        b.double_size();
        b.line("KITCHEN ORDER");
        b.line(&ticket.order_number);
        b.reset_size();

        if ticket.is_take_away {
            b.double_size();
            b.line("*** TAKEAWAY ***");
        } else {
            b.double_height();
            b.line(&format!("TABLE: {}", ticket.table_number));
        }
        b.reset_size();
        b.bold_off();

        b.left();
        if let Some(time) = format_timestamp(&ticket.created_at, "%H:%M") {
            b.line_fixed(&format!("Time: {}", time));
        }
        b.sep_double();

        for item in &ticket.lines {
            b.bold();
            b.double_height();
            b.line(&format!("{}x {}", item.quantity, item.name));
            b.reset_size();
            b.bold_off();
            if let Some(notes) = item.printable_notes() {
                b.line_fixed(&format!("   > {}", notes));
            }
            b.newline();
        }

        b.sep_double();
        b.center();
        b.line("*** KITCHEN COPY ***");
        b.left();
        b.newline();
        b.newline();
        b.cut_partial();

        b.build()
    }

    /// Diagnostic page: geometry, character set and styles
    pub fn render_test_page(&self) -> Vec<u8> {
        let width = self.profile.chars_per_line;
        let mut b = self.builder();

        b.center();
        b.bold();
        b.double_size();
        b.line("PRINTER TEST");
        b.reset_size();
        b.bold_off();
        b.line("Print Agent");

        b.left();
        b.sep_double();
        b.line_lr("Paper width:", &format!("{}mm", self.profile.width_mm));
        b.line_lr("Chars per line:", &width.to_string());
        b.line_lr("Code page:", &self.code_page.to_string());
        b.sep_single();

        // Column ruler: 1234567890123...
        let ruler: String = (1..=width)
            .map(|i| char::from(b'0' + (i % 10) as u8))
            .collect();
        b.line(&ruler);
        b.line("ABCDEFGHIJKLMNOPQRSTUVWXYZ");
        b.line("abcdefghijklmnopqrstuvwxyz");
        b.line("0123456789 !\"#$%&'()*+,-./:;<=>?@");

        b.bold();
        b.line("Bold text");
        b.bold_off();
        b.double_height();
        b.line("Double height");
        b.reset_size();
        b.sep_single();

        b.center();
        b.line("Test page OK");
        b.left();
        b.newline();
        b.newline();
        b.cut_partial();

        b.build()
    }
}

/// Two-decimal amount, half-cents rounded away from zero
fn amount(value: Decimal) -> String {
    let rounded =
        value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Format a front-end timestamp
///
/// Accepts RFC 3339 and `YYYY-MM-DD[T ]HH:MM[:SS[.fff]]`. The wall-clock
/// time as written is kept (no timezone conversion). Unparseable text is
/// returned verbatim; blank text yields `None`.
fn format_timestamp(raw: &str, pattern: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.format(pattern).to_string());
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .map(|dt| dt.format(pattern).to_string())
        .or_else(|| Some(raw.to_string()))
}

impl Default for TicketRenderer {
    fn default() -> Self {
        Self::new(80, CodePage::default(), ReceiptOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pos_printer::PARTIAL_CUT;
    use shared::PaymentInfo;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(name: &str, quantity: i32, unit: &str, total: &str, notes: Option<&str>) -> TicketLine {
        TicketLine {
            name: name.to_string(),
            quantity,
            unit_price: dec(unit),
            line_total: dec(total),
            notes: notes.map(str::to_string),
        }
    }

    fn sample_ticket() -> TicketData {
        TicketData {
            order_number: "ORD-1001".into(),
            table_number: "12".into(),
            is_take_away: false,
            created_at: "2024-03-05T18:42:10Z".into(),
            total: dec("27.50"),
            lines: vec![
                line("Coffee", 2, "3.50", "7.00", None),
                line("Grilled chicken with seasonal vegetables", 1, "15.00", "15.00", Some("no salt")),
                line("Lemonade", 1, "5.50", "5.50", Some("  ")),
            ],
            payment: Some(PaymentInfo {
                provider: "Cash".into(),
                amount: dec("30.00"),
                change: dec("2.50"),
            }),
        }
    }

    /// Strip ESC/POS control sequences and split into text lines
    fn text_lines(data: &[u8]) -> Vec<String> {
        let mut text = Vec::new();
        let mut i = 0;
        while i < data.len() {
            match data[i] {
                0x1B if data.get(i + 1) == Some(&0x40) => i += 2,
                0x1B if data.get(i + 1) == Some(&0x70) => i += 5,
                0x1B | 0x1D => i += 3,
                b => {
                    text.push(b);
                    i += 1;
                }
            }
        }
        String::from_utf8_lossy(&text)
            .split('\n')
            .map(str::to_string)
            .collect()
    }

    fn contains(data: &[u8], needle: &str) -> bool {
        data.windows(needle.len()).any(|w| w == needle.as_bytes())
    }

    #[test]
    fn test_chars_per_line() {
        assert_eq!(chars_per_line(80), 48);
        assert_eq!(chars_per_line(58), 32);
        assert_eq!(chars_per_line(76), 32);
    }

    #[test]
    fn test_receipt_ends_with_partial_cut() {
        let data = TicketRenderer::default().render_receipt(&sample_ticket());
        assert!(data.ends_with(&PARTIAL_CUT));
        assert!(data.starts_with(&[0x1B, 0x40]));
    }

    #[test]
    fn test_receipt_item_rows() {
        let data = TicketRenderer::default().render_receipt(&sample_ticket());
        let lines = text_lines(&data);

        // Coffee row: name(30) qty(3) price(7) total(8)
        let coffee = format!("{:<30}{:>3}{:>7}{:>8}", "Coffee", "2", "3.50", "7.00");
        assert!(lines.contains(&coffee));

        // Long name truncated to 29 chars plus '.'
        let chicken = lines
            .iter()
            .find(|l| l.starts_with("Grilled chicken"))
            .unwrap();
        assert_eq!(&chicken[..30], "Grilled chicken with seasonal.");

        // One notes row, only for the non-blank note
        let notes: Vec<_> = lines.iter().filter(|l| l.starts_with("   * ")).collect();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].contains("no salt"));
    }

    #[test]
    fn test_receipt_fixed_width_lines() {
        for width in [58u16, 80] {
            let renderer = TicketRenderer::new(width, CodePage::Wpc1252, ReceiptOptions::default());
            let cpl = chars_per_line(width);
            let data = renderer.render_receipt(&sample_ticket());
            let lines = text_lines(&data);

            let header = lines.iter().find(|l| l.starts_with("Item")).unwrap();
            assert_eq!(header.len(), cpl);

            let table_rows = lines
                .iter()
                .filter(|l| l.starts_with("Coffee") || l.starts_with("Grilled") || l.starts_with("Lemonade"))
                .count();
            assert_eq!(table_rows, 3);

            for l in &lines {
                if l.starts_with("Coffee")
                    || l.starts_with("   * ")
                    || l.starts_with("Paid:")
                    || l.starts_with("Order:")
                    || l.starts_with("Table:")
                    || l.starts_with("Date:")
                    || l.chars().all(|c| c == '-' || c == '=') && !l.is_empty()
                {
                    assert_eq!(l.len(), cpl, "line {:?}", l);
                }
            }
        }
    }

    #[test]
    fn test_header_lines_fill_width() {
        let ticket = TicketData {
            order_number: "ORD-2024-03-05-0001-DINING-ROOM-TERRACE".into(),
            table_number: "Terrace corner by the window".into(),
            created_at: "2024-03-05 18:42".into(),
            ..Default::default()
        };
        let renderer = TicketRenderer::new(58, CodePage::Wpc1252, ReceiptOptions::default());

        let lines = text_lines(&renderer.render_receipt(&ticket));
        assert!(lines.contains(&"Order: ORD-2024-03-05-0001-DINI.".to_string()));
        assert!(lines.contains(&"Table: Terrace corner by the wi.".to_string()));
        assert!(lines.contains(&format!("{:<32}", "Date: 2024-03-05 18:42")));

        let takeaway = TicketData {
            is_take_away: true,
            ..ticket.clone()
        };
        let lines = text_lines(&renderer.render_receipt(&takeaway));
        assert!(lines.contains(&format!("{:<32}", "TAKEAWAY")));

        let lines = text_lines(&renderer.render_kitchen(&ticket));
        assert!(lines.contains(&format!("{:<32}", "Time: 18:42")));
    }

    #[test]
    fn test_money_rounds_half_away_from_zero() {
        assert_eq!(amount(dec("3.456")), "3.46");
        assert_eq!(amount(dec("2.345")), "2.35");
        assert_eq!(amount(dec("-2.345")), "-2.35");
        assert_eq!(amount(dec("7")), "7.00");

        let ticket = TicketData {
            total: dec("6.915"),
            lines: vec![line("Coffee", 2, "3.456", "6.915", None)],
            payment: Some(PaymentInfo {
                provider: "Cash".into(),
                amount: dec("10"),
                change: dec("3.085"),
            }),
            ..Default::default()
        };
        let lines = text_lines(&TicketRenderer::default().render_receipt(&ticket));

        let coffee = format!("{:<30}{:>3}{:>7}{:>8}", "Coffee", "2", "3.46", "6.92");
        assert!(lines.contains(&coffee));
        assert!(lines.contains(&"TOTAL: $ 6.92".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("Change:") && l.ends_with("$ 3.09")));
    }

    #[test]
    fn test_control_chars_stay_on_one_row() {
        let ticket = TicketData {
            lines: vec![line("Tea\nwith\x1B@milk", 1, "2.00", "2.00", Some("no\nsugar"))],
            ..Default::default()
        };
        let data = TicketRenderer::default().render_receipt(&ticket);
        let lines = text_lines(&data);

        let tea = format!("{:<30}{:>3}{:>7}{:>8}", "Tea?with?@milk", "1", "2.00", "2.00");
        assert!(lines.contains(&tea));
        assert!(lines.contains(&format!("{:<48}", "   * no?sugar")));
        // Only the leading init sequence
        assert_eq!(data.windows(2).filter(|w| *w == [0x1B, 0x40]).count(), 1);
    }

    #[test]
    fn test_receipt_header_and_payment() {
        let data = TicketRenderer::default().render_receipt(&sample_ticket());
        let lines = text_lines(&data);

        assert!(lines.contains(&format!("{:<48}", "Order: ORD-1001")));
        assert!(lines.contains(&format!("{:<48}", "Table: 12")));
        assert!(lines.contains(&format!("{:<48}", "Date: 2024-03-05 18:42")));
        assert!(lines.contains(&"TOTAL: $ 27.50".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("Payment:") && l.ends_with("Cash")));
        assert!(lines.iter().any(|l| l.starts_with("Change:") && l.ends_with("$ 2.50")));
    }

    #[test]
    fn test_receipt_no_change_line_when_exact() {
        let mut ticket = sample_ticket();
        ticket.payment = Some(PaymentInfo {
            provider: "Card".into(),
            amount: dec("27.50"),
            change: Decimal::ZERO,
        });
        let data = TicketRenderer::default().render_receipt(&ticket);
        assert!(!contains(&data, "Change:"));
    }

    #[test]
    fn test_takeaway_receipt() {
        let ticket = TicketData {
            order_number: "ORD-1001".into(),
            is_take_away: true,
            total: dec("7.00"),
            lines: vec![line("Coffee", 2, "3.50", "7.00", None)],
            ..Default::default()
        };
        let data = TicketRenderer::default().render(&ticket, PrintJobKind::Receipt);

        assert!(contains(&data, "ORD-1001"));
        assert!(contains(&data, "TAKEAWAY"));
        assert!(!contains(&data, "Table:"));
        assert!(!contains(&data, "Date:"));
        assert!(contains(&data, "  2   3.50    7.00"));
        assert!(data.ends_with(&PARTIAL_CUT));
    }

    #[test]
    fn test_negative_quantity_passes_through() {
        let ticket = TicketData {
            lines: vec![line("Refund", -1, "4.00", "-4.00", None)],
            ..Default::default()
        };
        let data = TicketRenderer::default().render_receipt(&ticket);
        assert!(contains(&data, " -1   4.00   -4.00"));
    }

    #[test]
    fn test_kitchen_layout() {
        let data = TicketRenderer::default().render(&sample_ticket(), PrintJobKind::Kitchen);
        let lines = text_lines(&data);

        assert!(lines.contains(&"KITCHEN ORDER".to_string()));
        assert!(lines.contains(&"TABLE: 12".to_string()));
        assert!(lines.contains(&format!("{:<48}", "Time: 18:42")));
        assert!(lines.contains(&"2x Coffee".to_string()));
        assert!(lines.contains(&"*** KITCHEN COPY ***".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("   > no salt")));
        assert!(!contains(&data, "3.50"));
        assert!(data.ends_with(&PARTIAL_CUT));
    }

    #[test]
    fn test_kitchen_takeaway_banner() {
        let ticket = TicketData {
            order_number: "ORD-7".into(),
            is_take_away: true,
            ..Default::default()
        };
        let data = TicketRenderer::default().render_kitchen(&ticket);
        assert!(contains(&data, "*** TAKEAWAY ***"));
        assert!(!contains(&data, "TABLE:"));
    }

    #[test]
    fn test_test_page() {
        let renderer = TicketRenderer::new(58, CodePage::Wpc1252, ReceiptOptions::default());
        let data = renderer.render_test_page();
        let lines = text_lines(&data);

        assert!(data.starts_with(&[0x1B, 0x40]));
        assert!(data.ends_with(&PARTIAL_CUT));
        assert!(lines.contains(&"PRINTER TEST".to_string()));
        assert!(lines.iter().any(|l| l.len() == 32 && l.starts_with("1234567890")));
    }

    #[test]
    fn test_drawer_kick_is_fixed() {
        let narrow = TicketRenderer::new(58, CodePage::Wpc1252, ReceiptOptions::default());
        let data = narrow.render(&sample_ticket(), PrintJobKind::OpenDrawer);
        assert_eq!(data, vec![0x1B, 0x70, 0x00, 0x19, 0xFA]);
        assert_eq!(TicketRenderer::drawer_kick().to_vec(), data);
    }

    #[test]
    fn test_timestamp_formats() {
        assert_eq!(
            format_timestamp("2024-03-05 09:05:00", "%H:%M").as_deref(),
            Some("09:05")
        );
        assert_eq!(
            format_timestamp("2024-03-05T09:05:00.1234567", "%Y-%m-%d %H:%M").as_deref(),
            Some("2024-03-05 09:05")
        );
        assert_eq!(format_timestamp("yesterday", "%H:%M").as_deref(), Some("yesterday"));
        assert_eq!(format_timestamp("  ", "%H:%M"), None);
    }
}
