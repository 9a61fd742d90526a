//! ESC/POS command builder
//!
//! Provides a fluent API for building ESC/POS print data.

use crate::encoding::{CodePage, encode_text, fit_left, fit_right, text_width};

/// Initialize printer (ESC @)
pub const INIT: [u8; 2] = [0x1B, 0x40];

/// Partial cut, leaving a small tear-tab (GS V 1)
pub const PARTIAL_CUT: [u8; 3] = [0x1D, 0x56, 0x01];

/// Pulse drawer kick pin 2 for 50ms on / 500ms off (ESC p 0 25 250)
pub const DRAWER_KICK: [u8; 5] = [0x1B, 0x70, 0x00, 25, 250];

/// ESC/POS command builder
///
/// Builds ESC/POS byte sequences for thermal printers. Text is encoded
/// into the builder's code page as it is written.
pub struct EscPosBuilder {
    buf: Vec<u8>,
    width: usize,
    code_page: CodePage,
}

impl EscPosBuilder {
    /// Create a new builder with the specified paper width in characters
    ///
    /// Emits the initialize and code page selection commands.
    ///
    /// Common widths:
    /// - 58mm paper: 32 characters
    /// - 80mm paper: 48 characters
    pub fn new(width: usize, code_page: CodePage) -> Self {
        let mut buf = Vec::with_capacity(1024);
        buf.extend_from_slice(&INIT);
        // ESC t n - Select character code table
        buf.extend_from_slice(&[0x1B, 0x74, code_page.table()]);
        Self {
            buf,
            width,
            code_page,
        }
    }

    // === Text Output ===

    /// Write text in the builder's code page
    pub fn text(&mut self, s: &str) -> &mut Self {
        let bytes = encode_text(s, self.code_page);
        self.buf.extend_from_slice(&bytes);
        self
    }

    /// Write text followed by newline
    pub fn line(&mut self, s: &str) -> &mut Self {
        self.text(s);
        self.buf.push(b'\n');
        self
    }

    /// Write empty line
    pub fn newline(&mut self) -> &mut Self {
        self.buf.push(b'\n');
        self
    }

    // === Alignment ===

    /// Align text to center
    pub fn center(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x01]);
        self
    }

    /// Align text to left (default)
    pub fn left(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x00]);
        self
    }

    /// Align text to right
    pub fn right(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x02]);
        self
    }

    // === Text Style ===

    /// Enable bold text
    pub fn bold(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, 0x01]);
        self
    }

    /// Disable bold text
    pub fn bold_off(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, 0x00]);
        self
    }

    /// Double width and height
    pub fn double_size(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x21, 0x11]);
        self
    }

    /// Double height only
    pub fn double_height(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x21, 0x01]);
        self
    }

    /// Reset to normal size
    pub fn reset_size(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x21, 0x00]);
        self
    }

    // === Separators ===

    /// Print a line of '=' characters
    pub fn sep_double(&mut self) -> &mut Self {
        self.line(&"=".repeat(self.width))
    }

    /// Print a line of '-' characters
    pub fn sep_single(&mut self) -> &mut Self {
        self.line(&"-".repeat(self.width))
    }

    // === Layout Helpers ===

    /// Print a line padded or truncated to exactly the paper width
    pub fn line_fixed(&mut self, s: &str) -> &mut Self {
        let fitted = fit_left(s, self.width);
        self.line(&fitted)
    }

    /// Print left and right text on the same full-width line
    ///
    /// The right text keeps its width; the left text is padded or
    /// truncated into the remaining columns.
    pub fn line_lr(&mut self, left: &str, right: &str) -> &mut Self {
        let rw = text_width(right).min(self.width);
        let right = fit_right(right, rw);
        let left = fit_left(left, self.width - rw);
        self.text(&left);
        self.line(&right)
    }

    // === Paper Control ===

    /// Partial cut (leave a small connection)
    pub fn cut_partial(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&PARTIAL_CUT);
        self
    }

    // === Build ===

    /// Build the final byte buffer
    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for EscPosBuilder {
    fn default() -> Self {
        Self::new(48, CodePage::default())
    }
}
