//! Code page encoding utilities for thermal printers
//!
//! Receipt printers take text in a single-byte code page selected with
//! `ESC t n`. This module provides utilities for:
//! - Mapping UTF-8 text into the selected code page
//! - Measuring, padding and truncating fixed-width fields

use encoding_rs::Encoding;
use std::fmt;
use std::str::FromStr;

/// Printer character code table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodePage {
    /// Western European (Windows-1252)
    #[default]
    Wpc1252,
    /// Cyrillic DOS (CP866)
    Pc866,
    /// Central European (Windows-1250)
    Wpc1250,
    /// Cyrillic (Windows-1251)
    Wpc1251,
}

impl CodePage {
    /// Table number `n` for `ESC t n`
    pub fn table(&self) -> u8 {
        match self {
            CodePage::Wpc1252 => 16,
            CodePage::Pc866 => 17,
            CodePage::Wpc1250 => 45,
            CodePage::Wpc1251 => 46,
        }
    }

    fn encoding(&self) -> &'static Encoding {
        match self {
            CodePage::Wpc1252 => encoding_rs::WINDOWS_1252,
            CodePage::Pc866 => encoding_rs::IBM866,
            CodePage::Wpc1250 => encoding_rs::WINDOWS_1250,
            CodePage::Wpc1251 => encoding_rs::WINDOWS_1251,
        }
    }
}

impl FromStr for CodePage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wpc1252" | "cp1252" | "windows-1252" => Ok(CodePage::Wpc1252),
            "pc866" | "cp866" | "ibm866" => Ok(CodePage::Pc866),
            "wpc1250" | "cp1250" | "windows-1250" => Ok(CodePage::Wpc1250),
            "wpc1251" | "cp1251" | "windows-1251" => Ok(CodePage::Wpc1251),
            other => Err(format!("Unknown code page: {}", other)),
        }
    }
}

impl fmt::Display for CodePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CodePage::Wpc1252 => "wpc1252",
            CodePage::Pc866 => "pc866",
            CodePage::Wpc1250 => "wpc1250",
            CodePage::Wpc1251 => "wpc1251",
        };
        f.write_str(name)
    }
}

/// Encode text into the code page, one byte per character
///
/// Characters the code page cannot represent become `?`, so the byte
/// length always equals the character count. ASCII control characters
/// become `?` too: caller text must never carry printer commands or
/// line breaks.
pub fn encode_text(s: &str, code_page: CodePage) -> Vec<u8> {
    let encoding = code_page.encoding();
    let mut out = Vec::with_capacity(s.len());
    let mut buf = [0u8; 4];

    for c in s.chars() {
        if c.is_ascii_control() {
            out.push(b'?');
            continue;
        }
        if c.is_ascii() {
            out.push(c as u8);
            continue;
        }
        let (bytes, _, had_errors) = encoding.encode(c.encode_utf8(&mut buf));
        if had_errors || bytes.len() != 1 {
            out.push(b'?');
        } else {
            out.push(bytes[0]);
        }
    }
    out
}

/// Printed width of a string (one column per character)
pub fn text_width(s: &str) -> usize {
    s.chars().count()
}

/// Left-align `s` in exactly `width` columns
///
/// Longer text keeps its first `width - 1` characters followed by `.`;
/// shorter text is padded with spaces on the right.
pub fn fit_left(s: &str, width: usize) -> String {
    let len = text_width(s);
    if len > width {
        truncate(s, width)
    } else {
        format!("{}{}", s, " ".repeat(width - len))
    }
}

/// Right-align `s` in exactly `width` columns (same truncation as [`fit_left`])
pub fn fit_right(s: &str, width: usize) -> String {
    let len = text_width(s);
    if len > width {
        truncate(s, width)
    } else {
        format!("{}{}", " ".repeat(width - len), s)
    }
}

fn truncate(s: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(width - 1).collect();
    out.push('.');
    out
}
