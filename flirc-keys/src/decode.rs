//! Composite code decoding for receiver reports.
//!
//! Report layout (first three bytes):
//!
//! | byte | plain report      | special report          |
//! |------|-------------------|-------------------------|
//! | 0    | report class      | [`SPECIAL_MARKER`]      |
//! | 1    | modifier bits     | consumer code           |
//! | 2    | key code          | unused                  |
//!
//! A key code of 0 means "no key" and releases whatever was pressed.

use crate::codes::{CodeTable, Section};
use crate::error::DecodeError;

/// Byte 0 value marking a special (consumer) key report.
pub const SPECIAL_MARKER: u8 = 2;

/// Shortest report that can be decoded.
pub const MIN_REPORT_LEN: usize = 3;

/// Modifier tags by bit position (bit 0 = left control).
static MODIFIER_TAGS: [&str; 8] = ["LC", "LS", "LA", "LCMD", "RC", "RS", "RA", "RCMD"];

/// Modifier bit field from byte 1 of a plain report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const LEFT_CTRL: Modifiers = Modifiers(1 << 0);
    pub const LEFT_SHIFT: Modifiers = Modifiers(1 << 1);
    pub const LEFT_ALT: Modifiers = Modifiers(1 << 2);
    pub const LEFT_CMD: Modifiers = Modifiers(1 << 3);
    pub const RIGHT_CTRL: Modifiers = Modifiers(1 << 4);
    pub const RIGHT_SHIFT: Modifiers = Modifiers(1 << 5);
    pub const RIGHT_ALT: Modifiers = Modifiers(1 << 6);
    pub const RIGHT_CMD: Modifiers = Modifiers(1 << 7);

    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Tags for every set bit, lowest bit first.
    pub fn tags(self) -> impl Iterator<Item = &'static str> {
        MODIFIER_TAGS
            .iter()
            .enumerate()
            .filter(move |&(bit, _)| self.0 & (1u8 << bit) != 0)
            .map(|(_, tag)| *tag)
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self {
        Modifiers(self.0 | rhs.0)
    }
}

/// A pressed key identified by its composite code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedKey {
    /// Code looked up in the table.
    pub raw_code: u8,
    /// Canonical button identity.
    pub code: u32,
    pub section: Section,
    pub modifiers: Modifiers,
}

impl DecodedKey {
    /// Human description, modifiers first: `LA+RS+A`.
    pub fn describe(&self, table: &CodeTable) -> String {
        let name = table.describe(self.section, self.raw_code);
        if self.modifiers.is_empty() {
            return name;
        }
        let mut parts: Vec<&str> = self.modifiers.tags().collect();
        parts.push(&name);
        parts.join("+")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Press(DecodedKey),
    /// "No key" report.
    Release,
}

/// Decode one raw report.
pub fn decode(report: &[u8]) -> Result<KeyEvent, DecodeError> {
    if report.len() < MIN_REPORT_LEN {
        return Err(DecodeError::ShortReport(report.len()));
    }
    let (class, b1, b2) = (report[0], report[1], report[2]);

    let key = if class == SPECIAL_MARKER {
        DecodedKey {
            raw_code: b1,
            code: (u32::from(SPECIAL_MARKER) << 8) | u32::from(b1),
            section: Section::Special,
            modifiers: Modifiers::default(),
        }
    } else {
        let modifiers = Modifiers::from_bits(b1);
        let code = if modifiers.is_empty() {
            (u32::from(class) << 8) | u32::from(b2)
        } else {
            (u32::from(class) << 16) | (u32::from(b1) << 8) | u32::from(b2)
        };
        DecodedKey {
            raw_code: b2,
            code,
            section: Section::Plain,
            modifiers,
        }
    };

    if key.raw_code == 0 {
        return Ok(KeyEvent::Release);
    }
    Ok(KeyEvent::Press(key))
}
