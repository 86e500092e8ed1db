//! Decoders for game-specific compressed graphics found in ROM banks.
//!
//! Every decoder reads through a [`Cursor`] that the caller positions at
//! the start of the data and can inspect afterwards to find where the
//! next blob begins.

use thiserror::Error;

pub mod columns;
pub mod phantasy_star;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid plane control byte {byte:#04x} at offset {offset:#06x}")]
    InvalidControl { byte: u8, offset: usize },
    #[error("unsupported plane control byte {byte:#04x} at offset {offset:#06x}")]
    UnsupportedControl { byte: u8, offset: usize },
    #[error("palette entry {index} out of range at offset {offset:#06x}")]
    PaletteIndex { index: usize, offset: usize },
}

/// Read position into a borrowed ROM bank.
///
/// Reads past the end of the bank panic; bank slices and start offsets come
/// from the caller.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    bank: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(bank: &'a [u8]) -> Self {
        Self::at(bank, 0)
    }

    pub fn at(bank: &'a [u8], pos: usize) -> Self {
        Self { bank, pos }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn read_u8(&mut self) -> u8 {
        let b = self.bank[self.pos];
        self.pos += 1;
        b
    }

    pub fn read_u16_le(&mut self) -> u16 {
        let lo = self.read_u8();
        let hi = self.read_u8();
        u16::from_le_bytes([lo, hi])
    }

    /// Byte under the cursor, without advancing.
    pub fn peek(&self) -> u8 {
        self.bank[self.pos]
    }

    pub fn skip(&mut self, n: usize) {
        self.pos += n;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_advances() {
        let bank = [0x34u8, 0x12, 0xAA];
        let mut c = Cursor::new(&bank);
        assert_eq!(c.read_u16_le(), 0x1234);
        assert_eq!(c.pos(), 2);
        assert_eq!(c.peek(), 0xAA);
        c.skip(1);
        assert_eq!(c.pos(), 3);
    }

    #[test]
    #[should_panic]
    fn reading_past_the_end_panics() {
        let bank = [0u8; 1];
        let mut c = Cursor::at(&bank, 1);
        c.read_u8();
    }
}
