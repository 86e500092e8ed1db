// Color RAM decoding
//
// Each entry is a little-endian 16-bit word holding three 4-bit channels:
// bits 3..0 red, 7..4 green, 11..8 blue.

use crate::color::{Color, PixelBuffer};
use crate::vdp::REFERENCE_PALETTE;

pub const BANK_SIZE: usize = 16;
/// Bytes of color RAM covering both banks.
pub const CRAM_SIZE: usize = 2 * BANK_SIZE * 2;

/// Two banks of 16 colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub banks: [[Color; BANK_SIZE]; 2],
}

impl Palette {
    pub fn new() -> Self {
        Self {
            banks: [[Color::BLACK; BANK_SIZE]; 2],
        }
    }

    /// Both banks set to the fixed reference palette.
    pub fn reference() -> Self {
        Self {
            banks: [REFERENCE_PALETTE; 2],
        }
    }

    /// Decode both banks from the first [`CRAM_SIZE`] bytes of color RAM.
    ///
    /// Panics if `cram` holds fewer than [`CRAM_SIZE`] bytes.
    pub fn from_cram(cram: &[u8]) -> Self {
        let mut pal = Self::new();
        let entries = cram[..CRAM_SIZE].chunks_exact(2);
        for (i, pair) in entries.enumerate() {
            pal.banks[i / BANK_SIZE][i % BANK_SIZE] = decode_entry(u16::from_le_bytes([pair[0], pair[1]]));
        }
        pal
    }

    pub fn bank(&self, n: usize) -> &[Color; BANK_SIZE] {
        &self.banks[n & 1]
    }

    /// Fade step: bank 0 with `step` subtracted from every channel,
    /// saturating at zero. Bank 1 of the result is black.
    pub fn darken(&self, step: u8) -> Self {
        let mut out = Self::new();
        for (dst, src) in out.banks[0].iter_mut().zip(&self.banks[0]) {
            let (r, g, b) = src.components();
            *dst = Color::rgb(r.saturating_sub(step), g.saturating_sub(step), b.saturating_sub(step));
        }
        out
    }

    /// Swatch image: one 8-pixel-high row per bank, 16 squares of 8x8 each.
    pub fn to_image(&self) -> PixelBuffer {
        let mut img = PixelBuffer::new(128, 16);
        for (bank, colors) in self.banks.iter().enumerate() {
            for (i, &color) in colors.iter().enumerate() {
                let strip = [color; 8];
                for row in 0..8 {
                    img.put_strip(i * 8, bank * 8 + row, &strip);
                }
            }
        }
        img
    }

    /// Re-pack a color into the 12-bit color RAM layout, rounding each
    /// channel to the nearest nibble.
    pub fn quantize(color: Color) -> u16 {
        let nib = |c: u8| (c as u16 * 15 + 127) / 255;
        let (r, g, b) = color.components();
        nib(r) | nib(g) << 4 | nib(b) << 8
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

pub fn decode_entry(word: u16) -> Color {
    Color::from_nibbles(word as u8 & 0x0F, (word >> 4) as u8 & 0x0F, (word >> 8) as u8 & 0x0F)
}
