// Columns data formats: run tables, box blits, palette patches and the
// 1-bpp font strips.

use super::{Cursor, DecodeError};
use crate::color::{Color, PixelBuffer};
use crate::palette::{Palette, BANK_SIZE};

/// Row pitch of the nametable in bytes.
const BOX_STRIDE: usize = 64;

/// Expand a run table into `out`, starting at `offset`.
///
/// The table starts with a pass count `n`. Pass `k` fills
/// `out[offset + k]`, `out[offset + k + n]`, ... from a list of runs ended
/// by a zero byte. With bit 7 set a run copies `count & 0x7f` literal bytes,
/// otherwise it repeats the single following byte `count` times.
pub fn load_table(cur: &mut Cursor<'_>, out: &mut [u8], offset: usize) {
    let passes = cur.read_u8() as usize;
    for pass in 0..passes {
        let mut to = offset + pass;
        loop {
            let run = cur.read_u8();
            if run == 0 {
                break;
            }
            let count = (run & 0x7F) as usize;
            if run & 0x80 != 0 {
                for _ in 0..count {
                    out[to] = cur.read_u8();
                    to += passes;
                }
            } else {
                let value = cur.read_u8();
                for _ in 0..count {
                    out[to] = value;
                    to += passes;
                }
            }
        }
    }
    log::debug!("run table: {} passes, ends at {:#06x}", passes, cur.pos());
}

/// Blit `width` two-byte cells by `height` rows from `buf` into `out` at
/// `offset`, stepping 64 bytes per row.
///
/// Panics if `buf` holds fewer than `width * 2 * height` bytes.
pub fn box_write(buf: &[u8], out: &mut [u8], offset: usize, width: usize, height: usize) {
    let cell = width * 2;
    for row in 0..height {
        let src = &buf[row * cell..(row + 1) * cell];
        let dst = offset + row * BOX_STRIDE;
        out[dst..dst + cell].copy_from_slice(src);
    }
}

/// Apply a palette patch: a start index, a byte count and `count / 2`
/// two-byte entries. Entries may run from bank 0 into bank 1; only bank 0
/// receives the result.
pub fn load_palette(cur: &mut Cursor<'_>, pal: &mut Palette) -> Result<(), DecodeError> {
    let mut scratch = [Color::BLACK; 2 * BANK_SIZE];
    scratch[..BANK_SIZE].copy_from_slice(&pal.banks[0]);
    scratch[BANK_SIZE..].copy_from_slice(&pal.banks[1]);

    let mut index = cur.read_u8() as usize;
    let entries = cur.read_u8() / 2;
    for _ in 0..entries {
        let offset = cur.pos();
        let lo = cur.read_u8();
        let hi = cur.read_u8();
        let slot = scratch
            .get_mut(index)
            .ok_or(DecodeError::PaletteIndex { index, offset })?;
        *slot = Color::from_nibbles(lo & 0x0F, lo >> 4, hi & 0x0F);
        index += 1;
    }

    pal.banks[0].copy_from_slice(&scratch[..BANK_SIZE]);
    Ok(())
}

/// Decode a 1-bpp strip: a 16-bit row count, then one byte per 8-pixel
/// row, set bits black.
pub fn decode_bitmap(cur: &mut Cursor<'_>) -> PixelBuffer {
    let rows = cur.read_u16_le() as usize;
    let mut img = PixelBuffer::new(8, rows);
    for y in 0..rows {
        let bits = cur.read_u8();
        for x in 0..8 {
            let color = if bits & (0x80 >> x) != 0 { Color::BLACK } else { Color::WHITE };
            img.set(x, y, color);
        }
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_table_interleaves_passes() {
        #[rustfmt::skip]
        let bank: [u8; 11] = [
            2,
            0x03, 0xAA,             // pass 0: AA x3
            0x00,
            0x82, 0x01, 0x02,       // pass 1: literals 01 02
            0x01, 0x07,             //         07 x1
            0x00,
            0xEE,
        ];
        let mut cur = Cursor::new(&bank);
        let mut out = [0u8; 8];
        load_table(&mut cur, &mut out, 1);
        assert_eq!(out, [0, 0xAA, 0x01, 0xAA, 0x02, 0xAA, 0x07, 0]);
        assert_eq!(cur.pos(), 10);
        assert_eq!(cur.peek(), 0xEE);
    }

    #[test]
    fn empty_table_only_reads_count() {
        let bank = [0u8, 0xFF];
        let mut cur = Cursor::new(&bank);
        let mut out = [0u8; 4];
        load_table(&mut cur, &mut out, 0);
        assert_eq!(cur.pos(), 1);
        assert_eq!(out, [0; 4]);
    }

    #[test]
    fn box_write_uses_row_stride() {
        let buf = [1, 2, 3, 4, 5, 6, 7, 8];
        let mut out = [0u8; 200];
        box_write(&buf, &mut out, 10, 2, 2);
        assert_eq!(&out[10..14], &[1, 2, 3, 4]);
        assert_eq!(&out[74..78], &[5, 6, 7, 8]);
        assert_eq!(out[14], 0);
        assert_eq!(out[73], 0);
    }

    #[test]
    fn zero_width_box_writes_nothing() {
        let mut out = [0u8; 200];
        box_write(&[1, 2, 3, 4], &mut out, 0, 0, 2);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    #[should_panic]
    fn short_box_source_panics() {
        let mut out = [0u8; 200];
        box_write(&[1, 2, 3, 4], &mut out, 0, 2, 3);
    }

    #[test]
    fn palette_patch_lands_in_bank0() {
        let mut pal = Palette::new();
        pal.banks[0][0] = Color::rgb(1, 1, 1);
        // start 15, 4 bytes = 2 entries: bank0[15] and bank1[0]
        let bank = [15u8, 4, 0xF0, 0x00, 0x0F, 0x0F];
        let mut cur = Cursor::new(&bank);
        load_palette(&mut cur, &mut pal).unwrap();
        assert_eq!(pal.banks[0][15], Color::rgb(0, 255, 0));
        assert_eq!(pal.banks[0][0], Color::rgb(1, 1, 1));
        // the spill into the second bank is dropped
        assert_eq!(pal.banks[1][0], Color::BLACK);
        assert_eq!(cur.pos(), 6);
    }

    #[test]
    fn palette_patch_past_scratch_fails() {
        let mut pal = Palette::new();
        let bank = [31u8, 4, 0x11, 0x01, 0x22, 0x02];
        let mut cur = Cursor::new(&bank);
        let err = load_palette(&mut cur, &mut pal).unwrap_err();
        assert_eq!(err, DecodeError::PaletteIndex { index: 32, offset: 4 });
        assert_eq!(pal, Palette::new());
    }

    #[test]
    fn bitmap_rows_are_msb_first() {
        let bank = [2u8, 0, 0x81, 0x00];
        let mut cur = Cursor::new(&bank);
        let img = decode_bitmap(&mut cur);
        assert_eq!((img.width(), img.height()), (8, 2));
        assert_eq!(img.get(0, 0), Color::BLACK);
        assert_eq!(img.get(7, 0), Color::BLACK);
        assert_eq!(img.get(1, 0), Color::WHITE);
        assert!(img.row(1).iter().all(|c| *c == Color::WHITE));
    }
}
