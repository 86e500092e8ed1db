// Phantasy Star compressed tiles
//
// Each tile starts with a control byte holding four 2-bit plane codes,
// plane 0 in the top bits:
//
//   00  plane of zeros
//   01  plane of ones
//   11  eight literal bytes
//   10  escape, followed by a second control byte
//
// Escapes derive the plane from the literal stream and from a plane already
// built for this tile or the previous one.

use super::{Cursor, DecodeError};
use crate::color::{Color, PixelBuffer};
use crate::vdp::bitplane_row;

type Plane = [u8; 8];

/// Fill `plane` row by row, MSB of `mask` first: set bits take `value`,
/// clear bits take the next literal.
fn fill(cur: &mut Cursor<'_>, plane: &mut Plane, mask: u8, value: u8) {
    for (row, out) in plane.iter_mut().enumerate() {
        *out = if mask & (0x80 >> row) != 0 { value } else { cur.read_u8() };
    }
}

/// Like [`fill`], but set bits take the matching row of `source` XOR `xor`.
fn derive(cur: &mut Cursor<'_>, plane: &mut Plane, mask: u8, xor: u8, source: &Plane) {
    for (row, out) in plane.iter_mut().enumerate() {
        *out = if mask & (0x80 >> row) != 0 { source[row] ^ xor } else { cur.read_u8() };
    }
}

fn fill_plane(
    cur: &mut Cursor<'_>,
    code: u8,
    planes: &mut [Plane; 4],
    i: usize,
) -> Result<(), DecodeError> {
    match code {
        0b00 => fill(cur, &mut planes[i], 0xFF, 0x00),
        0b01 => fill(cur, &mut planes[i], 0xFF, 0xFF),
        0b11 => fill(cur, &mut planes[i], 0x00, 0x00),
        _ => {
            let offset = cur.pos();
            let ctl = cur.read_u8();
            let source = planes[(ctl & 0x03) as usize];
            match ctl {
                0x00..=0x02 => return Err(DecodeError::InvalidControl { byte: ctl, offset }),
                0x10..=0x12 => derive(cur, &mut planes[i], 0xFF, 0xFF, &source),
                0x20..=0x22 => return Err(DecodeError::UnsupportedControl { byte: ctl, offset }),
                0x40..=0x42 => {
                    let mask = cur.read_u8();
                    derive(cur, &mut planes[i], mask, 0xFF, &source);
                }
                _ => {
                    let value = cur.read_u8();
                    fill(cur, &mut planes[i], ctl, value);
                }
            }
        }
    }
    Ok(())
}

/// Decode `ntiles` tiles into an 8-pixel-wide column, one tile below the
/// other. Fails on the first malformed escape; nothing is returned for the
/// tiles decoded before it.
pub fn generate_tiles(
    cur: &mut Cursor<'_>,
    ntiles: usize,
    palette: &[Color; 16],
) -> Result<PixelBuffer, DecodeError> {
    let mut img = PixelBuffer::new(8, 8 * ntiles);
    let mut planes: [Plane; 4] = [[0; 8]; 4];
    for tile in 0..ntiles {
        let mut ctl = cur.read_u8();
        for i in 0..4 {
            fill_plane(cur, ctl >> 6, &mut planes, i)?;
            ctl <<= 2;
        }
        for row in 0..8 {
            let strip = bitplane_row(
                [planes[0][row], planes[1][row], planes[2][row], planes[3][row]],
                palette,
                false,
            );
            img.put_strip(0, tile * 8 + row, &strip);
        }
    }
    log::debug!("decoded {} tiles, cursor at {:#06x}", ntiles, cur.pos());
    Ok(img)
}
