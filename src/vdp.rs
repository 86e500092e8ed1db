// VDP video memory decoding: 4-bitplane tiles, the pattern atlas and the
// background nametable.

use crate::color::{Color, PixelBuffer};
use crate::palette::Palette;

pub const VRAM_SIZE: usize = 0x4000;
/// Nametable base used when a snapshot does not say otherwise.
pub const DEFAULT_NT_ADDR: u16 = 0x3800;

const TILE_BYTES: usize = 32;
const ROW_BYTES: usize = 4;

pub const PATTERN_WIDTH: usize = 256;
pub const PATTERN_HEIGHT: usize = 128;
pub const NAMETABLE_COLS: usize = 32;
pub const NAMETABLE_ROWS: usize = 28;

/// Fixed 16-color palette for viewing tiles without color RAM.
pub const REFERENCE_PALETTE: [Color; 16] = [
    Color::rgb(0, 0, 0),
    Color::rgb(128, 0, 0),
    Color::rgb(255, 0, 0),
    Color::rgb(0, 128, 0),
    Color::rgb(128, 128, 0),
    Color::rgb(255, 128, 0),
    Color::rgb(0, 255, 0),
    Color::rgb(128, 255, 0),
    Color::rgb(255, 255, 0),
    Color::rgb(0, 0, 128),
    Color::rgb(128, 0, 128),
    Color::rgb(255, 0, 128),
    Color::rgb(0, 128, 255),
    Color::rgb(128, 128, 255),
    Color::rgb(255, 128, 255),
    Color::rgb(0, 255, 255),
];

/// Palette indices for one 8-pixel tile row.
///
/// Column 0 comes from bit 7 of each plane, or bit 0 when `flip` is set.
/// Plane `n` supplies bit `n` of the index.
pub fn bitplane_indices(planes: [u8; 4], flip: bool) -> [u8; 8] {
    let mut out = [0u8; 8];
    for (col, idx) in out.iter_mut().enumerate() {
        let bit = if flip { col } else { 7 - col };
        *idx = planes
            .iter()
            .enumerate()
            .fold(0, |acc, (n, p)| acc | ((p >> bit) & 1) << n);
    }
    out
}

pub fn bitplane_row(planes: [u8; 4], palette: &[Color; 16], flip: bool) -> [Color; 8] {
    bitplane_indices(planes, flip).map(|i| palette[i as usize])
}

fn planes_at(ram: &[u8], pos: usize) -> [u8; 4] {
    [ram[pos], ram[pos + 1], ram[pos + 2], ram[pos + 3]]
}

/// A snapshot of video RAM and the nametable base register.
#[derive(Debug, Clone, Copy)]
pub struct Vram<'a> {
    pub ram: &'a [u8],
    pub nt_addr: u16,
}

impl<'a> Vram<'a> {
    pub fn new(ram: &'a [u8], nt_addr: u16) -> Self {
        Self { ram, nt_addr }
    }
}

impl<'a> From<&'a [u8]> for Vram<'a> {
    fn from(ram: &'a [u8]) -> Self {
        Self::new(ram, DEFAULT_NT_ADDR)
    }
}

/// Rasterize the first 512 tiles as a 32x16 tile atlas.
pub fn decode_patterns(ram: &[u8], palette: &[Color; 16]) -> PixelBuffer {
    let mut img = PixelBuffer::new(PATTERN_WIDTH, PATTERN_HEIGHT);
    let mut pos = 0;
    for tile_row in 0..PATTERN_HEIGHT / 8 {
        for tile_col in 0..PATTERN_WIDTH / 8 {
            for line in 0..8 {
                let strip = bitplane_row(planes_at(ram, pos), palette, false);
                img.put_strip(tile_col * 8, tile_row * 8 + line, &strip);
                pos += ROW_BYTES;
            }
        }
    }
    img
}

/// One decoded nametable word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NametableEntry {
    pub tile: u16,
    pub hflip: bool,
    pub vflip: bool,
    pub palette_bank: usize,
}

impl NametableEntry {
    pub fn from_word(w: u16) -> Self {
        Self {
            tile: w & 0x1FF,
            hflip: w & 0x200 != 0,
            vflip: w & 0x400 != 0,
            palette_bank: ((w & 0x800) >> 11) as usize,
        }
    }

    /// Address of the tile's first bitplane row.
    pub fn pattern_addr(&self) -> usize {
        (self.tile as usize) << 5
    }
}

/// Render the 32x28 background layer.
///
/// `nt_addr` overrides the snapshot's nametable base. Panics if the tables
/// run past the end of `vram.ram`.
pub fn decode_nametable(vram: &Vram<'_>, palette: &Palette, nt_addr: Option<u16>) -> PixelBuffer {
    let ram = vram.ram;
    let mut nt = nt_addr.unwrap_or(vram.nt_addr) as usize;
    let mut img = PixelBuffer::new(NAMETABLE_COLS * 8, NAMETABLE_ROWS * 8);
    for row in 0..NAMETABLE_ROWS {
        for col in 0..NAMETABLE_COLS {
            let entry = NametableEntry::from_word(u16::from_le_bytes([ram[nt], ram[nt + 1]]));
            nt += 2;
            let colors = palette.bank(entry.palette_bank);
            let mut pos = entry.pattern_addr();
            debug_assert!(pos + TILE_BYTES <= VRAM_SIZE);
            for line in 0..8 {
                let y = if entry.vflip { 7 - line } else { line };
                let strip = bitplane_row(planes_at(ram, pos), colors, entry.hflip);
                img.put_strip(col * 8, row * 8 + y, &strip);
                pos += ROW_BYTES;
            }
        }
    }
    log::debug!("decoded nametable at {:04X}", nt_addr.unwrap_or(vram.nt_addr));
    img
}
