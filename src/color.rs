// RGB colors and pixel buffers

use std::io::{self, Write};

/// 24-bit color packed as `R << 16 | G << 8 | B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color((r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    pub const fn components(self) -> (u8, u8, u8) {
        (self.r(), self.g(), self.b())
    }

    /// Scale a 4-bit color-RAM channel to 8 bits, truncating.
    pub fn from_nibbles(r: u8, g: u8, b: u8) -> Self {
        Color::rgb(scale_nibble(r), scale_nibble(g), scale_nibble(b))
    }
}

pub(crate) fn scale_nibble(n: u8) -> u8 {
    const FACTOR: f64 = 255.0 / 15.0;
    ((n & 0x0F) as f64 * FACTOR) as u8
}

/// Row-major grid of colors, white when created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl PixelBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::WHITE; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Color {
        self.pixels[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, color: Color) {
        self.pixels[y * self.width + x] = color;
    }

    pub fn row(&self, y: usize) -> &[Color] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [Color] {
        &mut self.pixels[y * self.width..(y + 1) * self.width]
    }

    /// Copy an 8-pixel strip into row `y` starting at column `x`.
    pub fn put_strip(&mut self, x: usize, y: usize, strip: &[Color; 8]) {
        self.row_mut(y)[x..x + 8].copy_from_slice(strip);
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Plain PPM (`P3`): header, then one `R G B` line per pixel.
    pub fn write_ppm(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?;
        for c in &self.pixels {
            let (r, g, b) = c.components();
            writeln!(out, "{} {} {}", r, g, b)?;
        }
        out.flush()
    }

    #[cfg(feature = "cli")]
    pub fn to_rgb_image(&self) -> image::RgbImage {
        let mut rgb = Vec::with_capacity(self.pixels.len() * 3);
        for c in &self.pixels {
            let (r, g, b) = c.components();
            rgb.extend_from_slice(&[r, g, b]);
        }
        image::RgbImage::from_raw(self.width as u32, self.height as u32, rgb)
            .unwrap_or_else(|| image::RgbImage::new(self.width as u32, self.height as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_channels() {
        let c = Color::rgb(0x12, 0x34, 0x56);
        assert_eq!(c.0, 0x123456);
        assert_eq!(c.components(), (0x12, 0x34, 0x56));
    }

    #[test]
    fn nibble_scaling_truncates() {
        assert_eq!(scale_nibble(0), 0);
        assert_eq!(scale_nibble(1), 17);
        assert_eq!(scale_nibble(15), 255);
    }

    #[test]
    fn new_buffer_is_white() {
        let buf = PixelBuffer::new(3, 2);
        assert!(buf.pixels().iter().all(|c| *c == Color::WHITE));
    }

    #[test]
    fn ppm_layout() {
        let mut buf = PixelBuffer::new(2, 1);
        buf.set(1, 0, Color::rgb(1, 2, 3));
        let mut out = Vec::new();
        buf.write_ppm(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "P3\n2 1\n255\n255 255 255\n1 2 3\n");
    }

    #[cfg(feature = "cli")]
    #[test]
    fn rgb_image_matches_pixels() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.set(0, 1, Color::rgb(9, 8, 7));
        let img = buf.to_rgb_image();
        assert_eq!(img.get_pixel(0, 1).0, [9, 8, 7]);
        assert_eq!(img.get_pixel(1, 1).0, [255, 255, 255]);
    }
}
