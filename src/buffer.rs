// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The in-memory image: a heap-owned, row-major grid of colors whose
//! first row is the top of the picture.

use std::slice::{Chunks, ChunksMut};

/// An 8-bit-per-channel color with alpha.  Bitmaps written at 24 bits
/// per pixel drop the alpha channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha; 255 is opaque
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 255 }
    }

    /// A color with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// A width × height grid of colors, stored row by row.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl PixelBuffer {
    /// A buffer of the given size, filled with opaque black.
    pub fn new(width: usize, height: usize) -> PixelBuffer {
        PixelBuffer {
            width,
            height,
            pixels: vec![Color::BLACK; width * height],
        }
    }

    /// Wraps an existing row-major vector; returns None if the length
    /// does not match the dimensions.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Color>) -> Option<PixelBuffer> {
        if pixels.len() != width * height {
            return None;
        }
        Some(PixelBuffer {
            width,
            height,
            pixels,
        })
    }

    /// Pixels per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The color at column `x` of row `y`, with row 0 at the top.
    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Overwrite a single pixel.  Panics when out of bounds, like
    /// slice indexing.
    pub fn set(&mut self, x: usize, y: usize, color: Color) {
        assert!(x < self.width && y < self.height, "pixel ({}, {}) out of bounds", x, y);
        self.pixels[y * self.width + x] = color;
    }

    /// One row, top row first.
    pub fn row(&self, y: usize) -> &[Color] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    /// Every row, top to bottom.
    pub fn rows(&self) -> Chunks<Color> {
        self.pixels.chunks(self.width.max(1))
    }

    /// Disjoint bands of `rows_per_band` whole rows, top to bottom.
    /// Each band can be handed to a different thread.
    pub fn bands_mut(&mut self, rows_per_band: usize) -> ChunksMut<Color> {
        let band = (rows_per_band * self.width).max(1);
        self.pixels.chunks_mut(band)
    }

    /// The whole grid as a flat row-major slice.
    pub fn as_slice(&self) -> &[Color] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_top_first_and_row_major() {
        let mut buf = PixelBuffer::new(3, 2);
        buf.set(2, 0, Color::WHITE);
        buf.set(0, 1, Color::rgb(1, 2, 3));
        assert_eq!(buf.row(0), &[Color::BLACK, Color::BLACK, Color::WHITE]);
        assert_eq!(buf.get(0, 1), Some(Color::rgb(1, 2, 3)));
        assert_eq!(buf.get(3, 0), None);
        assert_eq!(buf.rows().count(), 2);
    }

    #[test]
    fn bands_cover_every_row_once() {
        let mut buf = PixelBuffer::new(4, 7);
        let sizes: Vec<usize> = buf.bands_mut(3).map(|b| b.len()).collect();
        assert_eq!(sizes, vec![12, 12, 4]);
    }

    #[test]
    fn from_pixels_checks_length() {
        assert!(PixelBuffer::from_pixels(2, 2, vec![Color::WHITE; 3]).is_none());
        let buf = PixelBuffer::from_pixels(2, 2, vec![Color::WHITE; 4]).unwrap();
        assert_eq!(buf.get(1, 1), Some(Color::WHITE));
    }
}
