// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! An encoder for uncompressed Windows bitmaps: a 14-byte
//! BITMAPFILEHEADER, a 40-byte BITMAPINFOHEADER, no color table, and
//! BI_RGB pixel rows in blue-green-red order, each padded out to a
//! multiple of four bytes.
//!
//! Every header field is written individually as little-endian bytes;
//! nothing here depends on struct layout or the host's byte order.

use buffer::{Color, PixelBuffer};
use errors::{ConfigError, RenderError};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Size of the BITMAPFILEHEADER.
pub const FILE_HEADER_SIZE: u32 = 14;
/// Size of the BITMAPINFOHEADER.
pub const INFO_HEADER_SIZE: u32 = 40;
/// Pixel data starts right after the two headers; there is no color
/// table.
pub const PIXEL_DATA_OFFSET: u32 = FILE_HEADER_SIZE + INFO_HEADER_SIZE;
/// BI_RGB: no compression.
pub const BI_RGB: u32 = 0;
/// 72 DPI, the customary default.
pub const DEFAULT_PIXELS_PER_METER: i32 = 2835;

/// How many bits each pixel occupies in the file.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BitsPerPixel {
    /// Blue, green, red; rows padded to four bytes.
    Rgb24,
    /// Blue, green, red, alpha; rows never need padding.
    Rgba32,
}

impl BitsPerPixel {
    /// Bytes per pixel.
    pub fn bytes(self) -> usize {
        match self {
            BitsPerPixel::Rgb24 => 3,
            BitsPerPixel::Rgba32 => 4,
        }
    }

    /// The value of the header's bit-count field.
    pub fn bits(self) -> u16 {
        (self.bytes() * 8) as u16
    }

    /// Map 24 or 32 to a pixel format.
    pub fn from_bits(bits: u16) -> Option<BitsPerPixel> {
        match bits {
            24 => Some(BitsPerPixel::Rgb24),
            32 => Some(BitsPerPixel::Rgba32),
            _ => None,
        }
    }
}

impl Default for BitsPerPixel {
    fn default() -> Self {
        BitsPerPixel::Rgb24
    }
}

/// The order rows are stored in the file.  The sign of the header's
/// height field always matches.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RowOrder {
    /// The bottom image row comes first; height is positive.
    BottomUp,
    /// The top image row comes first; height is negative.
    TopDown,
}

impl Default for RowOrder {
    fn default() -> Self {
        RowOrder::BottomUp
    }
}

/// The sizes that go into the headers, worked out once and checked to
/// fit in their fields.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    /// Image width in pixels
    pub width: i32,
    /// Image height in pixels, always positive here
    pub height: i32,
    /// Bytes per row, including padding
    pub row_stride: u32,
    /// row_stride × height
    pub pixel_data_size: u32,
    /// The whole file: headers plus pixel data
    pub file_size: u32,
}

/// Serializes a PixelBuffer as a bitmap.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BitmapWriter {
    bits_per_pixel: BitsPerPixel,
    row_order: RowOrder,
    pixels_per_meter: i32,
}

impl Default for BitmapWriter {
    fn default() -> Self {
        BitmapWriter::new()
    }
}

impl BitmapWriter {
    /// 24 bits per pixel, bottom-up, 72 DPI.
    pub fn new() -> BitmapWriter {
        BitmapWriter {
            bits_per_pixel: BitsPerPixel::Rgb24,
            row_order: RowOrder::BottomUp,
            pixels_per_meter: DEFAULT_PIXELS_PER_METER,
        }
    }

    /// Choose between 24 and 32 bits per pixel.
    pub fn with_bits_per_pixel(mut self, bits_per_pixel: BitsPerPixel) -> Self {
        self.bits_per_pixel = bits_per_pixel;
        self
    }

    /// Choose the row order.
    pub fn with_row_order(mut self, row_order: RowOrder) -> Self {
        self.row_order = row_order;
        self
    }

    /// Set the horizontal and vertical resolution recorded in the
    /// header.  Zero is allowed and means "unspecified."
    pub fn with_pixels_per_meter(mut self, pixels_per_meter: i32) -> Self {
        self.pixels_per_meter = pixels_per_meter;
        self
    }

    /// The configured pixel format.
    pub fn bits_per_pixel(&self) -> BitsPerPixel {
        self.bits_per_pixel
    }

    /// The configured row order.
    pub fn row_order(&self) -> RowOrder {
        self.row_order
    }

    /// Bytes per stored row: the smallest multiple of four that holds
    /// `width` pixels.
    pub fn row_stride(&self, width: usize) -> usize {
        (width * self.bits_per_pixel.bytes() + 3) / 4 * 4
    }

    /// Bytes of pixel data for an image of this size.
    pub fn pixel_data_size(&self, width: usize, height: usize) -> usize {
        self.row_stride(width) * height
    }

    /// Total bytes in the file, or an error if the image is too large
    /// for the header's fields.
    pub fn file_size(&self, width: usize, height: usize) -> Result<u32, ConfigError> {
        Ok(self.layout(width, height)?.file_size)
    }

    /// Work out every size the headers need, checking each fits.
    pub fn layout(&self, width: usize, height: usize) -> Result<Layout, ConfigError> {
        let too_large = || ConfigError::ImageTooLarge { width, height };
        let max = i32::max_value() as u64;
        let (w, h) = (width as u64, height as u64);
        if w > max || h > max {
            return Err(too_large());
        }

        let stride = (w * self.bits_per_pixel.bytes() as u64 + 3) / 4 * 4;
        let data = stride.checked_mul(h).ok_or_else(too_large)?;
        let file = data + u64::from(PIXEL_DATA_OFFSET);
        if file > u64::from(u32::max_value()) {
            return Err(too_large());
        }

        Ok(Layout {
            width: w as i32,
            height: h as i32,
            row_stride: stride as u32,
            pixel_data_size: data as u32,
            file_size: file as u32,
        })
    }

    fn write_file_header<W: Write>(&self, sink: &mut W, layout: &Layout) -> io::Result<()> {
        sink.write_all(b"BM")?;
        sink.write_all(&layout.file_size.to_le_bytes())?;
        sink.write_all(&0u16.to_le_bytes())?; // reserved
        sink.write_all(&0u16.to_le_bytes())?; // reserved
        sink.write_all(&PIXEL_DATA_OFFSET.to_le_bytes())
    }

    fn write_info_header<W: Write>(&self, sink: &mut W, layout: &Layout) -> io::Result<()> {
        let height = match self.row_order {
            RowOrder::BottomUp => layout.height,
            RowOrder::TopDown => -layout.height,
        };
        sink.write_all(&INFO_HEADER_SIZE.to_le_bytes())?;
        sink.write_all(&layout.width.to_le_bytes())?;
        sink.write_all(&height.to_le_bytes())?;
        sink.write_all(&1u16.to_le_bytes())?; // planes
        sink.write_all(&self.bits_per_pixel.bits().to_le_bytes())?;
        sink.write_all(&BI_RGB.to_le_bytes())?;
        sink.write_all(&layout.pixel_data_size.to_le_bytes())?;
        sink.write_all(&self.pixels_per_meter.to_le_bytes())?;
        sink.write_all(&self.pixels_per_meter.to_le_bytes())?;
        sink.write_all(&0u32.to_le_bytes())?; // colors used: all
        sink.write_all(&0u32.to_le_bytes()) // important colors: all
    }

    // Fills `out` (one stride long) with a row in file order.  The
    // padding at the end is left as the zeros it was created with.
    fn encode_row(&self, row: &[Color], out: &mut [u8]) {
        let bpp = self.bits_per_pixel.bytes();
        for (color, bytes) in row.iter().zip(out.chunks_mut(bpp)) {
            bytes[0] = color.b;
            bytes[1] = color.g;
            bytes[2] = color.r;
            if bpp == 4 {
                bytes[3] = color.a;
            }
        }
    }

    fn write_pixels<W: Write>(
        &self,
        sink: &mut W,
        buffer: &PixelBuffer,
        layout: &Layout,
    ) -> io::Result<()> {
        let mut line = vec![0u8; layout.row_stride as usize];
        let mut emit = |row: &[Color]| {
            self.encode_row(row, &mut line);
            sink.write_all(&line)
        };
        match self.row_order {
            RowOrder::BottomUp => {
                for row in buffer.rows().rev() {
                    emit(row)?;
                }
            }
            RowOrder::TopDown => {
                for row in buffer.rows() {
                    emit(row)?;
                }
            }
        }
        Ok(())
    }

    fn write_bitmap<W: Write>(
        &self,
        sink: &mut W,
        buffer: &PixelBuffer,
        layout: &Layout,
    ) -> io::Result<()> {
        self.write_file_header(sink, layout)?;
        self.write_info_header(sink, layout)?;
        self.write_pixels(sink, buffer, layout)?;
        sink.flush()
    }

    /// Write the complete bitmap to any byte sink and return the
    /// number of bytes written, which always equals the header's
    /// file-size field.  `name` identifies the sink in error messages.
    pub fn write_named<W: Write>(
        &self,
        buffer: &PixelBuffer,
        sink: &mut W,
        name: &str,
    ) -> Result<u64, RenderError> {
        let layout = self.layout(buffer.width(), buffer.height())?;
        debug!(
            "encoding {}x{} bitmap at {} bpp, {:?}: stride {} bytes, {} bytes total",
            layout.width,
            layout.height,
            self.bits_per_pixel.bits(),
            self.row_order,
            layout.row_stride,
            layout.file_size
        );

        self.write_bitmap(sink, buffer, &layout)
            .map_err(|e| RenderError::io(name, e))?;
        Ok(u64::from(layout.file_size))
    }

    /// `write_named` for sinks that have no better name.
    pub fn write_to<W: Write>(&self, buffer: &PixelBuffer, sink: &mut W) -> Result<u64, RenderError> {
        self.write_named(buffer, sink, "<stream>")
    }

    /// The complete bitmap as a byte vector.
    pub fn encode(&self, buffer: &PixelBuffer) -> Result<Vec<u8>, RenderError> {
        let size = self.file_size(buffer.width(), buffer.height())?;
        let mut bytes = Vec::with_capacity(size as usize);
        self.write_named(buffer, &mut bytes, "<memory>")?;
        Ok(bytes)
    }

    /// Write the bitmap to `path`.  The bytes go to a temporary file in
    /// the same directory, which is renamed over `path` only once every
    /// byte has been written and synced; a failed write leaves nothing
    /// at `path`.
    pub fn write_file<P: AsRef<Path>>(&self, buffer: &PixelBuffer, path: P) -> Result<u64, RenderError> {
        let path = path.as_ref();
        // Fail on an oversized image before creating anything.
        self.layout(buffer.width(), buffer.height())?;

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let name = path.display().to_string();

        self.persist_with(path, dir, |out| self.write_named(buffer, out, &name))
    }

    // Runs `fill` against a temporary file in `dir`, and renames it to
    // `path` only if `fill` succeeds and the file holds exactly the
    // byte count it reported.  On any error the temporary file is
    // dropped, which deletes it.
    fn persist_with<F>(&self, path: &Path, dir: &Path, fill: F) -> Result<u64, RenderError>
    where
        F: FnOnce(&mut BufWriter<&mut File>) -> Result<u64, RenderError>,
    {
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| RenderError::io(path, e))?;
        let written = {
            let mut out = BufWriter::new(tmp.as_file_mut());
            let written = fill(&mut out)?;
            out.flush().map_err(|e| RenderError::io(path, e))?;
            written
        };
        tmp.as_file()
            .sync_all()
            .map_err(|e| RenderError::io(path, e))?;

        let on_disk = tmp
            .as_file()
            .metadata()
            .map_err(|e| RenderError::io(path, e))?
            .len();
        if on_disk != written {
            return Err(RenderError::io(
                path,
                io::Error::new(
                    io::ErrorKind::WriteZero,
                    format!("expected {} bytes on disk, found {}", written, on_disk),
                ),
            ));
        }

        tmp.persist(path)
            .map_err(|e| RenderError::io(path, e.error))?;
        Ok(written)
    }
}
