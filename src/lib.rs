#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot renderer
//!
//! The Mandelbrot set is the set of points c on the complex plane for
//! which repeatedly squaring z and adding c, starting from zero, never
//! runs off to infinity.  We can't iterate forever, so each point gets
//! a fixed number of tries: if |z| ever exceeds 2 the point has
//! escaped and is certainly outside the set; if it hasn't after the
//! last try, we call it inside.  How quickly a point escapes is the
//! number used to color the image.
//!
//! This crate maps a grid of pixels onto a rectangle of the complex
//! plane, runs that escape-time iteration for every pixel across a
//! pool of threads, colors the results with a pluggable policy, and
//! writes the picture out as an uncompressed BMP file.  The bitmap
//! encoder is self-contained; no imaging library is involved.

extern crate crossbeam;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;
extern crate tempfile;

pub mod bitmap;
pub mod buffer;
pub mod colors;
pub mod config;
pub mod errors;
pub mod escape;
pub mod planes;
pub mod preview;
pub mod renderer;

pub use bitmap::{BitmapWriter, BitsPerPixel, RowOrder};
pub use buffer::{Color, PixelBuffer};
pub use colors::{Binary, ColorPolicy, Grayscale, Palette, PolicyKind};
pub use config::RenderConfig;
pub use errors::{ConfigError, RenderError};
pub use escape::{escape_iterations, IterationResult};
pub use planes::{pixel_to_complex, PlaneMapper, Resolution, Viewport};
pub use renderer::Renderer;

/// Validate a configuration, render it with its color policy, and
/// write the bitmap to its output path.  Returns the number of bytes
/// written.
pub fn render_to_file(config: &RenderConfig) -> Result<u64, RenderError> {
    config.validate()?;
    let renderer = Renderer::from_config(config, config.policy.policy())?;
    renderer.render_to_file(&config.writer(), &config.output)
}
