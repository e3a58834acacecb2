// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Render configuration, and the small parsers the command line uses
//! to build one.

use bitmap::{BitmapWriter, BitsPerPixel, RowOrder};
use colors::PolicyKind;
use errors::ConfigError;
use num::Complex;
use num_cpus;
use planes::{Resolution, Viewport};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Everything needed to produce one bitmap.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// The window onto the complex plane
    pub viewport: Viewport,
    /// The size of the image
    pub resolution: Resolution,
    /// Iteration limit per point
    pub max_iterations: u32,
    /// Which built-in color policy to use
    pub policy: PolicyKind,
    /// Where the bitmap goes
    pub output: PathBuf,
    /// Worker threads
    pub threads: usize,
    /// 24 or 32 bits per pixel
    pub bits_per_pixel: BitsPerPixel,
    /// Row order in the file
    pub row_order: RowOrder,
    /// Give up if rendering takes longer than this
    pub time_budget: Option<Duration>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            viewport: Viewport::default(),
            resolution: Resolution::default(),
            max_iterations: 256,
            policy: PolicyKind::default(),
            output: PathBuf::from("mandelbrot.bmp"),
            threads: num_cpus::get(),
            bits_per_pixel: BitsPerPixel::default(),
            row_order: RowOrder::default(),
            time_budget: None,
        }
    }
}

impl RenderConfig {
    /// Check everything that can be checked before rendering: the
    /// plane, the iteration limit, and whether the image fits in a
    /// bitmap at all.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.viewport.validate()?;
        self.resolution.validate()?;
        if self.max_iterations == 0 && self.policy.policy().requires_escape() {
            return Err(ConfigError::ZeroIterations);
        }
        self.writer().layout(
            self.resolution.width as usize,
            self.resolution.height as usize,
        )?;
        Ok(())
    }

    /// The bitmap writer this configuration asks for.
    pub fn writer(&self) -> BitmapWriter {
        BitmapWriter::new()
            .with_bits_per_pixel(self.bits_per_pixel)
            .with_row_order(self.row_order)
    }
}

/// Given a string and a separator, returns the two values
/// separated by the separator.
pub fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

/// A specific implementation of parse_pair using a comma and expecting
/// floating point numbers.
pub fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

/// "800x600" to a Resolution.
pub fn parse_resolution(s: &str) -> Result<Resolution, ConfigError> {
    parse_pair::<u32>(s, 'x')
        .map(|(w, h)| Resolution::new(w, h))
        .ok_or_else(|| ConfigError::InvalidArgument(format!("could not parse image size '{}'", s)))
}

/// Two "re,im" corners to a Viewport.
pub fn parse_viewport(leftlower: &str, rightupper: &str) -> Result<Viewport, ConfigError> {
    let corner = |s: &str| {
        parse_complex(s)
            .ok_or_else(|| ConfigError::InvalidArgument(format!("could not parse corner '{}'", s)))
    };
    Ok(Viewport::from_corners(corner(leftlower)?, corner(rightupper)?))
}

/// A number of seconds, possibly fractional, to a Duration.
pub fn parse_seconds(s: &str) -> Result<Duration, ConfigError> {
    match f64::from_str(s) {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => {
            let whole = secs.trunc();
            Ok(Duration::new(whole as u64, ((secs - whole) * 1e9) as u32))
        }
        _ => Err(ConfigError::InvalidArgument(format!(
            "could not parse '{}' as a number of seconds",
            s
        ))),
    }
}
