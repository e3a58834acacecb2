// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error types.  Configuration problems are reported before any pixel
//! is computed; I/O problems are reported with the path that failed.

use std::io;
use std::path::Path;
use std::time::Duration;

/// Something about the requested render cannot work.  These are all
/// detected once, up front, never in the middle of a render.
#[derive(Debug, Fail)]
pub enum ConfigError {
    /// The viewport's corners are not strictly ordered, or not finite.
    #[fail(display = "invalid viewport: {}", _0)]
    InvalidViewport(String),

    /// One or both image dimensions are too small to interpolate across.
    #[fail(
        display = "invalid resolution {}x{}: both dimensions must be at least 2",
        width, height
    )]
    InvalidResolution {
        /// Requested width in pixels
        width: u32,
        /// Requested height in pixels
        height: u32,
    },

    /// A zero iteration cap means nothing ever escapes, which makes
    /// any policy that colors by escape meaningless.
    #[fail(display = "the iteration limit must be at least 1 for this color policy")]
    ZeroIterations,

    /// The image would not fit in the bitmap header's size fields.
    #[fail(display = "an image of {}x{} pixels is too large for a bitmap", width, height)]
    ImageTooLarge {
        /// Requested width in pixels
        width: usize,
        /// Requested height in pixels
        height: usize,
    },

    /// A command-line value that could not be parsed.
    #[fail(display = "{}", _0)]
    InvalidArgument(String),
}

/// Everything that can stop a render from producing a file.
#[derive(Debug, Fail)]
pub enum RenderError {
    /// The render was misconfigured.
    #[fail(display = "{}", _0)]
    Config(#[cause] ConfigError),

    /// The sink could not be opened or did not accept every byte.
    #[fail(display = "could not write {}: {}", path, cause)]
    Io {
        /// The file (or other sink) being written
        path: String,
        /// What the operating system said
        #[cause]
        cause: io::Error,
    },

    /// The render ran past its time budget and was abandoned; nothing
    /// was written.
    #[fail(display = "render exceeded its time budget of {:?}", _0)]
    DeadlineExceeded(Duration),
}

impl RenderError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io<P: AsRef<Path>>(path: P, cause: io::Error) -> Self {
        RenderError::Io {
            path: path.as_ref().display().to_string(),
            cause,
        }
    }

    /// True when the error was a configuration problem rather than a
    /// failure during rendering or writing.
    pub fn is_config(&self) -> bool {
        match *self {
            RenderError::Config(_) => true,
            _ => false,
        }
    }
}

impl From<ConfigError> for RenderError {
    fn from(err: ConfigError) -> Self {
        RenderError::Config(err)
    }
}
