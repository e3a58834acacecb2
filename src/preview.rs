// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A character-per-pixel preview for the terminal.

use escape::escape_iterations;
use planes::PlaneMapper;

/// Printed for points that never escaped.
pub const INSIDE: char = '*';
/// Printed for points that escaped.
pub const OUTSIDE: char = ' ';

/// One line per row, top (y_max) first, each line `width` characters
/// followed by a newline.
pub fn ascii_preview(plane: &PlaneMapper, max_iterations: u32) -> String {
    let (width, height) = (plane.width(), plane.height());
    let mut out = String::with_capacity((width + 1) * height);
    for (row, column) in iproduct!(0..height, 0..width) {
        let c = plane.image_pixel_to_point(column, row);
        out.push(if escape_iterations(c, max_iterations).escaped {
            OUTSIDE
        } else {
            INSIDE
        });
        if column + 1 == width {
            out.push('\n');
        }
    }
    out
}
