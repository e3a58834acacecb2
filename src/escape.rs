// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time iteration at the heart of the Mandelbrot set.

use num::Complex;

/// The squared bailout radius.  Once |z|² exceeds this (|z| > 2) the
/// orbit is guaranteed to diverge.
pub const BAILOUT: f64 = 4.0;

/// How long a point's orbit stayed bounded, and whether it got away.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct IterationResult {
    /// Iterations survived inside the bailout radius, capped at the
    /// iteration limit.
    pub count: u32,
    /// True iff `count` is below the iteration limit.
    pub escaped: bool,
}

impl IterationResult {
    /// A point still bounded after every iteration we were allowed.
    pub fn bounded(max_iterations: u32) -> Self {
        IterationResult {
            count: max_iterations,
            escaped: false,
        }
    }
}

/// Iterate z ← z² + c from z = 0, up to `max_iterations` times.
///
/// The count returned for an escaping point is the number of iterates
/// that stayed within the bailout radius before the one that left it,
/// so any |c| > 2 reports zero and `escaped` is always equivalent to
/// `count < max_iterations`.  This is total over every input; NaN
/// coordinates never compare above the bailout and so report as
/// bounded.
#[inline]
pub fn escape_iterations(c: Complex<f64>, max_iterations: u32) -> IterationResult {
    let mut z: Complex<f64> = Complex { re: 0.0, im: 0.0 };
    for i in 0..max_iterations {
        z = z * z + c;
        if z.norm_sqr() > BAILOUT {
            return IterationResult {
                count: i,
                escaped: true,
            };
        }
    }
    IterationResult::bounded(max_iterations)
}
