// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Color policies: how an escape count becomes a pixel.  The renderer
//! only knows the ColorPolicy trait, so any of these (or a plain
//! closure) can be swapped in without touching the iteration or the
//! encoder.

use buffer::Color;
use escape::IterationResult;
use std::fmt;
use std::str::FromStr;

/// Maps an iteration result to a color.  Policies are shared between
/// render threads, so they must be Sync, and they must not have side
/// effects.
pub trait ColorPolicy: Sync {
    /// The color of a point with this iteration result.
    fn color_of(&self, result: IterationResult, max_iterations: u32) -> Color;

    /// Whether the policy needs to tell escaped points from bounded
    /// ones.  A policy that does cannot be used with a zero iteration
    /// limit, since nothing ever escapes.
    fn requires_escape(&self) -> bool {
        true
    }
}

/// Wraps a plain function or closure as a policy.
#[derive(Copy, Clone, Debug)]
pub struct FnPolicy<F>(F);

/// Use any `Fn(IterationResult, u32) -> Color` as a color policy.
pub fn from_fn<F>(f: F) -> FnPolicy<F>
where
    F: Fn(IterationResult, u32) -> Color + Sync,
{
    FnPolicy(f)
}

impl<F> ColorPolicy for FnPolicy<F>
where
    F: Fn(IterationResult, u32) -> Color + Sync,
{
    fn color_of(&self, result: IterationResult, max_iterations: u32) -> Color {
        (self.0)(result, max_iterations)
    }
}

impl<'a, P: ColorPolicy + ?Sized> ColorPolicy for &'a P {
    fn color_of(&self, result: IterationResult, max_iterations: u32) -> Color {
        (**self).color_of(result, max_iterations)
    }

    fn requires_escape(&self) -> bool {
        (**self).requires_escape()
    }
}

impl<P: ColorPolicy + ?Sized> ColorPolicy for Box<P> {
    fn color_of(&self, result: IterationResult, max_iterations: u32) -> Color {
        (**self).color_of(result, max_iterations)
    }

    fn requires_escape(&self) -> bool {
        (**self).requires_escape()
    }
}

/// Interior black, exterior white.
#[derive(Copy, Clone, Debug, Default)]
pub struct Binary;

impl ColorPolicy for Binary {
    fn color_of(&self, result: IterationResult, _max_iterations: u32) -> Color {
        if result.escaped {
            Color::WHITE
        } else {
            Color::BLACK
        }
    }
}

/// Escaped points shaded from black (fast escape) towards white (slow
/// escape); the interior is black.
#[derive(Copy, Clone, Debug, Default)]
pub struct Grayscale;

impl ColorPolicy for Grayscale {
    fn color_of(&self, result: IterationResult, max_iterations: u32) -> Color {
        if !result.escaped {
            return Color::BLACK;
        }
        let level = (255 * u64::from(result.count + 1) / u64::from(max_iterations)).min(255) as u8;
        Color::rgb(level, level, level)
    }
}

/// The stops of the default gradient, from fast escape to slow.
pub const DEFAULT_STOPS: [(f64, f64, f64); 10] = [
    (0.0, 0.0, 0.2),
    (0.1, 0.2, 0.5),
    (0.2, 0.5, 0.8),
    (0.5, 0.8, 0.9),
    (1.0, 1.0, 0.8),
    (1.0, 0.8, 0.3),
    (1.0, 0.5, 0.1),
    (0.8, 0.2, 0.1),
    (0.5, 0.0, 0.2),
    (0.0, 0.0, 0.0),
];

/// A piecewise-linear gradient over a list of stops.  Interior points
/// are black.
#[derive(Clone, Debug)]
pub struct Palette {
    stops: Vec<(f64, f64, f64)>,
}

impl Palette {
    /// A gradient through the given stops, each channel in [0, 1].
    /// Returns None for fewer than two stops.
    pub fn new(stops: Vec<(f64, f64, f64)>) -> Option<Palette> {
        if stops.len() < 2 {
            return None;
        }
        Some(Palette { stops })
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            stops: DEFAULT_STOPS.to_vec(),
        }
    }
}

fn channel(v: f64) -> u8 {
    (v * 255.0).round().max(0.0).min(255.0) as u8
}

impl ColorPolicy for Palette {
    fn color_of(&self, result: IterationResult, max_iterations: u32) -> Color {
        if !result.escaped {
            return Color::BLACK;
        }
        let t = f64::from(result.count) / f64::from(max_iterations);
        let scaled = t * (self.stops.len() - 1) as f64;
        let idx = (scaled as usize).min(self.stops.len() - 2);
        let frac = scaled - idx as f64;

        let (r1, g1, b1) = self.stops[idx];
        let (r2, g2, b2) = self.stops[idx + 1];
        Color::rgb(
            channel(r1 + (r2 - r1) * frac),
            channel(g1 + (g2 - g1) * frac),
            channel(b1 + (b2 - b1) * frac),
        )
    }
}

/// The built-in policies, by name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PolicyKind {
    /// See `Binary`
    Binary,
    /// See `Grayscale`
    Grayscale,
    /// See `Palette`
    Palette,
}

impl PolicyKind {
    /// Every accepted name, for command-line help.
    pub const NAMES: &'static [&'static str] = &["binary", "grayscale", "palette"];

    /// Instantiate the policy.
    pub fn policy(self) -> Box<dyn ColorPolicy> {
        match self {
            PolicyKind::Binary => Box::new(Binary),
            PolicyKind::Grayscale => Box::new(Grayscale),
            PolicyKind::Palette => Box::new(Palette::default()),
        }
    }
}

impl Default for PolicyKind {
    fn default() -> Self {
        PolicyKind::Binary
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "binary" => Ok(PolicyKind::Binary),
            "grayscale" | "greyscale" => Ok(PolicyKind::Grayscale),
            "palette" => Ok(PolicyKind::Palette),
            other => Err(format!("unknown color policy '{}'", other)),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            PolicyKind::Binary => "binary",
            PolicyKind::Grayscale => "grayscale",
            PolicyKind::Palette => "palette",
        };
        f.write_str(name)
    }
}
