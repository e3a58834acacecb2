// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a grid of pixels with an origin at 0,0 and a rectangle on
//! the complex plane bounded by a Viewport.  Every pixel on the grid,
//! including the last row and column, lands exactly on or inside the
//! viewport: the corners of the grid are the corners of the viewport.

use errors::ConfigError;
use num::Complex;

/// The rectangle of the complex plane being rendered, with the real
/// part on the x axis and the imaginary part on the y axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Real part of the left edge
    pub x_min: f64,
    /// Real part of the right edge
    pub x_max: f64,
    /// Imaginary part of the bottom edge
    pub y_min: f64,
    /// Imaginary part of the top edge
    pub y_max: f64,
}

impl Viewport {
    /// Build a viewport from its four edges.  Use `validate` (or
    /// construct a PlaneMapper) before trusting it.
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Viewport {
        Viewport {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Build a viewport from its left-lower and right-upper corners.
    pub fn from_corners(leftlower: Complex<f64>, rightupper: Complex<f64>) -> Viewport {
        Viewport::new(leftlower.re, rightupper.re, leftlower.im, rightupper.im)
    }

    /// Checks that both axes are finite and strictly increasing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let all = [self.x_min, self.x_max, self.y_min, self.y_max];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::InvalidViewport(
                "every bound must be a finite number".to_string(),
            ));
        }
        if self.x_min >= self.x_max {
            return Err(ConfigError::InvalidViewport(format!(
                "the left edge ({}) is not to the left of the right edge ({})",
                self.x_min, self.x_max
            )));
        }
        if self.y_min >= self.y_max {
            return Err(ConfigError::InvalidViewport(format!(
                "the bottom edge ({}) is not below the top edge ({})",
                self.y_min, self.y_max
            )));
        }
        Ok(())
    }
}

impl Default for Viewport {
    /// The whole set, with a little room to spare.
    fn default() -> Self {
        Viewport::new(-2.0, 1.0, -1.5, 1.5)
    }
}

/// Width and height of the pixel grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Pixels per row
    pub width: u32,
    /// Number of rows
    pub height: u32,
}

impl Resolution {
    /// Constructor.
    pub fn new(width: u32, height: u32) -> Resolution {
        Resolution { width, height }
    }

    /// Interpolation divides by (n - 1), so a one-pixel axis has no
    /// meaningful mapping.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 2 || self.height < 2 {
            return Err(ConfigError::InvalidResolution {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::new(800, 600)
    }
}

/// Describes the x, y of a pixel on the plane, counted from the
/// left-lower corner.  (Image rows are counted from the top; see
/// `PlaneMapper::image_pixel_to_point`.)
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Straight linear interpolation from pixel (i, j) to the complex
/// plane.  Pixel (0, 0) is (x_min, y_min) and pixel (width - 1,
/// height - 1) is (x_max, y_max).  The caller is responsible for
/// having validated the viewport and resolution.
#[inline]
pub fn pixel_to_complex(
    i: usize,
    j: usize,
    viewport: &Viewport,
    resolution: &Resolution,
) -> Complex<f64> {
    let dx = (viewport.x_max - viewport.x_min) / f64::from(resolution.width - 1);
    let dy = (viewport.y_max - viewport.y_min) / f64::from(resolution.height - 1);
    Complex::new(
        viewport.x_min + (i as f64) * dx,
        viewport.y_min + (j as f64) * dy,
    )
}

/// Contains a validated viewport and resolution, and maps pixels from
/// the one to points on the other.
#[derive(Debug, Clone)]
pub struct PlaneMapper {
    /// The complex-plane window
    pub viewport: Viewport,
    /// The pixel grid
    pub resolution: Resolution,
    // The size of one pixel step on each axis of the complex plane.
    steps: (f64, f64),
}

impl PlaneMapper {
    /// Constructor.  Rejects a viewport whose corners are out of order
    /// and a grid with fewer than two pixels on either axis.
    pub fn new(viewport: Viewport, resolution: Resolution) -> Result<PlaneMapper, ConfigError> {
        viewport.validate()?;
        resolution.validate()?;

        let steps = (
            (viewport.x_max - viewport.x_min) / f64::from(resolution.width - 1),
            (viewport.y_max - viewport.y_min) / f64::from(resolution.height - 1),
        );

        Ok(PlaneMapper {
            viewport,
            resolution,
            steps,
        })
    }

    /// Pixels per row.
    pub fn width(&self) -> usize {
        self.resolution.width as usize
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.resolution.height as usize
    }

    /// The total number of points in the integral grid.  Used to
    /// calculate memory needs.
    pub fn len(&self) -> usize {
        self.width() * self.height()
    }

    /// A validated mapper is never empty, but clippy likes symmetry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Given a pixel counted from the left-lower corner, return the
    /// complex number at the equivalent location.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(
            self.viewport.x_min + (pixel.0 as f64) * self.steps.0,
            self.viewport.y_min + (pixel.1 as f64) * self.steps.1,
        )
    }

    /// Given a column and an image row counted from the *top* of the
    /// image, return the complex number it represents.  Row 0 is the
    /// viewport's top edge, y_max.
    pub fn image_pixel_to_point(&self, column: usize, row: usize) -> Complex<f64> {
        self.pixel_to_point(&Pixel(column, self.height() - 1 - row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> Viewport {
        Viewport::new(-2.0, 1.0, -1.5, 1.5)
    }

    #[test]
    fn planemapper_fails_on_bad_shape() {
        let pm = PlaneMapper::new(Viewport::new(1.0, -1.0, -1.0, 1.0), Resolution::new(4, 4));
        assert!(pm.is_err());
        let pm = PlaneMapper::new(Viewport::new(-1.0, 1.0, 1.0, -1.0), Resolution::new(4, 4));
        assert!(pm.is_err());
        let pm = PlaneMapper::new(Viewport::new(-1.0, -1.0, -1.0, 1.0), Resolution::new(4, 4));
        assert!(pm.is_err());
    }

    #[test]
    fn planemapper_fails_on_non_finite_bounds() {
        let pm = PlaneMapper::new(
            Viewport::new(::std::f64::NAN, 1.0, -1.0, 1.0),
            Resolution::new(4, 4),
        );
        assert!(pm.is_err());
        let pm = PlaneMapper::new(
            Viewport::new(-1.0, ::std::f64::INFINITY, -1.0, 1.0),
            Resolution::new(4, 4),
        );
        assert!(pm.is_err());
    }

    #[test]
    fn planemapper_fails_on_degenerate_grid() {
        for &(w, h) in &[(1, 4), (4, 1), (0, 0), (1, 1)] {
            match PlaneMapper::new(standard(), Resolution::new(w, h)) {
                Err(ConfigError::InvalidResolution { width, height }) => {
                    assert_eq!((width, height), (w, h));
                }
                other => panic!("expected a resolution error, got {:?}", other),
            }
        }
    }

    #[test]
    fn planemapper_passes_on_good_shape() {
        let pm = PlaneMapper::new(Viewport::new(-1.0, 1.0, -1.0, 1.0), Resolution::new(2, 2));
        assert!(pm.is_ok());
        assert_eq!(pm.unwrap().len(), 4);
    }

    #[test]
    fn pixel_to_point_hits_the_corners() {
        let pm = PlaneMapper::new(standard(), Resolution::new(3, 3)).unwrap();
        assert_eq!(pm.pixel_to_point(&Pixel(0, 0)), Complex::new(-2.0, -1.5));
        assert_eq!(pm.pixel_to_point(&Pixel(1, 1)), Complex::new(-0.5, 0.0));
        assert_eq!(pm.pixel_to_point(&Pixel(2, 2)), Complex::new(1.0, 1.5));
    }

    #[test]
    fn pixel_to_point_on_positive_planes() {
        let pm = PlaneMapper::new(Viewport::new(0.0, 4.0, 0.0, 4.0), Resolution::new(5, 5)).unwrap();
        assert_eq!(pm.pixel_to_point(&Pixel(0, 0)), Complex::new(0.0, 0.0));
        assert_eq!(pm.pixel_to_point(&Pixel(2, 3)), Complex::new(2.0, 3.0));
        assert_eq!(pm.pixel_to_point(&Pixel(4, 4)), Complex::new(4.0, 4.0));
    }

    #[test]
    fn mapper_agrees_with_free_function() {
        let vp = Viewport::new(-2.0, 2.0, -1.0, 1.0);
        let res = Resolution::new(9, 5);
        let pm = PlaneMapper::new(vp, res).unwrap();
        for i in 0..9 {
            for j in 0..5 {
                assert_eq!(pm.pixel_to_point(&Pixel(i, j)), pixel_to_complex(i, j, &vp, &res));
            }
        }
    }

    #[test]
    fn image_rows_count_from_the_top() {
        let pm = PlaneMapper::new(standard(), Resolution::new(3, 3)).unwrap();
        assert_eq!(pm.image_pixel_to_point(0, 0), Complex::new(-2.0, 1.5));
        assert_eq!(pm.image_pixel_to_point(2, 2), Complex::new(1.0, -1.5));
    }

    #[test]
    fn corners_build_a_viewport() {
        let vp = Viewport::from_corners(Complex::new(-2.0, -1.5), Complex::new(1.0, 1.5));
        assert_eq!(vp, standard());
        assert_eq!(Viewport::default(), standard());
    }
}
