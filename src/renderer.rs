// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The Renderer drives the whole pipeline: every pixel is mapped to
//! the complex plane, iterated, and colored, and the finished buffer
//! is handed to a BitmapWriter exactly once.
//!
//! Each pixel depends on nothing but its own coordinates, so the
//! threaded renderer simply cuts the image into horizontal bands of
//! whole rows and gives each band to its own scoped thread.  The bands
//! are disjoint slices of the one buffer; no locking is needed, and
//! the end of the crossbeam scope is the barrier before encoding.

use bitmap::BitmapWriter;
use buffer::{Color, PixelBuffer};
use colors::ColorPolicy;
use config::RenderConfig;
use crossbeam;
use errors::{ConfigError, RenderError};
use escape::escape_iterations;
use num_cpus;
use planes::{PlaneMapper, Resolution, Viewport};
use std::panic;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// A validated render: plane, iteration limit, and color policy.  Once
/// built, nothing about it changes except the scheduling knobs.
pub struct Renderer<P: ColorPolicy> {
    plane: PlaneMapper,
    max_iterations: u32,
    policy: P,
    threads: usize,
    time_budget: Option<Duration>,
}

impl<P: ColorPolicy> Renderer<P> {
    /// Validates the viewport, the resolution, and the iteration limit
    /// against the policy.  Nothing is rendered here.
    pub fn new(
        viewport: Viewport,
        resolution: Resolution,
        max_iterations: u32,
        policy: P,
    ) -> Result<Self, ConfigError> {
        let plane = PlaneMapper::new(viewport, resolution)?;
        if max_iterations == 0 && policy.requires_escape() {
            return Err(ConfigError::ZeroIterations);
        }
        Ok(Renderer {
            plane,
            max_iterations,
            policy,
            threads: num_cpus::get(),
            time_budget: None,
        })
    }

    /// Build a renderer from a full configuration, taking its thread
    /// count and time budget along with the plane.
    pub fn from_config(config: &RenderConfig, policy: P) -> Result<Self, ConfigError> {
        let renderer = Renderer::new(
            config.viewport,
            config.resolution,
            config.max_iterations,
            policy,
        )?
        .with_threads(config.threads);
        Ok(match config.time_budget {
            Some(budget) => renderer.with_time_budget(budget),
            None => renderer,
        })
    }

    /// Number of worker threads; zero is treated as one.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Abandon the render if it has not finished within `budget`.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// The plane being rendered.
    pub fn plane(&self) -> &PlaneMapper {
        &self.plane
    }

    /// The iteration limit.
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// The color of one pixel, with row 0 at the top of the image.
    pub fn pixel(&self, column: usize, row: usize) -> Color {
        let c = self.plane.image_pixel_to_point(column, row);
        let result = escape_iterations(c, self.max_iterations);
        self.policy.color_of(result, self.max_iterations)
    }

    fn fill_row(&self, row: usize, pixels: &mut [Color]) {
        for (column, pixel) in pixels.iter_mut().enumerate() {
            *pixel = self.pixel(column, row);
        }
    }

    /// The single-threaded reference render.
    pub fn render_single(&self) -> PixelBuffer {
        let mut buffer = PixelBuffer::new(self.plane.width(), self.plane.height());
        let width = self.plane.width();
        for (row, pixels) in buffer.bands_mut(1).enumerate() {
            debug_assert_eq!(pixels.len(), width);
            self.fill_row(row, pixels);
        }
        buffer
    }

    /// Render the whole image across the configured threads.  Fails only
    /// if a time budget was set and ran out, in which case the partial
    /// buffer is thrown away.
    pub fn render(&self) -> Result<PixelBuffer, RenderError> {
        let width = self.plane.width();
        let height = self.plane.height();
        let mut buffer = PixelBuffer::new(width, height);

        let threads = if self.threads > height {
            warn!(
                "{} threads requested for {} rows; using {}",
                self.threads, height, height
            );
            height
        } else {
            self.threads
        };
        let rows_per_band = (height + threads - 1) / threads;
        debug!(
            "rendering {}x{} at {} iterations: {} bands of up to {} rows",
            width, height, self.max_iterations, threads, rows_per_band
        );

        // A budget too large to represent as an instant has no deadline.
        let deadline = self
            .time_budget
            .and_then(|budget| Instant::now().checked_add(budget));
        let cancelled = AtomicBool::new(false);

        let outcome = {
            let cancelled = &cancelled;
            let bands = buffer.bands_mut(rows_per_band);
            crossbeam::scope(|spawner| {
                for (band, pixels) in bands.enumerate() {
                    let first_row = band * rows_per_band;
                    spawner.spawn(move |_| {
                        for (offset, row) in pixels.chunks_mut(width).enumerate() {
                            if cancelled.load(Ordering::Relaxed) {
                                return;
                            }
                            if let Some(deadline) = deadline {
                                if Instant::now() >= deadline {
                                    cancelled.store(true, Ordering::Relaxed);
                                    return;
                                }
                            }
                            self.fill_row(first_row + offset, row);
                        }
                    });
                }
            })
        };
        if let Err(payload) = outcome {
            panic::resume_unwind(payload);
        }

        if cancelled.load(Ordering::Relaxed) {
            let budget = self.time_budget.unwrap_or_default();
            return Err(RenderError::DeadlineExceeded(budget));
        }
        Ok(buffer)
    }

    /// Render, then write the bitmap to `path`.  An image too large for
    /// the format is refused before any pixel is computed, and nothing
    /// is written if the render fails.
    pub fn render_to_file<Q: AsRef<Path>>(
        &self,
        writer: &BitmapWriter,
        path: Q,
    ) -> Result<u64, RenderError> {
        writer.layout(self.plane.width(), self.plane.height())?;
        let buffer = self.render()?;
        writer.write_file(&buffer, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colors::{from_fn, Binary, ColorPolicy};
    use escape::IterationResult;

    fn renderer(width: u32, height: u32) -> Renderer<Binary> {
        Renderer::new(
            Viewport::new(-2.0, 1.0, -1.5, 1.5),
            Resolution::new(width, height),
            50,
            Binary,
        )
        .unwrap()
    }

    #[test]
    fn rejects_bad_configuration_up_front() {
        let r = Renderer::new(
            Viewport::new(1.0, -2.0, -1.5, 1.5),
            Resolution::new(3, 3),
            50,
            Binary,
        );
        assert!(r.is_err());
        let r = Renderer::new(Viewport::default(), Resolution::new(1, 3), 50, Binary);
        assert!(r.is_err());
        match Renderer::new(Viewport::default(), Resolution::new(3, 3), 0, Binary) {
            Err(ConfigError::ZeroIterations) => (),
            _ => panic!("zero iterations should be refused for a binary policy"),
        }
    }

    struct Flat;

    impl ColorPolicy for Flat {
        fn color_of(&self, _result: IterationResult, _max: u32) -> Color {
            Color::rgb(9, 9, 9)
        }

        fn requires_escape(&self) -> bool {
            false
        }
    }

    #[test]
    fn zero_iterations_allowed_when_policy_does_not_care() {
        let r = Renderer::new(Viewport::default(), Resolution::new(3, 3), 0, Flat).unwrap();
        let buffer = r.render().unwrap();
        assert!(buffer.as_slice().iter().all(|&c| c == Color::rgb(9, 9, 9)));
    }

    #[test]
    fn three_by_three_scene() {
        let buffer = renderer(3, 3).render().unwrap();
        // Centre is (-0.5, 0), inside the main cardioid.
        assert_eq!(buffer.get(1, 1), Some(Color::BLACK));
        // Top left is (-2, 1.5), well outside.
        assert_eq!(buffer.get(0, 0), Some(Color::WHITE));
        assert_eq!(buffer.get(2, 2), Some(Color::WHITE));
    }

    #[test]
    fn threads_do_not_change_the_picture() {
        let reference = renderer(31, 17).render_single();
        for &threads in &[1, 2, 3, 4, 16, 64] {
            let buffer = renderer(31, 17).with_threads(threads).render().unwrap();
            assert_eq!(buffer, reference, "{} threads", threads);
        }
    }

    #[test]
    fn image_is_symmetric_about_the_real_axis() {
        // 25 rows over a span of 3 puts every row on a multiple of 1/8.
        let buffer = renderer(40, 25).render().unwrap();
        for y in 0..25 {
            assert_eq!(buffer.row(y), buffer.row(24 - y));
        }
    }

    #[test]
    fn exhausted_budget_refuses_the_buffer() {
        let r = renderer(64, 64).with_time_budget(Duration::from_secs(0));
        match r.render() {
            Err(RenderError::DeadlineExceeded(d)) => assert_eq!(d, Duration::from_secs(0)),
            other => panic!("expected a deadline error, got {:?}", other.map(|b| b.width())),
        }
    }

    #[test]
    fn generous_budget_completes() {
        let r = renderer(16, 16).with_time_budget(Duration::from_secs(600));
        assert!(r.render().is_ok());
    }

    #[test]
    fn unrepresentable_budget_means_no_deadline() {
        let r = renderer(8, 8).with_time_budget(Duration::from_secs(u64::max_value()));
        assert!(r.render().is_ok());
        let budget = ::config::parse_seconds("1e30").unwrap();
        assert!(renderer(8, 8).with_time_budget(budget).render().is_ok());
    }

    #[test]
    fn oversized_image_is_refused_before_rendering() {
        let dir = ::tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.bmp");
        // Far too many pixels to allocate; only the layout check keeps
        // this test fast.
        let r = Renderer::new(
            Viewport::default(),
            Resolution::new(70_000, 70_000),
            50,
            Binary,
        )
        .unwrap();
        match r.render_to_file(&BitmapWriter::new(), &path) {
            Err(RenderError::Config(ConfigError::ImageTooLarge { width, height })) => {
                assert_eq!((width, height), (70_000, 70_000))
            }
            other => panic!("expected an oversized image, got {:?}", other),
        }
        assert!(!path.exists());
    }

    #[test]
    fn closures_drive_the_colors() {
        let policy = from_fn(|r: IterationResult, max: u32| {
            if r.escaped {
                Color::rgb(0, 0, (255 * r.count / max) as u8)
            } else {
                Color::rgb(255, 0, 0)
            }
        });
        let r = Renderer::new(Viewport::default(), Resolution::new(3, 3), 50, policy).unwrap();
        let buffer = r.render_single();
        assert_eq!(buffer.get(1, 1), Some(Color::rgb(255, 0, 0)));
        assert_eq!(buffer.get(0, 0), Some(Color::rgb(0, 0, 0)));
    }
}
