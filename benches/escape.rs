// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#[macro_use]
extern crate criterion;
extern crate mandelbrot;
extern crate num;

use criterion::{black_box, Criterion};
use mandelbrot::{escape_iterations, Binary, BitmapWriter, Renderer, Resolution, Viewport};
use num::Complex;

fn escape_benchmark(c: &mut Criterion) {
    c.bench_function("escape interior 1000", |b| {
        b.iter(|| escape_iterations(black_box(Complex::new(-0.5, 0.0)), 1000))
    });
    c.bench_function("escape boundary 1000", |b| {
        b.iter(|| escape_iterations(black_box(Complex::new(-0.7435, 0.1314)), 1000))
    });
}

fn render_benchmark(c: &mut Criterion) {
    let renderer = Renderer::new(Viewport::default(), Resolution::new(160, 120), 256, Binary)
        .expect("valid benchmark configuration");
    c.bench_function("render 160x120", move |b| b.iter(|| renderer.render()));

    let buffer = Renderer::new(Viewport::default(), Resolution::new(160, 120), 64, Binary)
        .expect("valid benchmark configuration")
        .render_single();
    let writer = BitmapWriter::new();
    c.bench_function("encode 160x120", move |b| b.iter(|| writer.encode(&buffer)));
}

criterion_group!(benches, escape_benchmark, render_benchmark);
criterion_main!(benches);
