// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate env_logger;
extern crate failure;
#[macro_use]
extern crate log;
extern crate mandelbrot;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use failure::Error;
use mandelbrot::bitmap::{BitsPerPixel, RowOrder};
use mandelbrot::config::{
    parse_pair, parse_resolution, parse_seconds, parse_viewport, RenderConfig,
};
use mandelbrot::{render_to_file, PlaneMapper, PolicyKind};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const THREADS: &str = "threads";
const ITERATIONS: &str = "iterations";
const COLOR: &str = "color";
const BPP: &str = "bpp";
const TOP_DOWN: &str = "top-down";
const TIMEOUT: &str = "timeout";
const PREVIEW: &str = "preview";

const MAX_ITERATIONS: u32 = 1_000_000;

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get() * 4;

    App::new("mandelbrot")
        .version("0.1.0")
        .about("Renders the Mandelbrot set to a BMP file")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("800x600")
                .validator(|s| validate_pair::<u32>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image, WIDTHxHEIGHT"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .required(false)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2.0,-1.5")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
                .help("Left lower corner of the viewport, RE,IM"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .required(false)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("1.0,1.5")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
                .help("Right upper corner of the viewport, RE,IM"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads to use in solver [default: one per CPU]"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("256")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        MAX_ITERATIONS,
                        "Could not parse iteration count",
                        &format!("Iteration count must be between 1 and {}", MAX_ITERATIONS),
                    )
                })
                .help("Maximum iterations per point"),
        )
        .arg(
            Arg::with_name(COLOR)
                .required(false)
                .long(COLOR)
                .short("c")
                .takes_value(true)
                .default_value("binary")
                .possible_values(PolicyKind::NAMES)
                .help("How escape counts become colors"),
        )
        .arg(
            Arg::with_name(BPP)
                .required(false)
                .long(BPP)
                .short("b")
                .takes_value(true)
                .default_value("24")
                .possible_values(&["24", "32"])
                .help("Bits per pixel in the bitmap"),
        )
        .arg(
            Arg::with_name(TOP_DOWN)
                .long(TOP_DOWN)
                .help("Store rows top to bottom (negative height) instead of bottom to top"),
        )
        .arg(
            Arg::with_name(TIMEOUT)
                .required(false)
                .long(TIMEOUT)
                .takes_value(true)
                .help("Give up, writing nothing, if rendering takes longer than this many seconds"),
        )
        .arg(
            Arg::with_name(PREVIEW)
                .required(false)
                .long(PREVIEW)
                .short("p")
                .takes_value(true)
                .validator(|s| validate_pair::<u32>(&s, 'x', "Could not parse preview size"))
                .help("Also print a COLSxROWS character preview to standard output"),
        )
        .get_matches()
}

// clap has already validated every value it was given a validator for,
// but the library re-checks so that errors surface the same way.
fn build_config(matches: &ArgMatches) -> Result<RenderConfig, Error> {
    let mut config = RenderConfig::default();

    if let Some(output) = matches.value_of(OUTPUT) {
        config.output = PathBuf::from(output);
    }
    if let Some(size) = matches.value_of(SIZE) {
        config.resolution = parse_resolution(size)?;
    }
    if let (Some(ll), Some(ru)) = (matches.value_of(LEFTLOWER), matches.value_of(RIGHTUPPER)) {
        config.viewport = parse_viewport(ll, ru)?;
    }
    if let Some(threads) = matches.value_of(THREADS) {
        config.threads = usize::from_str(threads)?;
    }
    if let Some(iterations) = matches.value_of(ITERATIONS) {
        config.max_iterations = u32::from_str(iterations)?;
    }
    if let Some(color) = matches.value_of(COLOR) {
        config.policy = PolicyKind::from_str(color).map_err(failure::err_msg)?;
    }
    if let Some(bits) = matches.value_of(BPP) {
        config.bits_per_pixel = u16::from_str(bits)
            .ok()
            .and_then(BitsPerPixel::from_bits)
            .ok_or_else(|| failure::err_msg(format!("unsupported bits per pixel: {}", bits)))?;
    }
    if matches.is_present(TOP_DOWN) {
        config.row_order = RowOrder::TopDown;
    }
    if let Some(secs) = matches.value_of(TIMEOUT) {
        config.time_budget = Some(parse_seconds(secs)?);
    }

    config.validate()?;
    Ok(config)
}

fn print_preview(config: &RenderConfig, size: &str) -> Result<(), Error> {
    let resolution = parse_resolution(size)?;
    let plane = PlaneMapper::new(config.viewport, resolution)?;
    print!(
        "{}",
        mandelbrot::preview::ascii_preview(&plane, config.max_iterations)
    );
    Ok(())
}

fn run() -> Result<(), Error> {
    let matches = args();
    let config = build_config(&matches)?;

    if let Some(size) = matches.value_of(PREVIEW) {
        print_preview(&config, size)?;
    }

    info!(
        "rendering {}x{} ({} iterations, {} policy) to {}",
        config.resolution.width,
        config.resolution.height,
        config.max_iterations,
        config.policy,
        config.output.display()
    );
    let started = Instant::now();
    let bytes = render_to_file(&config)?;
    info!(
        "wrote {} bytes to {} in {:?}",
        bytes,
        config.output.display(),
        started.elapsed()
    );
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("error: {}", e);
        for cause in e.iter_causes() {
            eprintln!("  caused by: {}", cause);
        }
        std::process::exit(1);
    }
}
