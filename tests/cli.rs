// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate assert_cmd;
extern crate predicates;
extern crate tempfile;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;

fn mandelbrot() -> Command {
    Command::cargo_bin("mandelbrot").unwrap()
}

#[test]
fn writes_a_bitmap() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("set.bmp");
    mandelbrot()
        .args(&["-o", out.to_str().unwrap(), "-s", "16x12", "-i", "50", "-t", "2"])
        .assert()
        .success();

    let bytes = fs::read(&out).unwrap();
    assert_eq!(&bytes[0..2], b"BM");
    // 16 * 3 = 48 bytes per row, already a multiple of four.
    assert_eq!(bytes.len(), 54 + 48 * 12);
}

#[test]
fn honours_depth_and_viewport_flags() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("zoom.bmp");
    mandelbrot()
        .args(&[
            "-o",
            out.to_str().unwrap(),
            "--size=5x4",
            "--leftlower=-0.8,-0.2",
            "--rightupper=-0.7,-0.1",
            "--bpp=32",
            "--color=palette",
            "--top-down",
        ])
        .assert()
        .success();

    let bytes = fs::read(&out).unwrap();
    assert_eq!(bytes.len(), 54 + 5 * 4 * 4);
    assert_eq!(&bytes[22..26], &(-4i32).to_le_bytes());
}

#[test]
fn prints_a_preview() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("preview.bmp");
    mandelbrot()
        .args(&["-o", out.to_str().unwrap(), "-s", "8x8", "-p", "3x3", "-i", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("** \n"));
}

#[test]
fn huge_timeout_is_no_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("patient.bmp");
    mandelbrot()
        .args(&["-o", out.to_str().unwrap(), "-s", "8x8", "--timeout", "1e30"])
        .assert()
        .success();
    assert!(out.exists());
}

#[test]
fn rejects_an_inverted_viewport() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("bad.bmp");
    mandelbrot()
        .args(&[
            "-o",
            out.to_str().unwrap(),
            "--leftlower=1,1",
            "--rightupper=-1,-1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid viewport"));
    assert!(!out.exists());
}

#[test]
fn rejects_a_one_pixel_image() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("thin.bmp");
    mandelbrot()
        .args(&["-o", out.to_str().unwrap(), "-s", "1x10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid resolution"));
}

#[test]
fn rejects_zero_iterations() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("zero.bmp");
    mandelbrot()
        .args(&["-o", out.to_str().unwrap(), "-i", "0"])
        .assert()
        .failure();
    assert!(!out.exists());
}

#[test]
fn reports_unwritable_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("missing").join("out.bmp");
    mandelbrot()
        .args(&["-o", out.to_str().unwrap(), "-s", "4x4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not write"));
}

#[test]
fn requires_an_output() {
    mandelbrot().assert().failure();
}
