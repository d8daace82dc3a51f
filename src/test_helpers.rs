//! Shared test utilities for the bulk-resize test suite.
//!
//! Synthetic image writers and directory assertions used by the codec,
//! driver, and replace tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let files = write_photo_set(tmp.path(), 3, 400, 300);
//! // ... run a batch ...
//! assert_no_scratch_files(tmp.path());
//! ```

use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

// =========================================================================
// Synthetic images
// =========================================================================

/// A smooth gradient with a little per-pixel texture, so encoders have
/// something to compress and a downscale actually shrinks the file.
fn pattern(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let noise = ((x * 7 + y * 13) % 17) as u8;
        Rgb([
            ((x * 255 / width.max(1)) as u8).wrapping_add(noise),
            ((y * 255 / height.max(1)) as u8).wrapping_add(noise),
            128u8.wrapping_add(noise),
        ])
    })
}

/// Write a `width × height` JPEG to `path`.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    DynamicImage::ImageRgb8(pattern(width, height))
        .save_with_format(path, image::ImageFormat::Jpeg)
        .unwrap();
}

/// Write a `width × height` RGBA PNG to `path`.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    let rgb = pattern(width, height);
    let rgba = RgbaImage::from_fn(width, height, |x, y| {
        let p = rgb.get_pixel(x, y);
        Rgba([p[0], p[1], p[2], 255])
    });
    DynamicImage::ImageRgba8(rgba)
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

/// Write `count` JPEGs named `photo-NN.jpg` and return them in order.
pub fn write_photo_set(dir: &Path, count: usize, width: u32, height: u32) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let path = dir.join(format!("photo-{i:02}.jpg"));
            create_test_jpeg(&path, width, height);
            path
        })
        .collect()
}

// =========================================================================
// Assertions
// =========================================================================

/// Panics if any `.resize-*` scratch file is left in `dir`.
pub fn assert_no_scratch_files(dir: &Path) {
    let leftovers: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(".resize-"))
        .collect();
    assert!(leftovers.is_empty(), "scratch files left behind: {leftovers:?}");
}
