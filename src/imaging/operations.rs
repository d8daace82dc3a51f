//! High-level image operations.
//!
//! These functions combine calculations with backend execution: they read
//! dimensions, compute target sizes, call the backend, and measure what the
//! re-encode did to the file size.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::scaled_dimensions;
use super::params::Quality;
use std::path::Path;
use std::time::Instant;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Largest output, in pixels, a rescale may produce: an RGBA8 buffer within
/// the `image` crate's default 512 MiB allocation limit.
pub const MAX_OUTPUT_PIXELS: u64 = 512 * 1024 * 1024 / 4;

/// Get image dimensions by decoding the file.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<Dimensions> {
    let image = backend.load(path)?;
    Ok(backend.dimensions(&image))
}

/// Rescale an already-decoded image by `factor` and encode it to `dest`.
///
/// `image` must have been loaded from `source`. Returns the savings:
/// `len(source) - len(dest)` in bytes, measured on disk after encoding.
/// Positive means the new file is smaller. The source length is read before
/// anything is written, so `dest` may be the source itself.
///
/// Fails with [`BackendError::InvalidScale`] unless `factor` is finite and
/// positive, and with [`BackendError::TooLarge`] when the output would exceed
/// [`MAX_OUTPUT_PIXELS`]. Nothing is written in either case.
pub fn rescale_to_file<B: ImageBackend>(
    backend: &B,
    image: &B::Image,
    source: &Path,
    dest: &Path,
    factor: f64,
    quality: Quality,
) -> Result<i64> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(BackendError::InvalidScale(factor));
    }
    let old = backend.dimensions(image);
    let new = scaled_dimensions(old, factor);
    // An allocation failure aborts the process, so refuse before the backend tries.
    if new.width as u64 * new.height as u64 > MAX_OUTPUT_PIXELS {
        return Err(BackendError::TooLarge {
            width: new.width,
            height: new.height,
        });
    }

    let original_len = std::fs::metadata(source)?.len();
    tracing::debug!(
        "rescaling {} by {:.2} ({}x{} -> {}x{})",
        source.display(),
        factor,
        old.width,
        old.height,
        new.width,
        new.height
    );

    let started = Instant::now();
    let scaled = backend.rescale(image, new.width, new.height);
    backend.save(&scaled, dest, quality)?;
    let new_len = std::fs::metadata(dest)?.len();
    tracing::debug!("encoded {} in {:?}", dest.display(), started.elapsed());

    Ok(original_len as i64 - new_len as i64)
}

/// Resize one file by `factor`, writing the result to `dest`.
///
/// Standalone entry point for single images: there is no size gate here,
/// `dest` is always overwritten (and may be `source`).
pub fn resize_one<B: ImageBackend>(
    backend: &B,
    source: &Path,
    dest: &Path,
    factor: f64,
    quality: Quality,
) -> Result<i64> {
    let image = backend.load(source)?;
    rescale_to_file(backend, &image, source, dest, factor, quality)
}
