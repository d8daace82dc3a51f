//! Image codec backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four operations the resizer needs:
//! load, dimensions, rescale, and save. The image type is associated, so the
//! production backend can hand around decoded pixel buffers while the test
//! mock gets away with plain [`Dimensions`].
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate's PNG and JPEG codecs.

use std::path::{Path, PathBuf};
use thiserror::Error;

use super::params::Quality;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("Unsupported image format for {0} (expected png, jpg or jpeg)")]
    UnsupportedFormat(PathBuf),
    #[error("No {0} encoder available on this system")]
    EncoderUnavailable(&'static str),
    #[error("Encoding failed: {0}")]
    Encode(String),
    #[error("Invalid scale factor {0}")]
    InvalidScale(f64),
    #[error("Output of {width}x{height} pixels is too large to allocate")]
    TooLarge { width: u32, height: u32 },
}

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Square images count as landscape.
    pub fn is_landscape(self) -> bool {
        self.width >= self.height
    }
}

/// Trait for image codec backends.
///
/// The batch driver and the single-file entry point are generic over this
/// trait, so they can be exercised with a mock that never touches pixels.
pub trait ImageBackend {
    /// In-memory decoded image.
    type Image;

    /// Decode the file at `path`.
    fn load(&self, path: &Path) -> Result<Self::Image, BackendError>;

    fn dimensions(&self, image: &Self::Image) -> Dimensions;

    /// Resample to exactly `width` x `height`.
    fn rescale(&self, image: &Self::Image, width: u32, height: u32) -> Self::Image;

    /// Encode to `path`, choosing the format from its suffix. Overwrites.
    fn save(&self, image: &Self::Image, path: &Path, quality: Quality)
    -> Result<(), BackendError>;
}
