//! Encoding parameters.
//!
//! - [`Quality`]: JPEG quality (1-100, default 75), clamped on construction.
//! - [`OutputFormat`]: the two formats the resizer writes, picked from a file suffix.

use super::backend::BackendError;
use image::ImageFormat;
use std::fmt;
use std::path::Path;

/// Quality setting for lossy JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

/// 75 matches the default most JPEG writers use when no quality is given.
impl Default for Quality {
    fn default() -> Self {
        Self(75)
    }
}

/// Output encodings supported when writing a resized image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    /// Pick the encoder from the file name suffix (case-insensitive).
    ///
    /// Anything other than `png`, `jpg`, or `jpeg` is an
    /// [`UnsupportedFormat`](BackendError::UnsupportedFormat) error.
    pub fn from_path(path: &Path) -> Result<Self, BackendError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            _ => Err(BackendError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
        })
    }
}
