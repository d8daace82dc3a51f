//! Pure Rust codec backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG) | `image::ImageReader` with content sniffing |
//! | Resample | `image::imageops::resize` with `CatmullRom` (bicubic) |
//! | Alpha | premultiplied `Rgba32F` around the resample |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (lossless) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` at the requested quality |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{OutputFormat, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ColorType, DynamicImage, ImageError, ImageReader, Rgba32FImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Resampling filter used for every rescale.
const FILTER: FilterType = FilterType::CatmullRom;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_error(path: &Path, err: impl std::fmt::Display) -> BackendError {
    BackendError::Decode {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

/// Load and decode an image from disk, trusting its bytes over its suffix.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| match e {
            ImageError::IoError(io) => BackendError::Io(io),
            other => decode_error(path, other),
        })
}

/// Resample with premultiplied alpha when the image has an alpha channel.
///
/// Filtering straight (non-premultiplied) RGBA bleeds the colour of fully
/// transparent pixels into visible edges.
fn resample(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    if !img.color().has_alpha() {
        return img.resize_exact(width, height, FILTER);
    }

    let mut buf = img.to_rgba32f();
    premultiply(&mut buf);
    let mut scaled = imageops::resize(&buf, width, height, FILTER);
    unpremultiply(&mut scaled);

    let scaled = DynamicImage::ImageRgba32F(scaled);
    match img.color() {
        ColorType::La16 | ColorType::Rgba16 => DynamicImage::ImageRgba16(scaled.to_rgba16()),
        _ => DynamicImage::ImageRgba8(scaled.to_rgba8()),
    }
}

fn premultiply(buf: &mut Rgba32FImage) {
    for px in buf.pixels_mut() {
        let a = px[3];
        px[0] *= a;
        px[1] *= a;
        px[2] *= a;
    }
}

fn unpremultiply(buf: &mut Rgba32FImage) {
    for px in buf.pixels_mut() {
        // Bicubic kernels overshoot; keep alpha in range before dividing.
        let a = px[3].clamp(0.0, 1.0);
        px[3] = a;
        if a > 0.0 {
            px[0] = (px[0] / a).clamp(0.0, 1.0);
            px[1] = (px[1] / a).clamp(0.0, 1.0);
            px[2] = (px[2] / a).clamp(0.0, 1.0);
        } else {
            px[0] = 0.0;
            px[1] = 0.0;
            px[2] = 0.0;
        }
    }
}

fn encode_error(err: ImageError) -> BackendError {
    match err {
        ImageError::IoError(io) => BackendError::Io(io),
        other => BackendError::Encode(other.to_string()),
    }
}

/// Guard for builds of `image` without the `jpeg` or `png` feature; this
/// crate's manifest enables both, so it only fires under a trimmed feature set.
fn ensure_encoder(format: OutputFormat) -> Result<(), BackendError> {
    if format.image_format().writing_enabled() {
        return Ok(());
    }
    Err(BackendError::EncoderUnavailable(match format {
        OutputFormat::Png => "PNG",
        OutputFormat::Jpeg => "JPEG",
    }))
}

/// Encode `img` to `path` in the format named by its suffix.
///
/// The format check runs before the file is created, so an unsupported
/// suffix never leaves an empty file behind.
fn save_image(img: &DynamicImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
    let format = OutputFormat::from_path(path)?;
    ensure_encoder(format)?;

    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        OutputFormat::Png => img
            .write_with_encoder(PngEncoder::new(&mut writer))
            .map_err(encode_error)?,
        // JPEG has no alpha channel; flatten to RGB first.
        OutputFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8())
            .write_with_encoder(JpegEncoder::new_with_quality(
                &mut writer,
                quality.value() as u8,
            ))
            .map_err(encode_error)?,
    }
    writer.flush()?;
    Ok(())
}

impl ImageBackend for RustBackend {
    type Image = DynamicImage;

    fn load(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        load_image(path)
    }

    fn dimensions(&self, image: &DynamicImage) -> Dimensions {
        Dimensions::new(image.width(), image.height())
    }

    fn rescale(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        resample(image, width, height)
    }

    fn save(&self, image: &DynamicImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
        save_image(image, path, quality)
    }
}
