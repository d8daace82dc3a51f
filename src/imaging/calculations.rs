//! Resize policy: pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::Dimensions;
use crate::types::DimensionSpec;

/// Does an image of `dims` exceed the trigger and therefore need resizing?
///
/// # Examples
/// ```
/// # use bulk_resize::imaging::{Dimensions, qualifies};
/// # use bulk_resize::types::DimensionSpec;
/// let dims = Dimensions::new(1200, 800);
/// assert!(qualifies(dims, DimensionSpec::Width, 1000));
/// assert!(!qualifies(dims, DimensionSpec::Height, 1000));
/// assert!(qualifies(dims, DimensionSpec::Either, 1000));
/// ```
pub fn qualifies(dims: Dimensions, trigger: DimensionSpec, trigger_value: u32) -> bool {
    match trigger {
        DimensionSpec::Width => dims.width > trigger_value,
        DimensionSpec::Height => dims.height > trigger_value,
        DimensionSpec::Either => dims.width > trigger_value || dims.height > trigger_value,
    }
}

/// Uniform factor that brings the chosen axis to `target_value` pixels.
///
/// `Either` means "largest dimension": the width ratio for landscape or
/// square images, the height ratio for portrait ones. Below 1 shrinks, above
/// 1 enlarges. `target_value` must be non-zero.
///
/// # Examples
/// ```
/// # use bulk_resize::imaging::{Dimensions, scale_factor};
/// # use bulk_resize::types::DimensionSpec;
/// let factor = scale_factor(Dimensions::new(4000, 3000), DimensionSpec::Either, 1920);
/// assert!((factor - 0.48).abs() < 1e-9);
/// ```
pub fn scale_factor(dims: Dimensions, target: DimensionSpec, target_value: u32) -> f64 {
    let by_width = target_value as f64 / dims.width as f64;
    let by_height = target_value as f64 / dims.height as f64;
    match target {
        DimensionSpec::Width => by_width,
        DimensionSpec::Height => by_height,
        DimensionSpec::Either if dims.is_landscape() => by_width,
        DimensionSpec::Either => by_height,
    }
}

/// Apply `factor` to each axis independently, rounding to the nearest pixel.
///
/// Never returns a zero-sized axis.
pub fn scaled_dimensions(dims: Dimensions, factor: f64) -> Dimensions {
    let scale = |v: u32| ((v as f64 * factor).round() as u32).max(1);
    Dimensions::new(scale(dims.width), scale(dims.height))
}
