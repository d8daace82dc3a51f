//! Image processing: decode, resize policy, rescale, encode.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Load** | `image::ImageReader` (JPEG, PNG) |
//! | **Qualify / scale factor** | pure functions in `calculations` |
//! | **Rescale** | Catmull-Rom with premultiplied alpha |
//! | **Save** | PNG (lossless) or JPEG, chosen by file suffix |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for the resize policy (unit testable)
//! - **Parameters**: Output format and quality
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Rescale-and-measure functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{qualifies, scale_factor, scaled_dimensions};
pub use operations::{MAX_OUTPUT_PIXELS, get_dimensions, rescale_to_file, resize_one};
pub use params::{OutputFormat, Quality};
pub use rust_backend::RustBackend;
