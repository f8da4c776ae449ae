//! Image processing on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_decoder` (header only) |
//! | **Resize** | `resize_exact` with a named [`Kernel`] (Lanczos3 by default) |
//! | **Encode** | TIFF / JPEG / PNG encoders from `image::codecs` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Handle**: [`ImageHandle`], the fluent open → configure → write API

pub mod backend;
mod calculations;
pub mod handle;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend, Metadata, OutputDimensions};
pub use calculations::{aspect_height, resize_dimensions, scaled_width};
pub use handle::ImageHandle;
pub use params::{ConvertParams, EncodeOptions, Kernel, OutputFormat, Quality, ResizeOptions};
pub use rust_backend::RustBackend;
