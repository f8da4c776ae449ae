//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader` + `ImageDecoder` (header only) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate decoders |
//! | Resize | `DynamicImage::resize_exact` with the requested [`Kernel`](super::Kernel) filter |
//! | Encode → TIFF | `image::codecs::tiff::TiffEncoder` (lossless) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//!
//! Encoding happens into memory. The destination is only touched once the
//! encoded bytes exist, so a failed decode or encode never leaves a file behind.

use super::backend::{BackendError, ImageBackend, Metadata, OutputDimensions};
use super::calculations::resize_dimensions;
use super::params::{ConvertParams, EncodeOptions, OutputFormat};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tiff::TiffEncoder;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Largest resize target, in pixels, the backend will allocate.
pub const MAX_OUTPUT_PIXELS: u64 = 1 << 28;

/// Backend using the `image` crate ecosystem.
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

/// Open a reader with the format sniffed from the file's magic bytes.
fn open_reader(path: &Path) -> Result<ImageReader<std::io::BufReader<std::fs::File>>, BackendError> {
    if path.is_dir() {
        return Err(BackendError::source_read(path, "is a directory"));
    }
    ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| BackendError::source_read(path, e))
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    open_reader(path)?
        .decode()
        .map_err(|e| BackendError::source_read(path, e))
}

/// Normalize pixel layouts the TIFF encoder does not accept.
fn tiff_compatible(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_)
        | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageRgb16(_)
        | DynamicImage::ImageRgba16(_) => img,
        other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}

/// Encode an image into an in-memory buffer.
fn encode(img: DynamicImage, encode: &EncodeOptions) -> Result<Vec<u8>, BackendError> {
    let mut buf = Cursor::new(Vec::new());
    let result = match encode.format {
        OutputFormat::Tiff => tiff_compatible(img).write_with_encoder(TiffEncoder::new(&mut buf)),
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel and no quality 0
            let quality = encode.quality.value().clamp(1, 100) as u8;
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))
        }
        OutputFormat::Png => img.write_with_encoder(PngEncoder::new(&mut buf)),
    };
    result.map_err(|e| BackendError::Encode(format!("{} encode failed: {}", encode.format, e)))?;
    Ok(buf.into_inner())
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Metadata, BackendError> {
        let reader = open_reader(path)?;
        let format = reader
            .format()
            .map(|f| format!("{f:?}").to_lowercase())
            .ok_or_else(|| BackendError::source_read(path, "unrecognized image format"))?;
        let decoder = reader
            .into_decoder()
            .map_err(|e| BackendError::source_read(path, e))?;
        let (width, height) = decoder.dimensions();
        let color_type = format!("{:?}", decoder.color_type()).to_lowercase();

        debug!(path = %path.display(), width, height, %format, "identified source");
        Ok(Metadata {
            width,
            height,
            format,
            color_type,
        })
    }

    fn convert(&self, params: &ConvertParams) -> Result<OutputDimensions, BackendError> {
        let img = load_image(&params.source)?;

        let img = match params.resize {
            Some(resize) => {
                let (width, height) =
                    resize_dimensions((img.width(), img.height()), resize.width, resize.height);
                if width == 0 || height == 0 {
                    return Err(BackendError::Encode(format!(
                        "target size {width}x{height} is empty"
                    )));
                }
                if u64::from(width) * u64::from(height) > MAX_OUTPUT_PIXELS {
                    return Err(BackendError::Encode(format!(
                        "target size {width}x{height} exceeds {MAX_OUTPUT_PIXELS} pixels"
                    )));
                }
                debug!(width, height, kernel = %resize.kernel, "resizing");
                img.resize_exact(width, height, resize.kernel.filter())
            }
            None => img,
        };
        let dims = OutputDimensions {
            width: img.width(),
            height: img.height(),
        };

        let bytes = encode(img, &params.encode)?;
        std::fs::write(&params.output, &bytes).map_err(|source| BackendError::Write {
            path: params.output.clone(),
            source,
        })?;
        debug!(path = %params.output.display(), bytes = bytes.len(), "wrote output");
        Ok(dims)
    }
}
