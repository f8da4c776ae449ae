//! Fluent handle over a source image.
//!
//! A handle accumulates the pending pipeline in place and runs it once, in
//! [`ImageHandle::to_file`]:
//!
//! ```no_run
//! use tiffsize::imaging::{ImageHandle, Kernel, Quality, ResizeOptions, RustBackend};
//!
//! let backend = RustBackend::new();
//! let mut image = ImageHandle::open(&backend, "input.jpg");
//! let info = image.metadata()?;
//! image
//!     .resize(ResizeOptions::width(info.width / 2).kernel(Kernel::Lanczos3))
//!     .tiff(Quality::new(100))
//!     .to_file("output.tiff")?;
//! # Ok::<(), tiffsize::imaging::BackendError>(())
//! ```
//!
//! Opening never touches the filesystem; a missing or unreadable source
//! surfaces from `metadata` or `to_file`.

use super::backend::{BackendError, ImageBackend, Metadata, OutputDimensions};
use super::params::{ConvertParams, EncodeOptions, OutputFormat, Quality, ResizeOptions};
use std::path::{Path, PathBuf};

pub struct ImageHandle<'a, B: ImageBackend> {
    backend: &'a B,
    source: PathBuf,
    resize: Option<ResizeOptions>,
    encode: Option<EncodeOptions>,
}

impl<'a, B: ImageBackend> ImageHandle<'a, B> {
    pub fn open(backend: &'a B, source: impl AsRef<Path>) -> Self {
        Self {
            backend,
            source: source.as_ref().to_path_buf(),
            resize: None,
            encode: None,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Read the source's header metadata.
    pub fn metadata(&self) -> Result<Metadata, BackendError> {
        self.backend.identify(&self.source)
    }

    /// Add (or replace) the resize step.
    pub fn resize(&mut self, options: ResizeOptions) -> &mut Self {
        self.resize = Some(options);
        self
    }

    /// Encode as TIFF.
    pub fn tiff(&mut self, quality: Quality) -> &mut Self {
        self.encode_as(OutputFormat::Tiff, quality)
    }

    /// Encode as JPEG.
    pub fn jpeg(&mut self, quality: Quality) -> &mut Self {
        self.encode_as(OutputFormat::Jpeg, quality)
    }

    /// Encode as PNG.
    pub fn png(&mut self) -> &mut Self {
        self.encode_as(OutputFormat::Png, Quality::MAX)
    }

    pub fn encode_as(&mut self, format: OutputFormat, quality: Quality) -> &mut Self {
        self.encode = Some(EncodeOptions { format, quality });
        self
    }

    /// The conversion `to_file` would execute for `output`.
    ///
    /// Without an explicit encode step the format comes from the output
    /// extension.
    pub fn plan(&self, output: impl AsRef<Path>) -> Result<ConvertParams, BackendError> {
        let output = output.as_ref();
        let encode = match self.encode {
            Some(encode) => encode,
            None => EncodeOptions {
                format: OutputFormat::from_path(output).ok_or_else(|| {
                    BackendError::Encode(format!(
                        "cannot infer output format from {}",
                        output.display()
                    ))
                })?,
                quality: Quality::default(),
            },
        };
        Ok(ConvertParams {
            source: self.source.clone(),
            output: output.to_path_buf(),
            resize: self.resize,
            encode,
        })
    }

    /// Run the pipeline and write the result. Blocks until the file is written.
    pub fn to_file(&self, output: impl AsRef<Path>) -> Result<OutputDimensions, BackendError> {
        let params = self.plan(output)?;
        self.backend.convert(&params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp, metadata};
    use crate::imaging::params::Kernel;

    #[test]
    fn open_does_not_touch_backend() {
        let backend = MockBackend::new();
        let handle = ImageHandle::open(&backend, "/missing.jpg");
        assert_eq!(handle.source(), Path::new("/missing.jpg"));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn metadata_goes_through_identify() {
        let backend = MockBackend::with_metadata(vec![metadata(800, 600)]);
        let handle = ImageHandle::open(&backend, "/input.jpg");

        let meta = handle.metadata().unwrap();
        assert_eq!(meta.dimensions(), (800, 600));
        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Identify("/input.jpg".to_string())]
        );
    }

    #[test]
    fn chained_configuration_reaches_backend() {
        let backend = MockBackend::with_metadata(vec![metadata(800, 600)]);
        let mut handle = ImageHandle::open(&backend, "/input.jpg");

        let dims = handle
            .resize(ResizeOptions::width(400).kernel(Kernel::Lanczos3))
            .tiff(Quality::new(100))
            .to_file("/output.tiff")
            .unwrap();
        assert_eq!(dims, OutputDimensions { width: 400, height: 300 });

        let ops = backend.get_operations();
        assert_eq!(
            ops,
            vec![RecordedOp::Convert {
                source: "/input.jpg".to_string(),
                output: "/output.tiff".to_string(),
                width: Some(400),
                height: None,
                kernel: Some(Kernel::Lanczos3),
                format: OutputFormat::Tiff,
                quality: 100,
            }]
        );
    }

    #[test]
    fn later_configuration_replaces_earlier() {
        let backend = MockBackend::new();
        let mut handle = ImageHandle::open(&backend, "/input.jpg");
        handle
            .resize(ResizeOptions::width(100))
            .jpeg(Quality::new(80))
            .resize(ResizeOptions::width(50))
            .tiff(Quality::new(90));

        let params = handle.plan("/output.bin").unwrap();
        assert_eq!(params.resize.map(|r| r.width), Some(50));
        assert_eq!(params.encode.format, OutputFormat::Tiff);
        assert_eq!(params.encode.quality.value(), 90);
    }

    #[test]
    fn plan_infers_format_from_extension() {
        let backend = MockBackend::new();
        let handle = ImageHandle::open(&backend, "/input.jpg");

        let params = handle.plan("/output.png").unwrap();
        assert_eq!(params.encode.format, OutputFormat::Png);
        assert_eq!(params.resize, None);
    }

    #[test]
    fn plan_without_format_or_known_extension_errors() {
        let backend = MockBackend::new();
        let handle = ImageHandle::open(&backend, "/input.jpg");

        let result = handle.to_file("/output.webp");
        assert!(matches!(result, Err(BackendError::Encode(_))));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn png_encode_uses_max_quality() {
        let backend = MockBackend::new();
        let mut handle = ImageHandle::open(&backend, "/input.jpg");
        handle.png();

        let params = handle.plan("/output.tiff").unwrap();
        assert_eq!(params.encode.format, OutputFormat::Png);
        assert_eq!(params.encode.quality, Quality::MAX);
    }
}
