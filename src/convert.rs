//! The conversion run: open → metadata → resize → encode → write.
//!
//! [`run`] performs the five steps in order against any [`ImageBackend`].
//! The resize width is derived from the source metadata
//! (`floor(width * scale)`, half width by default); the height follows the
//! source aspect ratio. The write is awaited, and every failure is returned
//! to the caller.

use crate::config::{ConfigError, ToolConfig};
use crate::imaging::{
    BackendError, ImageBackend, ImageHandle, Kernel, Metadata, OutputFormat, Quality,
    ResizeOptions, scaled_width,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{path} is {width}px wide; scaling by {scale} leaves no pixels")]
    EmptyTarget {
        path: PathBuf,
        width: u32,
        scale: f64,
    },
}

/// One conversion to perform.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub scale: f64,
    pub kernel: Kernel,
    pub format: OutputFormat,
    pub quality: Quality,
}

impl ConvertJob {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ..Self::from_config(&ToolConfig::default())
        }
    }

    pub fn from_config(config: &ToolConfig) -> Self {
        Self {
            input: PathBuf::from(&config.input),
            output: PathBuf::from(&config.output),
            scale: config.resize.scale,
            kernel: config.resize.kernel,
            format: config.encode.format,
            quality: Quality::new(config.encode.quality),
        }
    }
}

impl Default for ConvertJob {
    fn default() -> Self {
        Self::from_config(&ToolConfig::default())
    }
}

/// What a finished conversion produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvertReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub source: Metadata,
    pub width: u32,
    pub height: u32,
    pub kernel: String,
    pub format: String,
    pub quality: u32,
}

/// Convert `job.input` into `job.output`.
pub fn run(backend: &impl ImageBackend, job: &ConvertJob) -> Result<ConvertReport, ConvertError> {
    let mut image = ImageHandle::open(backend, &job.input);

    let source = image.metadata()?;
    debug!(
        width = source.width,
        height = source.height,
        format = %source.format,
        "read source metadata"
    );

    let width = target_width(&job.input, &source, job.scale)?;
    let written = image
        .resize(ResizeOptions::width(width).kernel(job.kernel))
        .encode_as(job.format, job.quality)
        .to_file(&job.output)?;

    info!(
        input = %job.input.display(),
        output = %job.output.display(),
        width = written.width,
        height = written.height,
        "converted"
    );

    Ok(ConvertReport {
        input: job.input.clone(),
        output: job.output.clone(),
        source,
        width: written.width,
        height: written.height,
        kernel: job.kernel.to_string(),
        format: job.format.to_string(),
        quality: job.quality.value(),
    })
}

fn target_width(path: &Path, source: &Metadata, scale: f64) -> Result<u32, ConvertError> {
    match scaled_width(source.width, scale) {
        0 => Err(ConvertError::EmptyTarget {
            path: path.to_path_buf(),
            width: source.width,
            scale,
        }),
        w => Ok(w),
    }
}
