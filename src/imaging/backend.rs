//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: identify (header-only metadata) and convert (decode, resize,
//! encode, write).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording `MockBackend` below.

use super::params::ConvertParams;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to read source {path}: {reason}")]
    SourceRead { path: PathBuf, reason: String },
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BackendError {
    pub(crate) fn source_read(path: &Path, reason: impl ToString) -> Self {
        BackendError::SourceRead {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Snapshot of a source image's properties, read without decoding pixels.
///
/// `format` comes from content sniffing, not the file extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub color_type: String,
}

impl Metadata {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Dimensions of the file a conversion actually wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutputDimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// Implementations must not leave a file at `params.output` when the
/// conversion fails before the final write.
pub trait ImageBackend {
    /// Read metadata from the file header.
    fn identify(&self, path: &Path) -> Result<Metadata, BackendError>;

    /// Execute a full conversion and persist the result.
    fn convert(&self, params: &ConvertParams) -> Result<OutputDimensions, BackendError>;
}
