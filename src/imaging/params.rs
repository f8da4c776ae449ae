//! Parameter types for image operations.
//!
//! These describe *what* to do. The [`backend`](super::backend) decides *how*.
//! Keeping them plain data lets the handle and the conversion run be tested
//! against a recording mock without touching pixels.
//!
//! ## Types
//!
//! - [`Quality`]: Encoding quality (0–100, default 100). Clamped on construction.
//! - [`Kernel`]: Named resampling filter, parsed from its lowercase name.
//! - [`OutputFormat`]: Container written by the encode step.
//! - [`ResizeOptions`] / [`EncodeOptions`]: The two configurable pipeline steps.
//! - [`ConvertParams`]: Everything a backend needs to execute one conversion.

use image::ImageFormat;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Quality setting for encoding (0-100).
///
/// Lossless containers (TIFF, PNG) record it but ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quality(pub u32);

impl Quality {
    pub const MAX: Quality = Quality(100);

    pub fn new(value: u32) -> Self {
        Self(value.min(100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::MAX
    }
}

/// Resampling kernel used by the resize step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    Nearest,
    Linear,
    Cubic,
    Gaussian,
    #[default]
    Lanczos3,
}

impl Kernel {
    pub const ALL: [Kernel; 5] = [
        Kernel::Nearest,
        Kernel::Linear,
        Kernel::Cubic,
        Kernel::Gaussian,
        Kernel::Lanczos3,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Kernel::Nearest => "nearest",
            Kernel::Linear => "linear",
            Kernel::Cubic => "cubic",
            Kernel::Gaussian => "gaussian",
            Kernel::Lanczos3 => "lanczos3",
        }
    }

    /// The `image` crate filter implementing this kernel.
    pub fn filter(self) -> FilterType {
        match self {
            Kernel::Nearest => FilterType::Nearest,
            Kernel::Linear => FilterType::Triangle,
            Kernel::Cubic => FilterType::CatmullRom,
            Kernel::Gaussian => FilterType::Gaussian,
            Kernel::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kernel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kernel::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<&str> = Kernel::ALL.iter().map(|k| k.name()).collect();
                format!("unknown kernel '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

/// Container format written by the encode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    #[serde(alias = "tif")]
    Tiff,
    #[serde(alias = "jpg")]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Tiff => "tiff",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
        }
    }

    /// Infer the output format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match ImageFormat::from_path(path).ok()? {
            ImageFormat::Tiff => Some(OutputFormat::Tiff),
            ImageFormat::Jpeg => Some(OutputFormat::Jpeg),
            ImageFormat::Png => Some(OutputFormat::Png),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "tif" | "tiff" => Ok(OutputFormat::Tiff),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            _ => Err(format!("unknown format '{s}' (expected one of: tiff, jpeg, png)")),
        }
    }
}

/// Resize step. `height: None` keeps the source aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeOptions {
    pub width: u32,
    pub height: Option<u32>,
    pub kernel: Kernel,
}

impl ResizeOptions {
    pub fn width(width: u32) -> Self {
        Self {
            width,
            height: None,
            kernel: Kernel::default(),
        }
    }

    pub fn kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = kernel;
        self
    }
}

/// Encode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeOptions {
    pub format: OutputFormat,
    pub quality: Quality,
}

/// Parameters for a full conversion: decode, optional resize, encode, write.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub resize: Option<ResizeOptions>,
    pub encode: EncodeOptions,
}
