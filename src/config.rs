//! Tool configuration module.
//!
//! Handles loading, validating, and merging `tiffsize.toml`. Stock defaults
//! reproduce the classic run: `input.jpg` halved with Lanczos3 into
//! `output.tiff` at quality 100. A config file overrides any subset of them,
//! and command-line flags override the file.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! input = "input.jpg"       # Source image
//! output = "output.tiff"    # Destination file
//!
//! [resize]
//! scale = 0.5               # Output width = floor(source width * scale), at most 8
//! kernel = "lanczos3"       # nearest | linear | cubic | gaussian | lanczos3
//!
//! [encode]
//! format = "tiff"           # tiff | jpeg | png
//! quality = 100             # 0-100 (ignored by lossless tiff/png)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Kernel, OutputFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up when `--config` is not given.
pub const CONFIG_FILENAME: &str = "tiffsize.toml";

/// Largest accepted `resize.scale`.
pub const MAX_SCALE: f64 = 8.0;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `tiffsize.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Source image path.
    pub input: String,
    /// Destination path.
    pub output: String,
    pub resize: ResizeConfig,
    pub encode: EncodeConfig,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            input: "input.jpg".to_string(),
            output: "output.tiff".to_string(),
            resize: ResizeConfig::default(),
            encode: EncodeConfig::default(),
        }
    }
}

impl ToolConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.encode.quality > 100 {
            return Err(ConfigError::Validation(
                "encode.quality must be 0-100".into(),
            ));
        }
        if !self.resize.scale.is_finite() || self.resize.scale <= 0.0 {
            return Err(ConfigError::Validation(
                "resize.scale must be a positive number".into(),
            ));
        }
        if self.resize.scale > MAX_SCALE {
            return Err(ConfigError::Validation(format!(
                "resize.scale must be at most {MAX_SCALE}"
            )));
        }
        if self.input.is_empty() || self.output.is_empty() {
            return Err(ConfigError::Validation(
                "input and output must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Resize step settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// Fraction of the source width to keep. Height follows the aspect ratio.
    pub scale: f64,
    /// Resampling kernel.
    pub kernel: Kernel,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            scale: 0.5,
            kernel: Kernel::Lanczos3,
        }
    }
}

/// Encode step settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodeConfig {
    pub format: OutputFormat,
    /// Encoding quality (0 = worst, 100 = best).
    pub quality: u32,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Tiff,
            quality: 100,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(ToolConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ToolConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ToolConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the file at `path`, falling back to stock defaults
/// when it does not exist.
pub fn load_config(path: &Path) -> Result<ToolConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `tiffsize.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# tiffsize configuration
# ======================
# All settings are optional. Values shown below are the defaults.
# Command-line flags override anything set here.
# Unknown keys will cause an error.

# Source image (any format the decoder recognizes: jpeg, png, tiff, webp).
input = "input.jpg"

# Destination file. Overwritten if it exists.
output = "output.tiff"

# ---------------------------------------------------------------------------
# Resize
# ---------------------------------------------------------------------------
[resize]
# Output width = floor(source width * scale). Height keeps the aspect ratio.
# Must be above 0 and at most 8.
scale = 0.5

# Resampling kernel: nearest, linear, cubic, gaussian, lanczos3.
kernel = "lanczos3"

# ---------------------------------------------------------------------------
# Encode
# ---------------------------------------------------------------------------
[encode]
# Output container: tiff, jpeg, png.
format = "tiff"

# Quality 0-100. Only jpeg is lossy; tiff and png ignore it.
quality = 100
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_reproduces_classic_run() {
        let config = ToolConfig::default();
        assert_eq!(config.input, "input.jpg");
        assert_eq!(config.output, "output.tiff");
        assert_eq!(config.resize.scale, 0.5);
        assert_eq!(config.resize.kernel, Kernel::Lanczos3);
        assert_eq!(config.encode.format, OutputFormat::Tiff);
        assert_eq!(config.encode.quality, 100);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[resize]
kernel = "cubic"
"#;
        let config: ToolConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.resize.kernel, Kernel::Cubic);
        // Defaults preserved
        assert_eq!(config.resize.scale, 0.5);
        assert_eq!(config.encode.quality, 100);
        assert_eq!(config.input, "input.jpg");
    }

    #[test]
    fn parse_format_aliases() {
        let config: ToolConfig = toml::from_str("[encode]\nformat = \"jpg\"\n").unwrap();
        assert_eq!(config.encode.format, OutputFormat::Jpeg);

        let config: ToolConfig = toml::from_str("[encode]\nformat = \"tif\"\n").unwrap();
        assert_eq!(config.encode.format, OutputFormat::Tiff);
    }

    #[test]
    fn parse_unknown_kernel_is_error() {
        let toml = r#"
[resize]
kernel = "bilinear"
"#;
        let result: Result<ToolConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config, ToolConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"
input = "photos/dawn.jpg"

[encode]
format = "jpeg"
quality = 85
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.input, "photos/dawn.jpg");
        assert_eq!(config.encode.format, OutputFormat::Jpeg);
        assert_eq!(config.encode.quality, 85);
        // Unspecified values should be defaults
        assert_eq!(config.output, "output.tiff");
        assert_eq!(config.resize.kernel, Kernel::Lanczos3);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "this is not valid toml [[[").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"
[encode]
quality = 200
"#,
        )
        .unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"quality = 90"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"quality = 70"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("quality").unwrap().as_integer(), Some(70));
    }

    #[test]
    fn merge_toml_table_merge_preserves_siblings() {
        let base: toml::Value = toml::from_str(
            r#"
[resize]
scale = 0.5
kernel = "lanczos3"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[resize]
kernel = "nearest"
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let resize = merged.get("resize").unwrap();
        assert_eq!(resize.get("kernel").unwrap().as_str(), Some("nearest"));
        assert_eq!(resize.get("scale").unwrap().as_float(), Some(0.5));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[encode]
qualty = 90
"#;
        let result: Result<ToolConfig, _> = toml::from_str(toml_str);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let toml_str = r#"
[rotate]
angle = 90
"#;
        let result: Result<ToolConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_quality_boundary_ok() {
        let mut config = ToolConfig::default();
        config.encode.quality = 100;
        assert!(config.validate().is_ok());

        config.encode.quality = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_quality_too_high() {
        let mut config = ToolConfig::default();
        config.encode.quality = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("quality"));
    }

    #[test]
    fn validate_scale_must_be_positive() {
        let mut config = ToolConfig::default();
        config.resize.scale = 0.0;
        assert!(config.validate().is_err());

        config.resize.scale = -0.5;
        assert!(config.validate().is_err());

        config.resize.scale = f64::NAN;
        assert!(config.validate().is_err());

        config.resize.scale = 2.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_scale_upper_bound() {
        let mut config = ToolConfig::default();
        config.resize.scale = MAX_SCALE;
        assert!(config.validate().is_ok());

        config.resize.scale = MAX_SCALE + 0.5;
        assert!(config.validate().is_err());

        config.resize.scale = 1e9;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at most"));
    }

    #[test]
    fn validate_empty_paths() {
        let mut config = ToolConfig::default();
        config.output = String::new();
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // stock config tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: ToolConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, ToolConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        assert!(content.contains("[resize]"));
        assert!(content.contains("[encode]"));
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value().unwrap();
        assert!(val.is_table());
        assert!(val.get("resize").is_some());
        assert!(val.get("encode").is_some());
        assert_eq!(val.get("input").unwrap().as_str(), Some("input.jpg"));
    }

    #[test]
    fn resolve_config_with_overlay() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[resize]
scale = 0.25
"#,
        )
        .unwrap();
        let config = resolve_config(base, Some(overlay)).unwrap();
        assert_eq!(config.resize.scale, 0.25);
        assert_eq!(config.resize.kernel, Kernel::Lanczos3);
    }
}
