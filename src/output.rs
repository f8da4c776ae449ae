//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Convert
//!
//! ```text
//! input.jpg → output.tiff
//!     Source: 800x600 jpeg (rgb8)
//!     Output: 400x300 tiff, quality 100
//!     Kernel: lanczos3
//! ```
//!
//! ## Identify
//!
//! ```text
//! input.jpg
//!     Size: 800x600
//!     Format: jpeg
//!     Color: rgb8
//! ```

use crate::convert::ConvertReport;
use crate::imaging::Metadata;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn dims(width: u32, height: u32) -> String {
    format!("{}x{}", width, height)
}

pub fn format_convert_output(report: &ConvertReport) -> Vec<String> {
    vec![
        format!("{} → {}", report.input.display(), report.output.display()),
        format!(
            "{}Source: {} {} ({})",
            indent(1),
            dims(report.source.width, report.source.height),
            report.source.format,
            report.source.color_type
        ),
        format!(
            "{}Output: {} {}, quality {}",
            indent(1),
            dims(report.width, report.height),
            report.format,
            report.quality
        ),
        format!("{}Kernel: {}", indent(1), report.kernel),
    ]
}

pub fn print_convert_output(report: &ConvertReport) {
    for line in format_convert_output(report) {
        println!("{}", line);
    }
}

pub fn format_identify_output(path: &Path, metadata: &Metadata) -> Vec<String> {
    vec![
        path.display().to_string(),
        format!("{}Size: {}", indent(1), dims(metadata.width, metadata.height)),
        format!("{}Format: {}", indent(1), metadata.format),
        format!("{}Color: {}", indent(1), metadata.color_type),
    ]
}

pub fn print_identify_output(path: &Path, metadata: &Metadata) {
    for line in format_identify_output(path, metadata) {
        println!("{}", line);
    }
}
