//! # tiffsize
//!
//! Shrinks an image to half its width with a Lanczos3 kernel and writes it
//! as a TIFF at quality 100. Kernel, scale, output format and quality can be
//! changed through `tiffsize.toml` or command-line flags.
//!
//! # Pipeline
//!
//! ```text
//! open(input) → metadata → resize(width = floor(W * 0.5), lanczos3) → tiff(q100) → to_file(output)
//! ```
//!
//! Each step maps onto [`imaging::ImageHandle`]; [`convert::run`] strings
//! them together. Nothing is written until the final step, and the final
//! step returns only once the file is on disk.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`convert`] | The conversion run and its report |
//! | [`imaging`] | Backend trait, `image`-crate backend, fluent handle, dimension math |
//! | [`config`] | `tiffsize.toml` loading, validation, merging over stock defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling and encoding come from the `image` crate, so the
//! binary has no system library dependencies. The TIFF encoder is lossless;
//! the quality setting only affects JPEG output.
//!
//! ## Backend Seam
//!
//! [`imaging::ImageBackend`] separates deciding what to do from doing the
//! pixel work. The conversion logic is tested against a recording mock;
//! the real backend is tested on synthetic images in a temp directory.

pub mod config;
pub mod convert;
pub mod imaging;
pub mod output;
