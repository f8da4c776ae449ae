//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Scale a source width, flooring the result.
///
/// # Examples
/// ```
/// # use tiffsize::imaging::scaled_width;
/// assert_eq!(scaled_width(800, 0.5), 400);
/// assert_eq!(scaled_width(801, 0.5), 400);
/// assert_eq!(scaled_width(1, 0.5), 0);
/// ```
pub fn scaled_width(width: u32, scale: f64) -> u32 {
    (width as f64 * scale).floor() as u32
}

/// Height that preserves the source aspect ratio at `target_width`.
///
/// Rounded to the nearest pixel, never below 1.
///
/// # Examples
/// ```
/// # use tiffsize::imaging::aspect_height;
/// // 800x600 halved → 400x300
/// assert_eq!(aspect_height((800, 600), 400), 300);
///
/// // Very wide strips keep at least one row
/// assert_eq!(aspect_height((4000, 1), 10), 1);
/// ```
pub fn aspect_height(source: (u32, u32), target_width: u32) -> u32 {
    let (src_w, src_h) = source;
    if src_w == 0 {
        return src_h.max(1);
    }
    let h = (src_h as f64 * target_width as f64 / src_w as f64).round() as u32;
    h.max(1)
}

/// Final output dimensions for a resize request.
///
/// An explicit height wins; otherwise the aspect ratio is preserved.
pub fn resize_dimensions(source: (u32, u32), width: u32, height: Option<u32>) -> (u32, u32) {
    match height {
        Some(h) => (width, h),
        None => (width, aspect_height(source, width)),
    }
}
