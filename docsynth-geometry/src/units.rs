//! Conversions between pixels and print points.
//!
//! A point is 1/72 inch. Pixel values only have a physical size together
//! with a resolution in dots per inch, so every conversion takes one.

use crate::error::{GeometryError, ensure_positive};

/// The number of print points in one inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Convert a length in pixels at `source_dpi` into print points.
pub fn pixels_to_points(px: f64, source_dpi: f64) -> Result<f64, GeometryError> {
    let dpi = ensure_positive("source dpi", source_dpi)?;
    Ok(px * POINTS_PER_INCH / dpi)
}

/// Convert a length in print points into pixels at `target_dpi`.
pub fn points_to_pixels(points: f64, target_dpi: f64) -> Result<f64, GeometryError> {
    let dpi = ensure_positive("target dpi", target_dpi)?;
    Ok(points * dpi / POINTS_PER_INCH)
}

/// The number of raster pixels per print point at `dpi`.
pub fn pixels_per_point(dpi: f64) -> Result<f64, GeometryError> {
    points_to_pixels(1.0, dpi)
}
