//! Random placement of overlays inside permissible page regions.

use crate::error::{Axis, GeometryError, ensure_positive};
use crate::rect::{PlacementRect, Print};
use kurbo::Size;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A permissible region, as fractional bounds of the page in print space.
///
/// `x` is measured from the left edge and `y` from the bottom edge of the
/// page. An overlay placed in the region lies entirely inside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// `[min, max]` as fractions of the page width.
    pub x: [f64; 2],
    /// `[min, max]` as fractions of the page height.
    pub y: [f64; 2],
}

impl Region {
    /// Create a new region, validating its bounds.
    pub fn new(x: [f64; 2], y: [f64; 2]) -> Result<Self, GeometryError> {
        let region = Self { x, y };
        region.validate()?;
        Ok(region)
    }

    /// Check that both ranges are ordered and lie in `[0, 1]`.
    pub fn validate(&self) -> Result<(), GeometryError> {
        for (axis, [min, max]) in [(Axis::X, self.x), (Axis::Y, self.y)] {
            let in_unit = (0.0..=1.0).contains(&min) && (0.0..=1.0).contains(&max);
            if !in_unit || min > max {
                return Err(GeometryError::InvalidParameter(format!(
                    "region {axis} range must be an ordered subrange of [0, 1], got [{min}, {max}]"
                )));
            }
        }

        Ok(())
    }

    /// The region in points, intersected with the page inset by `margin`.
    ///
    /// Returns `[x0, y0, x1, y1]`. The result may be empty (`x0 >= x1`) if the
    /// margin swallows the region.
    pub fn resolve(&self, page: Size, margin: f64) -> Result<[f64; 4], GeometryError> {
        self.validate()?;
        let width = ensure_positive("page width", page.width)?;
        let height = ensure_positive("page height", page.height)?;
        if !(margin.is_finite() && margin >= 0.0) {
            return Err(GeometryError::InvalidParameter(format!(
                "margin must be a non-negative finite number, got {margin}"
            )));
        }

        Ok([
            (self.x[0] * width).max(margin),
            (self.y[0] * height).max(margin),
            (self.x[1] * width).min(width - margin),
            (self.y[1] * height).min(height - margin),
        ])
    }
}

/// The range of valid minimum coordinates for an overlay of `extent` inside
/// `[min, max]`.
fn origin_range(
    axis: Axis,
    min: f64,
    max: f64,
    extent: f64,
) -> Result<(f64, f64), GeometryError> {
    let upper = max - extent;
    if upper < min {
        return Err(GeometryError::LayoutOverflow {
            axis,
            overlay: extent,
            available: (max - min).max(0.0),
        });
    }

    Ok((min, upper))
}

/// Sample a uniformly random placement for an overlay of size `overlay`.
///
/// The returned rectangle is in print space and lies entirely inside the
/// region resolved by [`Region::resolve`]. Its minimum corner is drawn
/// uniformly from `[x0, x1 - width] × [y0, y1 - height]`.
///
/// If the overlay is larger than the region on either axis this fails with
/// [`GeometryError::LayoutOverflow`]; the placement is never clamped.
pub fn sample_placement<R: Rng + ?Sized>(
    rng: &mut R,
    page: Size,
    overlay: Size,
    region: &Region,
    margin: f64,
) -> Result<PlacementRect<Print>, GeometryError> {
    ensure_positive("overlay width", overlay.width)?;
    ensure_positive("overlay height", overlay.height)?;

    let [x0, y0, x1, y1] = region.resolve(page, margin)?;
    let (x_min, x_max) = origin_range(Axis::X, x0, x1, overlay.width)?;
    let (y_min, y_max) = origin_range(Axis::Y, y0, y1, overlay.height)?;

    let x = rng.gen_range(x_min..=x_max);
    let y = rng.gen_range(y_min..=y_max);

    PlacementRect::from_origin_size(x, y, overlay)
}
