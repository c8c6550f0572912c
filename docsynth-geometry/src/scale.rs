//! Fitting overlays into page-relative size budgets.

use crate::error::{GeometryError, ensure_positive};
use crate::units::pixels_to_points;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// The maximum size of an overlay, as fractions of the page width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    /// Fraction of the page width, in `(0, 1]`.
    pub width: f64,
    /// Fraction of the page height, in `(0, 1]`.
    pub height: f64,
}

impl Footprint {
    /// Create a new footprint, validating both fractions.
    pub fn new(width: f64, height: f64) -> Result<Self, GeometryError> {
        let footprint = Self { width, height };
        footprint.validate()?;
        Ok(footprint)
    }

    /// Check that both fractions lie in `(0, 1]`.
    pub fn validate(&self) -> Result<(), GeometryError> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(GeometryError::InvalidParameter(format!(
                    "footprint {name} must be in (0, 1], got {value}"
                )));
            }
        }

        Ok(())
    }

    /// The footprint in points for a page of the given size.
    pub fn resolve(&self, page: Size) -> Result<Size, GeometryError> {
        self.validate()?;
        let width = ensure_positive("page width", page.width)?;
        let height = ensure_positive("page height", page.height)?;
        Ok(Size::new(width * self.width, height * self.height))
    }
}

/// An overlay scaled to fit its footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledOverlay {
    /// The uniform scale factor, in `(0, 1]`.
    pub scale: f64,
    /// The size of the overlay in points before scaling.
    pub native: Size,
    /// The size of the overlay in points after scaling.
    pub size: Size,
}

/// Compute the uniform scale that fits an asset into a footprint.
///
/// The asset is `asset_px` pixels large at `source_dpi`. The result never
/// upscales the asset beyond its native size, and the scaled asset never
/// exceeds the footprint on either axis. Since the aspect ratio is kept, at
/// most one axis ends up touching its bound.
pub fn fit_scale(
    asset_px: (u32, u32),
    source_dpi: f64,
    page: Size,
    footprint: Footprint,
) -> Result<ScaledOverlay, GeometryError> {
    let (px_width, px_height) = asset_px;
    if px_width == 0 || px_height == 0 {
        return Err(GeometryError::InvalidParameter(format!(
            "asset must have a positive size, got {px_width}x{px_height}"
        )));
    }

    let native = Size::new(
        pixels_to_points(f64::from(px_width), source_dpi)?,
        pixels_to_points(f64::from(px_height), source_dpi)?,
    );
    let budget = footprint.resolve(page)?;

    let scale = 1.0_f64
        .min(budget.width / native.width)
        .min(budget.height / native.height);

    log::debug!(
        "scaled {px_width}x{px_height}px asset ({:.2}x{:.2}pt) by {scale:.4} into {:.2}x{:.2}pt",
        native.width,
        native.height,
        budget.width,
        budget.height
    );

    Ok(ScaledOverlay {
        scale,
        native,
        size: Size::new(native.width * scale, native.height * scale),
    })
}
