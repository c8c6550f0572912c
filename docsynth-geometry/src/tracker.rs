//! Tracking overlay bounding boxes from print space into raster space.

use crate::error::GeometryError;
use crate::rect::{PlacementRect, Print, Raster, Space};
use crate::units::pixels_per_point;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The role an overlay plays on a page.
///
/// The declaration order is the drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayRole {
    /// A handwritten signature.
    Signature,
    /// An ink stamp.
    Stamp,
}

impl OverlayRole {
    /// All roles, in drawing order.
    pub const ALL: [Self; 2] = [Self::Signature, Self::Stamp];

    /// The lowercase name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signature => "signature",
            Self::Stamp => "stamp",
        }
    }
}

impl fmt::Display for OverlayRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bounding box recorded for an overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedBox<S: Space> {
    /// The role of the overlay.
    pub role: OverlayRole,
    /// The placement of the overlay.
    pub rect: PlacementRect<S>,
}

impl TrackedBox<Raster> {
    /// Integer pixel bounds `[x0, y0, x1, y1]`, with exclusive maximum.
    ///
    /// The minimum bounds are floored and the maximum bounds are ceiled, so
    /// the box always covers every pixel the overlay touches.
    pub fn pixel_coords(&self) -> [u32; 4] {
        let [x0, y0, x1, y1] = self.rect.coords();
        [
            x0.floor() as u32,
            y0.floor() as u32,
            x1.ceil() as u32,
            y1.ceil() as u32,
        ]
    }
}

/// Map a print space rectangle onto the pixel grid of a rasterized page.
///
/// `page_height` is the height of the page in points and `raster` the
/// dimensions of the rendered image. The vertical axis is flipped, because
/// print space grows upwards while raster space grows downwards. The result
/// is clamped to the raster bounds to absorb rounding of the image size.
pub fn print_to_raster(
    rect: &PlacementRect<Print>,
    page_height: f64,
    dpi: f64,
    raster: (u32, u32),
) -> Result<PlacementRect<Raster>, GeometryError> {
    let k = pixels_per_point(dpi)?;
    let (width, height) = (f64::from(raster.0), f64::from(raster.1));

    let x0 = (rect.x0() * k).clamp(0.0, width);
    let x1 = (rect.x1() * k).clamp(0.0, width);
    let y0 = ((page_height - rect.y1()) * k).clamp(0.0, height);
    let y1 = ((page_height - rect.y0()) * k).clamp(0.0, height);

    PlacementRect::new(x0, y0, x1, y1)
}

/// Records the placement of every overlay drawn onto one page.
#[derive(Debug, Clone)]
pub struct BoxTracker {
    page: PlacementRect<Print>,
    records: Vec<TrackedBox<Print>>,
}

impl BoxTracker {
    /// Create a tracker for a page of the given size in points.
    pub fn new(page: Size) -> Result<Self, GeometryError> {
        Ok(Self {
            page: PlacementRect::page(page)?,
            records: Vec::new(),
        })
    }

    /// The size of the tracked page in points.
    pub fn page_size(&self) -> Size {
        self.page.size()
    }

    /// Record the placement of an overlay.
    ///
    /// Overlapping placements are accepted. Placements reaching outside of
    /// the page are rejected.
    pub fn record(
        &mut self,
        role: OverlayRole,
        rect: PlacementRect<Print>,
    ) -> Result<(), GeometryError> {
        if !self.page.contains_rect(&rect, 1e-6) {
            return Err(GeometryError::InvalidParameter(format!(
                "{role} placement {rect:?} lies outside of the page"
            )));
        }

        if let Some(other) = self.records.iter().find(|r| r.rect.overlaps(&rect)) {
            log::debug!("{role} placement overlaps the {} placement", other.role);
        }

        self.records.push(TrackedBox { role, rect });
        Ok(())
    }

    /// All recorded placements in drawing order.
    pub fn records(&self) -> &[TrackedBox<Print>] {
        &self.records
    }

    /// Map all recorded placements into the pixel space of a raster image
    /// rendered at `dpi` with the given dimensions.
    pub fn to_raster(
        &self,
        dpi: f64,
        raster: (u32, u32),
    ) -> Result<Vec<TrackedBox<Raster>>, GeometryError> {
        let page_height = self.page.height();
        self.records
            .iter()
            .map(|record| {
                Ok(TrackedBox {
                    role: record.role,
                    rect: print_to_raster(&record.rect, page_height, dpi, raster)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flips_vertical_axis() {
        // One inch square in the bottom-left corner of a letter page.
        let rect = PlacementRect::<Print>::new(0.0, 0.0, 72.0, 72.0).unwrap();
        let raster = print_to_raster(&rect, 792.0, 100.0, (850, 1100)).unwrap();
        assert_eq!(raster.coords(), [0.0, 1000.0, 100.0, 1100.0]);
    }

    #[test]
    fn clamps_to_raster_bounds() {
        let rect = PlacementRect::<Print>::new(0.0, 0.0, 595.0, 842.0).unwrap();
        // 595pt at 300 dpi is 2479.17px; the renderer produced 2479px.
        let raster = print_to_raster(&rect, 842.0, 300.0, (2479, 3508)).unwrap();
        assert_eq!(raster.coords(), [0.0, 0.0, 2479.0, 3508.0]);
    }

    #[test]
    fn pixel_coords_cover_partial_pixels() {
        let tracked = TrackedBox {
            role: OverlayRole::Stamp,
            rect: PlacementRect::<Raster>::new(10.2, 20.7, 30.1, 40.0).unwrap(),
        };
        assert_eq!(tracked.pixel_coords(), [10, 20, 31, 40]);
    }

    #[test]
    fn tracker_keeps_drawing_order_and_overlaps() {
        let mut tracker = BoxTracker::new(Size::new(595.0, 842.0)).unwrap();
        let a = PlacementRect::new(100.0, 100.0, 200.0, 150.0).unwrap();
        let b = PlacementRect::new(150.0, 120.0, 250.0, 220.0).unwrap();
        tracker.record(OverlayRole::Signature, a).unwrap();
        tracker.record(OverlayRole::Stamp, b).unwrap();

        let roles: Vec<_> = tracker.records().iter().map(|r| r.role).collect();
        assert_eq!(roles, OverlayRole::ALL);

        let raster = tracker.to_raster(72.0, (595, 842)).unwrap();
        assert_eq!(raster[0].rect.coords(), [100.0, 692.0, 200.0, 742.0]);
        assert_eq!(raster[1].rect.coords(), [150.0, 622.0, 250.0, 722.0]);
    }

    #[test]
    fn tracker_rejects_off_page_rects() {
        let mut tracker = BoxTracker::new(Size::new(595.0, 842.0)).unwrap();
        let off = PlacementRect::new(500.0, 800.0, 650.0, 900.0).unwrap();
        assert!(tracker.record(OverlayRole::Signature, off).is_err());
        assert!(tracker.records().is_empty());
    }

    #[test]
    fn role_names() {
        assert_eq!(OverlayRole::Signature.to_string(), "signature");
        assert_eq!(OverlayRole::Stamp.as_str(), "stamp");
    }
}
