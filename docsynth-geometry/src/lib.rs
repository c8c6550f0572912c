/*!
Geometry for synthetic document pages.

This crate holds the numeric core of `docsynth`: converting asset pixel
dimensions into print points, scaling overlays into page-relative size
budgets, sampling random placements inside permissible regions and mapping
the recorded placement rectangles into the pixel space of the rasterized
page.

Two coordinate spaces are used throughout:

- [`Print`] space is PDF user space. Units are points (1/72 inch), the origin
  is the bottom-left corner of the page and the y-axis points up.
- [`Raster`] space is the pixel grid of the rendered image. The origin is the
  top-left pixel corner and the y-axis points down.

Rectangles carry their space in their type, see [`PlacementRect`].
*/

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod placement;
mod rect;
mod scale;
mod tracker;
mod units;

pub use error::*;
pub use kurbo::Size;
pub use placement::*;
pub use rect::*;
pub use scale::*;
pub use tracker::*;
pub use units::*;
