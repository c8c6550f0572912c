/*!
Rendering for synthetic document pages.

A page is composed into a single-page PDF with [`PageComposer`]: body text
first, then the signature and stamp overlays, each embedded with a soft mask
built from its alpha channel. The finished page is rasterized with `hayro`
at a target resolution, after which an [`Augment`] implementation can add
visual noise. [`render_signature`] uses the same machinery to produce
transparent signature images.
*/

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod asset;
mod augment;
mod compose;
mod error;
mod font;
mod pdf;
mod raster;
mod signature;

pub use asset::*;
pub use augment::*;
pub use compose::*;
pub use error::*;
pub use font::*;
pub use raster::*;
pub use signature::*;
