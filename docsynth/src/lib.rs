/*!
Synthetic document images for training document understanding models.

A batch asks a [`TextService`] for the body text of each document, places a
signature and a stamp from the [`AssetPool`]s at random positions inside
their configured regions, composes and rasterizes the page, applies noise
and writes three artifacts per document: the image, a JSON record with the
text and the overlay bounding boxes in image pixels, and optionally the PDF.

```no_run
use docsynth::{BatchPaths, GeneratorConfig, TextDirectory, run_batch};
use docsynth_render::{BodyFont, Identity};
use std::path::Path;

let report = run_batch(
    GeneratorConfig::default(),
    BatchPaths {
        signatures: Path::new("assets/signatures"),
        stamps: Path::new("assets/stamps"),
        output: Path::new("out"),
    },
    BodyFont::Helvetica,
    TextDirectory::open(Path::new("texts"))?,
    Identity,
    10,
)?;
println!("{} documents", report.generated());
# Ok::<(), docsynth::Error>(())
```
*/

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod config;
mod error;
mod persist;
mod pipeline;
mod prompt;
mod signatures;
mod text;

pub use assets::*;
pub use config::*;
pub use error::*;
pub use persist::*;
pub use pipeline::*;
pub use prompt::*;
pub use signatures::*;
pub use text::*;
