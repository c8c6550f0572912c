//! Overlay image assets.

use crate::error::RenderError;
use image::RgbaImage;
use std::fmt;
use std::path::Path;

/// A signature or stamp image with an alpha channel.
///
/// Assets are immutable once loaded and are shared between documents.
#[derive(Clone)]
pub struct Asset {
    name: String,
    image: RgbaImage,
}

impl Asset {
    /// Create an asset from decoded pixels.
    pub fn new(name: impl Into<String>, image: RgbaImage) -> Result<Self, RenderError> {
        let name = name.into();
        if image.width() == 0 || image.height() == 0 {
            return Err(RenderError::Image(image::ImageError::Parameter(
                image::error::ParameterError::from_kind(
                    image::error::ParameterErrorKind::DimensionMismatch,
                ),
            )));
        }

        Ok(Self { name, image })
    }

    /// Load an asset from an image file.
    pub fn open(path: &Path) -> Result<Self, RenderError> {
        let image = image::open(path)?.to_rgba8();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(name, image)
    }

    /// The name of the asset, usually its file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pixels of the asset.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// The width and height in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Whether any pixel is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.image.pixels().any(|p| p.0[3] < 255)
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.pixel_size();
        write!(f, "Asset({}, {width}x{height})", self.name)
    }
}
