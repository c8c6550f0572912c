use docsynth_geometry::GeometryError;

/// An error that occurred while composing, rasterizing or augmenting a page.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A font could not be loaded or used.
    #[error("font error: {0}")]
    Font(String),
    /// A geometric input was invalid.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    /// An image could not be decoded or encoded.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The page could not be rasterized.
    #[error("rasterization failed: {0}")]
    Rasterize(String),
    /// The augmentation transform failed.
    #[error("augmentation failed: {0}")]
    Augment(String),
}
