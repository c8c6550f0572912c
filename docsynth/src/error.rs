use docsynth_geometry::{GeometryError, OverlayRole};
use docsynth_render::RenderError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors of the document generator.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration or conversion input is outside of its domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// No asset of a pool fit into its placement region.
    #[error("layout overflow: {0}")]
    LayoutOverflow(#[source] GeometryError),
    /// A directory holds no usable assets for a role.
    #[error("no {role} assets found in {}", dir.display())]
    AssetPoolEmpty {
        /// The role of the missing assets.
        role: OverlayRole,
        /// The directory that was searched.
        dir: PathBuf,
    },
    /// The text service or the augmentation failed.
    #[error("external service failure: {0}")]
    ExternalService(String),
    /// The configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    /// Composing or rasterizing a page failed.
    #[error(transparent)]
    Render(RenderError),
    /// Encoding an image failed.
    #[error(transparent)]
    Image(#[from] image::ImageError),
    /// Serializing metadata failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// A filesystem operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// A short name of the error kind, used to tally failures.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidParameter(_) => "invalid-parameter",
            Self::LayoutOverflow(_) => "layout-overflow",
            Self::AssetPoolEmpty { .. } => "asset-pool-empty",
            Self::ExternalService(_) => "external-service",
            Self::Config(_) => "config",
            Self::Render(_) => "render",
            Self::Image(_) => "image",
            Self::Json(_) => "json",
            Self::Io(_) => "io",
        }
    }
}

impl From<GeometryError> for Error {
    fn from(err: GeometryError) -> Self {
        match err {
            GeometryError::InvalidParameter(msg) => Self::InvalidParameter(msg),
            overflow @ GeometryError::LayoutOverflow { .. } => Self::LayoutOverflow(overflow),
        }
    }
}

impl From<RenderError> for Error {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Geometry(err) => err.into(),
            RenderError::Augment(msg) => Self::ExternalService(format!("augmentation: {msg}")),
            other => Self::Render(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsynth_geometry::Axis;

    #[test]
    fn geometry_errors_keep_their_kind() {
        let overflow = GeometryError::LayoutOverflow {
            axis: Axis::Y,
            overlay: 90.0,
            available: 40.0,
        };
        assert_eq!(Error::from(overflow).kind(), "layout-overflow");
        assert_eq!(
            Error::from(RenderError::Geometry(GeometryError::InvalidParameter(
                "dpi".to_string()
            )))
            .kind(),
            "invalid-parameter"
        );
        assert_eq!(
            Error::from(RenderError::Augment("boom".to_string())).kind(),
            "external-service"
        );
    }

    #[test]
    fn empty_pool_names_the_directory() {
        let err = Error::AssetPoolEmpty {
            role: OverlayRole::Stamp,
            dir: PathBuf::from("assets/stamps"),
        };
        assert_eq!(err.to_string(), "no stamp assets found in assets/stamps");
    }
}
