use std::fmt;

/// An axis of a page or image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// The horizontal axis.
    X,
    /// The vertical axis.
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
        }
    }
}

/// An error produced by the geometry routines.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// A conversion or configuration input was outside its domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// An overlay does not fit inside its permissible region.
    #[error("overlay of {overlay:.2}pt exceeds the {available:.2}pt region on the {axis} axis")]
    LayoutOverflow {
        /// The axis on which the overlay overflows.
        axis: Axis,
        /// The overlay extent on that axis.
        overlay: f64,
        /// The region extent on that axis.
        available: f64,
    },
}

pub(crate) fn ensure_positive(name: &str, value: f64) -> Result<f64, GeometryError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GeometryError::InvalidParameter(format!(
            "{name} must be a positive finite number, got {value}"
        )))
    }
}
