//! Axis-aligned rectangles tagged with their coordinate space.

use crate::error::GeometryError;
use kurbo::Size;
use std::fmt;
use std::marker::PhantomData;

/// A coordinate space a [`PlacementRect`] can live in.
pub trait Space: Copy + fmt::Debug + PartialEq {
    /// A short human readable name of the space.
    const NAME: &'static str;
}

/// PDF user space: points, origin bottom-left, y-axis up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Print;

/// Raster image space: pixels, origin top-left, y-axis down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Raster;

impl Space for Print {
    const NAME: &'static str = "print";
}

impl Space for Raster {
    const NAME: &'static str = "raster";
}

/// A non-empty rectangle `[x0, y0, x1, y1]` in the space `S`.
///
/// Construction enforces `x0 < x1` and `y0 < y1`.
#[derive(Clone, Copy, PartialEq)]
pub struct PlacementRect<S: Space> {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    space: PhantomData<S>,
}

impl<S: Space> PlacementRect<S> {
    /// Create a rectangle from its bounds.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Result<Self, GeometryError> {
        let finite = [x0, y0, x1, y1].iter().all(|v| v.is_finite());
        if !finite || x0 >= x1 || y0 >= y1 {
            return Err(GeometryError::InvalidParameter(format!(
                "degenerate {} rect [{x0}, {y0}, {x1}, {y1}]",
                S::NAME
            )));
        }

        Ok(Self {
            x0,
            y0,
            x1,
            y1,
            space: PhantomData,
        })
    }

    /// Create a rectangle from its minimum corner and its size.
    pub fn from_origin_size(x: f64, y: f64, size: Size) -> Result<Self, GeometryError> {
        Self::new(x, y, x + size.width, y + size.height)
    }

    /// The minimum x bound.
    pub fn x0(&self) -> f64 {
        self.x0
    }

    /// The minimum y bound.
    pub fn y0(&self) -> f64 {
        self.y0
    }

    /// The maximum x bound.
    pub fn x1(&self) -> f64 {
        self.x1
    }

    /// The maximum y bound.
    pub fn y1(&self) -> f64 {
        self.y1
    }

    /// The bounds as `[x0, y0, x1, y1]`.
    pub fn coords(&self) -> [f64; 4] {
        [self.x0, self.y0, self.x1, self.y1]
    }

    /// The width of the rectangle.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// The height of the rectangle.
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// The size of the rectangle.
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// The area of the rectangle.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Whether `other` lies entirely inside this rectangle.
    ///
    /// `eps` widens this rectangle on every edge to absorb rounding.
    pub fn contains_rect(&self, other: &Self, eps: f64) -> bool {
        other.x0 >= self.x0 - eps
            && other.y0 >= self.y0 - eps
            && other.x1 <= self.x1 + eps
            && other.y1 <= self.y1 + eps
    }

    /// Whether the two rectangles share a region of positive area.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }
}

impl PlacementRect<Print> {
    /// The rectangle covering a whole page of the given size.
    pub fn page(page: Size) -> Result<Self, GeometryError> {
        Self::new(0.0, 0.0, page.width, page.height)
    }
}

impl<S: Space> fmt::Debug for PlacementRect<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PlacementRect<{}>[{}, {}, {}, {}]",
            S::NAME,
            self.x0,
            self.y0,
            self.x1,
            self.y1
        )
    }
}
