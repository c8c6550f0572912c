//! Rasterizing composed pages with hayro.

use crate::error::RenderError;
use docsynth_geometry::pixels_per_point;
use hayro::RenderSettings;
use hayro::hayro_interpret::InterpreterSettings;
use hayro::hayro_syntax::Pdf;
use image::RgbaImage;
use std::sync::Arc;
use vello_cpu::color::{AlphaColor, Srgb};
use vello_cpu::color::palette::css::{TRANSPARENT, WHITE};

/// The color under the page content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Background {
    /// Opaque white, like paper.
    #[default]
    White,
    /// Fully transparent, for rendering standalone assets.
    Transparent,
}

impl Background {
    fn color(self) -> AlphaColor<Srgb> {
        match self {
            Self::White => WHITE,
            Self::Transparent => TRANSPARENT,
        }
    }
}

/// Render the first page of a PDF file at `dpi` pixels per inch.
///
/// The returned image has straight (not premultiplied) alpha.
pub fn rasterize(pdf: Vec<u8>, dpi: f64, background: Background) -> Result<RgbaImage, RenderError> {
    let scale = pixels_per_point(dpi)? as f32;
    let pdf = Pdf::new(Arc::new(pdf)).map_err(|e| RenderError::Rasterize(format!("{e:?}")))?;
    let page = pdf
        .pages()
        .get(0)
        .ok_or_else(|| RenderError::Rasterize("the document has no pages".to_string()))?;

    let render_settings = RenderSettings {
        x_scale: scale,
        y_scale: scale,
        bg_color: background.color(),
        ..Default::default()
    };
    let pixmap = hayro::render(page, &InterpreterSettings::default(), &render_settings);
    let (width, height) = (u32::from(pixmap.width()), u32::from(pixmap.height()));
    log::debug!("rasterized page at {dpi} dpi into {width}x{height} pixels");

    let data: Vec<u8> = bytemuck::cast_vec(pixmap.take_unpremultiplied());
    RgbaImage::from_raw(width, height, data).ok_or_else(|| {
        RenderError::Rasterize(format!("pixel buffer does not match {width}x{height}"))
    })
}
