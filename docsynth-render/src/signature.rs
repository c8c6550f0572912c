//! Synthetic handwritten-like signatures.

use crate::error::RenderError;
use crate::font::{BodyFont, UsedGlyphs};
use crate::pdf::{FONT_NAME, PageParts};
use crate::raster::{Background, rasterize};
use docsynth_geometry::{GeometryError, Size};
use image::{Rgba, RgbaImage, imageops};
use kurbo::{Affine, Point, Rect};
use pdf_writer::{Content, Str};
use rand::Rng;

/// How a signature is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignatureStyle {
    /// The text size in pixels.
    pub font_size: f64,
    /// The transparent space around the text before rotation, in pixels.
    pub padding: f64,
    /// The counterclockwise rotation in degrees.
    pub rotation: f64,
    /// The transparent border added after rotation, in pixels.
    pub border: u32,
    /// The standard deviation of the final blur. Zero disables blurring.
    pub blur_sigma: f32,
}

impl SignatureStyle {
    /// Pick a random style: 48 to 72 px text, 20 px padding, up to 10° of
    /// rotation either way, a border of up to 10 px and a slight blur.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            font_size: f64::from(rng.gen_range(48u32..=72)),
            padding: 20.0,
            rotation: rng.gen_range(-10.0..=10.0),
            border: rng.gen_range(0..=10),
            blur_sigma: rng.gen_range(0.0..=0.8),
        }
    }
}

/// Render `name` as a black signature on a transparent background.
///
/// The page is rasterized at one pixel per point, so all style dimensions
/// are in pixels.
pub fn render_signature(
    font: &BodyFont,
    name: &str,
    style: &SignatureStyle,
) -> Result<RgbaImage, RenderError> {
    if !(style.font_size > 0.0 && style.font_size.is_finite())
        || !(style.padding >= 0.0 && style.padding.is_finite())
        || !style.rotation.is_finite()
    {
        return Err(
            GeometryError::InvalidParameter(format!("invalid signature style {style:?}")).into(),
        );
    }

    let glyphs = font.glyphs(name)?;
    let width = font.measure(name, style.font_size)?;
    let ascent = f64::from(font.ascent()) * style.font_size / 1000.0;
    let descent = f64::from(font.descent()) * style.font_size / 1000.0;

    let text_box = Rect::new(
        0.0,
        0.0,
        width + 2.0 * style.padding,
        ascent - descent + 2.0 * style.padding,
    );
    let rotation = Affine::rotate_about(style.rotation.to_radians(), text_box.center());
    let bounds = rotation.transform_rect_bbox(text_box);
    let transform = Affine::translate(Point::ORIGIN - bounds.origin()) * rotation;

    let mut used = UsedGlyphs::default();
    let bytes = font.encode(&glyphs, &mut used);

    let mut content = Content::new();
    content.save_state();
    content.transform(transform.as_coeffs().map(|c| c as f32));
    content.set_fill_gray(0.0);
    content.begin_text();
    content.set_font(FONT_NAME, style.font_size as f32);
    content.set_text_matrix([
        1.0,
        0.0,
        0.0,
        1.0,
        style.padding as f32,
        (style.padding - descent) as f32,
    ]);
    content.show(Str(&bytes));
    content.end_text();
    content.restore_state();

    let pdf = PageParts {
        size: Size::new(bounds.width(), bounds.height()),
        content: content.finish().into_vec(),
        font: Some((font, &used)),
        images: Vec::new(),
    }
    .write()?;

    let image = rasterize(pdf, 72.0, Background::Transparent)?;
    let image = add_border(&image, style.border);

    Ok(if style.blur_sigma > 0.0 {
        imageops::blur(&image, style.blur_sigma)
    } else {
        image
    })
}

/// Surround an image with transparent pixels.
fn add_border(image: &RgbaImage, border: u32) -> RgbaImage {
    if border == 0 {
        return image.clone();
    }

    let mut out = RgbaImage::from_pixel(
        image.width() + 2 * border,
        image.height() + 2 * border,
        Rgba([0, 0, 0, 0]),
    );
    imageops::overlay(&mut out, image, i64::from(border), i64::from(border));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn random_styles_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let style = SignatureStyle::random(&mut rng);
            assert!((48.0..=72.0).contains(&style.font_size));
            assert!((-10.0..=10.0).contains(&style.rotation));
            assert!(style.border <= 10);
            assert!((0.0..=0.8).contains(&style.blur_sigma));
        }
    }

    #[test]
    fn border_is_transparent() {
        let image = RgbaImage::from_pixel(3, 2, Rgba([0, 0, 0, 255]));
        let out = add_border(&image, 4);
        assert_eq!(out.dimensions(), (11, 10));
        assert_eq!(out.get_pixel(0, 0).0[3], 0);
        assert_eq!(out.get_pixel(4, 4).0[3], 255);
    }

    #[test]
    fn renders_ink_on_transparent_background() {
        let style = SignatureStyle {
            font_size: 48.0,
            padding: 20.0,
            rotation: 0.0,
            border: 5,
            blur_sigma: 0.0,
        };
        let image = render_signature(&BodyFont::Helvetica, "John Smith", &style).unwrap();

        let text_width = BodyFont::Helvetica.measure("John Smith", 48.0).unwrap();
        let expected = (text_width + 40.0 + 10.0).round() as i64;
        assert!((i64::from(image.width()) - expected).abs() <= 1, "{:?}", image.dimensions());

        assert_eq!(image.get_pixel(0, 0).0[3], 0);
        assert!(image.pixels().any(|p| p.0[3] > 200 && p.0[0] < 60));
    }

    #[test]
    fn rotation_expands_the_canvas() {
        let flat = SignatureStyle {
            font_size: 48.0,
            padding: 20.0,
            rotation: 0.0,
            border: 0,
            blur_sigma: 0.0,
        };
        let tilted = SignatureStyle {
            rotation: 10.0,
            ..flat
        };
        let a = render_signature(&BodyFont::Helvetica, "Anna", &flat).unwrap();
        let b = render_signature(&BodyFont::Helvetica, "Anna", &tilted).unwrap();
        assert!(b.height() > a.height());
    }

    #[test]
    fn rejects_invalid_styles() {
        let style = SignatureStyle {
            font_size: 0.0,
            padding: 20.0,
            rotation: 0.0,
            border: 0,
            blur_sigma: 0.0,
        };
        assert!(render_signature(&BodyFont::Helvetica, "Anna", &style).is_err());
    }
}
