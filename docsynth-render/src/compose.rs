//! Composing single pages out of body text and overlays.
//!
//! A [`PageComposer`] moves through its states in a fixed order: text is
//! drawn exactly once, then the overlays, and finally the page is serialized.
//! Skipping or repeating a step does not type check.

use crate::asset::Asset;
use crate::error::RenderError;
use crate::font::{BodyFont, Glyph, UsedGlyphs, advance_of};
use crate::pdf::{FONT_NAME, PageParts};
use crate::raster::{Background, rasterize};
use docsynth_geometry::{BoxTracker, GeometryError, OverlayRole, PlacementRect, Print, Size};
use image::RgbaImage;
use kurbo::Affine;
use pdf_writer::{Content, Name, Str};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// The A4 page size in points.
pub const A4: Size = Size::new(595.2756, 841.8898);

/// The geometry of a page and its body text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    /// The page size in points.
    pub size: Size,
    /// The margin on all four edges in points.
    pub margin: f64,
    /// The body text size in points.
    pub font_size: f64,
    /// The distance between consecutive baselines in points.
    pub leading: f64,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            size: A4,
            margin: 40.0,
            font_size: 12.0,
            leading: 14.4,
        }
    }
}

impl PageLayout {
    /// Check that the layout leaves room for text.
    pub fn validate(&self) -> Result<(), RenderError> {
        if !(self.size.width > 0.0 && self.size.height > 0.0) || !self.size.is_finite() {
            return Err(invalid(format!("invalid page size {:?}", self.size)));
        }
        if !(self.margin >= 0.0)
            || 2.0 * self.margin >= self.size.width
            || 2.0 * self.margin >= self.size.height
        {
            return Err(invalid(format!("margin {} does not fit the page", self.margin)));
        }
        if !(self.font_size > 0.0 && self.font_size.is_finite()) {
            return Err(invalid(format!("invalid font size {}", self.font_size)));
        }
        if !(self.leading > 0.0 && self.leading.is_finite()) {
            return Err(invalid(format!("invalid leading {}", self.leading)));
        }

        Ok(())
    }

    /// The width available to a line of text.
    pub fn text_width(&self) -> f64 {
        self.size.width - 2.0 * self.margin
    }
}

/// An asset placed on a page.
#[derive(Debug, Clone)]
pub struct OverlayInstance {
    role: OverlayRole,
    asset: Arc<Asset>,
    scale: f64,
    rect: PlacementRect<Print>,
}

impl OverlayInstance {
    /// Bind an asset to a placement.
    ///
    /// The scale is the factor the asset was shrunk by to fit its footprint
    /// and has to lie in `(0, 1]`.
    pub fn new(
        role: OverlayRole,
        asset: Arc<Asset>,
        scale: f64,
        rect: PlacementRect<Print>,
    ) -> Result<Self, RenderError> {
        if !(scale > 0.0 && scale <= 1.0) {
            return Err(GeometryError::InvalidParameter(format!(
                "overlay scale {scale} is outside of (0, 1]"
            ))
            .into());
        }

        Ok(Self {
            role,
            asset,
            scale,
            rect,
        })
    }

    /// The role of the overlay.
    pub fn role(&self) -> OverlayRole {
        self.role
    }

    /// The placed asset.
    pub fn asset(&self) -> &Arc<Asset> {
        &self.asset
    }

    /// The scale factor applied to the asset.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// The placement in print space.
    pub fn rect(&self) -> PlacementRect<Print> {
        self.rect
    }
}

/// Nothing has been drawn yet.
#[derive(Debug)]
pub struct Init;

/// The body text has been drawn.
#[derive(Debug)]
pub struct TextDrawn;

/// The overlays have been drawn.
#[derive(Debug)]
pub struct OverlaysDrawn;

/// Builds one page.
pub struct PageComposer<S> {
    layout: PageLayout,
    font: BodyFont,
    content: Content,
    used: UsedGlyphs,
    overlays: Vec<OverlayInstance>,
    tracker: BoxTracker,
    lines: TextStats,
    _state: PhantomData<S>,
}

/// How much of the body text made it onto the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStats {
    /// Lines drawn.
    pub drawn: usize,
    /// Lines that fell below the bottom margin.
    pub dropped: usize,
}

impl<S> fmt::Debug for PageComposer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageComposer")
            .field("layout", &self.layout)
            .field("font", &self.font)
            .field("overlays", &self.overlays.len())
            .field("lines", &self.lines)
            .finish_non_exhaustive()
    }
}

impl<S> PageComposer<S> {
    /// The layout of the page.
    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    fn advance<T>(self) -> PageComposer<T> {
        PageComposer {
            layout: self.layout,
            font: self.font,
            content: self.content,
            used: self.used,
            overlays: self.overlays,
            tracker: self.tracker,
            lines: self.lines,
            _state: PhantomData,
        }
    }
}

impl PageComposer<Init> {
    /// Start a new page.
    pub fn new(layout: PageLayout, font: BodyFont) -> Result<Self, RenderError> {
        layout.validate()?;

        Ok(Self {
            tracker: BoxTracker::new(layout.size)?,
            layout,
            font,
            content: Content::new(),
            used: UsedGlyphs::default(),
            overlays: Vec::new(),
            lines: TextStats::default(),
            _state: PhantomData,
        })
    }

    /// Draw the body text from the top margin downwards.
    ///
    /// Lines are wrapped at word boundaries. Blank lines advance the baseline
    /// without drawing anything. Lines whose baseline would fall below the
    /// bottom margin are dropped.
    pub fn draw_text(mut self, text: &str) -> Result<PageComposer<TextDrawn>, RenderError> {
        let PageLayout {
            size,
            margin,
            font_size,
            leading,
        } = self.layout;

        let mut lines = Vec::new();
        for paragraph in text.lines() {
            let glyphs = self.font.glyphs(paragraph)?;
            lines.extend(wrap_paragraph(&glyphs, font_size, self.layout.text_width()));
        }

        let mut baseline = size.height - margin - font_size;
        self.content.set_fill_gray(0.0);
        self.content.begin_text();
        self.content.set_font(FONT_NAME, font_size as f32);

        for line in &lines {
            if baseline < margin {
                self.lines.dropped += 1;
                continue;
            }

            if !line.is_empty() {
                let bytes = self.font.encode(line, &mut self.used);
                self.content
                    .set_text_matrix([1.0, 0.0, 0.0, 1.0, margin as f32, baseline as f32]);
                self.content.show(Str(&bytes));
            }

            self.lines.drawn += 1;
            baseline -= leading;
        }

        self.content.end_text();

        if self.lines.dropped > 0 {
            log::debug!(
                "dropped {} of {} lines below the bottom margin",
                self.lines.dropped,
                lines.len()
            );
        }

        Ok(self.advance())
    }
}

impl PageComposer<TextDrawn> {
    /// Draw the overlays on top of the text, signatures before stamps.
    ///
    /// Every placement is recorded for bounding box tracking. Overlapping
    /// overlays are allowed.
    pub fn draw_overlays(
        mut self,
        mut overlays: Vec<OverlayInstance>,
    ) -> Result<PageComposer<OverlaysDrawn>, RenderError> {
        overlays.sort_by_key(|o| o.role);

        for (i, overlay) in overlays.iter().enumerate() {
            self.tracker.record(overlay.role, overlay.rect)?;

            // Image space is the unit square, stretch it over the placement.
            let [x0, y0, ..] = overlay.rect.coords();
            let transform = Affine::translate((x0, y0))
                * Affine::scale_non_uniform(overlay.rect.width(), overlay.rect.height());
            let name = image_name(i);

            self.content.save_state();
            self.content
                .transform(transform.as_coeffs().map(|c| c as f32));
            self.content.x_object(Name(name.as_bytes()));
            self.content.restore_state();

            log::debug!(
                "drew {} {} at {:?} with scale {:.4}",
                overlay.role,
                overlay.asset.name(),
                overlay.rect,
                overlay.scale
            );
        }

        self.overlays = overlays;
        Ok(self.advance())
    }
}

impl PageComposer<OverlaysDrawn> {
    /// Serialize the page.
    pub fn finish(self) -> Result<FinalizedPage, RenderError> {
        let names: Vec<String> = (0..self.overlays.len()).map(image_name).collect();
        let images = names
            .iter()
            .cloned()
            .zip(self.overlays.iter().map(|o| o.asset.image()))
            .collect();

        let pdf = PageParts {
            size: self.layout.size,
            content: self.content.finish().into_vec(),
            font: Some((&self.font, &self.used)),
            images,
        }
        .write()?;

        Ok(FinalizedPage {
            pdf,
            tracker: self.tracker,
            text: self.lines,
        })
    }
}

/// A serialized page together with its overlay placements.
#[derive(Debug, Clone)]
pub struct FinalizedPage {
    pdf: Vec<u8>,
    tracker: BoxTracker,
    text: TextStats,
}

impl FinalizedPage {
    /// The PDF file of the page.
    pub fn pdf(&self) -> &[u8] {
        &self.pdf
    }

    /// The page size in points.
    pub fn size(&self) -> Size {
        self.tracker.page_size()
    }

    /// The overlay placements in print space.
    pub fn tracker(&self) -> &BoxTracker {
        &self.tracker
    }

    /// How many text lines were drawn and dropped.
    pub fn text_stats(&self) -> TextStats {
        self.text
    }

    /// Render the page on a white background at `dpi`.
    pub fn rasterize(&self, dpi: f64) -> Result<RgbaImage, RenderError> {
        rasterize(self.pdf.clone(), dpi, Background::White)
    }
}

fn invalid(msg: String) -> RenderError {
    GeometryError::InvalidParameter(msg).into()
}

fn image_name(index: usize) -> String {
    format!("Im{}", index + 1)
}

/// Greedily break a paragraph into lines no wider than `max_width`.
///
/// Words wider than a line are broken between glyphs. An empty paragraph
/// yields one empty line.
fn wrap_paragraph(glyphs: &[Glyph], size: f64, max_width: f64) -> Vec<Vec<Glyph>> {
    let space = glyphs.iter().copied().find(|g| g.ch == ' ');
    let space_width = space.map_or(0.0, |s| advance_of(&[s], size));

    let mut lines = Vec::new();
    let mut line: Vec<Glyph> = Vec::new();

    for mut word in glyphs.split(|g| g.ch == ' ').filter(|w| !w.is_empty()) {
        if !line.is_empty() {
            if advance_of(&line, size) + space_width + advance_of(word, size) <= max_width {
                line.extend(space);
                line.extend_from_slice(word);
                continue;
            }
            lines.push(std::mem::take(&mut line));
        }

        while advance_of(word, size) > max_width {
            let mut end = 0;
            let mut width = 0.0;
            for glyph in word {
                let advance = advance_of(&[*glyph], size);
                if end > 0 && width + advance > max_width {
                    break;
                }
                width += advance;
                end += 1;
            }

            if end == word.len() {
                break;
            }
            lines.push(word[..end].to_vec());
            word = &word[end..];
        }

        line.extend_from_slice(word);
    }

    lines.push(line);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &[Glyph]) -> String {
        line.iter().map(|g| g.ch).collect()
    }

    fn wrap(s: &str, max_width: f64) -> Vec<String> {
        let glyphs = BodyFont::Helvetica.glyphs(s).unwrap();
        wrap_paragraph(&glyphs, 10.0, max_width)
            .iter()
            .map(|l| text(l))
            .collect()
    }

    #[test]
    fn wraps_at_word_boundaries() {
        // "aaa" is 16.68pt wide at 10pt, a space 2.78pt.
        assert_eq!(wrap("aaa aaa aaa", 40.0), ["aaa aaa", "aaa"]);
        assert_eq!(wrap("aaa aaa aaa", 100.0), ["aaa aaa aaa"]);
    }

    #[test]
    fn breaks_overlong_words() {
        // Each "a" is 5.56pt wide at 10pt.
        assert_eq!(wrap("aaaaa", 12.0), ["aa", "aa", "a"]);
        assert_eq!(wrap("W", 1.0), ["W"]);
    }

    #[test]
    fn empty_paragraph_is_a_blank_line() {
        assert_eq!(wrap("", 100.0), [""]);
        assert_eq!(wrap("   ", 100.0), [""]);
    }

    #[test]
    fn rejects_invalid_layouts() {
        let mut layout = PageLayout::default();
        assert!(layout.validate().is_ok());
        layout.margin = 400.0;
        assert!(layout.validate().is_err());
        layout = PageLayout {
            font_size: 0.0,
            ..PageLayout::default()
        };
        assert!(PageComposer::new(layout, BodyFont::Helvetica).is_err());
    }

    #[test]
    fn rejects_invalid_scale() {
        let asset = Arc::new(Asset::new("a", RgbaImage::new(2, 2)).unwrap());
        let rect = PlacementRect::new(0.0, 0.0, 1.0, 1.0).unwrap();
        assert!(OverlayInstance::new(OverlayRole::Stamp, asset.clone(), 0.0, rect).is_err());
        assert!(OverlayInstance::new(OverlayRole::Stamp, asset.clone(), 1.5, rect).is_err());
        assert!(OverlayInstance::new(OverlayRole::Stamp, asset, 1.0, rect).is_ok());
    }

    #[test]
    fn drops_lines_below_the_margin() {
        let layout = PageLayout {
            size: Size::new(200.0, 100.0),
            margin: 10.0,
            font_size: 10.0,
            leading: 20.0,
        };
        // Baselines at 80, 60, 40, 20, then 0 is below the margin.
        let page = PageComposer::new(layout, BodyFont::Helvetica)
            .unwrap()
            .draw_text("1\n2\n\n4\n5\n6")
            .unwrap()
            .draw_overlays(Vec::new())
            .unwrap()
            .finish()
            .unwrap();

        assert_eq!(
            page.text_stats(),
            TextStats {
                drawn: 4,
                dropped: 2
            }
        );
    }

    #[test]
    fn overlays_are_drawn_in_role_order() {
        let asset = Arc::new(Asset::new("a", RgbaImage::new(4, 4)).unwrap());
        let stamp = OverlayInstance::new(
            OverlayRole::Stamp,
            asset.clone(),
            1.0,
            PlacementRect::new(100.0, 100.0, 150.0, 150.0).unwrap(),
        )
        .unwrap();
        let signature = OverlayInstance::new(
            OverlayRole::Signature,
            asset,
            0.5,
            PlacementRect::new(120.0, 120.0, 170.0, 140.0).unwrap(),
        )
        .unwrap();

        let page = PageComposer::new(PageLayout::default(), BodyFont::Helvetica)
            .unwrap()
            .draw_text("Hello")
            .unwrap()
            .draw_overlays(vec![stamp, signature])
            .unwrap()
            .finish()
            .unwrap();

        let roles: Vec<_> = page.tracker().records().iter().map(|r| r.role).collect();
        assert_eq!(roles, OverlayRole::ALL);
        assert_eq!(page.size(), A4);

        let pdf = String::from_utf8_lossy(page.pdf());
        assert!(pdf.contains("/Im1") && pdf.contains("/Im2"));
        assert!(pdf.contains("/Helvetica"));
    }
}
