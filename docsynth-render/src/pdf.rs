//! Low-level helpers for writing single-page PDF documents.

use crate::error::RenderError;
use crate::font::{BodyFont, UsedGlyphs};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::RgbaImage;
use kurbo::Size;
use pdf_writer::{Filter, Finish, Name, Pdf, Rect, Ref};
use std::io::Write;

/// The resource name of the body font.
pub(crate) const FONT_NAME: Name<'static> = Name(b"F1");

/// Deflate-compress data.
pub(crate) fn deflate_encode(data: &[u8]) -> Result<Vec<u8>, RenderError> {
    let mut e = ZlibEncoder::new(Vec::new(), Compression::new(6));
    e.write_all(data)?;
    Ok(e.finish()?)
}

/// A reference allocator that tracks the next available object number.
pub(crate) struct RefAllocator {
    next: i32,
}

impl RefAllocator {
    pub(crate) fn new(start: i32) -> Self {
        Self { next: start }
    }

    pub(crate) fn alloc(&mut self) -> Ref {
        let r = Ref::new(self.next);
        self.next += 1;
        r
    }
}

/// Write an RGBA image as an RGB image XObject with a soft mask.
///
/// The soft mask holds the alpha channel, so fully transparent pixels leave
/// the content underneath untouched.
fn write_image(
    pdf: &mut Pdf,
    alloc: &mut RefAllocator,
    image: &RgbaImage,
) -> Result<Ref, RenderError> {
    let (width, height) = (image.width() as i32, image.height() as i32);
    let rgb: Vec<u8> = image
        .pixels()
        .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
        .collect();
    let alpha: Vec<u8> = image.pixels().map(|p| p.0[3]).collect();

    let mask_data = deflate_encode(&alpha)?;
    let rgb_data = deflate_encode(&rgb)?;

    let mask_ref = alloc.alloc();
    let mut mask = pdf.image_xobject(mask_ref, &mask_data);
    mask.filter(Filter::FlateDecode);
    mask.width(width);
    mask.height(height);
    mask.color_space().device_gray();
    mask.bits_per_component(8);
    mask.finish();

    let image_ref = alloc.alloc();
    let mut xobj = pdf.image_xobject(image_ref, &rgb_data);
    xobj.filter(Filter::FlateDecode);
    xobj.width(width);
    xobj.height(height);
    xobj.color_space().device_rgb();
    xobj.bits_per_component(8);
    xobj.s_mask(mask_ref);
    xobj.finish();

    Ok(image_ref)
}

/// The parts of a single-page document.
pub(crate) struct PageParts<'a> {
    /// The media box size in points.
    pub(crate) size: Size,
    /// The uncompressed content stream.
    pub(crate) content: Vec<u8>,
    /// The font referenced as [`FONT_NAME`] and the glyphs used with it.
    pub(crate) font: Option<(&'a BodyFont, &'a UsedGlyphs)>,
    /// Images referenced by resource name.
    pub(crate) images: Vec<(String, &'a RgbaImage)>,
}

impl PageParts<'_> {
    /// Serialize the page into a complete PDF file.
    pub(crate) fn write(self) -> Result<Vec<u8>, RenderError> {
        let mut alloc = RefAllocator::new(1);
        let catalog_ref = alloc.alloc();
        let page_tree_ref = alloc.alloc();
        let page_ref = alloc.alloc();
        let content_ref = alloc.alloc();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_ref).pages(page_tree_ref);
        pdf.pages(page_tree_ref).kids([page_ref]).count(1);

        let font_ref = match self.font {
            Some((font, used)) => Some(font.write(&mut pdf, &mut alloc, used)?),
            None => None,
        };

        let mut image_refs = Vec::with_capacity(self.images.len());
        for (name, image) in &self.images {
            image_refs.push((name.as_str(), write_image(&mut pdf, &mut alloc, image)?));
        }

        let encoded = deflate_encode(&self.content)?;
        pdf.stream(content_ref, &encoded).filter(Filter::FlateDecode);

        let mut page = pdf.page(page_ref);
        page.parent(page_tree_ref);
        page.media_box(Rect::new(
            0.0,
            0.0,
            self.size.width as f32,
            self.size.height as f32,
        ));
        page.contents(content_ref);
        let mut resources = page.resources();
        if let Some(font_ref) = font_ref {
            resources.fonts().pair(FONT_NAME, font_ref);
        }
        if !image_refs.is_empty() {
            let mut x_objects = resources.x_objects();
            for (name, image_ref) in &image_refs {
                x_objects.pair(Name(name.as_bytes()), *image_ref);
            }
        }
        resources.finish();
        page.finish();

        Ok(pdf.finish())
    }
}
