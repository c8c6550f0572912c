//! Fonts for body text.
//!
//! Two kinds of fonts are supported: the standard Helvetica font, which
//! needs no font program but only covers the WinAnsi character set, and
//! TrueType fonts, which are embedded as `Identity-H` encoded CID fonts and
//! can render any script the font has glyphs for.

use crate::error::RenderError;
use crate::pdf::{RefAllocator, deflate_encode};
use pdf_writer::types::{CidFontType, FontFlags, SystemInfo, UnicodeCmap};
use pdf_writer::{Filter, Finish, Name, Pdf, Rect, Ref, Str};
use skrifa::instance::{LocationRef, Size as FontSize};
use skrifa::raw::TableProvider;
use skrifa::{FontRef, MetadataProvider};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Helvetica advance widths for the printable ASCII range, in 1/1000 em.
const HELVETICA_ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

const HELVETICA_DEFAULT_WIDTH: u16 = 556;
const HELVETICA_ASCENT: f32 = 718.0;
const HELVETICA_DESCENT: f32 = -207.0;

const IDENTITY: SystemInfo<'static> = SystemInfo {
    registry: Str(b"Adobe"),
    ordering: Str(b"Identity"),
    supplement: 0,
};

/// A glyph of laid out text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    /// The character the glyph represents.
    pub ch: char,
    /// The code of the glyph: a WinAnsi byte for Helvetica, a glyph ID for
    /// embedded fonts.
    pub id: u16,
    /// The advance width in 1/1000 em.
    pub advance: f32,
}

/// A parsed TrueType font that can be embedded into pages.
///
/// The font program is shared, cloning is cheap.
#[derive(Clone)]
pub struct FontFace {
    name: String,
    data: Arc<[u8]>,
    units_per_em: f32,
    ascent: f32,
    descent: f32,
    cap_height: f32,
    bbox: [f32; 4],
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFace")
            .field("name", &self.name)
            .field("len", &self.data.len())
            .finish()
    }
}

impl FontFace {
    /// Load a TrueType font from a file.
    pub fn open(path: &Path) -> Result<Self, RenderError> {
        let data = std::fs::read(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Font");
        Self::from_data(name, data)
    }

    /// Parse a TrueType font from memory.
    pub fn from_data(name: &str, data: Vec<u8>) -> Result<Self, RenderError> {
        let data: Arc<[u8]> = Arc::from(data);
        let font = parse(&data)?;
        if font.glyf().is_err() {
            return Err(RenderError::Font(format!(
                "{name}: only fonts with TrueType outlines can be embedded"
            )));
        }

        let metrics = font.metrics(FontSize::unscaled(), LocationRef::default());
        let units_per_em = f32::from(metrics.units_per_em);
        if units_per_em <= 0.0 {
            return Err(RenderError::Font(format!("{name}: invalid units per em")));
        }

        let bbox = metrics
            .bounds
            .map(|b| [b.x_min, b.y_min, b.x_max, b.y_max])
            .unwrap_or([0.0, metrics.descent, units_per_em, metrics.ascent]);

        Ok(Self {
            name: pdf_font_name(name),
            units_per_em,
            ascent: metrics.ascent,
            descent: metrics.descent,
            cap_height: metrics.cap_height.unwrap_or(metrics.ascent),
            bbox,
            data,
        })
    }

    /// The name under which the font is embedded.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the font has a glyph for every non-whitespace character of
    /// `text`.
    pub fn supports(&self, text: &str) -> Result<bool, RenderError> {
        let font = parse(&self.data)?;
        let charmap = font.charmap();
        Ok(text
            .chars()
            .filter(|c| !c.is_whitespace())
            .all(|c| charmap.map(c).is_some_and(|g| g.to_u32() != 0)))
    }

    fn to_pdf_units(&self, v: f32) -> f32 {
        v * 1000.0 / self.units_per_em
    }

    fn glyphs(&self, text: &str) -> Result<Vec<Glyph>, RenderError> {
        let font = parse(&self.data)?;
        let charmap = font.charmap();
        let metrics = font.glyph_metrics(FontSize::unscaled(), LocationRef::default());

        Ok(text
            .chars()
            .filter_map(normalize_char)
            .map(|ch| {
                let gid = charmap.map(ch).map(|g| g.to_u32()).unwrap_or(0);
                let id = u16::try_from(gid).unwrap_or(0);
                let advance = charmap
                    .map(ch)
                    .and_then(|g| metrics.advance_width(g))
                    .unwrap_or(0.0);
                Glyph {
                    ch,
                    id,
                    advance: self.to_pdf_units(advance),
                }
            })
            .collect())
    }

    fn write(
        &self,
        pdf: &mut Pdf,
        alloc: &mut RefAllocator,
        used: &UsedGlyphs,
    ) -> Result<Ref, RenderError> {
        let type0_ref = alloc.alloc();
        let cid_ref = alloc.alloc();
        let descriptor_ref = alloc.alloc();
        let file_ref = alloc.alloc();
        let cmap_ref = alloc.alloc();
        let base_font = Name(self.name.as_bytes());

        pdf.type0_font(type0_ref)
            .base_font(base_font)
            .encoding_predefined(Name(b"Identity-H"))
            .descendant_font(cid_ref)
            .to_unicode(cmap_ref);

        let mut cid = pdf.cid_font(cid_ref);
        cid.subtype(CidFontType::Type2);
        cid.base_font(base_font);
        cid.system_info(IDENTITY);
        cid.font_descriptor(descriptor_ref);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        {
            let mut widths = cid.widths();
            for (gid, (_, advance)) in &used.0 {
                widths.consecutive(*gid, [*advance]);
            }
        }
        cid.finish();

        let [x0, y0, x1, y1] = self.bbox.map(|v| self.to_pdf_units(v));
        pdf.font_descriptor(descriptor_ref)
            .name(base_font)
            .flags(FontFlags::NON_SYMBOLIC)
            .bbox(Rect::new(x0, y0, x1, y1))
            .italic_angle(0.0)
            .ascent(self.to_pdf_units(self.ascent))
            .descent(self.to_pdf_units(self.descent))
            .cap_height(self.to_pdf_units(self.cap_height))
            .stem_v(80.0)
            .font_file2(file_ref);

        let program = deflate_encode(&self.data)?;
        pdf.stream(file_ref, &program)
            .filter(Filter::FlateDecode)
            .pair(Name(b"Length1"), self.data.len() as i32);

        let mut cmap = UnicodeCmap::new(Name(b"Docsynth-UCS"), IDENTITY);
        for (gid, (ch, _)) in &used.0 {
            cmap.pair(*gid, *ch);
        }
        pdf.cmap(cmap_ref, &cmap.finish());

        Ok(type0_ref)
    }
}

/// The font used to draw body text.
#[derive(Debug, Clone, Default)]
pub enum BodyFont {
    /// The standard Helvetica font. Characters outside of WinAnsi are drawn
    /// as `?`.
    #[default]
    Helvetica,
    /// An embedded TrueType font.
    Embedded(Arc<FontFace>),
}

impl BodyFont {
    /// Lay out `text` into glyphs.
    ///
    /// Tabs become spaces and other control characters are dropped.
    pub fn glyphs(&self, text: &str) -> Result<Vec<Glyph>, RenderError> {
        match self {
            Self::Helvetica => Ok(text
                .chars()
                .filter_map(normalize_char)
                .map(|ch| {
                    let (ch, code) = match win_ansi(ch) {
                        Some(code) => (ch, code),
                        None => ('?', b'?'),
                    };
                    Glyph {
                        ch,
                        id: u16::from(code),
                        advance: f32::from(helvetica_width(code)),
                    }
                })
                .collect()),
            Self::Embedded(face) => face.glyphs(text),
        }
    }

    /// Whether every non-whitespace character of `text` can be drawn.
    pub fn supports(&self, text: &str) -> Result<bool, RenderError> {
        match self {
            Self::Helvetica => Ok(text
                .chars()
                .filter(|c| !c.is_whitespace())
                .all(|c| win_ansi(c).is_some())),
            Self::Embedded(face) => face.supports(text),
        }
    }

    /// The width of `text` at `size` points.
    pub fn measure(&self, text: &str, size: f64) -> Result<f64, RenderError> {
        Ok(advance_of(&self.glyphs(text)?, size))
    }

    /// The ascent in 1/1000 em.
    pub fn ascent(&self) -> f32 {
        match self {
            Self::Helvetica => HELVETICA_ASCENT,
            Self::Embedded(face) => face.to_pdf_units(face.ascent),
        }
    }

    /// The descent in 1/1000 em, usually negative.
    pub fn descent(&self) -> f32 {
        match self {
            Self::Helvetica => HELVETICA_DESCENT,
            Self::Embedded(face) => face.to_pdf_units(face.descent),
        }
    }

    /// Encode glyphs into the bytes of a text showing operator.
    pub(crate) fn encode(&self, glyphs: &[Glyph], used: &mut UsedGlyphs) -> Vec<u8> {
        match self {
            Self::Helvetica => glyphs.iter().map(|g| g.id as u8).collect(),
            Self::Embedded(_) => {
                let mut bytes = Vec::with_capacity(glyphs.len() * 2);
                for glyph in glyphs {
                    used.0.insert(glyph.id, (glyph.ch, glyph.advance));
                    bytes.extend_from_slice(&glyph.id.to_be_bytes());
                }
                bytes
            }
        }
    }

    /// Write the font resource and return its reference.
    pub(crate) fn write(
        &self,
        pdf: &mut Pdf,
        alloc: &mut RefAllocator,
        used: &UsedGlyphs,
    ) -> Result<Ref, RenderError> {
        match self {
            Self::Helvetica => {
                let font_ref = alloc.alloc();
                pdf.type1_font(font_ref)
                    .base_font(Name(b"Helvetica"))
                    .encoding_predefined(Name(b"WinAnsiEncoding"));
                Ok(font_ref)
            }
            Self::Embedded(face) => face.write(pdf, alloc, used),
        }
    }
}

/// Glyphs used on a page, with the character and width of each.
#[derive(Debug, Clone, Default)]
pub(crate) struct UsedGlyphs(BTreeMap<u16, (char, f32)>);

/// The total advance of `glyphs` at `size` points.
pub(crate) fn advance_of(glyphs: &[Glyph], size: f64) -> f64 {
    glyphs.iter().map(|g| f64::from(g.advance)).sum::<f64>() * size / 1000.0
}

fn parse(data: &[u8]) -> Result<FontRef<'_>, RenderError> {
    FontRef::new(data).map_err(|e| RenderError::Font(e.to_string()))
}

fn normalize_char(ch: char) -> Option<char> {
    match ch {
        '\t' => Some(' '),
        c if c.is_control() => None,
        c => Some(c),
    }
}

fn win_ansi(ch: char) -> Option<u8> {
    match ch {
        ' '..='~' | '\u{a0}'..='\u{ff}' => Some(ch as u8),
        '€' => Some(0x80),
        '…' => Some(0x85),
        '‘' => Some(0x91),
        '’' => Some(0x92),
        '“' => Some(0x93),
        '”' => Some(0x94),
        '•' => Some(0x95),
        '–' => Some(0x96),
        '—' => Some(0x97),
        _ => None,
    }
}

fn helvetica_width(code: u8) -> u16 {
    match code {
        0x20..=0x7e => HELVETICA_ASCII_WIDTHS[usize::from(code - 0x20)],
        0x97 | 0x85 => 1000,
        _ => HELVETICA_DEFAULT_WIDTH,
    }
}

/// Restrict a font name to characters that are safe in a PDF name.
fn pdf_font_name(name: &str) -> String {
    let cleaned: String = name.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if cleaned.is_empty() {
        "EmbeddedFont".to_string()
    } else {
        cleaned
    }
}
