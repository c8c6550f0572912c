//! Writing document artifacts.
//!
//! All artifacts of a document are first written to temporary files in the
//! output directory and only renamed into place once every one of them was
//! written. A failed document leaves no files behind.

use crate::error::Error;
use docsynth_geometry::{OverlayRole, Raster, TrackedBox};
use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// The bounding box of an overlay in the output image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// The overlay role.
    #[serde(rename = "type")]
    pub role: OverlayRole,
    /// `[x0, y0, x1, y1]` in pixels, origin top left, maximum exclusive.
    pub coords: [u32; 4],
}

/// The metadata record written next to each image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// The document identifier, also the stem of every artifact.
    pub id: String,
    /// The document type, the topic the text was written about.
    #[serde(rename = "type")]
    pub doc_type: String,
    /// The generated body text, as received.
    pub text: String,
    /// The overlay bounding boxes in drawing order.
    pub bboxes: Vec<BoundingBox>,
}

impl DocumentMetadata {
    /// Collect the metadata of a document.
    pub fn new(
        id: impl Into<String>,
        doc_type: impl Into<String>,
        text: impl Into<String>,
        boxes: &[TrackedBox<Raster>],
    ) -> Self {
        Self {
            id: id.into(),
            doc_type: doc_type.into(),
            text: text.into(),
            bboxes: boxes
                .iter()
                .map(|b| BoundingBox {
                    role: b.role,
                    coords: b.pixel_coords(),
                })
                .collect(),
        }
    }
}

/// Everything written for one document.
#[derive(Debug, Clone, Copy)]
pub struct Artifacts<'a> {
    /// The metadata, written as `<id>.json`.
    pub metadata: &'a DocumentMetadata,
    /// The final image, written as `<id>.png`.
    pub image: &'a RgbaImage,
    /// The composed page, written as `<id>.pdf` if present.
    pub pdf: Option<&'a [u8]>,
}

/// Write the artifacts of a document into `dir` and return their paths.
pub fn persist_document(dir: &Path, artifacts: Artifacts<'_>) -> Result<Vec<PathBuf>, Error> {
    let id = &artifacts.metadata.id;

    let mut png = Cursor::new(Vec::new());
    artifacts.image.write_to(&mut png, ImageFormat::Png)?;

    let mut files = vec![
        (format!("{id}.png"), png.into_inner()),
        (
            format!("{id}.json"),
            serde_json::to_vec_pretty(artifacts.metadata)?,
        ),
    ];
    if let Some(pdf) = artifacts.pdf {
        files.push((format!("{id}.pdf"), pdf.to_vec()));
    }

    write_all_atomic(dir, &files)
}

/// Write a set of files so that either all or none of them appear.
pub(crate) fn write_all_atomic(
    dir: &Path,
    files: &[(String, Vec<u8>)],
) -> Result<Vec<PathBuf>, Error> {
    let mut staged = Vec::with_capacity(files.len());
    for (name, bytes) in files {
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        staged.push((tmp, dir.join(name)));
    }

    let mut written: Vec<PathBuf> = Vec::with_capacity(staged.len());
    for (tmp, path) in staged {
        if let Err(e) = tmp.persist(&path) {
            for done in &written {
                if let Err(err) = std::fs::remove_file(done) {
                    log::warn!("failed to remove {}: {err}", done.display());
                }
            }
            return Err(e.error.into());
        }
        written.push(path);
    }

    Ok(written)
}
