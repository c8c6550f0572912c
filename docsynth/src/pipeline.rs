//! The per-document pipeline and the batch loop.
//!
//! Every document runs through the same stages: text, overlay scaling and
//! placement, composition, rasterization, bounding box mapping,
//! augmentation and persistence. Failures are confined to the document they
//! occur in; only setup problems abort a batch.

use crate::assets::AssetPool;
use crate::config::{GeneratorConfig, OverlayConfig};
use crate::error::Error;
use crate::persist::{Artifacts, DocumentMetadata, persist_document};
use crate::prompt::PromptTemplate;
use crate::text::TextService;
use docsynth_geometry::{GeometryError, OverlayRole, fit_scale, sample_placement};
use docsynth_render::{
    Augment, BodyFont, OverlayInstance, PageComposer, PageLayout, apply_augment,
};
use image::RgbaImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use uuid::Uuid;

/// Scale and place an asset of `pool` on a page.
///
/// If the scaled asset does not fit its region, another asset is drawn from
/// the pool, up to `attempts` times in total.
pub fn place_overlay<R: Rng + ?Sized>(
    rng: &mut R,
    pool: &AssetPool,
    overlay: &OverlayConfig,
    layout: &PageLayout,
    attempts: u32,
) -> Result<OverlayInstance, Error> {
    let mut last = None;

    for attempt in 1..=attempts.max(1) {
        let asset = pool.choose(rng);
        let fit = fit_scale(
            asset.pixel_size(),
            overlay.source_dpi,
            layout.size,
            overlay.footprint,
        )?;

        match sample_placement(rng, layout.size, fit.size, &overlay.region, layout.margin) {
            Ok(rect) => {
                return Ok(OverlayInstance::new(
                    pool.role(),
                    asset.clone(),
                    fit.scale,
                    rect,
                )?);
            }
            Err(err @ GeometryError::LayoutOverflow { .. }) => {
                log::debug!(
                    "{} {} does not fit (attempt {attempt}/{attempts}): {err}",
                    pool.role(),
                    asset.name()
                );
                last = Some(err);
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(match last {
        Some(err) => Error::LayoutOverflow(err),
        None => Error::InvalidParameter("no placement attempts".to_string()),
    })
}

/// A document ready to be written.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// The metadata record.
    pub metadata: DocumentMetadata,
    /// The augmented raster image.
    pub image: RgbaImage,
    /// The composed page.
    pub pdf: Vec<u8>,
}

/// The outcome of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// The identifiers of the written documents.
    pub ids: Vec<String>,
    /// The number of skipped documents.
    pub failed: usize,
    /// Skipped documents by error kind.
    pub failures: BTreeMap<&'static str, usize>,
}

impl BatchReport {
    /// The number of written documents.
    pub fn generated(&self) -> usize {
        self.ids.len()
    }
}

/// Generates documents from a fixed set of resources.
pub struct Generator<T, A> {
    config: GeneratorConfig,
    layout: PageLayout,
    font: BodyFont,
    prompt: PromptTemplate,
    signatures: AssetPool,
    stamps: AssetPool,
    text: T,
    augment: A,
    rng: StdRng,
    ids: HashSet<String>,
}

impl<T: TextService, A: Augment> Generator<T, A> {
    /// Create a generator. The configuration is validated and the pools
    /// have to hold the assets of their roles.
    pub fn new(
        config: GeneratorConfig,
        font: BodyFont,
        signatures: AssetPool,
        stamps: AssetPool,
        text: T,
        augment: A,
    ) -> Result<Self, Error> {
        config.validate()?;
        for (pool, role) in [(&signatures, OverlayRole::Signature), (&stamps, OverlayRole::Stamp)] {
            if pool.role() != role {
                return Err(Error::InvalidParameter(format!(
                    "expected a {role} pool, got a {} pool",
                    pool.role()
                )));
            }
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            layout: config.page.layout(),
            prompt: config.prompt.template()?,
            config,
            font,
            signatures,
            stamps,
            text,
            augment,
            rng,
            ids: HashSet::new(),
        })
    }

    /// Turn a text into a finished document.
    pub fn render_document(
        &mut self,
        id: &str,
        doc_type: &str,
        text: &str,
    ) -> Result<RenderedDocument, Error> {
        let mut overlays = Vec::with_capacity(OverlayRole::ALL.len());
        for role in OverlayRole::ALL {
            let pool = match role {
                OverlayRole::Signature => &self.signatures,
                OverlayRole::Stamp => &self.stamps,
            };
            overlays.push(place_overlay(
                &mut self.rng,
                pool,
                self.config.overlay(role),
                &self.layout,
                self.config.placement_attempts,
            )?);
        }

        let page = PageComposer::new(self.layout, self.font.clone())?
            .draw_text(text)?
            .draw_overlays(overlays)?
            .finish()?;

        let stats = page.text_stats();
        if stats.dropped > 0 {
            log::debug!("{id}: {} lines did not fit the page", stats.dropped);
        }

        let dpi = self.config.raster.dpi;
        let image = page.rasterize(dpi)?;
        let boxes = page.tracker().to_raster(dpi, image.dimensions())?;
        let image = apply_augment(&mut self.augment, image)?;

        Ok(RenderedDocument {
            metadata: DocumentMetadata::new(id, doc_type, text, &boxes),
            image,
            pdf: page.pdf().to_vec(),
        })
    }

    /// Pick a topic, obtain text for it and render the document under a
    /// fresh identifier.
    pub fn generate_document(&mut self) -> Result<RenderedDocument, Error> {
        let (topic, prompt) = self.prompt.sample(&mut self.rng);
        let topic = topic.to_string();

        let text = self.text.generate(&prompt)?;
        if text.trim().is_empty() {
            return Err(Error::ExternalService(
                "the text service returned no text".to_string(),
            ));
        }

        let id = self.next_id();
        self.render_document(&id, &topic, &text)
    }

    /// Generate `count` documents into `out_dir`.
    ///
    /// Documents that fail are logged, counted and skipped.
    pub fn run(&mut self, count: usize, out_dir: &Path) -> Result<BatchReport, Error> {
        std::fs::create_dir_all(out_dir)?;
        let write_pdf = self.config.output.write_pdf;
        let mut report = BatchReport::default();

        for i in 1..=count {
            let result = self.generate_document().and_then(|doc| {
                persist_document(
                    out_dir,
                    Artifacts {
                        metadata: &doc.metadata,
                        image: &doc.image,
                        pdf: write_pdf.then_some(doc.pdf.as_slice()),
                    },
                )?;
                Ok(doc.metadata.id)
            });

            match result {
                Ok(id) => {
                    log::info!("[{i}/{count}] generated {id}");
                    report.ids.push(id);
                }
                Err(err) => {
                    log::warn!("[{i}/{count}] skipped document: {err}");
                    report.failed += 1;
                    *report.failures.entry(err.kind()).or_default() += 1;
                }
            }
        }

        log::info!(
            "generated {} of {count} documents into {}, {} failed",
            report.generated(),
            out_dir.display(),
            report.failed
        );
        Ok(report)
    }

    fn next_id(&mut self) -> String {
        loop {
            let id = Uuid::new_v4().simple().to_string();
            if self.ids.insert(id.clone()) {
                return id;
            }
        }
    }
}

/// Where a batch reads its assets from and writes its documents to.
#[derive(Debug, Clone, Copy)]
pub struct BatchPaths<'a> {
    /// The directory of signature images.
    pub signatures: &'a Path,
    /// The directory of stamp images.
    pub stamps: &'a Path,
    /// The output directory.
    pub output: &'a Path,
}

/// Load the asset pools and generate `count` documents.
///
/// Both pools are loaded before anything is written, so a missing pool
/// fails the batch without creating the output directory.
pub fn run_batch<T: TextService, A: Augment>(
    config: GeneratorConfig,
    paths: BatchPaths<'_>,
    font: BodyFont,
    text: T,
    augment: A,
    count: usize,
) -> Result<BatchReport, Error> {
    let signatures = AssetPool::load(OverlayRole::Signature, paths.signatures)?;
    let stamps = AssetPool::load(OverlayRole::Stamp, paths.stamps)?;
    Generator::new(config, font, signatures, stamps, text, augment)?.run(count, paths.output)
}
