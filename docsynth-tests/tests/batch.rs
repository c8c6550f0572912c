use docsynth::{
    BatchPaths, BatchReport, DocumentMetadata, Error, GeneratorConfig, generate_signatures,
    run_batch,
};
use docsynth_geometry::OverlayRole;
use docsynth_render::{BodyFont, Identity, NoiseAugmenter};
use docsynth_tests::{Workspace, entries};
use std::path::Path;

const LETTER: &str = "Уважаемые коллеги,\n\nпросим подтвердить получение документов.\n\nС уважением";

fn config(seed: u64) -> GeneratorConfig {
    let mut config = GeneratorConfig::default();
    config.raster.dpi = 72.0;
    config.seed = Some(seed);
    config
}

fn letter(_: &str) -> Result<String, String> {
    Ok("Dear colleagues,\n\nplease confirm the receipt of the documents.".to_string())
}

fn batch(ws: &Workspace, config: GeneratorConfig, out: &Path, count: usize) -> BatchReport {
    run_batch(
        config,
        BatchPaths {
            signatures: &ws.signatures(),
            stamps: &ws.stamps(),
            output: out,
        },
        BodyFont::Helvetica,
        letter,
        Identity,
        count,
    )
    .unwrap()
}

fn read_metadata(dir: &Path, id: &str) -> DocumentMetadata {
    let json = std::fs::read_to_string(dir.join(format!("{id}.json"))).unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn empty_pool_aborts_before_writing() {
    let ws = Workspace::new();
    docsynth_tests::write_ink(&ws.stamps().join("stamp.png"), 100, 100, [200, 0, 0]);
    let out = ws.output("out");

    let result = run_batch(
        config(1),
        BatchPaths {
            signatures: &ws.signatures(),
            stamps: &ws.stamps(),
            output: &out,
        },
        BodyFont::Helvetica,
        letter,
        Identity,
        3,
    );

    assert!(matches!(
        result,
        Err(Error::AssetPoolEmpty {
            role: OverlayRole::Signature,
            ..
        })
    ));
    assert!(!out.exists());
}

#[test]
fn batch_writes_consistent_artifacts() {
    let ws = Workspace::with_assets();
    let out = ws.output("out");
    let report = batch(&ws, config(3), &out, 3);

    assert_eq!(report.generated(), 3);
    assert_eq!(report.failed, 0);
    let mut ids = report.ids.clone();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);

    // No PDFs unless asked for.
    assert_eq!(entries(&out).len(), 6);

    for id in &report.ids {
        let meta = read_metadata(&out, id);
        assert_eq!(&meta.id, id);
        assert!(!meta.doc_type.is_empty());
        assert!(meta.text.starts_with("Dear colleagues"));

        let roles: Vec<_> = meta.bboxes.iter().map(|b| b.role).collect();
        assert_eq!(roles, OverlayRole::ALL);

        let image = image::open(out.join(format!("{id}.png"))).unwrap().to_rgba8();
        let (w, h) = image.dimensions();
        assert!((594..=596).contains(&w) && (841..=843).contains(&h), "{w}x{h}");

        for b in &meta.bboxes {
            let [x0, y0, x1, y1] = b.coords;
            assert!(x0 < x1 && x1 <= w, "{:?}", b.coords);
            assert!(y0 < y1 && y1 <= h, "{:?}", b.coords);
            // Overlays sit in the lower part of the page.
            assert!(y0 > h / 2, "{:?}", b.coords);
        }
    }
}

#[test]
fn overlays_are_visible_inside_their_boxes() {
    let ws = Workspace::with_assets();
    let out = ws.output("out");
    let report = batch(&ws, config(11), &out, 1);

    let id = &report.ids[0];
    let meta = read_metadata(&out, id);
    let image = image::open(out.join(format!("{id}.png"))).unwrap().to_rgba8();

    for b in &meta.bboxes {
        let [x0, y0, x1, y1] = b.coords;
        let center = image.get_pixel((x0 + x1) / 2, (y0 + y1) / 2);
        let [r, _, bl, _] = center.0;
        match b.role {
            OverlayRole::Signature => assert!(bl > 150 && r < 100, "{center:?}"),
            OverlayRole::Stamp => assert!(r > 100 && r > bl.saturating_sub(60), "{center:?}"),
        }
        // The transparent frame leaves the corners on white paper.
        assert_eq!(image.get_pixel(x0, y0).0, [255, 255, 255, 255]);
    }
}

#[test]
fn seeded_batches_are_reproducible() {
    let ws = Workspace::with_assets();

    let run = |name: &str| {
        let out = ws.output(name);
        let mut config = config(42);
        config.augment.enabled = true;
        let augment = NoiseAugmenter::new(config.augment.settings(), Some(7)).unwrap();
        let report = run_batch(
            config,
            BatchPaths {
                signatures: &ws.signatures(),
                stamps: &ws.stamps(),
                output: &out,
            },
            BodyFont::Helvetica,
            letter,
            augment,
            2,
        )
        .unwrap();

        report
            .ids
            .iter()
            .map(|id| {
                let meta = read_metadata(&out, id);
                let image = image::open(out.join(format!("{id}.png"))).unwrap().to_rgba8();
                (meta.doc_type, meta.bboxes, image)
            })
            .collect::<Vec<_>>()
    };

    let first = run("a");
    let second = run("b");
    assert_eq!(first.len(), 2);
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.0, b.0);
        assert_eq!(a.1, b.1);
        assert!(a.2 == b.2, "images differ");
    }
}

#[test]
fn writes_pdfs_on_request() {
    let ws = Workspace::with_assets();
    let out = ws.output("out");
    let mut config = config(5);
    config.output.write_pdf = true;
    let report = batch(&ws, config, &out, 1);

    let id = &report.ids[0];
    assert_eq!(
        entries(&out),
        [format!("{id}.json"), format!("{id}.pdf"), format!("{id}.png")]
    );
    let pdf = std::fs::read(out.join(format!("{id}.pdf"))).unwrap();
    assert!(pdf.starts_with(b"%PDF-"));
}

#[test]
fn failing_text_service_skips_every_document() {
    let ws = Workspace::with_assets();
    let out = ws.output("out");

    let report = run_batch(
        config(2),
        BatchPaths {
            signatures: &ws.signatures(),
            stamps: &ws.stamps(),
            output: &out,
        },
        BodyFont::Helvetica,
        |_: &str| Err::<String, _>("model offline".to_string()),
        Identity,
        2,
    )
    .unwrap();

    assert_eq!(report.generated(), 0);
    assert_eq!(report.failed, 2);
    assert_eq!(report.failures.get("external-service"), Some(&2));
    assert!(entries(&out).is_empty());
}

#[test]
fn non_latin_text_is_kept_in_metadata() {
    let ws = Workspace::with_assets();
    let out = ws.output("out");

    let report = run_batch(
        config(8),
        BatchPaths {
            signatures: &ws.signatures(),
            stamps: &ws.stamps(),
            output: &out,
        },
        BodyFont::Helvetica,
        |_: &str| Ok::<_, String>(LETTER.to_string()),
        Identity,
        1,
    )
    .unwrap();

    let meta = read_metadata(&out, &report.ids[0]);
    assert_eq!(meta.text, LETTER);
}

#[test]
fn generated_signatures_feed_the_generator() {
    let ws = Workspace::new();
    docsynth_tests::write_ink(&ws.stamps().join("stamp.png"), 200, 200, [200, 30, 30]);

    let written = generate_signatures(&[BodyFont::Helvetica], &ws.signatures(), 3, Some(4)).unwrap();
    assert_eq!(written.len(), 3);

    let out = ws.output("out");
    let report = batch(&ws, config(9), &out, 2);
    assert_eq!(report.generated(), 2);

    for id in &report.ids {
        let meta = read_metadata(&out, id);
        assert_eq!(meta.bboxes.len(), 2);
    }
}
