//! Property tests for the geometry core.

use docsynth_geometry::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const A4: Size = Size::new(595.0, 842.0);

proptest! {
    #[test]
    fn pixel_point_roundtrip(px in 0.001f64..1.0e6, dpi in 1.0f64..2400.0) {
        let back = points_to_pixels(pixels_to_points(px, dpi).unwrap(), dpi).unwrap();
        prop_assert!(((back - px) / px).abs() <= 1e-6, "px={px} back={back}");
    }

    #[test]
    fn scaler_never_upscales(
        w in 1u32..20_000,
        h in 1u32..20_000,
        dpi in 36.0f64..1200.0,
        fw in 0.01f64..=1.0,
        fh in 0.01f64..=1.0,
    ) {
        let fit = fit_scale((w, h), dpi, A4, Footprint::new(fw, fh).unwrap()).unwrap();
        prop_assert!(fit.scale > 0.0);
        prop_assert!(fit.scale <= 1.0);
    }

    #[test]
    fn scaler_respects_footprint(
        w in 1u32..20_000,
        h in 1u32..20_000,
        dpi in 36.0f64..1200.0,
        fw in 0.01f64..=1.0,
        fh in 0.01f64..=1.0,
    ) {
        let fit = fit_scale((w, h), dpi, A4, Footprint::new(fw, fh).unwrap()).unwrap();
        let eps = 1e-9;
        prop_assert!(fit.size.width <= A4.width * fw + eps);
        prop_assert!(fit.size.height <= A4.height * fh + eps);
        let native_ratio = fit.native.width / fit.native.height;
        let scaled_ratio = fit.size.width / fit.size.height;
        prop_assert!(((native_ratio - scaled_ratio) / native_ratio).abs() < 1e-9);
    }

    #[test]
    fn overflow_is_reported_not_clamped(
        x0 in 0.0f64..0.5,
        span in 0.01f64..0.4,
        extra in 1.0f64..100.0,
        seed in any::<u64>(),
    ) {
        let region = Region::new([x0, x0 + span], [0.0, 1.0]).unwrap();
        let too_wide = Size::new(A4.width * span + extra, 10.0);
        let mut rng = StdRng::seed_from_u64(seed);
        let result = sample_placement(&mut rng, A4, too_wide, &region, 0.0);
        let is_x_overflow = matches!(
            result,
            Err(GeometryError::LayoutOverflow { axis: Axis::X, .. })
        );
        prop_assert!(is_x_overflow);
    }
}

#[test]
fn placement_stays_inside_region() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut sampled = 0;

    while sampled < 10_000 {
        let page = Size::new(rng.gen_range(100.0..2000.0), rng.gen_range(100.0..2000.0));
        let x = [rng.gen_range(0.0..0.5), rng.gen_range(0.5..=1.0)];
        let y = [rng.gen_range(0.0..0.5), rng.gen_range(0.5..=1.0)];
        let region = Region::new(x, y).unwrap();
        let margin = rng.gen_range(0.0..30.0);

        let [rx0, ry0, rx1, ry1] = region.resolve(page, margin).unwrap();
        if rx1 - rx0 < 1.0 || ry1 - ry0 < 1.0 {
            continue;
        }

        let overlay = Size::new(
            rng.gen_range(0.01..=1.0) * (rx1 - rx0),
            rng.gen_range(0.01..=1.0) * (ry1 - ry0),
        );
        let rect = sample_placement(&mut rng, page, overlay, &region, margin).unwrap();

        let eps = 1e-9;
        assert!(rect.x0() >= rx0 - eps && rect.x1() <= rx1 + eps, "{rect:?} in x {rx0}..{rx1}");
        assert!(rect.y0() >= ry0 - eps && rect.y1() <= ry1 + eps, "{rect:?} in y {ry0}..{ry1}");
        sampled += 1;
    }
}

#[test]
fn full_page_maps_to_full_raster() {
    let mut tracker = BoxTracker::new(A4).unwrap();
    tracker
        .record(OverlayRole::Signature, PlacementRect::page(A4).unwrap())
        .unwrap();

    let (width, height) = (
        points_to_pixels(A4.width, 300.0).unwrap().round() as u32,
        points_to_pixels(A4.height, 300.0).unwrap().round() as u32,
    );
    let raster = tracker.to_raster(300.0, (width, height)).unwrap();
    let [x0, y0, x1, y1] = raster[0].pixel_coords();

    assert!(x0 <= 1 && y0 <= 1, "{:?}", raster[0]);
    assert!(width - x1 <= 1 && height - y1 <= 1, "{:?}", raster[0]);
}

#[test]
fn a4_signature_scenario() {
    let fit = fit_scale((300, 150), 300.0, A4, Footprint::new(0.25, 0.2).unwrap()).unwrap();
    assert!((fit.size.width - 72.0).abs() < 1e-9);
    assert!((fit.size.height - 36.0).abs() < 1e-9);

    // x in [327, 505], y in [84, 210] on an A4 page.
    let region = Region::new([327.0 / 595.0, 505.0 / 595.0], [84.0 / 842.0, 210.0 / 842.0])
        .unwrap();
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..1_000 {
        let rect = sample_placement(&mut rng, A4, fit.size, &region, 0.0).unwrap();
        let eps = 1e-9;
        assert!(rect.x0() >= 327.0 - eps && rect.x0() <= 505.0 - 72.0 + eps, "{rect:?}");
        assert!(rect.y0() >= 84.0 - eps && rect.y0() <= 210.0 - 36.0 + eps, "{rect:?}");
    }
}
