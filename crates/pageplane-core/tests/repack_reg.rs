//! Repacker regression test
//!
//! Checks that both repackers move every channel to the right plane, keep
//! row 0 on top, agree byte for byte across layouts and page shapes, and
//! never read the unused pixel byte or the row padding.

use pageplane_core::{
    AffinityCheck, PageSize, PlanarImage, PlaneLayout, PlanePacking, RepackStrategy, Resolution,
    RowOrder, pixel_dimensions, repack, repack_with,
};
use pageplane_test::{RegParams, pattern_bgr, pattern_page, swapped_column_image};
use rstest::rstest;

fn layouts() -> Vec<PlaneLayout> {
    let mut out = Vec::new();
    for row_order in [RowOrder::BottomUp, RowOrder::TopDown] {
        for packing in [PlanePacking::PlaneMajor, PlanePacking::PixelInterleaved] {
            for row_alignment in [1, 4] {
                out.push(PlaneLayout {
                    row_order,
                    packing,
                    row_alignment,
                });
            }
        }
    }
    out
}

// ========================================================================
// Test: channel placement
// ========================================================================

#[test]
fn repack_reg_channels() {
    let mut rp = RegParams::new("repack_channels");

    let src = pattern_page(9, 5, 12).unwrap();
    for layout in layouts() {
        for strategy in [RepackStrategy::Baseline, RepackStrategy::RowCached] {
            let mut dst = PlanarImage::with_layout(3, 9, 5, &layout).unwrap();
            repack(&src, &mut dst, strategy).unwrap();

            let mut bad = 0;
            for y in 0..5 {
                for x in 0..9 {
                    let (b, g, r) = pattern_bgr(x, y);
                    if dst.rgb(x, y) != Some((r, g, b)) {
                        bad += 1;
                    }
                }
            }
            rp.compare_values(0.0, bad as f64, 0.0);
        }
    }

    assert!(rp.cleanup());
}

// ========================================================================
// Test: row 0 stays on top
// ========================================================================

#[test]
fn repack_reg_no_flip() {
    let mut rp = RegParams::new("repack_no_flip");

    let mut src = pageplane_core::InterleavedBuffer::packed(6, 4).unwrap();
    for x in 0..6 {
        src.set_bgr(x, 0, 0, 0, 255).unwrap();
    }

    for bottom_up in [true, false] {
        let mut dst = PlanarImage::allocate(3, 6, 4, bottom_up).unwrap();
        repack(&src, &mut dst, RepackStrategy::RowCached).unwrap();
        let red = dst.plane_bytes(0).unwrap();
        rp.compare_strings(&[255; 6], &red[0..6]);
        rp.compare_strings(&[0; 18], &red[6..24]);
    }

    assert!(rp.cleanup());
}

// ========================================================================
// Test: baseline and row-cached agree
// ========================================================================

#[rstest]
#[case::single_column(1, 5, 0)]
#[case::single_row(8, 1, 0)]
#[case::odd_width_padded(7, 3, 12)]
#[case::wider_padded(33, 17, 4)]
#[case::empty(4, 0, 0)]
fn repack_reg_variants_agree(#[case] width: u32, #[case] height: u32, #[case] pad: usize) {
    let mut rp = RegParams::new("repack_variants");
    let src = pattern_page(width, height, pad).unwrap();

    for layout in layouts() {
        let mut baseline = PlanarImage::with_layout(3, width, height, &layout).unwrap();
        let mut cached = baseline.clone();
        let mut sampled = baseline.clone();

        repack(&src, &mut baseline, RepackStrategy::Baseline).unwrap();
        let summary = repack(&src, &mut cached, RepackStrategy::RowCached).unwrap();
        repack_with(
            &src,
            &mut sampled,
            RepackStrategy::RowCached,
            AffinityCheck::SamplePair,
        )
        .unwrap();

        rp.compare_values(1.0, summary.all_cached() as u8 as f64, 0.0);
        rp.compare_strings(baseline.buffer().as_slice(), cached.buffer().as_slice());
        rp.compare_strings(baseline.buffer().as_slice(), sampled.buffer().as_slice());
    }

    assert!(rp.cleanup());
}

#[test]
fn repack_reg_non_affine_fallback() {
    let mut rp = RegParams::new("repack_non_affine");
    let src = pattern_page(11, 4, 8).unwrap();

    let mut baseline = swapped_column_image(11, 4).unwrap();
    let mut cached = baseline.clone();
    repack(&src, &mut baseline, RepackStrategy::Baseline).unwrap();
    let summary = repack(&src, &mut cached, RepackStrategy::RowCached).unwrap();

    rp.compare_values(3.0, summary.lookup_planes().count() as f64, 0.0);
    rp.compare_strings(baseline.buffer().as_slice(), cached.buffer().as_slice());

    let (b, g, r) = pattern_bgr(4, 2);
    rp.compare_values(r as f64, cached.pixel(0, 4, 2).unwrap() as f64, 0.0);
    rp.compare_values(g as f64, cached.pixel(1, 4, 2).unwrap() as f64, 0.0);
    rp.compare_values(b as f64, cached.pixel(2, 4, 2).unwrap() as f64, 0.0);

    assert!(rp.cleanup());
}

// ========================================================================
// Test: full A4 page at 300 dpi
// ========================================================================

#[test]
fn repack_reg_a4_page() {
    let mut rp = RegParams::new("repack_a4");

    let (width, height) = pixel_dimensions(PageSize::A4, Resolution::default()).unwrap();
    rp.compare_values(2480.0, width as f64, 0.0);
    rp.compare_values(3508.0, height as f64, 0.0);

    let src = pattern_page(width, height, 0).unwrap();
    let mut baseline = PlanarImage::allocate(3, width, height, true).unwrap();
    let mut cached = PlanarImage::allocate(3, width, height, true).unwrap();
    repack(&src, &mut baseline, RepackStrategy::Baseline).unwrap();
    repack(&src, &mut cached, RepackStrategy::RowCached).unwrap();

    rp.compare_strings(baseline.buffer().as_slice(), cached.buffer().as_slice());
    let (b, g, r) = pattern_bgr(width - 1, height - 1);
    rp.compare_values(
        1.0,
        (cached.rgb(width - 1, height - 1) == Some((r, g, b))) as u8 as f64,
        0.0,
    );

    assert!(rp.cleanup());
}
