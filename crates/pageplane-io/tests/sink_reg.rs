//! Image sink regression test
//!
//! Pages repacked into different storage layouts must encode to the same
//! picture in every format, and decode back to the same samples.

use pageplane_core::{
    ImageFormat, PlanarImage, PlaneLayout, PlanePacking, RepackStrategy, RowOrder, repack,
};
use pageplane_io::{FileSink, ImageSink, MemorySink, detect_format_from_bytes, read_image_mem};
use pageplane_test::{RegParams, pattern_page};
use rstest::rstest;

const FORMATS: [ImageFormat; 3] = [ImageFormat::Bmp, ImageFormat::Png, ImageFormat::Tiff];

fn repacked(layout: &PlaneLayout, width: u32, height: u32) -> PlanarImage {
    let src = pattern_page(width, height, 8).unwrap();
    let mut image = PlanarImage::with_layout(3, width, height, layout).unwrap();
    repack(&src, &mut image, RepackStrategy::RowCached).unwrap();
    image
}

#[test]
fn sink_reg_layout_independent() {
    let mut rp = RegParams::new("sink_layouts");

    let top_down = repacked(&PlaneLayout::with_row_order(RowOrder::TopDown), 13, 7);
    let interleaved = repacked(
        &PlaneLayout::with_row_order(RowOrder::BottomUp)
            .packing(PlanePacking::PixelInterleaved)
            .row_alignment(4),
        13,
        7,
    );

    for format in FORMATS {
        let a = pageplane_io::write_image_mem(&top_down, format).unwrap();
        let b = pageplane_io::write_image_mem(&interleaved, format).unwrap();
        rp.compare_strings(&a, &b);
        rp.compare_values(
            1.0,
            (detect_format_from_bytes(&a).ok() == Some(format)) as u8 as f64,
            0.0,
        );

        let decoded = read_image_mem(&a).unwrap();
        rp.compare_planar(&top_down, &decoded);
    }

    rp.write_image_and_check(&interleaved, ImageFormat::Bmp)
        .unwrap();

    assert!(rp.cleanup());
}

#[rstest]
#[case::bmp(ImageFormat::Bmp)]
#[case::png(ImageFormat::Png)]
#[case::tiff(ImageFormat::Tiff)]
fn sink_reg_file_sink(#[case] format: ImageFormat) {
    let mut rp = RegParams::new("sink_files");

    let dir = tempfile::tempdir().unwrap();
    let image = repacked(&PlaneLayout::default(), 5, 3);

    let mut sink = FileSink::create(dir.path(), "doc", format).unwrap();
    for page in [0, 1, 11] {
        sink.encode(page, &image).unwrap();
    }
    let names: Vec<String> = sink
        .written()
        .iter()
        .filter_map(|p| p.file_name()?.to_str().map(str::to_string))
        .collect();
    let ext = format.extension();
    let expected = vec![
        format!("doc-001.{ext}"),
        format!("doc-002.{ext}"),
        format!("doc-012.{ext}"),
    ];
    rp.compare_values(1.0, (names == expected) as u8 as f64, 0.0);

    let back = pageplane_io::read_image(sink.path_for(11)).unwrap();
    rp.compare_planar(&image, &back);

    assert!(rp.cleanup());
}

fn encode_page<S: ImageSink>(mut sink: S, page: usize, image: &PlanarImage) {
    sink.encode(page, image).unwrap();
}

#[test]
fn sink_reg_memory_sink() {
    let mut rp = RegParams::new("sink_memory");

    let image = repacked(&PlaneLayout::default(), 1, 4);
    let mut sink = MemorySink::new(ImageFormat::Png);
    encode_page(&mut sink, 3, &image);
    sink.encode(0, &image).unwrap();

    let indices: Vec<usize> = sink.pages().iter().map(|(i, _)| *i).collect();
    rp.compare_values(1.0, (indices == vec![3, 0]) as u8 as f64, 0.0);
    let decoded = read_image_mem(sink.page(0).unwrap()).unwrap();
    rp.compare_planar(&image, &decoded);
    rp.compare_values(1.0, sink.page(1).is_none() as u8 as f64, 0.0);

    assert!(rp.cleanup());
}
