//! Interleaved to planar repacking
//!
//! Copies a rasterized page out of an [`InterleavedBuffer`] into the red,
//! green and blue planes of a planar destination. Two variants produce
//! byte-identical output:
//!
//! - [`repack_baseline`] looks every destination address up in the
//!   plane's address table
//! - [`repack_row_cached`] resolves one base address per row and plane and
//!   then walks the row with a fixed column stride
//!
//! Source row 0 always lands in logical row 0. Whether that row is stored
//! first or last is the address table's business, so no variant flips.
//!
//! All preconditions (matching dimensions, three acquirable planes, every
//! address inside the buffer) are checked before the first byte is
//! written. A failed repack leaves the destination untouched.

use crate::channel::{BYTES_PER_PIXEL, COLOR_PLANES, SOURCE_BYTE};
use crate::error::{Error, Result};
use crate::interleaved::InterleavedBuffer;
use crate::planar::{AddressTable, PlanarImage, PlaneBuffer};

/// Repacker variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RepackStrategy {
    /// Per-pixel table lookup
    Baseline,
    /// Per-row base address with a cached column stride
    #[default]
    RowCached,
}

/// How the row-cached repacker decides whether a plane's column stride can
/// be cached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AffinityCheck {
    /// Check every column entry against the stride once per image; planes
    /// that fail are repacked with per-pixel lookups.
    #[default]
    Verify,
    /// Derive the stride from columns 0 and 1 and trust it. Only correct
    /// for address tables that are affine in x.
    SamplePair,
}

/// Which path each color plane took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepackSummary {
    /// `true` where the cached-stride path was used, indexed by plane
    pub cached: [bool; COLOR_PLANES],
}

impl RepackSummary {
    /// Check whether every plane used the cached-stride path.
    pub fn all_cached(&self) -> bool {
        self.cached.iter().all(|&c| c)
    }

    /// Planes that were repacked with per-pixel lookups.
    pub fn lookup_planes(&self) -> impl Iterator<Item = u32> + '_ {
        self.cached
            .iter()
            .enumerate()
            .filter(|&(_, &c)| !c)
            .map(|(p, _)| p as u32)
    }
}

/// Repack `src` into the color planes of `dst`.
///
/// The row-cached variant uses [`AffinityCheck::Verify`].
///
/// # Errors
///
/// See [`repack_baseline`].
pub fn repack(
    src: &InterleavedBuffer,
    dst: &mut PlanarImage,
    strategy: RepackStrategy,
) -> Result<RepackSummary> {
    repack_with(src, dst, strategy, AffinityCheck::default())
}

/// Repack with an explicit affinity check for the row-cached variant.
pub fn repack_with(
    src: &InterleavedBuffer,
    dst: &mut PlanarImage,
    strategy: RepackStrategy,
    affinity: AffinityCheck,
) -> Result<RepackSummary> {
    match strategy {
        RepackStrategy::Baseline => repack_baseline(src, dst),
        RepackStrategy::RowCached => repack_row_cached(src, dst, affinity),
    }
}

/// Repack with a table lookup for every destination sample.
///
/// # Errors
///
/// - [`Error::PlaneUnavailable`] if `dst` has fewer than three planes
/// - [`Error::DimensionMismatch`] if the sizes differ
/// - [`Error::AddressOutOfRange`] if a table reaches outside the buffer
pub fn repack_baseline(src: &InterleavedBuffer, dst: &mut PlanarImage) -> Result<RepackSummary> {
    let (tables, buffer) = dst.color_planes_mut()?;
    repack_baseline_into(src, tables, buffer)
}

/// Repack with per-row base addresses and cached column strides.
///
/// # Errors
///
/// See [`repack_baseline`].
pub fn repack_row_cached(
    src: &InterleavedBuffer,
    dst: &mut PlanarImage,
    affinity: AffinityCheck,
) -> Result<RepackSummary> {
    let (tables, buffer) = dst.color_planes_mut()?;
    repack_row_cached_into(src, tables, buffer, affinity)
}

/// Baseline repack into any red, green and blue address tables sharing
/// `dst`.
pub fn repack_baseline_into<T: AddressTable + ?Sized>(
    src: &InterleavedBuffer,
    tables: [&T; COLOR_PLANES],
    dst: &mut PlaneBuffer,
) -> Result<RepackSummary> {
    check_tables(src, &tables, dst)?;

    for y in 0..src.height() {
        let row = src.row(y);
        for (x, pixel) in (0u32..).zip(row.chunks_exact(BYTES_PER_PIXEL)) {
            for (table, &byte) in tables.iter().zip(SOURCE_BYTE.iter()) {
                dst.store(table.offset(x, y), pixel[byte])?;
            }
        }
    }

    log::debug!(
        "baseline repack of {}x{} page done",
        src.width(),
        src.height()
    );
    Ok(RepackSummary::default())
}

/// Row-cached repack into any red, green and blue address tables sharing
/// `dst`.
pub fn repack_row_cached_into<T: AddressTable + ?Sized>(
    src: &InterleavedBuffer,
    tables: [&T; COLOR_PLANES],
    dst: &mut PlaneBuffer,
    affinity: AffinityCheck,
) -> Result<RepackSummary> {
    check_tables(src, &tables, dst)?;

    let width = src.width();
    if width == 0 || src.height() == 0 {
        return Ok(RepackSummary {
            cached: [true; COLOR_PLANES],
        });
    }

    let mut summary = RepackSummary::default();
    let mut x_stride = [0isize; COLOR_PLANES];
    let mut x_origin = [0isize; COLOR_PLANES];
    for (p, table) in tables.iter().enumerate() {
        x_stride[p] = table.x_stride();
        x_origin[p] = table.col_offset(0);
        summary.cached[p] = match affinity {
            AffinityCheck::Verify => table.is_affine_in_x(),
            AffinityCheck::SamplePair => true,
        };
        if summary.cached[p] {
            log::debug!("plane {p}: cached column stride {}", x_stride[p]);
        } else {
            log::warn!("plane {p}: column offsets are not affine, using per-pixel lookup");
        }
    }

    // Every cached run is checked before the first store.
    let last_x = (width - 1) as isize;
    for y in 0..src.height() {
        for (p, table) in tables.iter().enumerate() {
            if summary.cached[p] {
                let first = table.row_offset(y).saturating_add(x_origin[p]);
                let last = last_x
                    .checked_mul(x_stride[p])
                    .and_then(|span| first.checked_add(span))
                    .ok_or(Error::AddressOutOfRange {
                        offset: first,
                        len: dst.len(),
                    })?;
                dst.check_span(first, last)?;
            }
        }
    }

    let mut row_base = [0isize; COLOR_PLANES];
    for y in 0..src.height() {
        for (p, table) in tables.iter().enumerate() {
            if summary.cached[p] {
                row_base[p] = table.row_offset(y) + x_origin[p];
            }
        }

        let row = src.row(y);
        for (x, pixel) in (0u32..).zip(row.chunks_exact(BYTES_PER_PIXEL)) {
            for p in 0..COLOR_PLANES {
                let value = pixel[SOURCE_BYTE[p]];
                if summary.cached[p] {
                    let offset = row_base[p] + x as isize * x_stride[p];
                    // SAFETY: offsets for x in 0..width form an arithmetic
                    // progression from row_base[p] to the last address of
                    // the row, and both ends passed check_span above.
                    unsafe { dst.store_unchecked(offset, value) };
                } else {
                    dst.store(tables[p].offset(x, y), value)?;
                }
            }
        }
    }

    Ok(summary)
}

/// Validate shapes and reachable addresses before any write.
fn check_tables<T: AddressTable + ?Sized>(
    src: &InterleavedBuffer,
    tables: &[&T; COLOR_PLANES],
    dst: &PlaneBuffer,
) -> Result<()> {
    let expected = (src.width(), src.height());
    for table in tables {
        let actual = (table.cols(), table.rows());
        if actual != expected {
            return Err(Error::DimensionMismatch { expected, actual });
        }
        if let Some((lo, hi)) = table.extent() {
            dst.check_span(lo, hi)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planar::{PlaneLayout, PlanePacking, RowOrder, Vpat};

    /// 2x2 page with 16-byte rows: (B, G, R) = (10,20,30) (40,50,60) in
    /// row 0 and (70,80,90) (100,110,120) in row 1.
    fn two_by_two() -> InterleavedBuffer {
        let mut src = InterleavedBuffer::with_stride(2, 2, 16).unwrap();
        src.set_bgr(0, 0, 10, 20, 30).unwrap();
        src.set_bgr(1, 0, 40, 50, 60).unwrap();
        src.set_bgr(0, 1, 70, 80, 90).unwrap();
        src.set_bgr(1, 1, 100, 110, 120).unwrap();
        src
    }

    fn logical(img: &PlanarImage, plane: u32) -> Vec<u8> {
        img.plane_bytes(plane).unwrap()
    }

    #[test]
    fn test_two_by_two_both_variants() {
        let src = two_by_two();
        for strategy in [RepackStrategy::Baseline, RepackStrategy::RowCached] {
            let mut dst = PlanarImage::allocate(3, 2, 2, true).unwrap();
            repack(&src, &mut dst, strategy).unwrap();
            assert_eq!(logical(&dst, 0), vec![30, 60, 90, 120]);
            assert_eq!(logical(&dst, 1), vec![20, 50, 80, 110]);
            assert_eq!(logical(&dst, 2), vec![10, 40, 70, 100]);
        }
    }

    #[test]
    fn test_no_vertical_flip() {
        let mut src = InterleavedBuffer::packed(3, 4).unwrap();
        for x in 0..3 {
            src.set_bgr(x, 0, 1, 2, 3).unwrap();
        }
        for bottom_up in [true, false] {
            let mut dst = PlanarImage::allocate(3, 3, 4, bottom_up).unwrap();
            repack(&src, &mut dst, RepackStrategy::RowCached).unwrap();
            for x in 0..3 {
                assert_eq!(dst.rgb(x, 0), Some((3, 2, 1)));
                assert_eq!(dst.rgb(x, 3), Some((0, 0, 0)));
            }
        }
    }

    #[test]
    fn test_width_one() {
        let mut src = InterleavedBuffer::packed(1, 3).unwrap();
        src.set_bgr(0, 2, 5, 6, 7).unwrap();
        // A single x entry: reading column 1 would panic.
        let tables: Vec<Vpat> = (0..3)
            .map(|p| Vpat::from_entries(vec![p * 3, p * 3 + 1, p * 3 + 2], vec![0]).unwrap())
            .collect();
        let mut dst = PlanarImage::from_tables(1, 3, 9, tables).unwrap();
        let summary = repack(&src, &mut dst, RepackStrategy::RowCached).unwrap();
        assert!(summary.all_cached());
        assert_eq!(dst.rgb(0, 2), Some((7, 6, 5)));
    }

    #[test]
    fn test_zero_height_writes_nothing() {
        let src = InterleavedBuffer::packed(5, 0).unwrap();
        let mut dst = PlanarImage::allocate(3, 5, 0, true).unwrap();
        for strategy in [RepackStrategy::Baseline, RepackStrategy::RowCached] {
            repack(&src, &mut dst, strategy).unwrap();
        }
        assert!(dst.buffer().is_empty());
    }

    #[test]
    fn test_dimension_mismatch_leaves_destination_untouched() {
        let mut src = InterleavedBuffer::packed(3, 3).unwrap();
        src.fill(1, 1, 1);
        let mut dst = PlanarImage::allocate(3, 3, 2, true).unwrap();
        let err = repack(&src, &mut dst, RepackStrategy::Baseline).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: (3, 3),
                actual: (3, 2)
            }
        ));
        assert!(dst.buffer().as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_missing_plane_aborts() {
        let src = InterleavedBuffer::packed(2, 2).unwrap();
        let mut dst = PlanarImage::allocate(2, 2, 2, true).unwrap();
        for strategy in [RepackStrategy::Baseline, RepackStrategy::RowCached] {
            assert!(matches!(
                repack(&src, &mut dst, strategy),
                Err(Error::PlaneUnavailable { plane: 2, count: 2 })
            ));
        }
    }

    #[test]
    fn test_non_affine_plane_falls_back() {
        let mut src = InterleavedBuffer::packed(4, 2).unwrap();
        for y in 0..2 {
            for x in 0..4 {
                let v = (y * 4 + x) as u8;
                src.set_bgr(x, y, v, v + 100, v + 200).unwrap();
            }
        }
        let swapped = |base: isize| {
            Vpat::from_entries(vec![base, base + 4], vec![1, 0, 3, 2]).unwrap()
        };
        let tables = vec![
            Vpat::affine(2, 4, 0, 4, 1),
            swapped(8),
            Vpat::affine(2, 4, 16, 4, 1),
        ];
        let mut cached = PlanarImage::from_tables(4, 2, 24, tables.clone()).unwrap();
        let mut baseline = PlanarImage::from_tables(4, 2, 24, tables).unwrap();

        let summary = repack(&src, &mut cached, RepackStrategy::RowCached).unwrap();
        repack(&src, &mut baseline, RepackStrategy::Baseline).unwrap();

        assert_eq!(summary.cached, [true, false, true]);
        assert_eq!(summary.lookup_planes().collect::<Vec<_>>(), vec![1]);
        assert_eq!(cached.buffer(), baseline.buffer());
        assert_eq!(cached.pixel(1, 0, 1), Some(104));
    }

    #[test]
    fn test_sample_pair_overrun_writes_nothing() {
        // In bounds as a lookup table, but a stride of 3 sampled from
        // columns 0 and 1 runs past the buffer on row 1.
        let table = Vpat::from_entries(vec![0, 8], vec![0, 3, 1, 2]).unwrap();
        let mut src = InterleavedBuffer::packed(4, 2).unwrap();
        src.fill(9, 9, 9);
        let mut buf = PlaneBuffer::zeroed(13).unwrap();

        let err = repack_row_cached_into(
            &src,
            [&table, &table, &table],
            &mut buf,
            AffinityCheck::SamplePair,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::AddressOutOfRange {
                offset: 17,
                len: 13
            }
        ));
        assert!(buf.as_slice().iter().all(|&b| b == 0));

        // Verified affinity falls back to lookups and succeeds.
        let summary =
            repack_row_cached_into(&src, [&table, &table, &table], &mut buf, AffinityCheck::Verify)
                .unwrap();
        assert_eq!(summary.lookup_planes().count(), 3);
        assert_eq!(buf.get(11), Some(9));
    }

    #[test]
    fn test_overflowing_table_is_rejected() {
        let extreme = Vpat::from_entries(vec![isize::MAX], vec![1]).unwrap();
        let src = InterleavedBuffer::packed(1, 1).unwrap();
        let mut buf = PlaneBuffer::zeroed(4).unwrap();
        for strategy in [RepackStrategy::Baseline, RepackStrategy::RowCached] {
            let tables = [&extreme, &extreme, &extreme];
            let result = match strategy {
                RepackStrategy::Baseline => repack_baseline_into(&src, tables, &mut buf),
                RepackStrategy::RowCached => {
                    repack_row_cached_into(&src, tables, &mut buf, AffinityCheck::Verify)
                }
            };
            assert!(matches!(
                result,
                Err(Error::AddressOutOfRange {
                    offset: isize::MAX,
                    len: 4
                })
            ));
        }
    }

    #[test]
    fn test_sample_pair_trusts_first_two_columns() {
        let mut src = InterleavedBuffer::packed(3, 1).unwrap();
        src.fill(1, 2, 3);
        // Affine in x, so sampling is enough.
        let layout = PlaneLayout::with_row_order(RowOrder::TopDown)
            .packing(PlanePacking::PixelInterleaved);
        let mut dst = PlanarImage::with_layout(3, 3, 1, &layout).unwrap();
        let summary =
            repack_with(&src, &mut dst, RepackStrategy::RowCached, AffinityCheck::SamplePair)
                .unwrap();
        assert!(summary.all_cached());
        assert_eq!(dst.buffer().as_slice(), &[3, 2, 1, 3, 2, 1, 3, 2, 1]);
    }

    #[test]
    fn test_into_accepts_trait_objects() {
        let src = two_by_two();
        let a = Vpat::affine(2, 2, 2, -2, 1);
        let b = Vpat::affine(2, 2, 6, -2, 1);
        let c = Vpat::affine(2, 2, 10, -2, 1);
        let tables: [&dyn AddressTable; 3] = [&a, &b, &c];
        let mut buf = PlaneBuffer::zeroed(12).unwrap();
        repack_row_cached_into(&src, tables, &mut buf, AffinityCheck::Verify).unwrap();
        assert_eq!(
            buf.as_slice(),
            &[90, 120, 30, 60, 80, 110, 20, 50, 70, 100, 10, 40]
        );
    }
}
