//! pageplane Core - pixel containers and the planar repacker
//!
//! This crate provides the data structures and the one algorithm with real
//! content in pageplane: moving a rasterized page out of an interleaved
//! 4-bytes-per-pixel buffer into a planar image whose planes are reached
//! through per-axis address tables.
//!
//! - [`InterleavedBuffer`] - Rasterized page, B-G-R-pad bytes, top-down rows
//! - [`PlanarImage`] - Planar destination with one [`Vpat`] per plane
//! - [`AddressTable`] - The per-plane `row_offset` / `col_offset` lookup
//! - [`PlaneLayout`] - Storage description used to build address tables
//! - [`repack`] - Baseline and row-cached repackers
//! - [`geometry`] - Page size in points to pixel dimensions
//!
//! # Example
//!
//! ```
//! use pageplane_core::{InterleavedBuffer, PlanarImage, RepackStrategy, repack};
//!
//! let mut src = InterleavedBuffer::packed(4, 2).unwrap();
//! src.fill(10, 20, 30);
//!
//! let mut dst = PlanarImage::allocate(3, 4, 2, true).unwrap();
//! repack(&src, &mut dst, RepackStrategy::RowCached).unwrap();
//! assert_eq!(dst.rgb(3, 1), Some((30, 20, 10)));
//! ```

pub mod error;
pub mod format;
pub mod geometry;
pub mod interleaved;
pub mod planar;
pub mod repack;

pub use error::{Error, Result};
pub use format::ImageFormat;
pub use geometry::{PageSize, Resolution, pixel_dimensions};
pub use interleaved::InterleavedBuffer;
pub use planar::{
    AddressTable, MAX_PLANES, PlanarImage, PlaneBuffer, PlaneLayout, PlanePacking, RowOrder,
    Vpat, is_injective,
};
pub use repack::{
    AffinityCheck, RepackStrategy, RepackSummary, repack, repack_baseline,
    repack_baseline_into, repack_row_cached, repack_row_cached_into, repack_with,
};

/// Byte positions inside one interleaved source pixel and the plane order
/// of the planar destination.
///
/// # Pixel format
///
/// Source pixels are 4 bytes: blue, green, red, unused. Destination planes
/// are red (0), green (1), blue (2).
pub mod channel {
    /// Blue byte of a source pixel
    pub const BLUE: usize = 0;
    /// Green byte of a source pixel
    pub const GREEN: usize = 1;
    /// Red byte of a source pixel
    pub const RED: usize = 2;
    /// Padding byte of a source pixel, never read
    pub const PAD: usize = 3;

    /// Bytes per interleaved source pixel
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Red plane index
    pub const RED_PLANE: u32 = 0;
    /// Green plane index
    pub const GREEN_PLANE: u32 = 1;
    /// Blue plane index
    pub const BLUE_PLANE: u32 = 2;

    /// Number of color planes filled by the repacker
    pub const COLOR_PLANES: usize = 3;

    /// Source byte feeding each destination plane, indexed by plane.
    pub const SOURCE_BYTE: [usize; COLOR_PLANES] = [RED, GREEN, BLUE];

    /// Split a source pixel into its (blue, green, red) bytes.
    ///
    /// # Panics
    ///
    /// Panics if `pixel` is shorter than 3 bytes.
    #[inline]
    pub fn split_bgr(pixel: &[u8]) -> (u8, u8, u8) {
        (pixel[BLUE], pixel[GREEN], pixel[RED])
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_source_byte_order() {
            let pixel = [10u8, 20, 30, 0];
            assert_eq!(pixel[SOURCE_BYTE[RED_PLANE as usize]], 30);
            assert_eq!(pixel[SOURCE_BYTE[GREEN_PLANE as usize]], 20);
            assert_eq!(pixel[SOURCE_BYTE[BLUE_PLANE as usize]], 10);
        }

        #[test]
        fn test_split_bgr_ignores_pad() {
            assert_eq!(split_bgr(&[1, 2, 3, 255]), (1, 2, 3));
            assert_eq!(PAD, BYTES_PER_PIXEL - 1);
        }
    }
}
