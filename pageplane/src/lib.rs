//! pageplane - Rasterized pages to planar images
//!
//! Takes pages rasterized as interleaved B-G-R-pad pixels and copies them
//! into the separate red, green and blue planes of a planar image. Every
//! destination byte is addressed through per-plane address tables, so the
//! same repacker serves bottom-up, top-down, padded and pixel-interleaved
//! storage.
//!
//! # Overview
//!
//! - [`PlanarImage`], [`Vpat`] and [`AddressTable`]: planar storage and
//!   its per-axis address tables
//! - [`repack()`]: baseline and row-cached repackers
//! - [`pixel_dimensions`]: page size in points to pixels
//! - [`io`]: BMP, PNG and TIFF sinks
//! - [`render`]: page sources, the raster library handle and the
//!   conversion driver
//!
//! # Example
//!
//! ```
//! use pageplane::{InterleavedBuffer, PlanarImage, RepackStrategy, repack};
//!
//! let mut page = InterleavedBuffer::packed(4, 2).unwrap();
//! page.set_bgr(0, 0, 10, 20, 30).unwrap();
//!
//! let mut image = PlanarImage::allocate(3, 4, 2, true).unwrap();
//! repack(&page, &mut image, RepackStrategy::RowCached).unwrap();
//! assert_eq!(image.rgb(0, 0), Some((30, 20, 10)));
//! ```

// Re-export core types (primary data structures used everywhere)
pub use pageplane_core::*;

// Re-export the outer crates as modules
pub use pageplane_io as io;
pub use pageplane_render as render;
