//! Page source
//!
//! The seam between the conversion driver and whatever turns a document
//! page into pixels. A source reports its pages' physical sizes and
//! rasterizes one page at a time into an [`InterleavedBuffer`].
//!
//! A source must size its buffers with
//! [`pageplane_core::pixel_dimensions`]; the driver allocates the planar
//! destination with the same function and rejects any buffer that
//! disagrees.

use crate::error::{RenderError, RenderResult};
use pageplane_core::{InterleavedBuffer, PageSize, Resolution};

/// A paged document that can be rasterized page by page
pub trait PageSource {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Physical size of page `index`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::PageIndex`] for an index past the end.
    fn page_size(&self, index: usize) -> RenderResult<PageSize>;

    /// Rasterize page `index` at `resolution`, top row first, B-G-R-pad
    /// pixels.
    fn rasterize(
        &mut self,
        index: usize,
        resolution: Resolution,
    ) -> RenderResult<InterleavedBuffer>;

    /// Set the RGB color the page is cleared to before drawing. Sources
    /// that always draw an opaque background may ignore it.
    fn set_background(&mut self, _rgb: [u8; 3]) {}
}

impl<S: PageSource + ?Sized> PageSource for &mut S {
    fn page_count(&self) -> usize {
        (**self).page_count()
    }

    fn page_size(&self, index: usize) -> RenderResult<PageSize> {
        (**self).page_size(index)
    }

    fn rasterize(
        &mut self,
        index: usize,
        resolution: Resolution,
    ) -> RenderResult<InterleavedBuffer> {
        (**self).rasterize(index, resolution)
    }

    fn set_background(&mut self, rgb: [u8; 3]) {
        (**self).set_background(rgb)
    }
}

/// Check `index` against a page count.
pub fn check_page_index(index: usize, count: usize) -> RenderResult<()> {
    if index >= count {
        return Err(RenderError::PageIndex { index, count });
    }
    Ok(())
}
