//! Page conversion driver
//!
//! Runs every page of a [`PageSource`] through the same pipeline:
//!
//! 1. page size to pixel dimensions ([`pixel_dimensions`])
//! 2. rasterize into an interleaved B-G-R-pad buffer
//! 3. check the buffer against the expected dimensions
//! 4. allocate a three-plane destination with the configured layout
//! 5. repack the buffer into the planes
//! 6. hand the planar image to an [`ImageSink`]
//!
//! Pages of zero width or height skip step 6; most formats cannot encode
//! them. Any failure in steps 1 to 6 is local to its page. It is logged,
//! recorded in the [`ConversionReport`], and the next page is attempted.
//! Each page is attempted exactly once.

use crate::error::{RenderError, RenderResult};
use crate::library::{RasterBackend, RasterLibrary};
use crate::options::ConvertOptions;
use crate::source::{PageSource, check_page_index};
use pageplane_core::channel::COLOR_PLANES;
use pageplane_core::{PlanarImage, pixel_dimensions, repack_with};
use pageplane_io::ImageSink;
use std::path::Path;

/// Result of converting one page
#[derive(Debug)]
pub enum PageOutcome {
    /// The page was repacked and, unless it has zero area, accepted by the
    /// sink
    Converted {
        /// Page index
        index: usize,
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
    /// The page was skipped
    Failed {
        /// Page index
        index: usize,
        /// Why the page failed
        error: RenderError,
    },
}

impl PageOutcome {
    /// Page index this outcome belongs to.
    pub fn index(&self) -> usize {
        match self {
            PageOutcome::Converted { index, .. } | PageOutcome::Failed { index, .. } => *index,
        }
    }

    /// Check whether the page was converted.
    pub fn is_converted(&self) -> bool {
        matches!(self, PageOutcome::Converted { .. })
    }
}

/// Per-page outcomes of a document conversion, in page order
#[derive(Debug, Default)]
pub struct ConversionReport {
    outcomes: Vec<PageOutcome>,
}

impl ConversionReport {
    /// All outcomes, one per page.
    pub fn outcomes(&self) -> &[PageOutcome] {
        &self.outcomes
    }

    /// Number of pages attempted.
    pub fn page_count(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of converted pages.
    pub fn converted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_converted()).count()
    }

    /// Failed pages with their errors.
    pub fn failed(&self) -> impl Iterator<Item = (usize, &RenderError)> + '_ {
        self.outcomes.iter().filter_map(|o| match o {
            PageOutcome::Failed { index, error } => Some((*index, error)),
            PageOutcome::Converted { .. } => None,
        })
    }

    /// Check whether every page was converted.
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(PageOutcome::is_converted)
    }
}

/// Converts pages to planar images
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    /// Create a converter.
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Get the options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Rasterize page `index` of `source` and repack it into a new planar
    /// image.
    ///
    /// # Errors
    ///
    /// - [`RenderError::PageIndex`] for an index past the end
    /// - [`RenderError::RasterSize`] if the source returned a buffer of
    ///   other dimensions than the page geometry gives
    /// - [`RenderError::Core`] for geometry, allocation or repack failures
    /// - whatever the source returns from rasterization
    pub fn convert_page<S: PageSource + ?Sized>(
        &self,
        source: &mut S,
        index: usize,
    ) -> RenderResult<PlanarImage> {
        check_page_index(index, source.page_count())?;
        let size = source.page_size(index)?;
        let expected = pixel_dimensions(size, self.options.resolution)?;

        source.set_background(self.options.background);
        let raster = source.rasterize(index, self.options.resolution)?;
        let actual = (raster.width(), raster.height());
        if actual != expected {
            return Err(RenderError::RasterSize {
                index,
                expected,
                actual,
            });
        }

        let (width, height) = expected;
        let mut image =
            PlanarImage::with_layout(COLOR_PLANES as u32, width, height, &self.options.layout)?;
        let summary = repack_with(
            &raster,
            &mut image,
            self.options.strategy,
            self.options.affinity,
        )?;

        log::debug!(
            "page {index}: {width}x{height} px, {:?} repack, cached planes {:?}",
            self.options.strategy,
            summary.cached
        );
        Ok(image)
    }

    /// Convert every page of `source` and pass the results to `sink`.
    ///
    /// Never stops early: a page that fails is recorded in the report and
    /// the next page is attempted. A page that rounds to zero pixels on
    /// either axis is converted but not passed to the sink.
    pub fn convert_document<S, K>(&self, source: &mut S, sink: &mut K) -> ConversionReport
    where
        S: PageSource + ?Sized,
        K: ImageSink + ?Sized,
    {
        let count = source.page_count();
        log::info!(
            "converting {count} page(s) at {}x{} dpi",
            self.options.resolution.x_dpi,
            self.options.resolution.y_dpi
        );

        let mut report = ConversionReport::default();
        for index in 0..count {
            let result = self.convert_page(source, index).and_then(|image| {
                let (width, height) = (image.width(), image.height());
                if width == 0 || height == 0 {
                    log::warn!("page {index} is {width}x{height} px, nothing to encode");
                } else {
                    sink.encode(index, &image)?;
                }
                Ok((width, height))
            });
            let outcome = match result {
                Ok((width, height)) => PageOutcome::Converted {
                    index,
                    width,
                    height,
                },
                Err(error) => {
                    log::warn!("page {index} skipped: {error}");
                    PageOutcome::Failed { index, error }
                }
            };
            report.outcomes.push(outcome);
        }

        log::info!(
            "converted {} of {} page(s)",
            report.converted(),
            report.page_count()
        );
        report
    }

    /// Open `path` through `library` and convert the whole document.
    ///
    /// # Errors
    ///
    /// Returns the open failure. Page failures are in the report.
    pub fn convert_path<B, P, K>(
        &self,
        library: &RasterLibrary<B>,
        path: P,
        password: Option<&str>,
        sink: &mut K,
    ) -> RenderResult<ConversionReport>
    where
        B: RasterBackend,
        P: AsRef<Path>,
        K: ImageSink + ?Sized,
    {
        let mut document = library.open_document(path, password)?;
        Ok(self.convert_document(&mut document, sink))
    }
}
