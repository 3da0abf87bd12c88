//! Error types for pageplane-render
//!
//! Document-level failures (the library cannot start, a document cannot be
//! opened) are returned directly. Page-level failures are collected per
//! page by the driver and never stop the remaining pages.

use thiserror::Error;

/// pageplane-render error type
#[derive(Error, Debug)]
pub enum RenderError {
    /// The raster library rejected its configuration
    #[error("invalid library configuration: {0}")]
    InvalidConfig(String),

    /// A document could not be opened
    #[error("failed to open document '{path}': {message}")]
    DocumentOpen { path: String, message: String },

    /// Page index past the end of the document
    #[error("page index {index} out of range (document has {count} pages)")]
    PageIndex { index: usize, count: usize },

    /// The page source failed to rasterize a page
    #[error("failed to rasterize page {index}: {message}")]
    Rasterize { index: usize, message: String },

    /// The rasterized buffer does not have the size the page geometry
    /// promised
    #[error(
        "page {index} rasterized to {}x{}, expected {}x{}",
        .actual.0, .actual.1, .expected.0, .expected.1
    )]
    RasterSize {
        index: usize,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Allocation, address-table or repack failure
    #[error("core error: {0}")]
    Core(#[from] pageplane_core::Error),

    /// The image sink failed
    #[error("sink error: {0}")]
    Io(#[from] pageplane_io::IoError),
}

/// Result type alias for pageplane-render operations
pub type RenderResult<T> = Result<T, RenderError>;
