//! pageplane-render - Page sources and the conversion driver
//!
//! Connects a page rasterizer to the planar repacker and an image sink.
//!
//! - [`PageSource`]: a paged document rasterized one page at a time
//! - [`RasterLibrary`] / [`RasterBackend`]: an owned handle around a
//!   rasterizer that needs global initialization and teardown
//! - [`SyntheticBackend`]: a backend drawing deterministic test pages,
//!   usable without any native library
//! - [`Converter`]: runs each page through geometry, rasterization,
//!   repacking and the sink, keeping failures local to their page
//!
//! # Example
//!
//! ```
//! use pageplane_core::PageSize;
//! use pageplane_io::{ImageFormat, MemorySink};
//! use pageplane_render::{ConvertOptions, Converter, SyntheticDocument};
//!
//! let mut doc = SyntheticDocument::new(vec![PageSize::new(72.0, 36.0); 2]);
//! let mut sink = MemorySink::new(ImageFormat::Bmp);
//! let converter = Converter::new(ConvertOptions::default().with_dpi(96.0));
//! let report = converter.convert_document(&mut doc, &mut sink);
//! assert!(report.is_complete());
//! assert_eq!(sink.pages().len(), 2);
//! ```

pub mod driver;
mod error;
pub mod library;
pub mod options;
pub mod source;
pub mod synthetic;

pub use driver::{ConversionReport, Converter, PageOutcome};
pub use error::{RenderError, RenderResult};
pub use library::{Document, LibraryConfig, RasterBackend, RasterLibrary};
pub use options::ConvertOptions;
pub use source::{PageSource, check_page_index};
pub use synthetic::{SyntheticBackend, SyntheticDocument, SyntheticState};
