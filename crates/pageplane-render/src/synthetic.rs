//! Synthetic raster backend
//!
//! A [`RasterBackend`] that needs no native library. Its documents are
//! lists of page sizes, registered in memory or read from a small text
//! file, and every page is drawn as a deterministic test pattern: the
//! background color, a one-pixel black frame, and a horizontal gradient
//! band whose green level encodes the page index.
//!
//! # Document files
//!
//! One page per line as `<width_pt> <height_pt>`, optionally followed by
//! `fail` to make that page's rasterization fail. A line
//! `password <secret>` protects the document. Empty lines and lines
//! starting with `#` are ignored.
//!
//! ```text
//! # two Letter pages, the second one broken
//! 612 792
//! 612 792 fail
//! ```

use crate::error::{RenderError, RenderResult};
use crate::library::{LibraryConfig, RasterBackend};
use crate::source::{PageSource, check_page_index};
use pageplane_core::{InterleavedBuffer, PageSize, Resolution, pixel_dimensions};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Row alignment of rasterized buffers, in bytes
pub const DEFAULT_ROW_ALIGNMENT: usize = 64;

/// Green level step per page index in the gradient band
const PAGE_MARK_STEP: usize = 40;

/// In-memory paged document drawn as a test pattern
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticDocument {
    pages: Vec<PageSize>,
    password: Option<String>,
    failing: Vec<usize>,
    background: [u8; 3],
    row_alignment: usize,
}

impl SyntheticDocument {
    /// Create a document with the given page sizes.
    pub fn new(pages: Vec<PageSize>) -> Self {
        Self {
            pages,
            password: None,
            failing: Vec::new(),
            background: [255, 255, 255],
            row_alignment: DEFAULT_ROW_ALIGNMENT,
        }
    }

    /// Require `password` to open the document.
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    /// Make rasterization of page `index` fail.
    pub fn with_failing_page(mut self, index: usize) -> Self {
        self.failing.push(index);
        self
    }

    /// Pad rasterized rows to a multiple of `align` bytes (at least 1).
    pub fn with_row_alignment(mut self, align: usize) -> Self {
        self.row_alignment = align.max(1);
        self
    }

    /// Parse the text document format described in the module docs.
    ///
    /// The error message names the offending line.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut doc = Self::new(Vec::new());
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                ["password", secret] => doc.password = Some(secret.to_string()),
                [w, h, rest @ ..] => {
                    let width = w.parse::<f64>();
                    let height = h.parse::<f64>();
                    let (Ok(width), Ok(height)) = (width, height) else {
                        return Err(format!("line {}: bad page size '{line}'", lineno + 1));
                    };
                    match rest {
                        [] => {}
                        ["fail"] => doc.failing.push(doc.pages.len()),
                        _ => return Err(format!("line {}: unexpected '{line}'", lineno + 1)),
                    }
                    doc.pages.push(PageSize::new(width, height));
                }
                _ => return Err(format!("line {}: unexpected '{line}'", lineno + 1)),
            }
        }
        Ok(doc)
    }

    /// Get the page sizes.
    pub fn pages(&self) -> &[PageSize] {
        &self.pages
    }

    fn unlock(&self, password: Option<&str>) -> bool {
        match &self.password {
            None => true,
            Some(expected) => password == Some(expected.as_str()),
        }
    }
}

/// Draw the frame and the gradient band.
fn draw_pattern(buf: &mut InterleavedBuffer, index: usize) -> RenderResult<()> {
    let (w, h) = (buf.width(), buf.height());
    if w == 0 || h == 0 {
        return Ok(());
    }

    for x in 0..w {
        buf.set_bgr(x, 0, 0, 0, 0)?;
        buf.set_bgr(x, h - 1, 0, 0, 0)?;
    }
    for y in 0..h {
        buf.set_bgr(0, y, 0, 0, 0)?;
        buf.set_bgr(w - 1, y, 0, 0, 0)?;
    }

    let green = (index * PAGE_MARK_STEP % 256) as u8;
    let span = (w as usize).saturating_sub(1).max(1);
    for y in (h / 8).max(1)..(h / 4).min(h - 1) {
        for x in 1..w - 1 {
            let blue = (x as usize * 255 / span) as u8;
            buf.set_bgr(x, y, blue, green, 255 - blue)?;
        }
    }
    Ok(())
}

impl PageSource for SyntheticDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, index: usize) -> RenderResult<PageSize> {
        check_page_index(index, self.pages.len())?;
        Ok(self.pages[index])
    }

    fn rasterize(
        &mut self,
        index: usize,
        resolution: Resolution,
    ) -> RenderResult<InterleavedBuffer> {
        let size = self.page_size(index)?;
        if self.failing.contains(&index) {
            return Err(RenderError::Rasterize {
                index,
                message: "page marked as broken".to_string(),
            });
        }

        let (width, height) = pixel_dimensions(size, resolution)?;
        let stride = (width as usize * 4).next_multiple_of(self.row_alignment);
        let mut buf = InterleavedBuffer::with_stride(width, height, stride)?;
        let [r, g, b] = self.background;
        buf.fill(b, g, r);
        draw_pattern(&mut buf, index)?;

        log::trace!("synthetic page {index}: {width}x{height}, stride {stride}");
        Ok(buf)
    }

    fn set_background(&mut self, rgb: [u8; 3]) {
        self.background = rgb;
    }
}

/// Shared view of a [`SyntheticBackend`]'s lifecycle, for tests
#[derive(Debug, Clone, Default)]
pub struct SyntheticState {
    initialized: Arc<AtomicBool>,
    shutdowns: Arc<AtomicUsize>,
}

impl SyntheticState {
    /// Check whether the backend is between initialize and shutdown.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Number of shutdowns so far.
    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

/// Backend serving [`SyntheticDocument`]s
#[derive(Debug, Default)]
pub struct SyntheticBackend {
    documents: HashMap<PathBuf, SyntheticDocument>,
    state: SyntheticState,
}

impl SyntheticBackend {
    /// Create a backend with no registered documents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `document` for `path` instead of reading the file.
    pub fn register<P: Into<PathBuf>>(&mut self, path: P, document: SyntheticDocument) {
        self.documents.insert(path.into(), document);
    }

    /// Get a handle observing initialization and shutdown.
    pub fn state(&self) -> SyntheticState {
        self.state.clone()
    }
}

impl RasterBackend for SyntheticBackend {
    type Document = SyntheticDocument;

    fn name(&self) -> &str {
        "synthetic"
    }

    fn initialize(&mut self, config: &LibraryConfig) -> RenderResult<()> {
        if self.state.initialized.swap(true, Ordering::SeqCst) {
            return Err(RenderError::InvalidConfig(
                "backend is already initialized".to_string(),
            ));
        }
        log::debug!(
            "synthetic backend ignores {} font path(s)",
            config.user_font_paths.len()
        );
        Ok(())
    }

    fn open_document(&self, path: &Path, password: Option<&str>) -> RenderResult<Self::Document> {
        let open_error = |message: String| RenderError::DocumentOpen {
            path: path.display().to_string(),
            message,
        };

        if !self.state.is_initialized() {
            return Err(open_error("library is not initialized".to_string()));
        }

        let document = match self.documents.get(path) {
            Some(doc) => doc.clone(),
            None => {
                let text = std::fs::read_to_string(path).map_err(|e| open_error(e.to_string()))?;
                SyntheticDocument::parse(&text).map_err(open_error)?
            }
        };

        if !document.unlock(password) {
            return Err(open_error("incorrect password".to_string()));
        }
        Ok(document)
    }

    fn shutdown(&mut self) {
        self.state.initialized.store(false, Ordering::SeqCst);
        self.state.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}
