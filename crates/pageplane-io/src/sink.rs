//! Image sinks
//!
//! An [`ImageSink`] receives every successfully converted page. Sinks only
//! look at images through their logical accessors, so the storage layout
//! chosen for conversion never leaks into the output.

use crate::{IoResult, write_image, write_image_mem};
use pageplane_core::{ImageFormat, PlanarImage};
use std::fs;
use std::path::{Path, PathBuf};

/// Destination for converted pages
///
/// Images of zero width or height are not encodable as PNG or TIFF; the
/// conversion driver never hands them to a sink.
pub trait ImageSink {
    /// Encode one page. `page_index` is zero-based.
    fn encode(&mut self, page_index: usize, image: &PlanarImage) -> IoResult<()>;
}

impl<S: ImageSink + ?Sized> ImageSink for &mut S {
    fn encode(&mut self, page_index: usize, image: &PlanarImage) -> IoResult<()> {
        (**self).encode(page_index, image)
    }
}

/// Writes each page to its own file in a directory.
///
/// Page `i` goes to `<dir>/<stem>-<NNN>.<ext>` where `NNN` is the
/// one-based page number, zero-padded to three digits.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    stem: String,
    format: ImageFormat,
    written: Vec<PathBuf>,
}

impl FileSink {
    /// Create a sink writing into `dir`, creating the directory if needed.
    pub fn create<P: AsRef<Path>>(dir: P, stem: &str, format: ImageFormat) -> IoResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            stem: stem.to_string(),
            format,
            written: Vec::new(),
        })
    }

    /// Output path for a zero-based page index.
    pub fn path_for(&self, page_index: usize) -> PathBuf {
        self.dir.join(format!(
            "{}-{:03}.{}",
            self.stem,
            page_index + 1,
            self.format.extension()
        ))
    }

    /// Get the output format.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Files written so far, in the order they were written.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ImageSink for FileSink {
    fn encode(&mut self, page_index: usize, image: &PlanarImage) -> IoResult<()> {
        let path = self.path_for(page_index);
        write_image(image, &path, self.format)?;
        log::debug!("page {page_index} written to {}", path.display());
        self.written.push(path);
        Ok(())
    }
}

/// Keeps encoded pages in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    format: ImageFormat,
    pages: Vec<(usize, Vec<u8>)>,
}

impl MemorySink {
    /// Create an empty sink encoding to `format`.
    pub fn new(format: ImageFormat) -> Self {
        Self {
            format,
            pages: Vec::new(),
        }
    }

    /// Encoded pages as (page index, bytes), in arrival order.
    pub fn pages(&self) -> &[(usize, Vec<u8>)] {
        &self.pages
    }

    /// Encoded bytes of one page, if it arrived.
    pub fn page(&self, page_index: usize) -> Option<&[u8]> {
        self.pages
            .iter()
            .find(|(i, _)| *i == page_index)
            .map(|(_, data)| data.as_slice())
    }

    /// Consume the sink and return its pages.
    pub fn into_pages(self) -> Vec<(usize, Vec<u8>)> {
        self.pages
    }
}

impl ImageSink for MemorySink {
    fn encode(&mut self, page_index: usize, image: &PlanarImage) -> IoResult<()> {
        let data = write_image_mem(image, self.format)?;
        log::trace!("page {page_index} encoded, {} bytes", data.len());
        self.pages.push((page_index, data));
        Ok(())
    }
}
