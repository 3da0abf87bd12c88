//! Raster library handle
//!
//! Rasterizers backed by a native library usually need a global
//! initialize/teardown pair around all document work. [`RasterLibrary`]
//! turns that pair into an owned handle: [`RasterLibrary::init`] starts the
//! backend, dropping the handle (or calling [`RasterLibrary::destroy`])
//! shuts it down, and every [`Document`] opened through it borrows the
//! handle so it cannot outlive the library.

use crate::error::{RenderError, RenderResult};
use crate::source::PageSource;
use pageplane_core::{InterleavedBuffer, PageSize, Resolution};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Configuration handed to the backend on initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    /// Configuration structure version understood by the backend
    pub version: u32,
    /// Extra directories searched for fonts
    pub user_font_paths: Vec<PathBuf>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            version: 2,
            user_font_paths: Vec::new(),
        }
    }
}

impl LibraryConfig {
    /// Add a font directory.
    pub fn with_font_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.user_font_paths.push(path.into());
        self
    }

    /// Check the configuration before it reaches a backend.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidConfig`] for version 0 or a font path
    /// that is not a directory.
    pub fn validate(&self) -> RenderResult<()> {
        if self.version == 0 {
            return Err(RenderError::InvalidConfig(
                "config version must be at least 1".to_string(),
            ));
        }
        if let Some(path) = self.user_font_paths.iter().find(|p| !p.is_dir()) {
            return Err(RenderError::InvalidConfig(format!(
                "font path '{}' is not a directory",
                path.display()
            )));
        }
        Ok(())
    }
}

/// A rasterizer implementation behind a [`RasterLibrary`]
pub trait RasterBackend {
    /// Document type produced by [`RasterBackend::open_document`]
    type Document: PageSource;

    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Start the backend. Called once by [`RasterLibrary::init`].
    fn initialize(&mut self, config: &LibraryConfig) -> RenderResult<()>;

    /// Open a document, optionally protected by `password`.
    fn open_document(&self, path: &Path, password: Option<&str>) -> RenderResult<Self::Document>;

    /// Stop the backend. Called exactly once when the library is dropped.
    fn shutdown(&mut self);
}

/// Initialized raster library
#[derive(Debug)]
pub struct RasterLibrary<B: RasterBackend> {
    backend: B,
    config: LibraryConfig,
}

impl<B: RasterBackend> RasterLibrary<B> {
    /// Validate `config` and initialize `backend` with it.
    pub fn init(mut backend: B, config: LibraryConfig) -> RenderResult<Self> {
        config.validate()?;
        backend.initialize(&config)?;
        log::info!(
            "{} raster library initialized (config v{})",
            backend.name(),
            config.version
        );
        Ok(Self { backend, config })
    }

    /// Get the configuration the library was started with.
    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    /// Get the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Open a document through the library.
    pub fn open_document<P: AsRef<Path>>(
        &self,
        path: P,
        password: Option<&str>,
    ) -> RenderResult<Document<'_, B::Document>> {
        let path = path.as_ref();
        let inner = self.backend.open_document(path, password)?;
        log::info!(
            "opened '{}' ({} pages)",
            path.display(),
            inner.page_count()
        );
        Ok(Document {
            inner,
            _library: PhantomData,
        })
    }

    /// Shut the library down now.
    pub fn destroy(self) {
        drop(self);
    }
}

impl<B: RasterBackend> Drop for RasterLibrary<B> {
    fn drop(&mut self) {
        self.backend.shutdown();
        log::debug!("{} raster library shut down", self.backend.name());
    }
}

/// Document opened through a [`RasterLibrary`], borrowing it
#[derive(Debug)]
pub struct Document<'lib, D> {
    inner: D,
    _library: PhantomData<&'lib ()>,
}

impl<D> Document<'_, D> {
    /// Get the backend document.
    pub fn inner(&self) -> &D {
        &self.inner
    }
}

impl<D: PageSource> PageSource for Document<'_, D> {
    fn page_count(&self) -> usize {
        self.inner.page_count()
    }

    fn page_size(&self, index: usize) -> RenderResult<PageSize> {
        self.inner.page_size(index)
    }

    fn rasterize(
        &mut self,
        index: usize,
        resolution: Resolution,
    ) -> RenderResult<InterleavedBuffer> {
        self.inner.rasterize(index, resolution)
    }

    fn set_background(&mut self, rgb: [u8; 3]) {
        self.inner.set_background(rgb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{SyntheticBackend, SyntheticDocument};

    #[test]
    fn test_config_validation() {
        assert!(LibraryConfig::default().validate().is_ok());
        let zero = LibraryConfig {
            version: 0,
            ..LibraryConfig::default()
        };
        assert!(matches!(zero.validate(), Err(RenderError::InvalidConfig(_))));
        let missing = LibraryConfig::default().with_font_path("/no/such/font/dir");
        assert!(matches!(
            missing.validate(),
            Err(RenderError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_init_and_shutdown() {
        let backend = SyntheticBackend::new();
        let state = backend.state();
        let library = RasterLibrary::init(backend, LibraryConfig::default()).unwrap();
        assert!(state.is_initialized());
        library.destroy();
        assert!(!state.is_initialized());
        assert_eq!(state.shutdowns(), 1);
    }

    #[test]
    fn test_open_registered_document() {
        let mut backend = SyntheticBackend::new();
        backend.register("a.pdf", SyntheticDocument::new(vec![PageSize::LETTER; 2]));
        let library = RasterLibrary::init(backend, LibraryConfig::default()).unwrap();
        let doc = library.open_document("a.pdf", None).unwrap();
        assert_eq!(doc.page_count(), 2);
        assert!(library.open_document("b.pdf", None).is_err());
    }
}
