//! Error types for pageplane-core
//!
//! Provides a unified error type for buffer construction, planar image
//! allocation, address-table acquisition and repacking. Each variant
//! carries enough context to tell which page resource was at fault.

use thiserror::Error;

/// pageplane-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Row stride shorter than one row of 4-byte pixels
    #[error("invalid stride: {stride} bytes, need at least {min}")]
    InvalidStride { stride: usize, min: usize },

    /// Pixel data shorter than `stride * height`
    #[error("buffer too small: {len} bytes, need {required}")]
    BufferTooSmall { len: usize, required: usize },

    /// Source and destination dimensions differ
    #[error("dimension mismatch: expected {}x{}, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Unsupported number of planes
    #[error("invalid plane count: {0}")]
    InvalidPlaneCount(u32),

    /// The address table of a plane could not be acquired
    #[error("address table unavailable for plane {plane} (image has {count} planes)")]
    PlaneUnavailable { plane: u32, count: u32 },

    /// A computed address falls outside the plane buffer
    #[error("address {offset} out of range for plane buffer of {len} bytes")]
    AddressOutOfRange { offset: isize, len: usize },

    /// Two logical pixels of one plane map to the same byte
    #[error("address table of plane {plane} maps two pixels to the same byte")]
    AddressAliasing { plane: u32 },

    /// Page size or resolution cannot be turned into pixel dimensions
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Memory allocation failed
    #[error("memory allocation failed")]
    AllocationFailed,
}

/// Result type alias for pageplane-core operations
pub type Result<T> = std::result::Result<T, Error>;
