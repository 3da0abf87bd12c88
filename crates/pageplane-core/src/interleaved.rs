//! Interleaved page buffer
//!
//! The rasterizer hands each page over as one row-major byte buffer with
//! four bytes per pixel in blue, green, red, unused order. Row 0 is the
//! top of the page. Rows may be padded, so consecutive rows start
//! `stride` bytes apart with `stride >= width * 4`.

use crate::channel::{self, BYTES_PER_PIXEL};
use crate::error::{Error, Result};

/// Rasterized page in interleaved B-G-R-pad layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterleavedBuffer {
    width: u32,
    height: u32,
    stride: usize,
    data: Vec<u8>,
}

impl InterleavedBuffer {
    /// Wrap existing pixel data.
    ///
    /// `data` must hold at least `stride * height` bytes; any excess is kept
    /// but never read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStride`] if `stride < width * 4` and
    /// [`Error::BufferTooSmall`] if `data` is shorter than `stride * height`.
    pub fn new(width: u32, height: u32, stride: usize, data: Vec<u8>) -> Result<Self> {
        let min = Self::min_stride(width)?;
        if stride < min {
            return Err(Error::InvalidStride { stride, min });
        }
        let required = stride
            .checked_mul(height as usize)
            .ok_or(Error::AllocationFailed)?;
        if data.len() < required {
            return Err(Error::BufferTooSmall {
                len: data.len(),
                required,
            });
        }

        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    /// Allocate a zeroed buffer with the given row stride.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStride`] if `stride < width * 4` and
    /// [`Error::AllocationFailed`] if the buffer cannot be allocated.
    pub fn with_stride(width: u32, height: u32, stride: usize) -> Result<Self> {
        let min = Self::min_stride(width)?;
        if stride < min {
            return Err(Error::InvalidStride { stride, min });
        }
        let len = stride
            .checked_mul(height as usize)
            .ok_or(Error::AllocationFailed)?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| Error::AllocationFailed)?;
        data.resize(len, 0);

        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    /// Allocate a zeroed buffer without row padding.
    pub fn packed(width: u32, height: u32) -> Result<Self> {
        let stride = Self::min_stride(width)?;
        Self::with_stride(width, height, stride)
    }

    /// Smallest legal stride for `width` pixels.
    fn min_stride(width: u32) -> Result<usize> {
        (width as usize)
            .checked_mul(BYTES_PER_PIXEL)
            .ok_or(Error::AllocationFailed)
    }

    /// Get the width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the row stride in bytes.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Get the raw pixel bytes, padding included.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable access to the raw pixel bytes.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the buffer and return its bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Check whether the buffer holds no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Get the pixel bytes of row `y`, padding excluded.
    ///
    /// The returned slice is exactly `width * 4` bytes long.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize * BYTES_PER_PIXEL]
    }

    /// Get mutable access to the pixel bytes of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        let end = start + self.width as usize * BYTES_PER_PIXEL;
        &mut self.data[start..end]
    }

    /// Get the (blue, green, red) bytes at (x, y).
    ///
    /// Returns `None` if coordinates are out of bounds.
    pub fn bgr(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = x as usize * BYTES_PER_PIXEL;
        Some(channel::split_bgr(&self.row(y)[idx..idx + BYTES_PER_PIXEL]))
    }

    /// Set the (blue, green, red) bytes at (x, y). The pad byte is left as is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if coordinates are out of bounds.
    pub fn set_bgr(&mut self, x: u32, y: u32, b: u8, g: u8, r: u8) -> Result<()> {
        if x >= self.width {
            return Err(Error::IndexOutOfBounds {
                index: x as usize,
                len: self.width as usize,
            });
        }
        if y >= self.height {
            return Err(Error::IndexOutOfBounds {
                index: y as usize,
                len: self.height as usize,
            });
        }
        let idx = x as usize * BYTES_PER_PIXEL;
        let pixel = &mut self.row_mut(y)[idx..idx + BYTES_PER_PIXEL];
        pixel[channel::BLUE] = b;
        pixel[channel::GREEN] = g;
        pixel[channel::RED] = r;
        Ok(())
    }

    /// Set every pixel to one color, the way a renderer clears its
    /// background before drawing.
    pub fn fill(&mut self, b: u8, g: u8, r: u8) {
        for y in 0..self.height {
            for pixel in self.row_mut(y).chunks_exact_mut(BYTES_PER_PIXEL) {
                pixel[channel::BLUE] = b;
                pixel[channel::GREEN] = g;
                pixel[channel::RED] = r;
                pixel[channel::PAD] = 0xff;
            }
        }
    }
}
