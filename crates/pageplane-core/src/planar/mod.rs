//! Planar image - the repacker's destination
//!
//! A [`PlanarImage`] owns one byte buffer shared by all of its planes and
//! one [`Vpat`] per plane. The sample of plane `p` at logical pixel (x, y)
//! lives at `tables[p].row_offset(y) + tables[p].col_offset(x)` inside the
//! buffer. Nothing outside this module assumes a particular stride, row
//! order or plane packing; everything goes through the tables.
//!
//! # Plane order
//!
//! Color images use plane 0 for red, 1 for green and 2 for blue. A fourth
//! plane may be allocated but is never written by the repacker.
//!
//! # See also
//!
//! - [`PlaneLayout`] for the storage arrangements this crate can build
//! - [`crate::repack`] for the code that fills the planes

mod layout;
pub mod vpat;

pub use layout::{PlaneLayout, PlanePacking, RowOrder};
pub use vpat::{AddressTable, Vpat, is_injective};

use crate::channel::{BLUE_PLANE, COLOR_PLANES, GREEN_PLANE, RED_PLANE};
use crate::error::{Error, Result};

/// Largest plane count accepted by the allocators
pub const MAX_PLANES: u32 = 4;

// ============================================================================
// PlaneBuffer
// ============================================================================

/// Backing storage shared by all planes of a [`PlanarImage`]
///
/// Offsets are signed to match [`AddressTable`]; any offset outside
/// `0..len()` is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaneBuffer {
    data: Vec<u8>,
}

impl PlaneBuffer {
    /// Allocate a zero-filled buffer of `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the memory cannot be reserved.
    pub fn zeroed(len: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| Error::AllocationFailed)?;
        data.resize(len, 0);
        Ok(Self { data })
    }

    /// Get the buffer length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check whether the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the raw bytes in storage order.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    fn index(&self, offset: isize) -> Result<usize> {
        usize::try_from(offset)
            .ok()
            .filter(|&i| i < self.data.len())
            .ok_or(Error::AddressOutOfRange {
                offset,
                len: self.data.len(),
            })
    }

    /// Get the byte at `offset`, or `None` if it is out of range.
    #[inline]
    pub fn get(&self, offset: isize) -> Option<u8> {
        self.index(offset).ok().map(|i| self.data[i])
    }

    /// Store one byte.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AddressOutOfRange`] if `offset` is outside the buffer.
    #[inline]
    pub fn store(&mut self, offset: isize, value: u8) -> Result<()> {
        let i = self.index(offset)?;
        self.data[i] = value;
        Ok(())
    }

    /// Check that both ends of a run of addresses lie inside the buffer.
    pub(crate) fn check_span(&self, first: isize, last: isize) -> Result<()> {
        self.index(first)?;
        self.index(last)?;
        Ok(())
    }

    /// Store one byte without a bounds check.
    ///
    /// # Safety
    ///
    /// `offset` must satisfy `0 <= offset < self.len()`.
    #[inline]
    pub(crate) unsafe fn store_unchecked(&mut self, offset: isize, value: u8) {
        debug_assert!(offset >= 0 && (offset as usize) < self.data.len());
        // SAFETY: the caller guarantees the offset is in range.
        unsafe {
            *self.data.get_unchecked_mut(offset as usize) = value;
        }
    }
}

// ============================================================================
// PlanarImage
// ============================================================================

/// Multi-plane 8-bit image addressed through per-plane address tables
#[derive(Debug, Clone)]
pub struct PlanarImage {
    width: u32,
    height: u32,
    buffer: PlaneBuffer,
    tables: Vec<Vpat>,
    layout: Option<PlaneLayout>,
}

impl PlanarImage {
    /// Allocate a zero-filled image with plane-major, unpadded storage.
    ///
    /// With `bottom_up` set, logical row 0 is stored last in every plane,
    /// the way bitmap files store their rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPlaneCount`] unless `1 <= plane_count <= 4`
    /// and [`Error::AllocationFailed`] if the buffer size overflows or
    /// cannot be reserved.
    pub fn allocate(plane_count: u32, width: u32, height: u32, bottom_up: bool) -> Result<Self> {
        let row_order = if bottom_up {
            RowOrder::BottomUp
        } else {
            RowOrder::TopDown
        };
        Self::with_layout(
            plane_count,
            width,
            height,
            &PlaneLayout::with_row_order(row_order),
        )
    }

    /// Allocate a zero-filled image with an explicit storage layout.
    ///
    /// # Errors
    ///
    /// See [`PlanarImage::allocate`]. A layout with zero row alignment is
    /// rejected with [`Error::InvalidParameter`].
    pub fn with_layout(
        plane_count: u32,
        width: u32,
        height: u32,
        layout: &PlaneLayout,
    ) -> Result<Self> {
        check_plane_count(plane_count)?;
        let built = layout.build(plane_count, width, height)?;
        let buffer = PlaneBuffer::zeroed(built.buffer_len)?;
        log::trace!(
            "allocated {plane_count}-plane {width}x{height} image, {} bytes, {layout:?}",
            built.buffer_len
        );

        Ok(Self {
            width,
            height,
            buffer,
            tables: built.tables,
            layout: Some(*layout),
        })
    }

    /// Build an image over caller-supplied address tables.
    ///
    /// Every table must cover exactly `width` columns and `height` rows,
    /// every address it produces must fall inside a zeroed buffer of
    /// `buffer_len` bytes, and no two pixels of one plane may share a byte.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPlaneCount`] unless `1 <= tables.len() <= 4`
    /// - [`Error::DimensionMismatch`] if a table has the wrong shape
    /// - [`Error::AddressOutOfRange`] if a table reaches outside the buffer
    /// - [`Error::AddressAliasing`] if a table is not injective
    pub fn from_tables(
        width: u32,
        height: u32,
        buffer_len: usize,
        tables: Vec<Vpat>,
    ) -> Result<Self> {
        let plane_count = u32::try_from(tables.len()).unwrap_or(u32::MAX);
        check_plane_count(plane_count)?;

        for (plane, table) in tables.iter().enumerate() {
            if table.cols() != width || table.rows() != height {
                return Err(Error::DimensionMismatch {
                    expected: (width, height),
                    actual: (table.cols(), table.rows()),
                });
            }
            if let Some((lo, hi)) = table.extent() {
                for offset in [lo, hi] {
                    if offset < 0 || offset as usize >= buffer_len {
                        return Err(Error::AddressOutOfRange {
                            offset,
                            len: buffer_len,
                        });
                    }
                }
            }
            if !is_injective(table) {
                return Err(Error::AddressAliasing {
                    plane: plane as u32,
                });
            }
        }

        Ok(Self {
            width,
            height,
            buffer: PlaneBuffer::zeroed(buffer_len)?,
            tables,
            layout: None,
        })
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

    /// Get the number of planes.
    #[inline]
    pub fn plane_count(&self) -> u32 {
        self.tables.len() as u32
    }

    /// Get the storage layout, or `None` for an image built from tables.
    pub fn layout(&self) -> Option<&PlaneLayout> {
        self.layout.as_ref()
    }

    /// Get the backing buffer.
    pub fn buffer(&self) -> &PlaneBuffer {
        &self.buffer
    }

    /// Acquire the address table of one plane.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlaneUnavailable`] if `plane >= plane_count()`.
    pub fn address_table(&self, plane: u32) -> Result<&Vpat> {
        self.tables
            .get(plane as usize)
            .ok_or(Error::PlaneUnavailable {
                plane,
                count: self.plane_count(),
            })
    }

    /// Acquire the red, green and blue tables together with the buffer.
    ///
    /// Fails on the first missing plane, before anything can be written.
    pub(crate) fn color_planes_mut(
        &mut self,
    ) -> Result<([&Vpat; COLOR_PLANES], &mut PlaneBuffer)> {
        let count = self.plane_count();
        for plane in [RED_PLANE, GREEN_PLANE, BLUE_PLANE] {
            if plane >= count {
                return Err(Error::PlaneUnavailable { plane, count });
            }
        }
        let t = &self.tables;
        Ok(([&t[0], &t[1], &t[2]], &mut self.buffer))
    }

    /// Get the sample of `plane` at (x, y).
    ///
    /// Returns `None` if the plane or coordinates are out of range.
    pub fn pixel(&self, plane: u32, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let table = self.tables.get(plane as usize)?;
        self.buffer.get(table.offset(x, y))
    }

    /// Set the sample of `plane` at (x, y).
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlaneUnavailable`] for a bad plane and
    /// [`Error::IndexOutOfBounds`] for bad coordinates.
    pub fn set_pixel(&mut self, plane: u32, x: u32, y: u32, value: u8) -> Result<()> {
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
        let offset = self.address_table(plane)?.offset(x, y);
        self.buffer.store(offset, value)
    }

    /// Get the (red, green, blue) samples at (x, y).
    ///
    /// Returns `None` for images with fewer than three planes or for
    /// coordinates out of range.
    pub fn rgb(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        Some((
            self.pixel(RED_PLANE, x, y)?,
            self.pixel(GREEN_PLANE, x, y)?,
            self.pixel(BLUE_PLANE, x, y)?,
        ))
    }

    /// Set every sample of one plane to `value`.
    pub fn fill_plane(&mut self, plane: u32, value: u8) -> Result<()> {
        let count = self.plane_count();
        let table = self
            .tables
            .get(plane as usize)
            .ok_or(Error::PlaneUnavailable { plane, count })?;
        for y in 0..self.height {
            let row = table.row_offset(y);
            for x in 0..self.width {
                self.buffer.store(row + table.col_offset(x), value)?;
            }
        }
        Ok(())
    }

    /// Copy one plane out in logical order: top row first, left to right.
    pub fn plane_bytes(&self, plane: u32) -> Result<Vec<u8>> {
        let table = self.address_table(plane)?;
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize);
        for y in 0..self.height {
            let row = table.row_offset(y);
            for x in 0..self.width {
                let offset = row + table.col_offset(x);
                out.push(self.buffer.get(offset).ok_or(Error::AddressOutOfRange {
                    offset,
                    len: self.buffer.len(),
                })?);
            }
        }
        Ok(out)
    }

    /// Flatten the color planes into top-down interleaved RGB bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlaneUnavailable`] if the image has fewer than three
    /// planes.
    pub fn to_rgb8(&self) -> Result<Vec<u8>> {
        let planes = [
            self.plane_bytes(RED_PLANE)?,
            self.plane_bytes(GREEN_PLANE)?,
            self.plane_bytes(BLUE_PLANE)?,
        ];
        let mut out = Vec::with_capacity(planes[0].len() * COLOR_PLANES);
        for i in 0..planes[0].len() {
            out.extend(planes.iter().map(|p| p[i]));
        }
        Ok(out)
    }

    /// Compare logical contents, ignoring storage layout.
    ///
    /// Two images are equal when they have the same dimensions and plane
    /// count and every (plane, x, y) sample matches.
    pub fn logical_eq(&self, other: &PlanarImage) -> bool {
        if self.width != other.width
            || self.height != other.height
            || self.plane_count() != other.plane_count()
        {
            return false;
        }
        (0..self.plane_count()).all(|p| {
            (0..self.height).all(|y| {
                (0..self.width).all(|x| self.pixel(p, x, y) == other.pixel(p, x, y))
            })
        })
    }
}

fn check_plane_count(plane_count: u32) -> Result<()> {
    if plane_count == 0 || plane_count > MAX_PLANES {
        return Err(Error::InvalidPlaneCount(plane_count));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_bottom_up() {
        let mut img = PlanarImage::allocate(3, 4, 2, true).unwrap();
        assert_eq!(img.plane_count(), 3);
        assert_eq!(img.buffer().len(), 24);
        img.set_pixel(0, 0, 0, 7).unwrap();
        // Logical row 0 of plane 0 is its last stored row.
        assert_eq!(img.buffer().as_slice()[4], 7);
        assert_eq!(img.pixel(0, 0, 0), Some(7));
    }

    #[test]
    fn test_allocate_top_down() {
        let mut img = PlanarImage::allocate(3, 4, 2, false).unwrap();
        img.set_pixel(2, 1, 1, 9).unwrap();
        assert_eq!(img.buffer().as_slice()[16 + 4 + 1], 9);
    }

    #[test]
    fn test_invalid_plane_count() {
        assert!(matches!(
            PlanarImage::allocate(0, 4, 4, true),
            Err(Error::InvalidPlaneCount(0))
        ));
        assert!(matches!(
            PlanarImage::allocate(5, 4, 4, true),
            Err(Error::InvalidPlaneCount(5))
        ));
    }

    #[test]
    fn test_allocation_overflow() {
        assert!(matches!(
            PlanarImage::allocate(4, u32::MAX, u32::MAX, true),
            Err(Error::AllocationFailed)
        ));
    }

    #[test]
    fn test_address_table_unavailable() {
        let img = PlanarImage::allocate(2, 3, 3, true).unwrap();
        assert!(img.address_table(1).is_ok());
        assert!(matches!(
            img.address_table(2),
            Err(Error::PlaneUnavailable { plane: 2, count: 2 })
        ));
    }

    #[test]
    fn test_color_planes_need_three() {
        let mut img = PlanarImage::allocate(2, 3, 3, true).unwrap();
        assert!(matches!(
            img.color_planes_mut(),
            Err(Error::PlaneUnavailable { plane: 2, count: 2 })
        ));
    }

    #[test]
    fn test_from_tables_rejects_out_of_range() {
        let t = Vpat::affine(2, 2, 0, 2, 1);
        let err = PlanarImage::from_tables(2, 2, 3, vec![t]).unwrap_err();
        assert!(matches!(err, Error::AddressOutOfRange { offset: 3, len: 3 }));
    }

    #[test]
    fn test_from_tables_rejects_overflowing_entries() {
        let extreme = Vpat::from_entries(vec![isize::MAX], vec![1]).unwrap();
        assert!(matches!(
            PlanarImage::from_tables(1, 1, 4, vec![extreme]),
            Err(Error::AddressOutOfRange {
                offset: isize::MAX,
                len: 4
            })
        ));
        let extreme = Vpat::from_entries(vec![isize::MIN, 0], vec![-1]).unwrap();
        assert!(matches!(
            PlanarImage::from_tables(1, 2, 4, vec![extreme]),
            Err(Error::AddressOutOfRange {
                offset: isize::MIN,
                ..
            })
        ));
    }

    #[test]
    fn test_from_tables_rejects_aliasing() {
        let t = Vpat::affine(2, 3, 0, 2, 1);
        let err = PlanarImage::from_tables(3, 2, 16, vec![t]).unwrap_err();
        assert!(matches!(err, Error::AddressAliasing { plane: 0 }));
    }

    #[test]
    fn test_from_tables_rejects_wrong_shape() {
        let t = Vpat::affine(2, 3, 0, 3, 1);
        let err = PlanarImage::from_tables(4, 2, 16, vec![t]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[test]
    fn test_plane_bytes_and_rgb8() {
        let mut img = PlanarImage::allocate(3, 2, 1, true).unwrap();
        img.fill_plane(0, 1).unwrap();
        img.fill_plane(1, 2).unwrap();
        img.set_pixel(2, 1, 0, 3).unwrap();
        assert_eq!(img.plane_bytes(2).unwrap(), vec![0, 3]);
        assert_eq!(img.to_rgb8().unwrap(), vec![1, 2, 0, 1, 2, 3]);
        assert_eq!(img.rgb(1, 0), Some((1, 2, 3)));
        assert_eq!(img.rgb(2, 0), None);
    }

    #[test]
    fn test_logical_eq_ignores_layout() {
        let layout = PlaneLayout::with_row_order(RowOrder::TopDown)
            .packing(PlanePacking::PixelInterleaved)
            .row_alignment(4);
        let mut a = PlanarImage::allocate(3, 3, 2, true).unwrap();
        let mut b = PlanarImage::with_layout(3, 3, 2, &layout).unwrap();
        for img in [&mut a, &mut b] {
            img.set_pixel(1, 2, 1, 42).unwrap();
        }
        assert!(a.logical_eq(&b));
        assert_ne!(a.buffer().as_slice(), b.buffer().as_slice());
        b.set_pixel(0, 0, 0, 1).unwrap();
        assert!(!a.logical_eq(&b));
    }

    #[test]
    fn test_plane_buffer_bounds() {
        let mut buf = PlaneBuffer::zeroed(4).unwrap();
        assert!(buf.store(3, 1).is_ok());
        assert!(matches!(
            buf.store(4, 1),
            Err(Error::AddressOutOfRange { offset: 4, len: 4 })
        ));
        assert!(buf.store(-1, 1).is_err());
        assert_eq!(buf.get(3), Some(1));
        assert_eq!(buf.get(-2), None);
        assert!(buf.check_span(0, 3).is_ok());
        assert!(buf.check_span(3, 4).is_err());
    }
}
