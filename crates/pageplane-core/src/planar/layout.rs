//! Plane storage layouts
//!
//! A [`PlaneLayout`] describes how the planes of a [`super::PlanarImage`]
//! sit in its single backing buffer and produces the matching address
//! tables. All layouts built here are affine in x; non-affine storage can
//! still be described with [`super::PlanarImage::from_tables`].

use super::vpat::Vpat;
use crate::error::{Error, Result};

/// Order in which logical rows are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RowOrder {
    /// Logical row 0 is stored first
    TopDown,
    /// Logical row 0 is stored last, as in bitmap files
    #[default]
    BottomUp,
}

/// How the planes share the backing buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlanePacking {
    /// Each plane occupies its own contiguous block
    #[default]
    PlaneMajor,
    /// Samples of all planes alternate per pixel (RGBRGB...)
    PixelInterleaved,
}

/// Storage description for a planar image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaneLayout {
    /// Row storage order
    pub row_order: RowOrder,
    /// Plane packing
    pub packing: PlanePacking,
    /// Every stored row is padded to a multiple of this many bytes
    pub row_alignment: usize,
}

impl Default for PlaneLayout {
    fn default() -> Self {
        Self {
            row_order: RowOrder::BottomUp,
            packing: PlanePacking::PlaneMajor,
            row_alignment: 1,
        }
    }
}

/// Address tables and backing size produced by a layout
#[derive(Debug, Clone)]
pub(crate) struct LayoutTables {
    pub(crate) tables: Vec<Vpat>,
    pub(crate) buffer_len: usize,
}

impl PlaneLayout {
    /// Default layout with the given row order.
    pub fn with_row_order(row_order: RowOrder) -> Self {
        Self {
            row_order,
            ..Self::default()
        }
    }

    /// Set the plane packing.
    pub fn packing(mut self, packing: PlanePacking) -> Self {
        self.packing = packing;
        self
    }

    /// Set the row alignment in bytes.
    pub fn row_alignment(mut self, row_alignment: usize) -> Self {
        self.row_alignment = row_alignment;
        self
    }

    /// Bytes between the starts of two consecutive stored rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for a zero alignment and
    /// [`Error::AllocationFailed`] on overflow.
    pub fn row_bytes(&self, plane_count: u32, width: u32) -> Result<usize> {
        if self.row_alignment == 0 {
            return Err(Error::InvalidParameter(
                "row alignment must be at least 1".into(),
            ));
        }
        let samples = match self.packing {
            PlanePacking::PlaneMajor => width as usize,
            PlanePacking::PixelInterleaved => (width as usize)
                .checked_mul(plane_count as usize)
                .ok_or(Error::AllocationFailed)?,
        };
        samples
            .checked_next_multiple_of(self.row_alignment)
            .ok_or(Error::AllocationFailed)
    }

    /// Build one address table per plane plus the backing buffer size.
    pub(crate) fn build(&self, plane_count: u32, width: u32, height: u32) -> Result<LayoutTables> {
        let row_bytes = self.row_bytes(plane_count, width)?;
        let block = row_bytes
            .checked_mul(height as usize)
            .ok_or(Error::AllocationFailed)?;
        let buffer_len = match self.packing {
            PlanePacking::PlaneMajor => block
                .checked_mul(plane_count as usize)
                .ok_or(Error::AllocationFailed)?,
            PlanePacking::PixelInterleaved => block,
        };
        if buffer_len > isize::MAX as usize {
            return Err(Error::AllocationFailed);
        }

        let row_step = row_bytes as isize;
        let (first_row, step) = match self.row_order {
            RowOrder::TopDown => (0, row_step),
            RowOrder::BottomUp => ((height as isize - 1).max(0) * row_step, -row_step),
        };

        let tables = (0..plane_count as isize)
            .map(|plane| match self.packing {
                PlanePacking::PlaneMajor => {
                    Vpat::affine(height, width, plane * block as isize + first_row, step, 1)
                }
                PlanePacking::PixelInterleaved => {
                    let mut t = Vpat::affine(height, width, first_row, step, plane_count as isize);
                    t.shift_columns(plane);
                    t
                }
            })
            .collect();

        Ok(LayoutTables { tables, buffer_len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planar::vpat::{AddressTable, is_injective};

    #[test]
    fn test_plane_major_bottom_up() {
        let lt = PlaneLayout::default().build(3, 4, 2).unwrap();
        assert_eq!(lt.buffer_len, 24);
        // Plane 1 starts at byte 8; logical row 0 is its second stored row.
        assert_eq!(lt.tables[1].offset(0, 0), 8 + 4);
        assert_eq!(lt.tables[1].offset(0, 1), 8);
        assert_eq!(lt.tables[2].offset(3, 0), 16 + 4 + 3);
    }

    #[test]
    fn test_pixel_interleaved_top_down() {
        let layout = PlaneLayout::with_row_order(RowOrder::TopDown)
            .packing(PlanePacking::PixelInterleaved)
            .row_alignment(4);
        let lt = layout.build(3, 3, 2).unwrap();
        // 9 bytes of samples padded to 12 per row.
        assert_eq!(lt.buffer_len, 24);
        assert_eq!(lt.tables[0].offset(0, 0), 0);
        assert_eq!(lt.tables[2].offset(1, 0), 5);
        assert_eq!(lt.tables[1].offset(2, 1), 12 + 7);
        assert_eq!(lt.tables[1].x_stride(), 3);
    }

    #[test]
    fn test_tables_are_injective_and_in_bounds() {
        for packing in [PlanePacking::PlaneMajor, PlanePacking::PixelInterleaved] {
            for row_order in [RowOrder::TopDown, RowOrder::BottomUp] {
                let layout = PlaneLayout {
                    row_order,
                    packing,
                    row_alignment: 8,
                };
                let lt = layout.build(3, 5, 4).unwrap();
                for t in &lt.tables {
                    assert!(is_injective(t));
                    let (lo, hi) = t.extent().unwrap();
                    assert!(lo >= 0 && (hi as usize) < lt.buffer_len);
                }
            }
        }
    }

    #[test]
    fn test_zero_height() {
        let lt = PlaneLayout::default().build(3, 7, 0).unwrap();
        assert_eq!(lt.buffer_len, 0);
        assert!(lt.tables.iter().all(|t| t.rows() == 0 && t.cols() == 7));
    }

    #[test]
    fn test_zero_alignment_rejected() {
        let layout = PlaneLayout::default().row_alignment(0);
        assert!(matches!(
            layout.row_bytes(3, 10),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_overflow_rejected() {
        let layout = PlaneLayout::default().packing(PlanePacking::PixelInterleaved);
        assert!(matches!(
            layout.build(4, u32::MAX, u32::MAX),
            Err(Error::AllocationFailed)
        ));
    }
}
