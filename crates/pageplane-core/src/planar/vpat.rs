//! Address tables
//!
//! A planar image does not promise a stride formula. Each plane instead
//! exposes two lookup sequences, one per axis, and the byte offset of
//! pixel (x, y) inside the plane buffer is `row_offset(y) + col_offset(x)`.
//! Offsets are signed so that bottom-up storage (rows walking towards
//! lower addresses) is expressible.
//!
//! Sums of entries saturate instead of overflowing. A saturated offset is
//! `isize::MIN` or `isize::MAX`, and neither lies inside any buffer, so a
//! table with extreme entries is rejected as out of range.

use crate::error::{Error, Result};

/// Per-plane, per-axis lookup from logical coordinate to byte offset.
///
/// Implementations must be injective: no two (x, y) pairs may produce the
/// same offset. Nothing else is assumed about the mapping; in particular
/// `col_offset` need not be affine in `x`.
pub trait AddressTable {
    /// Number of rows covered by the table.
    fn rows(&self) -> u32;

    /// Number of columns covered by the table.
    fn cols(&self) -> u32;

    /// Byte offset contributed by row `y`.
    ///
    /// # Panics
    ///
    /// May panic if `y >= rows()`.
    fn row_offset(&self, y: u32) -> isize;

    /// Byte offset contributed by column `x`.
    ///
    /// # Panics
    ///
    /// May panic if `x >= cols()`.
    fn col_offset(&self, x: u32) -> isize;

    /// Byte offset of pixel (x, y), saturated to the `isize` range.
    #[inline]
    fn offset(&self, x: u32, y: u32) -> isize {
        self.row_offset(y).saturating_add(self.col_offset(x))
    }

    /// Distance between columns 0 and 1, or 1 when there is at most one
    /// column. Column 1 is never looked up for a single-column table.
    fn x_stride(&self) -> isize {
        if self.cols() >= 2 {
            self.col_offset(1).saturating_sub(self.col_offset(0))
        } else {
            1
        }
    }

    /// Check `col_offset(x) == col_offset(0) + x * x_stride()` for every
    /// column.
    fn is_affine_in_x(&self) -> bool {
        let cols = self.cols();
        if cols < 3 {
            return true;
        }
        let origin = self.col_offset(0);
        let stride = self.x_stride();
        (2..cols).all(|x| {
            (x as isize)
                .checked_mul(stride)
                .and_then(|step| origin.checked_add(step))
                == Some(self.col_offset(x))
        })
    }

    /// Smallest and largest offset the table can produce, saturated to the
    /// `isize` range, or `None` for an empty table.
    fn extent(&self) -> Option<(isize, isize)> {
        let rows = axis_extent(self.rows(), |y| self.row_offset(y))?;
        let cols = axis_extent(self.cols(), |x| self.col_offset(x))?;
        Some((rows.0.saturating_add(cols.0), rows.1.saturating_add(cols.1)))
    }
}

fn axis_extent(len: u32, entry: impl Fn(u32) -> isize) -> Option<(isize, isize)> {
    (0..len).map(entry).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Check that no two pixels of `table` share an offset.
///
/// Materializes every offset, so this costs `rows * cols` memory; use it
/// on construction or in tests, not per page.
pub fn is_injective<T: AddressTable + ?Sized>(table: &T) -> bool {
    let mut offsets = Vec::with_capacity(table.rows() as usize * table.cols() as usize);
    for y in 0..table.rows() {
        let row = table.row_offset(y);
        offsets.extend((0..table.cols()).map(|x| row.saturating_add(table.col_offset(x))));
    }
    let total = offsets.len();
    offsets.sort_unstable();
    offsets.dedup();
    offsets.len() == total
}

/// Explicit address table: one stored offset per row and per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vpat {
    y_entries: Vec<isize>,
    x_entries: Vec<isize>,
}

impl Vpat {
    /// Build a table from explicit entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if either sequence is longer than
    /// `u32::MAX` entries.
    pub fn from_entries(y_entries: Vec<isize>, x_entries: Vec<isize>) -> Result<Self> {
        if u32::try_from(y_entries.len()).is_err() || u32::try_from(x_entries.len()).is_err() {
            return Err(Error::InvalidParameter(
                "address table longer than u32::MAX entries".into(),
            ));
        }
        Ok(Self {
            y_entries,
            x_entries,
        })
    }

    /// Build an affine table: `origin + y * row_step` per row and
    /// `x * col_step` per column, saturating.
    pub fn affine(rows: u32, cols: u32, origin: isize, row_step: isize, col_step: isize) -> Self {
        Self {
            y_entries: (0..rows as isize)
                .map(|y| origin.saturating_add(y.saturating_mul(row_step)))
                .collect(),
            x_entries: (0..cols as isize)
                .map(|x| x.saturating_mul(col_step))
                .collect(),
        }
    }

    /// Get the row entries.
    #[inline]
    pub fn y_entries(&self) -> &[isize] {
        &self.y_entries
    }

    /// Get the column entries.
    #[inline]
    pub fn x_entries(&self) -> &[isize] {
        &self.x_entries
    }

    /// Add `delta` to every column entry.
    pub(crate) fn shift_columns(&mut self, delta: isize) {
        for entry in &mut self.x_entries {
            *entry += delta;
        }
    }
}

impl AddressTable for Vpat {
    #[inline]
    fn rows(&self) -> u32 {
        self.y_entries.len() as u32
    }

    #[inline]
    fn cols(&self) -> u32 {
        self.x_entries.len() as u32
    }

    #[inline]
    fn row_offset(&self, y: u32) -> isize {
        self.y_entries[y as usize]
    }

    #[inline]
    fn col_offset(&self, x: u32) -> isize {
        self.x_entries[x as usize]
    }
}

impl<T: AddressTable + ?Sized> AddressTable for &T {
    fn rows(&self) -> u32 {
        (**self).rows()
    }

    fn cols(&self) -> u32 {
        (**self).cols()
    }

    #[inline]
    fn row_offset(&self, y: u32) -> isize {
        (**self).row_offset(y)
    }

    #[inline]
    fn col_offset(&self, x: u32) -> isize {
        (**self).col_offset(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affine_table_offsets() {
        let t = Vpat::affine(3, 4, 100, -10, 2);
        assert_eq!(t.offset(0, 0), 100);
        assert_eq!(t.offset(3, 2), 100 - 20 + 6);
        assert_eq!(t.x_stride(), 2);
        assert!(t.is_affine_in_x());
        assert_eq!(t.extent(), Some((80, 106)));
    }

    #[test]
    fn test_single_column_stride_defaults_to_one() {
        let t = Vpat::from_entries(vec![0, 1, 2], vec![7]).unwrap();
        assert_eq!(t.x_stride(), 1);
        assert!(t.is_affine_in_x());
    }

    #[test]
    fn test_non_affine_detected() {
        // Column pairs swapped: 1, 0, 3, 2
        let t = Vpat::from_entries(vec![0, 4], vec![1, 0, 3, 2]).unwrap();
        assert_eq!(t.x_stride(), -1);
        assert!(!t.is_affine_in_x());
        assert!(is_injective(&t));
    }

    #[test]
    fn test_injectivity_violation() {
        // Row step 2 with 3 columns of stride 1 makes rows overlap.
        let t = Vpat::affine(2, 3, 0, 2, 1);
        assert!(!is_injective(&t));
    }

    #[test]
    fn test_extreme_entries_saturate() {
        let t = Vpat::from_entries(vec![isize::MAX], vec![1]).unwrap();
        assert_eq!(t.offset(0, 0), isize::MAX);
        assert_eq!(t.extent(), Some((isize::MAX, isize::MAX)));

        let t = Vpat::from_entries(vec![isize::MIN, 0], vec![-1, 0, 1]).unwrap();
        assert_eq!(t.extent(), Some((isize::MIN, 1)));
        assert_eq!(t.x_stride(), 1);
        assert!(t.is_affine_in_x());

        let t = Vpat::from_entries(vec![0], vec![0, isize::MAX, 5]).unwrap();
        assert!(!t.is_affine_in_x());
    }

    #[test]
    fn test_empty_extent() {
        let t = Vpat::affine(0, 5, 0, 5, 1);
        assert_eq!(t.extent(), None);
        assert!(is_injective(&t));
    }
}
