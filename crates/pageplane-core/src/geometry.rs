//! Page geometry
//!
//! Converts a page's physical size, given in points (1/72 inch), into
//! pixel dimensions at a target resolution.
//!
//! Every caller that needs pixel dimensions for a page must go through
//! [`pixel_dimensions`]: the rasterized buffer and the planar image that
//! receives it are sized independently, and they only agree if both use
//! the same rounding rule (round half away from zero).

use crate::error::{Error, Result};

/// Points per inch
pub const POINTS_PER_INCH: f64 = 72.0;

/// Physical page size in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    /// Page width in points
    pub width_pt: f64,
    /// Page height in points
    pub height_pt: f64,
}

impl PageSize {
    /// ISO A4 (210 x 297 mm)
    pub const A4: PageSize = PageSize {
        width_pt: 595.276,
        height_pt: 841.89,
    };

    /// US Letter (8.5 x 11 in)
    pub const LETTER: PageSize = PageSize {
        width_pt: 612.0,
        height_pt: 792.0,
    };

    /// Create a page size from width and height in points.
    pub fn new(width_pt: f64, height_pt: f64) -> Self {
        Self {
            width_pt,
            height_pt,
        }
    }

    /// Pixel dimensions of this page at `resolution`.
    ///
    /// See [`pixel_dimensions`].
    pub fn pixel_dimensions(&self, resolution: Resolution) -> Result<(u32, u32)> {
        pixel_dimensions(*self, resolution)
    }
}

/// Target resolution in dots per inch, per axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Horizontal resolution
    pub x_dpi: f64,
    /// Vertical resolution
    pub y_dpi: f64,
}

impl Resolution {
    /// Resolution used when none is configured
    pub const DEFAULT_DPI: f64 = 300.0;

    /// Same resolution on both axes.
    pub fn uniform(dpi: f64) -> Self {
        Self {
            x_dpi: dpi,
            y_dpi: dpi,
        }
    }

    /// Distinct horizontal and vertical resolution.
    pub fn new(x_dpi: f64, y_dpi: f64) -> Self {
        Self { x_dpi, y_dpi }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::uniform(Self::DEFAULT_DPI)
    }
}

/// Convert a length in points to pixels at `dpi`.
///
/// The result is `round(points * dpi / 72)`.
///
/// # Errors
///
/// Returns [`Error::InvalidGeometry`] if `points` is negative or not finite,
/// if `dpi` is not a positive finite number, or if the result does not fit
/// in `u32`.
pub fn points_to_pixels(points: f64, dpi: f64) -> Result<u32> {
    if !points.is_finite() || points < 0.0 {
        return Err(Error::InvalidGeometry(format!(
            "page length must be a non-negative number of points, got {points}"
        )));
    }
    if !dpi.is_finite() || dpi <= 0.0 {
        return Err(Error::InvalidGeometry(format!(
            "resolution must be positive, got {dpi} dpi"
        )));
    }

    let pixels = (points * dpi / POINTS_PER_INCH).round();
    if pixels > f64::from(u32::MAX) {
        return Err(Error::InvalidGeometry(format!(
            "{points} pt at {dpi} dpi is too large ({pixels} px)"
        )));
    }
    Ok(pixels as u32)
}

/// Pixel dimensions of a page of `size` rendered at `resolution`.
///
/// Returns `(round(width_pt * x_dpi / 72), round(height_pt * y_dpi / 72))`.
///
/// # Errors
///
/// See [`points_to_pixels`].
pub fn pixel_dimensions(size: PageSize, resolution: Resolution) -> Result<(u32, u32)> {
    let width = points_to_pixels(size.width_pt, resolution.x_dpi)?;
    let height = points_to_pixels(size.height_pt, resolution.y_dpi)?;
    Ok((width, height))
}
