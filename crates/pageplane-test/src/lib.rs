//! pageplane-test - Regression test framework for pageplane
//!
//! Provides [`RegParams`], the bookkeeping object every `*_reg.rs`
//! integration test runs through, plus deterministic fixtures. Three
//! modes are supported:
//!
//! - **Generate**: Create golden files for comparison
//! - **Compare**: Compare results with golden files
//! - **Display**: Run tests without comparison (visual inspection)
//!
//! # Usage
//!
//! ```ignore
//! use pageplane_test::RegParams;
//!
//! let mut rp = RegParams::new("repack");
//! rp.compare_values(2480.0, image.width() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "generate", "compare", or "display"

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

use pageplane_core::{InterleavedBuffer, PlanarImage, Vpat};

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // pageplane-test is at crates/pageplane-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the golden files directory
pub fn golden_dir() -> String {
    format!("{}/tests/golden", workspace_root())
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}

/// Value written into every byte the repacker must never read: the
/// unused fourth byte of each pixel and the row padding.
pub const POISON: u8 = 0xA5;

/// Deterministic (blue, green, red) test color of pixel (x, y).
pub fn pattern_bgr(x: u32, y: u32) -> (u8, u8, u8) {
    let b = (x.wrapping_mul(7) ^ y.wrapping_mul(3)) as u8;
    let g = (x.wrapping_add(y).wrapping_mul(5)) as u8;
    let r = (x.wrapping_mul(11).wrapping_add(y.wrapping_mul(13)) >> 1) as u8;
    (b, g, r)
}

/// Build a page filled with [`pattern_bgr`], with `pad` extra bytes at the
/// end of every row. Pad bytes and row padding hold [`POISON`].
pub fn pattern_page(width: u32, height: u32, pad: usize) -> TestResult<InterleavedBuffer> {
    let stride = width as usize * 4 + pad;
    let data = vec![POISON; stride * height as usize];
    let mut page = InterleavedBuffer::new(width, height, stride, data)?;
    for y in 0..height {
        for x in 0..width {
            let (b, g, r) = pattern_bgr(x, y);
            page.set_bgr(x, y, b, g, r)?;
        }
    }
    Ok(page)
}

/// Three-plane top-down image whose column tables swap every pair of
/// neighbouring columns (1, 0, 3, 2, ...), so no plane is affine in x.
pub fn swapped_column_image(width: u32, height: u32) -> TestResult<PlanarImage> {
    let plane_len = width as usize * height as usize;
    let x_entries: Vec<isize> = (0..width)
        .map(|x| (if x ^ 1 < width { x ^ 1 } else { x }) as isize)
        .collect();
    let tables = (0..3)
        .map(|p| {
            let y_entries = (0..height as isize)
                .map(|y| (p * plane_len) as isize + y * width as isize)
                .collect();
            Vpat::from_entries(y_entries, x_entries.clone())
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PlanarImage::from_tables(width, height, plane_len * 3, tables)?)
}
