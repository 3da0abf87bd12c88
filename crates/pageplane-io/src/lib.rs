//! pageplane-io - Image sinks for planar pages
//!
//! Encodes [`PlanarImage`]s to files or memory and decodes them back for
//! verification.
//!
//! # Supported formats
//!
//! | Format | Read | Write | Feature |
//! |--------|------|-------|---------|
//! | BMP    | Yes  | Yes   | `bmp` (default) |
//! | PNG    | Yes  | Yes   | `png-format` (default) |
//! | TIFF   | Yes  | Yes   | `tiff-format` |
//!
//! Every writer emits 8-bit RGB and reads the image only through its
//! logical (plane, x, y) accessor.

#[cfg(feature = "bmp")]
pub mod bmp;
mod error;
pub mod format;
#[cfg(feature = "png-format")]
pub mod png;
pub mod sink;
#[cfg(feature = "tiff-format")]
pub mod tiff;

pub use error::{IoError, IoResult};
pub use format::{detect_format, detect_format_from_bytes};
pub use pageplane_core::ImageFormat;
pub use sink::{FileSink, ImageSink, MemorySink};

use pageplane_core::PlanarImage;
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;

/// Read an image file, detecting its format from the content.
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<PlanarImage> {
    let data = std::fs::read(path)?;
    read_image_mem(&data)
}

/// Decode an image held in memory.
pub fn read_image_mem(data: &[u8]) -> IoResult<PlanarImage> {
    let format = detect_format_from_bytes(data)?;
    match format {
        #[cfg(feature = "bmp")]
        ImageFormat::Bmp => bmp::read_bmp(Cursor::new(data)),
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::read_png(Cursor::new(data)),
        #[cfg(feature = "tiff-format")]
        ImageFormat::Tiff => tiff::read_tiff(Cursor::new(data)),
        #[allow(unreachable_patterns)]
        _ => Err(IoError::UnsupportedFormat(format!(
            "{format:?} support is not enabled"
        ))),
    }
}

/// Encode an image to any seekable writer.
pub fn write_image_format<W: Write + Seek>(
    image: &PlanarImage,
    writer: W,
    format: ImageFormat,
) -> IoResult<()> {
    match format {
        #[cfg(feature = "bmp")]
        ImageFormat::Bmp => bmp::write_bmp(image, writer),
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::write_png(image, writer),
        #[cfg(feature = "tiff-format")]
        ImageFormat::Tiff => tiff::write_tiff(image, writer),
        #[allow(unreachable_patterns)]
        _ => {
            let _ = (image, writer);
            Err(IoError::UnsupportedFormat(format!(
                "{format:?} support is not enabled"
            )))
        }
    }
}

/// Write an image to a file.
pub fn write_image<P: AsRef<Path>>(
    image: &PlanarImage,
    path: P,
    format: ImageFormat,
) -> IoResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_image_format(image, &mut writer, format)?;
    writer.flush()?;
    Ok(())
}

/// Encode an image into a byte vector.
pub fn write_image_mem(image: &PlanarImage, format: ImageFormat) -> IoResult<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_image_format(image, &mut cursor, format)?;
    Ok(cursor.into_inner())
}

/// Build a top-down three-plane image from decoded 8-bit samples.
///
/// `channels` is 1 (gray, replicated), 3 (RGB) or 4 (RGBA, alpha dropped);
/// rows start `line_size` bytes apart.
#[cfg(any(feature = "png-format", feature = "tiff-format"))]
pub(crate) fn planar_from_samples(
    width: u32,
    height: u32,
    channels: usize,
    line_size: usize,
    data: &[u8],
) -> IoResult<PlanarImage> {
    let row_len = width as usize * channels;
    if line_size < row_len || data.len() < line_size * height as usize {
        return Err(IoError::InvalidData(format!(
            "decoded {} bytes for a {width}x{height} image with {channels} channels",
            data.len()
        )));
    }

    let mut image = PlanarImage::allocate(3, width, height, false)?;
    for y in 0..height {
        let start = y as usize * line_size;
        let row = &data[start..start + row_len];
        for (x, px) in (0..width).zip(row.chunks_exact(channels)) {
            let (r, g, b) = if channels == 1 {
                (px[0], px[0], px[0])
            } else {
                (px[0], px[1], px[2])
            };
            image.set_pixel(0, x, y, r)?;
            image.set_pixel(1, x, y, g)?;
            image.set_pixel(2, x, y, b)?;
        }
    }
    Ok(image)
}
