//! TIFF image format support
//!
//! Single-page, uncompressed 8-bit RGB.

use crate::{IoError, IoResult, planar_from_samples};
use pageplane_core::PlanarImage;
use std::io::{Read, Seek, Write};
use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::TiffEncoder;
use tiff::encoder::colortype::RGB8;

/// Read a TIFF image
///
/// Accepts 8-bit gray, RGB and RGBA.
pub fn read_tiff<R: Read + Seek>(reader: R) -> IoResult<PlanarImage> {
    let mut decoder = Decoder::new(reader)
        .map_err(|e| IoError::DecodeError(format!("TIFF decode error: {e}")))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| IoError::DecodeError(format!("Failed to get TIFF dimensions: {e}")))?;
    let color_type = decoder
        .colortype()
        .map_err(|e| IoError::DecodeError(format!("Failed to get TIFF color type: {e}")))?;

    let channels = match color_type {
        ColorType::Gray(8) => 1,
        ColorType::RGB(8) => 3,
        ColorType::RGBA(8) => 4,
        _ => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported TIFF color type: {color_type:?}"
            )));
        }
    };

    let data = match decoder
        .read_image()
        .map_err(|e| IoError::DecodeError(format!("Failed to read TIFF image data: {e}")))?
    {
        DecodingResult::U8(data) => data,
        _ => {
            return Err(IoError::UnsupportedFormat(
                "TIFF sample format is not 8-bit".to_string(),
            ));
        }
    };

    planar_from_samples(width, height, channels, width as usize * channels, &data)
}

/// Write a single-page TIFF image as 8-bit RGB
pub fn write_tiff<W: Write + Seek>(image: &PlanarImage, writer: W) -> IoResult<()> {
    let data = image.to_rgb8()?;

    let mut encoder = TiffEncoder::new(writer)
        .map_err(|e| IoError::EncodeError(format!("TIFF encoder error: {e}")))?;
    encoder
        .write_image::<RGB8>(image.width(), image.height(), &data)
        .map_err(|e| IoError::EncodeError(format!("TIFF write error: {e}")))?;

    Ok(())
}
