//! PNG image format support

use crate::{IoError, IoResult, planar_from_samples};
use pageplane_core::PlanarImage;
use png::{BitDepth, ColorType, Decoder, Encoder};
use std::io::{BufRead, Seek, Write};

/// Read a PNG image
///
/// Accepts 8-bit grayscale, RGB and RGBA images. Gray is replicated into
/// all three planes and alpha is dropped.
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<PlanarImage> {
    let decoder = Decoder::new(reader);
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("PNG decode error: {e}")))?;

    let info = reader.info();
    let width = info.width;
    let height = info.height;
    let color_type = info.color_type;
    let bit_depth = info.bit_depth;

    let channels = match (color_type, bit_depth) {
        (ColorType::Grayscale, BitDepth::Eight) => 1,
        (ColorType::Rgb, BitDepth::Eight) => 3,
        (ColorType::Rgba, BitDepth::Eight) => 4,
        _ => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported PNG format: {color_type:?} {bit_depth:?}"
            )));
        }
    };

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("failed to get output buffer size".to_string()))?;
    let mut buf = vec![0; buf_size];
    let output_info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::DecodeError(format!("PNG frame error: {e}")))?;

    planar_from_samples(
        width,
        height,
        channels,
        output_info.line_size,
        &buf[..output_info.buffer_size()],
    )
}

/// Write a PNG image as 8-bit RGB
pub fn write_png<W: Write>(image: &PlanarImage, writer: W) -> IoResult<()> {
    let data = image.to_rgb8()?;

    let mut encoder = Encoder::new(writer, image.width(), image.height());
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(format!("PNG header error: {e}")))?;
    writer
        .write_image_data(&data)
        .map_err(|e| IoError::EncodeError(format!("PNG write error: {e}")))?;
    writer
        .finish()
        .map_err(|e| IoError::EncodeError(format!("PNG finish error: {e}")))?;

    Ok(())
}
