//! BMP image format support
//!
//! Writes planar color images as uncompressed 24-bit Windows bitmaps and
//! reads 24- and 32-bit bitmaps back into a top-down planar image.

use crate::{IoError, IoResult};
use pageplane_core::PlanarImage;
use std::io::{Read, Write};

/// BMP file header size
const BMP_FILE_HEADER_SIZE: usize = 14;

/// BMP info header size (BITMAPINFOHEADER)
const BMP_INFO_HEADER_SIZE: u32 = 40;

/// Bytes per stored row; BMP rows are 4-byte aligned.
fn row_stride(width: u32, bits_per_pixel: u16) -> usize {
    (width as usize * bits_per_pixel as usize).div_ceil(32) * 4
}

fn le_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

fn le_i32(b: &[u8]) -> i32 {
    i32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

/// Read a BMP image
///
/// The result has three planes (red, green, blue) stored top-down.
pub fn read_bmp<R: Read>(mut reader: R) -> IoResult<PlanarImage> {
    let mut file_header = [0u8; BMP_FILE_HEADER_SIZE];
    reader.read_exact(&mut file_header)?;

    if &file_header[0..2] != b"BM" {
        return Err(IoError::InvalidData("not a BMP file".to_string()));
    }
    let pixel_offset = le_u32(&file_header[10..14]) as usize;

    let mut info_header = [0u8; BMP_INFO_HEADER_SIZE as usize];
    reader.read_exact(&mut info_header)?;

    let header_size = le_u32(&info_header[0..4]);
    if header_size < BMP_INFO_HEADER_SIZE {
        return Err(IoError::InvalidData(format!(
            "unsupported BMP header size: {header_size}"
        )));
    }

    let width = le_i32(&info_header[4..8]);
    let height = le_i32(&info_header[8..12]);

    let planes = u16::from_le_bytes([info_header[12], info_header[13]]);
    if planes != 1 {
        return Err(IoError::InvalidData(format!(
            "unsupported number of planes: {planes}"
        )));
    }

    let bits_per_pixel = u16::from_le_bytes([info_header[14], info_header[15]]);
    let bytes_per_pixel = match bits_per_pixel {
        24 => 3,
        32 => 4,
        _ => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported BMP bit depth: {bits_per_pixel}"
            )));
        }
    };

    let compression = le_u32(&info_header[16..20]);
    if compression != 0 && !(compression == 3 && bits_per_pixel == 32) {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported BMP compression: {compression}"
        )));
    }

    let width = width.unsigned_abs();
    let top_down = height < 0;
    let height = height.unsigned_abs();

    // Skip the rest of the header and any bit masks
    let current_pos = BMP_FILE_HEADER_SIZE + BMP_INFO_HEADER_SIZE as usize;
    if pixel_offset > current_pos {
        let mut skip = vec![0u8; pixel_offset - current_pos];
        reader.read_exact(&mut skip)?;
    }

    let mut image = PlanarImage::allocate(3, width, height, false)?;
    let mut row_buffer = vec![0u8; row_stride(width, bits_per_pixel)];

    for row in 0..height {
        reader.read_exact(&mut row_buffer)?;
        let y = if top_down { row } else { height - 1 - row };

        for (x, pixel) in (0..width).zip(row_buffer.chunks_exact(bytes_per_pixel)) {
            image.set_pixel(0, x, y, pixel[2])?;
            image.set_pixel(1, x, y, pixel[1])?;
            image.set_pixel(2, x, y, pixel[0])?;
        }
    }

    Ok(image)
}

/// Write a BMP image
///
/// Writes 24-bit BGR pixels with bottom-up rows, each padded to a multiple
/// of 4 bytes. Only the logical (plane, x, y) samples are read, so any
/// storage layout is accepted.
///
/// # Errors
///
/// Returns [`IoError::Core`] if the image has fewer than three planes and
/// [`IoError::UnsupportedFormat`] if it is too large for the BMP header
/// fields.
pub fn write_bmp<W: Write>(image: &PlanarImage, mut writer: W) -> IoResult<()> {
    let width = image.width();
    let height = image.height();
    let rgb = image.to_rgb8()?;

    let row_stride = row_stride(width, 24);
    let pixel_data_size = row_stride as u64 * height as u64;
    let pixel_offset = BMP_FILE_HEADER_SIZE + BMP_INFO_HEADER_SIZE as usize;
    let file_size = pixel_offset as u64 + pixel_data_size;

    if file_size > u32::MAX as u64 || width > i32::MAX as u32 || height > i32::MAX as u32 {
        return Err(IoError::UnsupportedFormat(format!(
            "{width}x{height} image is too large for BMP"
        )));
    }

    // File header
    writer.write_all(b"BM")?;
    writer.write_all(&(file_size as u32).to_le_bytes())?;
    writer.write_all(&[0u8; 4])?; // Reserved
    writer.write_all(&(pixel_offset as u32).to_le_bytes())?;

    // Info header
    writer.write_all(&BMP_INFO_HEADER_SIZE.to_le_bytes())?;
    writer.write_all(&(width as i32).to_le_bytes())?;
    writer.write_all(&(height as i32).to_le_bytes())?; // Bottom-up
    writer.write_all(&1u16.to_le_bytes())?; // Planes
    writer.write_all(&24u16.to_le_bytes())?;
    writer.write_all(&0u32.to_le_bytes())?; // Compression
    writer.write_all(&(pixel_data_size as u32).to_le_bytes())?;
    writer.write_all(&0i32.to_le_bytes())?; // X pixels per meter
    writer.write_all(&0i32.to_le_bytes())?; // Y pixels per meter
    writer.write_all(&0u32.to_le_bytes())?; // Colors used
    writer.write_all(&0u32.to_le_bytes())?; // Important colors

    let src_row = width as usize * 3;
    let mut row_buffer = vec![0u8; row_stride];
    for row in 0..height as usize {
        let y = height as usize - 1 - row;
        let src = &rgb[y * src_row..(y + 1) * src_row];
        for (dst, px) in row_buffer.chunks_exact_mut(3).zip(src.chunks_exact(3)) {
            dst[0] = px[2];
            dst[1] = px[1];
            dst[2] = px[0];
        }
        writer.write_all(&row_buffer)?;
    }

    Ok(())
}
