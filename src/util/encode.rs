//! PNG encoding for screenshots
//!
//! Screenshots are always PNG. Compression favours speed: a full 4K frame
//! must encode well within a tool call's latency budget, and the payload is
//! base64'd into the MCP response anyway.
//!
//! # Examples
//!
//! ```
//! use desktop_mcp::util::{encode::encode_png, image_buffer::ImageBuffer};
//!
//! let img = ImageBuffer::from_test_pattern(64, 64);
//! let png = encode_png(&img).unwrap();
//! assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
//! ```

use std::io::Cursor;

use image::{
    ImageEncoder,
    codecs::png::{CompressionType, FilterType, PngEncoder},
};

use crate::{
    error::{AutomationError, AutomationResult},
    util::image_buffer::ImageBuffer,
};

/// PNG file signature
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

/// Encodes an image as PNG with fast compression
pub fn encode_png(buffer: &ImageBuffer) -> AutomationResult<Vec<u8>> {
    encode_png_with_compression(buffer, CompressionType::Fast)
}

/// Encodes an image as PNG with the given compression level
pub fn encode_png_with_compression(
    buffer: &ImageBuffer,
    compression: CompressionType,
) -> AutomationResult<Vec<u8>> {
    let mut output = Vec::new();

    let encoder =
        PngEncoder::new_with_quality(Cursor::new(&mut output), compression, FilterType::Adaptive);

    let rgba = buffer.to_rgba8();
    let (width, height) = rgba.dimensions();

    encoder
        .write_image(rgba.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .map_err(|e| AutomationError::execution_failed("screenshot", format!("PNG encoding: {e}")))?;

    Ok(output)
}

/// Reads width and height from a PNG's IHDR chunk
///
/// Returns `None` if `data` is not a PNG.
pub fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 24 || data[..8] != PNG_SIGNATURE || &data[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes(data[16..20].try_into().ok()?);
    let height = u32::from_be_bytes(data[20..24].try_into().ok()?);
    Some((width, height))
}
