//! Conditional re-encoding of oversized images.
//!
//! Compression failure is never user-visible: the candidate keeps its
//! original bytes and intake proceeds.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageError, ImageReader};
use tracing::{debug, warn};

use crate::candidate::UploadCandidate;

/// Raw size above which a candidate gets re-encoded: 5 MiB.
pub const COMPRESSION_THRESHOLD: u64 = 5 * 1024 * 1024;

/// Re-encoding parameters.
#[derive(Debug, Clone)]
pub struct CompressionOptions {
    /// JPEG quality, 1-100.
    pub quality: u8,
    /// Maximum width/height in pixels; larger images are downscaled,
    /// preserving aspect ratio.
    pub max_dimension: u32,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            quality: 80,
            max_dimension: 3000,
        }
    }
}

/// Attaches a compressed variant to the candidate if its raw size exceeds
/// [`COMPRESSION_THRESHOLD`].
///
/// Decode or encode failures leave the candidate unmodified.
pub fn maybe_compress(candidate: &mut UploadCandidate, options: &CompressionOptions) {
    if candidate.raw_size() <= COMPRESSION_THRESHOLD {
        return;
    }

    match compress_bytes(candidate.raw_bytes(), options) {
        Ok(data) => {
            debug!(
                file = %candidate.file_name(),
                raw = candidate.raw_size(),
                compressed = data.len(),
                "attached compressed variant"
            );
            candidate.set_compressed(data.into());
        }
        Err(e) => {
            warn!(
                file = %candidate.file_name(),
                error = %e,
                "compression failed, keeping original bytes"
            );
        }
    }
}

/// Decodes, optionally downscales, and re-encodes image bytes as JPEG.
pub fn compress_bytes(bytes: &[u8], options: &CompressionOptions) -> Result<Vec<u8>, ImageError> {
    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(ImageError::IoError)?
        .decode()?;

    let (width, height) = img.dimensions();
    let img = if width > options.max_dimension || height > options.max_dimension {
        img.resize(
            options.max_dimension,
            options.max_dimension,
            FilterType::Lanczos3,
        )
    } else {
        img
    };

    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, options.quality);
    rgb.write_with_encoder(encoder)?;
    Ok(out)
}

/// Reads pixel dimensions from encoded image bytes without a full decode.
///
/// Returns `None` when the bytes are not a readable image; commit metadata
/// then simply omits the dimensions.
pub fn probe_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}
