//! File intake for guest photo uploads.
//!
//! Validates selected files against type/size/batch rules and optionally
//! re-encodes oversized images before transfer. Produces [`UploadCandidate`]s
//! consumed by the upload session; rejected files come back with a per-file
//! [`RejectReason`] and no other side effect.

mod candidate;
mod compression;
mod validation;

pub use candidate::{CandidateStatus, SelectedFile, UploadCandidate};
pub use compression::{
    COMPRESSION_THRESHOLD, CompressionOptions, maybe_compress, probe_dimensions,
};
pub use validation::{IntakeOutcome, Rejection, accept_selection};

/// Maximum accepted file size: 20 MiB.
pub const MAX_FILE_SIZE: u64 = 20 * 1024 * 1024;

/// Maximum number of candidates in one upload batch.
pub const MAX_BATCH_SIZE: usize = 20;

/// Maximum caption length in characters.
pub const MAX_CAPTION_LEN: usize = 200;

/// MIME types the service accepts.
pub const SUPPORTED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Why a selected file was not accepted into the batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("unsupported file type: {0} (accepted: JPEG, PNG, WebP)")]
    UnsupportedType(String),

    #[error("file too large: {0} bytes (limit 20 MiB)")]
    Oversize(u64),

    #[error("batch is full ({MAX_BATCH_SIZE} files max)")]
    BatchFull,
}

/// Validates a selection and compresses the accepted candidates in place.
///
/// Convenience wrapper combining [`accept_selection`] and [`maybe_compress`].
/// Compression is CPU-bound; callers on an async runtime should run this
/// inside `spawn_blocking`.
pub fn process_selection(
    selection: Vec<SelectedFile>,
    current_batch_size: usize,
    options: &CompressionOptions,
) -> IntakeOutcome {
    let mut outcome = accept_selection(selection, current_batch_size);
    for candidate in &mut outcome.accepted {
        maybe_compress(candidate, options);
    }
    outcome
}

/// Formats a byte count for display ("1.18 MB", "0 Bytes").
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let exp = (bytes.ilog2() / 10).min(UNITS.len() as u32 - 1);
    let value = bytes as f64 / 1024f64.powi(exp as i32);
    format!("{} {}", (value * 100.0).round() / 100.0, UNITS[exp as usize])
}
