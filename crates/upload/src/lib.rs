//! Batch upload flow for guest photos.
//!
//! This crate implements the **business logic** for pushing one batch of
//! validated photo candidates to the upload service. It is a library crate
//! with no transport dependencies; callers provide an [`UploadService`]
//! implementation that bridges to the actual request layer.
//!
//! # Pipeline
//!
//! 1. **Begin**: reserve one upload slot per candidate
//! 2. **Transfer**: send each candidate's bytes to its slot, independently
//! 3. **Complete**: commit metadata for the candidates that transferred
//!
//! Per-file and aggregate status is streamed as [`UploadEvent`]s.

pub mod error;
pub mod service;
pub mod session;
pub mod types;
pub mod uploader;

// Re-export primary types for convenience.
pub use error::{ServiceError, UploadError};
pub use service::UploadService;
pub use session::{SessionPhase, UploadSession};
pub use types::{BatchOutcome, TransferPolicy, UploadEvent};
pub use uploader::BatchUploader;
