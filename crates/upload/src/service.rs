//! Upload service contract consumed by the batch uploader.
//!
//! The app provides an implementation on top of its HTTP layer. Using a
//! trait keeps upload logic decoupled from transport and testable with mocks.

use std::future::Future;
use std::pin::Pin;

use guestsnap_protocol::{BeginUploadRequest, BeginUploadResponse, CompleteUploadRequest};

use crate::error::ServiceError;

/// Abstract connection to the upload service.
pub trait UploadService: Send + Sync {
    /// Reserves one upload slot per file in the request.
    ///
    /// The service must return exactly one reservation per input file, in
    /// the same order; the uploader treats any mismatch as fatal.
    fn begin_upload(
        &self,
        req: &BeginUploadRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BeginUploadResponse, ServiceError>> + Send + '_>>;

    /// Transfers file bytes to a reserved slot's target.
    ///
    /// Outcomes are independent per file.
    fn transfer(
        &self,
        target: &str,
        data: &[u8],
    ) -> Pin<Box<dyn Future<Output = Result<(), ServiceError>> + Send + '_>>;

    /// Commits metadata for the transferred files. All-or-nothing from the
    /// client's perspective.
    fn complete_upload(
        &self,
        req: &CompleteUploadRequest,
    ) -> Pin<Box<dyn Future<Output = Result<(), ServiceError>> + Send + '_>>;
}
