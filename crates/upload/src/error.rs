//! Upload error types.

/// Errors reported by the external upload service.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ServiceError {
    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("transfer failed: {0}")]
    TransferFailed(String),

    #[error("commit failed: {0}")]
    CommitFailed(String),
}

/// Errors fatal to a whole upload session.
///
/// Per-file transfer failures are *not* here; they surface as the
/// candidate's `Error` status and never abort siblings.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("no files selected")]
    EmptyBatch,

    #[error("session already started")]
    AlreadyStarted,

    #[error("reservation failed: {0}")]
    Reservation(ServiceError),

    #[error("slot count mismatch: requested {requested}, reserved {reserved}")]
    SlotMismatch { requested: usize, reserved: usize },

    #[error("no files were uploaded")]
    AllTransfersFailed,

    #[error("commit failed: {0}")]
    Commit(ServiceError),

    #[error("cancelled")]
    Cancelled,
}
