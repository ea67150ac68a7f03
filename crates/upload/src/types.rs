//! Data types for the upload flow.

use std::time::Duration;

use serde::Serialize;

/// Transfer execution policy.
///
/// The default reproduces the service's observed behavior: one transfer at
/// a time, no timeout. Both knobs are configurable because a transfer that
/// never resolves otherwise leaves its candidate stalled in `Uploading`.
#[derive(Debug, Clone)]
pub struct TransferPolicy {
    /// Per-file transfer timeout. `None` = wait forever.
    pub per_file_timeout: Option<Duration>,
    /// Maximum transfers in flight. Transfers are always *issued* in
    /// acceptance order; only completion order may differ.
    pub max_concurrent: usize,
}

impl Default for TransferPolicy {
    fn default() -> Self {
        Self {
            per_file_timeout: None,
            max_concurrent: 1,
        }
    }
}

/// Status event emitted while a batch uploads.
///
/// Serializable so app shells can forward events to their UI layer as-is.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UploadEvent {
    /// A candidate entered `Uploading`.
    #[serde(rename_all = "camelCase")]
    FileStarted { id: String, file_name: String },
    /// A candidate's bytes reached its slot.
    FileCompleted { id: String },
    /// A candidate's transfer failed; siblings continue.
    FileFailed { id: String, error: String },
    /// Aggregate progress, recomputed on every per-file transition.
    Progress {
        completed: usize,
        failed: usize,
        total: usize,
        /// completed / total, in `0.0..=1.0`.
        fraction: f64,
    },
    /// The batch committed successfully.
    BatchCompleted { uploaded: usize },
    /// The batch failed as a whole (reservation, commit, or zero transfers).
    BatchFailed { error: String },
}

/// Final accounting for one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    /// Candidates committed to the gallery.
    pub uploaded: usize,
    /// Candidates that ended in `Error`.
    pub failed: usize,
}
