//! Batch uploader: drives a session through begin / transfer / complete.
//!
//! Per-candidate outcomes are independent; session-fatal errors (failed
//! reservation, slot mismatch, failed commit, zero successful transfers)
//! come back as [`UploadError`]. Status is streamed as [`UploadEvent`]s.

use std::sync::Arc;
use std::time::Duration;

use guestsnap_intake::{CandidateStatus, probe_dimensions};
use guestsnap_protocol::{BeginUploadRequest, CompleteUploadRequest, CompletedItem, FileDescriptor};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{ServiceError, UploadError};
use crate::service::UploadService;
use crate::session::{SessionPhase, UploadSession};
use crate::types::{BatchOutcome, TransferPolicy, UploadEvent};

/// Uploads one batch of candidates to the service.
pub struct BatchUploader {
    service: Arc<dyn UploadService>,
    policy: TransferPolicy,
    events_tx: mpsc::Sender<UploadEvent>,
    events_rx: Option<mpsc::Receiver<UploadEvent>>,
    cancel: CancellationToken,
}

impl BatchUploader {
    /// Creates an uploader with the default transfer policy.
    pub fn new(service: Arc<dyn UploadService>) -> Self {
        Self::with_policy(service, TransferPolicy::default())
    }

    /// Creates an uploader with an explicit transfer policy.
    pub fn with_policy(service: Arc<dyn UploadService>, policy: TransferPolicy) -> Self {
        let (events_tx, events_rx) = mpsc::channel(256);
        Self {
            service,
            policy,
            events_tx,
            events_rx: Some(events_rx),
            cancel: CancellationToken::new(),
        }
    }

    /// Takes the event receiver. Can only be called once.
    ///
    /// The stream is best-effort: emission never blocks the pipeline, so a
    /// consumer that stops draining (or never attaches) loses events once
    /// the channel buffer fills.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<UploadEvent>> {
        self.events_rx.take()
    }

    /// Best-effort event emission. Dropped when the buffer is full or the
    /// receiver is gone; uploads must never stall on an undrained stream.
    fn emit(&self, event: UploadEvent) {
        let _ = self.events_tx.try_send(event);
    }

    /// Returns a cancellation token for this uploader.
    ///
    /// Cancellation is honored only before the batch transition; once
    /// transfers start the batch runs to per-file terminal states.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs the full batch pipeline for one session.
    ///
    /// On success every surviving candidate is `Completed`, the commit has
    /// been acknowledged, and the session is finished. Fatal errors finish
    /// the session too; it is never reusable after `run`.
    pub async fn run(&self, session: &mut UploadSession) -> Result<BatchOutcome, UploadError> {
        let token = session.token().to_string();

        match self.run_batch(session).await {
            Ok(outcome) => {
                self.emit(UploadEvent::BatchCompleted {
                    uploaded: outcome.uploaded,
                });
                info!(
                    token = %token,
                    uploaded = outcome.uploaded,
                    failed = outcome.failed,
                    "batch committed"
                );
                Ok(outcome)
            }
            Err(e) => {
                self.emit(UploadEvent::BatchFailed {
                    error: e.to_string(),
                });
                error!(token = %token, error = %e, "batch failed");
                Err(e)
            }
        }
    }

    async fn run_batch(&self, session: &mut UploadSession) -> Result<BatchOutcome, UploadError> {
        if session.phase() != SessionPhase::Selecting {
            return Err(UploadError::AlreadyStarted);
        }
        if session.is_empty() {
            return Err(UploadError::EmptyBatch);
        }

        // Pre-transfer cancellation gate.
        if self.cancel.is_cancelled() {
            session.finish();
            return Err(UploadError::Cancelled);
        }

        // 1. Reserve one slot per candidate.
        let files: Vec<FileDescriptor> = session
            .candidates()
            .iter()
            .map(|c| FileDescriptor {
                file_name: c.file_name().to_string(),
                mime_type: c.mime_type().to_string(),
                size: c.upload_size(),
            })
            .collect();

        let begin_req = BeginUploadRequest {
            token: session.token().to_string(),
            files,
            uploader_name: session.uploader_name().map(String::from),
        };

        debug!(token = %begin_req.token, files = begin_req.files.len(), "begin upload");
        let reservation = self.service.begin_upload(&begin_req).await.map_err(|e| {
            session.finish();
            UploadError::Reservation(e)
        })?;

        // Slot i corresponds to candidate i; a count mismatch is fatal to
        // the session, not to any single file.
        if reservation.uploads.len() != session.len() {
            session.finish();
            return Err(UploadError::SlotMismatch {
                requested: session.len(),
                reserved: reservation.uploads.len(),
            });
        }

        // 2. Batch transition, then independent per-file transfers.
        session.begin_batch();
        for c in session.candidates() {
            self.emit(UploadEvent::FileStarted {
                id: c.id().to_string(),
                file_name: c.file_name().to_string(),
            });
        }
        self.emit_progress(session);

        self.transfer_all(session, &reservation.uploads).await;

        let (completed, failed) = session.counts();

        // 3. Commit metadata for the candidates that made it.
        let items: Vec<CompletedItem> = session
            .candidates()
            .iter()
            .zip(&reservation.uploads)
            .filter(|(c, _)| *c.status() == CandidateStatus::Completed)
            .map(|(c, slot)| {
                let dims = probe_dimensions(c.raw_bytes());
                CompletedItem {
                    object_key: slot.object_key.clone(),
                    caption: (!c.caption().is_empty()).then(|| c.caption().to_string()),
                    width: dims.map(|(w, _)| w),
                    height: dims.map(|(_, h)| h),
                }
            })
            .collect();

        if items.is_empty() {
            session.finish();
            return Err(UploadError::AllTransfersFailed);
        }

        let complete_req = CompleteUploadRequest {
            token: session.token().to_string(),
            completed: items,
        };

        debug!(token = %complete_req.token, items = complete_req.completed.len(), "complete upload");
        let commit = self.service.complete_upload(&complete_req).await;
        session.finish();

        // A failed commit fails the session even though individual
        // transfers succeeded; the transferred bytes stay orphaned
        // server-side.
        commit.map_err(UploadError::Commit)?;

        Ok(BatchOutcome {
            uploaded: completed,
            failed,
        })
    }

    /// Transfers every candidate's bytes to its reserved slot.
    ///
    /// Transfers are issued in acceptance order with at most
    /// `policy.max_concurrent` in flight. Every candidate reaches a
    /// terminal state before this returns.
    async fn transfer_all(
        &self,
        session: &mut UploadSession,
        slots: &[guestsnap_protocol::ReservedSlot],
    ) {
        struct Job {
            index: usize,
            target: String,
            data: Arc<[u8]>,
        }

        let jobs: Vec<Job> = session
            .candidates()
            .iter()
            .zip(slots)
            .enumerate()
            .map(|(index, (c, slot))| Job {
                index,
                target: slot.upload_url.clone(),
                data: c.upload_bytes(),
            })
            .collect();

        let window = self.policy.max_concurrent.max(1);
        let timeout = self.policy.per_file_timeout;

        let mut set: JoinSet<(usize, Result<(), ServiceError>)> = JoinSet::new();
        let mut next = 0;

        while next < jobs.len() || !set.is_empty() {
            while next < jobs.len() && set.len() < window {
                let job = &jobs[next];
                let service = Arc::clone(&self.service);
                let index = job.index;
                let target = job.target.clone();
                let data = Arc::clone(&job.data);
                set.spawn(async move {
                    let result = transfer_one(service, &target, &data, timeout).await;
                    (index, result)
                });
                next += 1;
            }

            match set.join_next().await {
                Some(Ok((index, result))) => self.apply_transfer_result(session, index, result),
                Some(Err(e)) => {
                    // The candidate is failed by the sweep below.
                    warn!(error = %e, "transfer task aborted");
                }
                None => break,
            }
        }

        // Safety net: no candidate may be left in `Uploading`.
        let stalled: Vec<usize> = session
            .candidates()
            .iter()
            .enumerate()
            .filter(|(_, c)| *c.status() == CandidateStatus::Uploading)
            .map(|(i, _)| i)
            .collect();
        for index in stalled {
            self.apply_transfer_result(
                session,
                index,
                Err(ServiceError::TransferFailed("transfer task aborted".into())),
            );
        }
    }

    fn apply_transfer_result(
        &self,
        session: &mut UploadSession,
        index: usize,
        result: Result<(), ServiceError>,
    ) {
        let candidate = &mut session.candidates_mut()[index];
        let id = candidate.id().to_string();
        match result {
            Ok(()) => {
                candidate.complete();
                debug!(file = %id, "transfer completed");
                self.emit(UploadEvent::FileCompleted { id });
            }
            Err(e) => {
                let reason = e.to_string();
                candidate.fail(reason.clone());
                warn!(file = %id, error = %reason, "transfer failed");
                self.emit(UploadEvent::FileFailed { id, error: reason });
            }
        }
        self.emit_progress(session);
    }

    fn emit_progress(&self, session: &UploadSession) {
        let (completed, failed) = session.counts();
        self.emit(UploadEvent::Progress {
            completed,
            failed,
            total: session.len(),
            fraction: session.progress(),
        });
    }
}

async fn transfer_one(
    service: Arc<dyn UploadService>,
    target: &str,
    data: &[u8],
    timeout: Option<Duration>,
) -> Result<(), ServiceError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, service.transfer(target, data))
            .await
            .map_err(|_| {
                ServiceError::TransferFailed(format!("timed out after {}ms", limit.as_millis()))
            })?,
        None => service.transfer(target, data).await,
    }
}
