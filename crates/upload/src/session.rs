//! Per-batch upload session state.
//!
//! A session owns its candidates exclusively. Membership is frozen the
//! moment the batch transition to `Uploading` happens; from then on the
//! only changes are per-candidate status transitions.

use guestsnap_intake::{
    CandidateStatus, CompressionOptions, Rejection, SelectedFile, UploadCandidate,
    process_selection,
};
use tracing::debug;

use crate::error::UploadError;

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Files can still be added, removed, and captioned.
    Selecting,
    /// Transfers are in flight; membership is frozen.
    Uploading,
    /// Terminal: committed, failed, or cancelled.
    Finished,
}

/// One batch of upload candidates tied to one gallery token.
pub struct UploadSession {
    token: String,
    /// Remembered display name, injected at construction and read once
    /// per session (never ambient global state).
    uploader_name: Option<String>,
    candidates: Vec<UploadCandidate>,
    phase: SessionPhase,
}

impl UploadSession {
    /// Creates an empty session for the given gallery token.
    pub fn new(token: impl Into<String>, uploader_name: Option<String>) -> Self {
        Self {
            token: token.into(),
            uploader_name,
            candidates: Vec::new(),
            phase: SessionPhase::Selecting,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn uploader_name(&self) -> Option<&str> {
        self.uploader_name.as_deref()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn candidates(&self) -> &[UploadCandidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Validates and admits a selection, compressing oversized images.
    ///
    /// Returns the per-file rejections; the caller decides how to surface
    /// them. Fails once transfer has started.
    pub fn select_files(
        &mut self,
        selection: Vec<SelectedFile>,
        options: &CompressionOptions,
    ) -> Result<Vec<Rejection>, UploadError> {
        if self.phase != SessionPhase::Selecting {
            return Err(UploadError::AlreadyStarted);
        }
        let outcome = process_selection(selection, self.candidates.len(), options);
        debug!(
            accepted = outcome.accepted.len(),
            rejected = outcome.rejections.len(),
            "selection processed"
        );
        self.candidates.extend(outcome.accepted);
        Ok(outcome.rejections)
    }

    /// Removes a candidate by id. Only allowed while it is still pending.
    pub fn remove_file(&mut self, id: &str) -> bool {
        if self.phase != SessionPhase::Selecting {
            return false;
        }
        let before = self.candidates.len();
        self.candidates
            .retain(|c| c.id() != id || !c.is_pending());
        self.candidates.len() != before
    }

    /// Sets a candidate's caption (clamped to 200 characters).
    pub fn set_caption(&mut self, id: &str, caption: &str) -> bool {
        if self.phase != SessionPhase::Selecting {
            return false;
        }
        match self.candidates.iter_mut().find(|c| c.id() == id) {
            Some(c) => {
                c.set_caption(caption);
                true
            }
            None => false,
        }
    }

    /// Tears the session down.
    ///
    /// Permitted only before the batch transition, while every candidate is
    /// still pending; an in-flight session must reach per-file terminal
    /// states first.
    pub fn cancel(&mut self) -> Result<(), UploadError> {
        if self.phase != SessionPhase::Selecting
            || self.candidates.iter().any(|c| !c.is_pending())
        {
            return Err(UploadError::AlreadyStarted);
        }
        self.candidates.clear();
        self.phase = SessionPhase::Finished;
        Ok(())
    }

    /// Aggregate progress: completed / total, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.candidates.is_empty() {
            return 0.0;
        }
        let (completed, _) = self.counts();
        completed as f64 / self.candidates.len() as f64
    }

    /// Returns `(completed, failed)` candidate counts.
    pub fn counts(&self) -> (usize, usize) {
        let mut completed = 0;
        let mut failed = 0;
        for c in &self.candidates {
            match c.status() {
                CandidateStatus::Completed => completed += 1,
                CandidateStatus::Error(_) => failed += 1,
                _ => {}
            }
        }
        (completed, failed)
    }

    /// Batch transition: every candidate moves `Pending → Uploading` and
    /// membership freezes.
    pub(crate) fn begin_batch(&mut self) {
        self.phase = SessionPhase::Uploading;
        for c in &mut self.candidates {
            c.begin_transfer();
        }
    }

    pub(crate) fn candidates_mut(&mut self) -> &mut [UploadCandidate] {
        &mut self.candidates
    }

    pub(crate) fn finish(&mut self) {
        self.phase = SessionPhase::Finished;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg(name: &str, size: usize) -> SelectedFile {
        SelectedFile::new(name, "image/jpeg", vec![0u8; size])
    }

    fn session_with_files(n: usize) -> UploadSession {
        let mut session = UploadSession::new("wedding2025", Some("Sarah".into()));
        let files = (0..n).map(|i| jpeg(&format!("f{i}.jpg"), 16)).collect();
        let rejections = session
            .select_files(files, &CompressionOptions::default())
            .unwrap();
        assert!(rejections.is_empty());
        session
    }

    #[test]
    fn new_session_is_selecting() {
        let session = UploadSession::new("t", None);
        assert_eq!(session.phase(), SessionPhase::Selecting);
        assert!(session.is_empty());
        assert_eq!(session.progress(), 0.0);
    }

    #[test]
    fn select_files_accumulates_across_calls() {
        let mut session = session_with_files(3);
        let rejections = session
            .select_files(vec![jpeg("later.jpg", 16)], &CompressionOptions::default())
            .unwrap();
        assert!(rejections.is_empty());
        assert_eq!(session.len(), 4);
    }

    #[test]
    fn batch_cap_spans_selections() {
        let mut session = session_with_files(18);
        let files = (0..5).map(|i| jpeg(&format!("x{i}.jpg"), 16)).collect();
        let rejections = session
            .select_files(files, &CompressionOptions::default())
            .unwrap();
        assert_eq!(session.len(), 20);
        assert_eq!(rejections.len(), 3);
    }

    #[test]
    fn remove_file_only_while_pending() {
        let mut session = session_with_files(2);
        let id = session.candidates()[0].id().to_string();
        assert!(session.remove_file(&id));
        assert_eq!(session.len(), 1);

        session.begin_batch();
        let id = session.candidates()[0].id().to_string();
        assert!(!session.remove_file(&id));
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn set_caption_finds_candidate() {
        let mut session = session_with_files(1);
        let id = session.candidates()[0].id().to_string();
        assert!(session.set_caption(&id, "First dance"));
        assert_eq!(session.candidates()[0].caption(), "First dance");
        assert!(!session.set_caption("no-such-id", "x"));
    }

    #[test]
    fn membership_frozen_after_start() {
        let mut session = session_with_files(1);
        session.begin_batch();
        let result = session.select_files(vec![jpeg("late.jpg", 16)], &CompressionOptions::default());
        assert!(matches!(result, Err(UploadError::AlreadyStarted)));
    }

    #[test]
    fn cancel_before_start() {
        let mut session = session_with_files(3);
        session.cancel().unwrap();
        assert_eq!(session.phase(), SessionPhase::Finished);
        assert!(session.is_empty());
    }

    #[test]
    fn cancel_rejected_after_start() {
        let mut session = session_with_files(3);
        session.begin_batch();
        assert!(matches!(session.cancel(), Err(UploadError::AlreadyStarted)));
        assert_eq!(session.len(), 3);
    }

    #[test]
    fn progress_counts_completed_only() {
        let mut session = session_with_files(4);
        session.begin_batch();
        session.candidates_mut()[0].complete();
        session.candidates_mut()[1].fail("reset");
        assert_eq!(session.counts(), (1, 1));
        assert_eq!(session.progress(), 0.25);
    }
}
