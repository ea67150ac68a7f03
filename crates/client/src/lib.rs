//! Guest-facing facade over the upload and gallery crates.
//!
//! [`EventClient`] is what an app shell holds per opened event: it resolves
//! the invite token, owns the current upload session and the gallery cache,
//! and wires the one cross-cutting rule between them, namely that a
//! committed batch invalidates the cached gallery so fresh photos surface
//! on the next read.

use std::sync::Arc;

use guestsnap_gallery::{GalleryCache, GalleryError, GalleryPage, PhotoService};
use guestsnap_intake::{CompressionOptions, Rejection, SelectedFile};
use guestsnap_protocol::{EventInfo, PhotoMeta};
use guestsnap_upload::{
    BatchOutcome, BatchUploader, TransferPolicy, UploadError, UploadEvent, UploadService,
    UploadSession,
};
use tokio::sync::mpsc;
use tracing::info;

/// Errors surfaced by the facade.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// An operation needed an active session and none exists.
    #[error("no active upload session")]
    NoSession,

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Gallery(#[from] GalleryError),
}

/// Per-client tunables, all with sensible defaults.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Display name attached to this guest's uploads.
    pub uploader_name: Option<String>,
    pub compression: CompressionOptions,
    pub transfer: TransferPolicy,
}

/// One guest's view of one event.
///
/// Holds at most one upload session at a time. A session is created lazily
/// on the first [`select_files`](Self::select_files) and consumed by
/// [`confirm_upload`](Self::confirm_upload) or
/// [`cancel_session`](Self::cancel_session); either way the next selection
/// starts a fresh one.
pub struct EventClient {
    event: EventInfo,
    config: ClientConfig,
    uploader: BatchUploader,
    session: Option<UploadSession>,
    cache: GalleryCache,
}

impl EventClient {
    /// Opens an event by invite token.
    ///
    /// Fails with [`GalleryError::EventNotFound`] if the token does not
    /// resolve; nothing is fetched or uploaded before that check passes.
    pub async fn open(
        upload_service: Arc<dyn UploadService>,
        photo_service: Arc<dyn PhotoService>,
        token: &str,
        config: ClientConfig,
    ) -> Result<Self, ClientError> {
        let event = photo_service.get_event_info(token).await?;
        info!(token = %event.token, title = %event.title, "event opened");

        let cache = GalleryCache::new(photo_service, event.token.clone());
        let uploader = BatchUploader::with_policy(upload_service, config.transfer.clone());
        Ok(Self {
            event,
            config,
            uploader,
            session: None,
            cache,
        })
    }

    pub fn event(&self) -> &EventInfo {
        &self.event
    }

    /// The current upload session, if one is active.
    pub fn session(&self) -> Option<&UploadSession> {
        self.session.as_ref()
    }

    /// Takes the upload event receiver. Can only be called once.
    ///
    /// The stream is best-effort; uploads proceed whether or not a
    /// consumer is attached or keeping up.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<UploadEvent>> {
        self.uploader.take_events()
    }

    /// Adds files to the current session, creating one if needed.
    ///
    /// Returns the per-file rejections so the shell can show why a file was
    /// turned away.
    pub fn select_files(
        &mut self,
        selection: Vec<SelectedFile>,
    ) -> Result<Vec<Rejection>, ClientError> {
        let token = self.event.token.clone();
        let uploader_name = self.config.uploader_name.clone();
        let session = self
            .session
            .get_or_insert_with(|| UploadSession::new(token, uploader_name));
        Ok(session.select_files(selection, &self.config.compression)?)
    }

    /// Removes a pending candidate from the current session.
    pub fn remove_file(&mut self, id: &str) -> bool {
        self.session.as_mut().is_some_and(|s| s.remove_file(id))
    }

    /// Sets a candidate's caption in the current session.
    pub fn set_caption(&mut self, id: &str, caption: &str) -> bool {
        self.session
            .as_mut()
            .is_some_and(|s| s.set_caption(id, caption))
    }

    /// Runs the full upload pipeline for the current session.
    ///
    /// Consumes the session whatever the outcome; a failed batch is not
    /// retryable in place, the guest reselects. On success the gallery
    /// cache is invalidated so the committed photos surface on the next
    /// read.
    pub async fn confirm_upload(&mut self) -> Result<BatchOutcome, ClientError> {
        let mut session = self.session.take().ok_or(ClientError::NoSession)?;
        let outcome = self.uploader.run(&mut session).await?;
        self.cache.invalidate();
        Ok(outcome)
    }

    /// Discards the current session before any transfer has started.
    pub fn cancel_session(&mut self) -> Result<(), ClientError> {
        let mut session = self.session.take().ok_or(ClientError::NoSession)?;
        session.cancel()?;
        info!(token = %self.event.token, "session cancelled");
        Ok(())
    }

    /// Fetches the next gallery page. Returns `false` once exhausted.
    pub async fn fetch_more(&mut self) -> Result<bool, ClientError> {
        Ok(self.cache.fetch_next().await?.is_some())
    }

    /// Drops all cached pages and refetches the first one.
    pub async fn refresh(&mut self) -> Result<&GalleryPage, ClientError> {
        self.cache.invalidate();
        Ok(self.cache.fetch_first().await?)
    }

    /// All fetched photos in display order.
    pub fn photos(&self) -> impl Iterator<Item = &PhotoMeta> {
        self.cache.photos()
    }

    /// Whether the gallery has pages that were not fetched yet.
    pub fn has_more(&self) -> bool {
        self.cache.has_more()
    }

    pub fn gallery(&self) -> &GalleryCache {
        &self.cache
    }
}
