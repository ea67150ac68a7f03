//! Cursor-paginated read model over the event gallery.
//!
//! [`GalleryCache`] accumulates pages as the viewer scrolls and discards
//! everything on invalidation, so the next read reflects freshly committed
//! photos. The service is reached through the [`PhotoService`] trait; the
//! app bridges it to its HTTP layer.

mod cache;
mod service;

pub use cache::{DEFAULT_PAGE_SIZE, GalleryCache, GalleryPage};
pub use service::PhotoService;

/// Errors from gallery reads.
///
/// A failed fetch never mutates cached state; retrying is the caller's
/// decision.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GalleryError {
    #[error("event not found: {0}")]
    EventNotFound(String),

    #[error("fetch failed: {0}")]
    Fetch(String),
}
