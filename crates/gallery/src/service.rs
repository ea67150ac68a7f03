use std::future::Future;
use std::pin::Pin;

use guestsnap_protocol::{EventInfo, ListPhotosRequest, ListPhotosResponse};

use crate::GalleryError;

/// Read side of the photo service.
///
/// Cursor semantics are the service's; the client contract is only that an
/// absent cursor means "from the start" and an absent `next_cursor` in a
/// response marks the final page.
pub trait PhotoService: Send + Sync {
    /// Fetches one page of the gallery.
    fn list_photos(
        &self,
        req: &ListPhotosRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ListPhotosResponse, GalleryError>> + Send + '_>>;

    /// Resolves an invite token to its event, or fails with
    /// [`GalleryError::EventNotFound`].
    fn get_event_info(
        &self,
        token: &str,
    ) -> Pin<Box<dyn Future<Output = Result<EventInfo, GalleryError>> + Send + '_>>;
}
