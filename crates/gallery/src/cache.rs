//! Append-on-fetch page cache with whole-cache invalidation.

use std::sync::Arc;

use guestsnap_protocol::{ListPhotosRequest, PhotoMeta};
use tracing::debug;

use crate::service::PhotoService;
use crate::GalleryError;

/// Page size requested by the cache. The service would default to 50 if the
/// limit were omitted; the cache always sends its own.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// One fetched page, in server order.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryPage {
    pub items: Vec<PhotoMeta>,
    /// Cursor for the page after this one; `None` marks the final page.
    pub next_cursor: Option<String>,
}

/// Cursor-paginated cache over one event's gallery.
///
/// The cache owns its pages exclusively. Reads append pages; the only
/// mutation allowed from the write path is [`invalidate`](Self::invalidate),
/// which discards everything. Pages are never edited in place, so the
/// flattened view stays free of duplicates as long as paging state is reset
/// wholesale after commits.
pub struct GalleryCache {
    service: Arc<dyn PhotoService>,
    token: String,
    page_size: u32,
    pages: Vec<GalleryPage>,
    next_cursor: Option<String>,
    exhausted: bool,
}

impl GalleryCache {
    /// Creates an empty cache for the given token.
    pub fn new(service: Arc<dyn PhotoService>, token: impl Into<String>) -> Self {
        Self::with_page_size(service, token, DEFAULT_PAGE_SIZE)
    }

    /// Creates a cache with an explicit page size.
    pub fn with_page_size(
        service: Arc<dyn PhotoService>,
        token: impl Into<String>,
        page_size: u32,
    ) -> Self {
        Self {
            service,
            token: token.into(),
            page_size,
            pages: Vec::new(),
            next_cursor: None,
            exhausted: false,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Fetches the first page, replacing any cached pages on success.
    ///
    /// On failure the cached state is left exactly as it was.
    pub async fn fetch_first(&mut self) -> Result<&GalleryPage, GalleryError> {
        let page = self.request(None).await?;
        self.next_cursor = page.next_cursor.clone();
        self.exhausted = page.next_cursor.is_none();
        self.pages.clear();
        self.pages.push(page);
        Ok(&self.pages[0])
    }

    /// Fetches the page after the last cached one and appends it.
    ///
    /// Delegates to [`fetch_first`](Self::fetch_first) when nothing is
    /// cached yet. Returns `Ok(None)` once the gallery is exhausted.
    pub async fn fetch_next(&mut self) -> Result<Option<&GalleryPage>, GalleryError> {
        if self.pages.is_empty() {
            return self.fetch_first().await.map(Some);
        }
        if self.exhausted {
            return Ok(None);
        }

        let cursor = self.next_cursor.clone();
        let page = self.request(cursor).await?;
        self.next_cursor = page.next_cursor.clone();
        self.exhausted = page.next_cursor.is_none();
        self.pages.push(page);
        Ok(self.pages.last())
    }

    /// Discards all cached pages; the next read starts from the first page.
    ///
    /// Idempotent. This is the only mutation the upload path may trigger.
    /// It resets paging state wholesale instead of reconciling, which is
    /// what keeps the flattened view duplicate-free after commits shift
    /// cursor positions.
    pub fn invalidate(&mut self) {
        debug!(token = %self.token, pages = self.pages.len(), "gallery cache invalidated");
        self.pages.clear();
        self.next_cursor = None;
        self.exhausted = false;
    }

    /// Flattened view: all fetched items in fetch order.
    pub fn photos(&self) -> impl Iterator<Item = &PhotoMeta> {
        self.pages.iter().flat_map(|p| p.items.iter())
    }

    /// Number of cached photos across all pages.
    pub fn len(&self) -> usize {
        self.pages.iter().map(|p| p.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether another `fetch_next` may yield more items.
    pub fn has_more(&self) -> bool {
        !self.exhausted
    }

    pub fn pages(&self) -> &[GalleryPage] {
        &self.pages
    }

    async fn request(&self, cursor: Option<String>) -> Result<GalleryPage, GalleryError> {
        let req = ListPhotosRequest {
            token: self.token.clone(),
            cursor,
            limit: Some(self.page_size),
        };
        let resp = self.service.list_photos(&req).await?;
        debug!(
            token = %self.token,
            items = resp.items.len(),
            has_more = resp.next_cursor.is_some(),
            "fetched gallery page"
        );
        Ok(GalleryPage {
            items: resp.items,
            next_cursor: resp.next_cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guestsnap_protocol::{EventInfo, ListPhotosResponse};
    use std::collections::HashSet;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    fn photo(id: &str) -> PhotoMeta {
        PhotoMeta {
            id: id.into(),
            url: format!("https://cdn.example.com/{id}.jpg"),
            width: 800,
            height: 600,
            uploader_name: None,
            caption: None,
            created_at: "2025-01-01T10:00:00Z".into(),
        }
    }

    /// In-memory photo service with the same cursor semantics as the real
    /// one: the cursor is the id of the last item of the previous page.
    struct MockPhotos {
        photos: Mutex<Vec<PhotoMeta>>,
        fail_next: Mutex<bool>,
        calls: Mutex<usize>,
    }

    impl MockPhotos {
        fn with_ids(ids: &[&str]) -> Self {
            Self {
                photos: Mutex::new(ids.iter().map(|id| photo(id)).collect()),
                fail_next: Mutex::new(false),
                calls: Mutex::new(0),
            }
        }

        /// Simulates other guests committing: new photos land at the front.
        fn prepend(&self, id: &str) {
            self.photos.lock().unwrap().insert(0, photo(id));
        }
    }

    impl PhotoService for MockPhotos {
        fn list_photos(
            &self,
            req: &ListPhotosRequest,
        ) -> Pin<Box<dyn Future<Output = Result<ListPhotosResponse, GalleryError>> + Send + '_>>
        {
            let req = req.clone();
            Box::pin(async move {
                *self.calls.lock().unwrap() += 1;
                if std::mem::take(&mut *self.fail_next.lock().unwrap()) {
                    return Err(GalleryError::Fetch("503 service unavailable".into()));
                }

                let photos = self.photos.lock().unwrap();
                let start = match &req.cursor {
                    Some(cursor) => photos
                        .iter()
                        .position(|p| p.id == *cursor)
                        .map(|i| i + 1)
                        .unwrap_or(0),
                    None => 0,
                };
                let limit = req.limit.unwrap_or(50) as usize;
                let end = (start + limit).min(photos.len());
                let items: Vec<PhotoMeta> = photos[start..end].to_vec();
                let next_cursor = if end < photos.len() {
                    items.last().map(|p| p.id.clone())
                } else {
                    None
                };
                Ok(ListPhotosResponse { items, next_cursor })
            })
        }

        fn get_event_info(
            &self,
            token: &str,
        ) -> Pin<Box<dyn Future<Output = Result<EventInfo, GalleryError>> + Send + '_>> {
            let token = token.to_string();
            Box::pin(async move {
                if token == "wedding2025" {
                    Ok(EventInfo {
                        token,
                        title: "Mert & Ajshe, 14.09.2025".into(),
                        cover_url: None,
                        created_at: "2025-01-01T00:00:00Z".into(),
                    })
                } else {
                    Err(GalleryError::EventNotFound(token))
                }
            })
        }
    }

    fn ids(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("id{i}")).collect()
    }

    fn cache_over(ids: &[String], page_size: u32) -> (Arc<MockPhotos>, GalleryCache) {
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let service = Arc::new(MockPhotos::with_ids(&refs));
        let cache = GalleryCache::with_page_size(service.clone(), "wedding2025", page_size);
        (service, cache)
    }

    #[tokio::test]
    async fn first_page_and_cursor() {
        let all = ids(45);
        let (_service, mut cache) = cache_over(&all, 20);

        let page = cache.fetch_first().await.unwrap();
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.next_cursor.as_deref(), Some("id20"));
        assert!(cache.has_more());
        assert_eq!(cache.len(), 20);
    }

    #[tokio::test]
    async fn pagination_until_exhausted_has_no_duplicates() {
        let all = ids(45);
        let (_service, mut cache) = cache_over(&all, 20);

        while cache.fetch_next().await.unwrap().is_some() {}

        assert!(!cache.has_more());
        assert_eq!(cache.pages().len(), 3);
        assert_eq!(cache.len(), 45);

        // Flattened view preserves server order with no repeats.
        let seen: Vec<&str> = cache.photos().map(|p| p.id.as_str()).collect();
        assert_eq!(seen, all.iter().map(String::as_str).collect::<Vec<_>>());
        let unique: HashSet<&str> = seen.iter().copied().collect();
        assert_eq!(unique.len(), seen.len());
    }

    #[tokio::test]
    async fn fetch_next_after_exhaustion_is_noop() {
        let all = ids(5);
        let (service, mut cache) = cache_over(&all, 20);

        assert!(cache.fetch_next().await.unwrap().is_some());
        assert!(!cache.has_more());
        let calls_before = *service.calls.lock().unwrap();
        assert!(cache.fetch_next().await.unwrap().is_none());
        assert_eq!(*service.calls.lock().unwrap(), calls_before);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_cache_unchanged() {
        let all = ids(45);
        let (service, mut cache) = cache_over(&all, 20);
        cache.fetch_first().await.unwrap();

        *service.fail_next.lock().unwrap() = true;
        let err = cache.fetch_next().await.unwrap_err();
        assert!(matches!(err, GalleryError::Fetch(_)));

        assert_eq!(cache.len(), 20);
        assert!(cache.has_more());

        // The caller may retry; the cursor position was not consumed.
        assert!(cache.fetch_next().await.unwrap().is_some());
        assert_eq!(cache.len(), 40);
    }

    #[tokio::test]
    async fn invalidate_discards_all_pages() {
        let all = ids(45);
        let (_service, mut cache) = cache_over(&all, 20);
        cache.fetch_first().await.unwrap();
        cache.fetch_next().await.unwrap();
        assert_eq!(cache.len(), 40);

        cache.invalidate();
        assert!(cache.is_empty());
        assert!(cache.has_more());
        assert_eq!(cache.pages().len(), 0);
    }

    #[tokio::test]
    async fn invalidate_is_idempotent() {
        let all = ids(30);
        let (_service, mut cache) = cache_over(&all, 20);
        cache.fetch_first().await.unwrap();

        cache.invalidate();
        let once = cache.fetch_first().await.unwrap().clone();

        cache.invalidate();
        cache.invalidate();
        let twice = cache.fetch_first().await.unwrap().clone();

        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn invalidate_after_commit_avoids_resurfacing() {
        let all = ids(25);
        let (service, mut cache) = cache_over(&all, 20);
        cache.fetch_first().await.unwrap();

        // A commit prepends a photo, shifting every cursor position.
        service.prepend("fresh1");

        cache.invalidate();
        while cache.fetch_next().await.unwrap().is_some() {}

        let seen: Vec<&str> = cache.photos().map(|p| p.id.as_str()).collect();
        assert_eq!(seen.len(), 26);
        assert_eq!(seen[0], "fresh1");
        let unique: HashSet<&str> = seen.iter().copied().collect();
        assert_eq!(unique.len(), seen.len());
    }

    #[tokio::test]
    async fn fetch_first_replaces_pages() {
        let all = ids(45);
        let (_service, mut cache) = cache_over(&all, 20);
        cache.fetch_first().await.unwrap();
        cache.fetch_next().await.unwrap();
        assert_eq!(cache.len(), 40);

        cache.fetch_first().await.unwrap();
        assert_eq!(cache.len(), 20);
        assert_eq!(cache.pages().len(), 1);
    }

    #[tokio::test]
    async fn empty_gallery() {
        let (_service, mut cache) = cache_over(&[], 20);
        let page = cache.fetch_first().await.unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_cursor.is_none());
        assert!(!cache.has_more());
    }

    #[tokio::test]
    async fn event_lookup() {
        let service = Arc::new(MockPhotos::with_ids(&[]));
        let info = service.get_event_info("wedding2025").await.unwrap();
        assert_eq!(info.title, "Mert & Ajshe, 14.09.2025");
        assert!(matches!(
            service.get_event_info("nope").await,
            Err(GalleryError::EventNotFound(_))
        ));
    }
}
