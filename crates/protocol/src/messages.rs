use serde::{Deserialize, Serialize};

use crate::types::PhotoMeta;

// ---------------------------------------------------------------------------
// Gallery listing
// ---------------------------------------------------------------------------

/// Requests one page of the event gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPhotosRequest {
    pub token: String,
    /// Identifier of the last item of the previous page; absent = from start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    /// Page size. The service applies its own default (50) when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// One page of gallery items.
///
/// `next_cursor` absent means this was the final page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPhotosResponse {
    pub items: Vec<PhotoMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

// ---------------------------------------------------------------------------
// Upload: begin / complete
// ---------------------------------------------------------------------------

/// Describes one file the client intends to upload.
///
/// `size` is the declared transfer size: the compressed size when a
/// compressed variant exists, the raw size otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub file_name: String,
    pub mime_type: String,
    pub size: u64,
}

/// Reserves one upload slot per file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginUploadRequest {
    pub token: String,
    pub files: Vec<FileDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader_name: Option<String>,
}

/// A server-issued upload slot.
///
/// Slot `i` in [`BeginUploadResponse::uploads`] corresponds to file `i` in
/// the request. Keys are unique per request and must not be reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservedSlot {
    pub temp_id: String,
    /// Presigned transfer target for the file bytes.
    pub upload_url: String,
    /// Opaque server-side key; becomes the final object name.
    pub object_key: String,
}

/// Response to [`BeginUploadRequest`]: exactly one slot per input file,
/// same order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginUploadResponse {
    pub uploads: Vec<ReservedSlot>,
}

/// Commit metadata for one successfully transferred file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedItem {
    pub object_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Finalizes a batch: commits metadata for the files that transferred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteUploadRequest {
    pub token: String,
    pub completed: Vec<CompletedItem>,
}
