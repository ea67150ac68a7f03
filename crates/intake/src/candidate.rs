use std::path::Path;
use std::sync::Arc;

use crate::MAX_CAPTION_LEN;

/// A file the user picked, before any validation.
///
/// Bytes are shared so candidates can be handed to concurrent transfer
/// tasks without copying image data.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub file_name: String,
    /// Declared MIME type (from the picker, not sniffed).
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, deriving the MIME type from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = match path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .as_deref()
        {
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("webp") => "image/webp",
            Some(other) => return Ok(Self::new(file_name, format!("image/{other}"), bytes)),
            None => "application/octet-stream",
        }
        .to_string();
        Ok(Self {
            file_name,
            mime_type,
            bytes: bytes.into(),
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Per-candidate upload state.
///
/// The only legal sequences are prefixes of `Pending → Uploading → Completed`
/// or `Pending → Uploading → Error`; the transition methods ignore anything
/// else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateStatus {
    Pending,
    Uploading,
    Completed,
    Error(String),
}

/// One selected file awaiting upload, with its session-local state.
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    id: String,
    file: SelectedFile,
    compressed: Option<Arc<[u8]>>,
    caption: String,
    status: CandidateStatus,
}

impl UploadCandidate {
    /// Wraps an accepted file with a fresh client-generated identifier.
    pub fn new(file: SelectedFile) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file,
            compressed: None,
            caption: String::new(),
            status: CandidateStatus::Pending,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.file.mime_type
    }

    /// Original bytes, used for dimension probing.
    pub fn raw_bytes(&self) -> &[u8] {
        &self.file.bytes
    }

    pub fn raw_size(&self) -> u64 {
        self.file.size()
    }

    /// Bytes to transfer: the compressed variant when present.
    pub fn upload_bytes(&self) -> Arc<[u8]> {
        self.compressed
            .clone()
            .unwrap_or_else(|| Arc::clone(&self.file.bytes))
    }

    /// Declared transfer size: compressed size when a variant exists.
    pub fn upload_size(&self) -> u64 {
        self.compressed
            .as_ref()
            .map(|c| c.len() as u64)
            .unwrap_or_else(|| self.file.size())
    }

    pub fn has_compressed(&self) -> bool {
        self.compressed.is_some()
    }

    pub(crate) fn set_compressed(&mut self, data: Arc<[u8]>) {
        self.compressed = Some(data);
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Sets the caption, clamping to [`MAX_CAPTION_LEN`] characters.
    pub fn set_caption(&mut self, caption: &str) {
        self.caption = caption.chars().take(MAX_CAPTION_LEN).collect();
    }

    pub fn status(&self) -> &CandidateStatus {
        &self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == CandidateStatus::Pending
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            CandidateStatus::Completed | CandidateStatus::Error(_)
        )
    }

    /// `Pending → Uploading`. No-op from any other state.
    pub fn begin_transfer(&mut self) {
        if self.status == CandidateStatus::Pending {
            self.status = CandidateStatus::Uploading;
        }
    }

    /// `Uploading → Completed`. No-op from any other state.
    pub fn complete(&mut self) {
        if self.status == CandidateStatus::Uploading {
            self.status = CandidateStatus::Completed;
        }
    }

    /// `Uploading → Error`. No-op from any other state.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if self.status == CandidateStatus::Uploading {
            self.status = CandidateStatus::Error(reason.into());
        }
    }
}
