use serde::{Deserialize, Serialize};

/// Information about an event gallery, keyed by its invite token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInfo {
    pub token: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    pub created_at: String,
}

/// A committed photo as returned by the service.
///
/// Immutable once received; the cache only appends or discards whole pages,
/// it never edits individual records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoMeta {
    /// Opaque identifier (maps to the obfuscated object key server-side).
    pub id: String,
    /// CDN/public display URL.
    pub url: String,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_meta_json_roundtrip() {
        let photo = PhotoMeta {
            id: "abc123".into(),
            url: "https://cdn.example.com/p/abc123.jpg".into(),
            width: 800,
            height: 600,
            uploader_name: Some("Sarah".into()),
            caption: None,
            created_at: "2025-01-01T10:00:00Z".into(),
        };
        let json = serde_json::to_string(&photo).unwrap();
        assert!(json.contains("uploaderName"));
        assert!(!json.contains("caption"));
        let parsed: PhotoMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(photo, parsed);
    }

    #[test]
    fn event_info_optional_cover() {
        let json = r#"{"token":"wedding2025","title":"M & A","createdAt":"2025-01-01T00:00:00Z"}"#;
        let info: EventInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.token, "wedding2025");
        assert!(info.cover_url.is_none());
    }
}
