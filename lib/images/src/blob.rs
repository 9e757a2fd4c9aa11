//! Stored image metadata and incoming uploads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored image as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    /// Flat name of the image within the store.
    pub pathname: String,
    /// Public URL the image is served from.
    pub url: String,
    /// Size in bytes.
    pub size: u64,
    /// When the image was written.
    pub uploaded_at: DateTime<Utc>,
}

/// An image file received from a client, not yet validated.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// File name supplied by the client.
    pub file_name: String,
    /// Declared MIME type.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Extension implied by the content type.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => "bin",
        }
    }
}
