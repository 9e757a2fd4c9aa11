//! Upload rules.

use crate::blob::ImageUpload;
use crate::error::UploadError;

/// Two mebibytes.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024;

/// Size and type limits applied to every upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    max_bytes: u64,
    allowed_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
        }
    }
}

impl UploadPolicy {
    /// Creates a policy with explicit limits.
    #[must_use]
    pub fn new(max_bytes: u64, allowed_types: Vec<String>) -> Self {
        Self {
            max_bytes,
            allowed_types,
        }
    }

    /// Returns the size limit in bytes.
    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Returns the accepted MIME types.
    #[must_use]
    pub fn allowed_types(&self) -> &[String] {
        &self.allowed_types
    }

    /// Checks an upload against the policy.
    ///
    /// # Errors
    ///
    /// Returns the first rule the upload breaks.
    pub fn check(&self, upload: &ImageUpload) -> Result<(), UploadError> {
        if upload.bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if upload.file_name.trim().is_empty() {
            return Err(UploadError::MissingName);
        }
        let size = upload.bytes.len() as u64;
        if size > self.max_bytes {
            return Err(UploadError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        if !self.allowed_types.iter().any(|t| *t == upload.content_type) {
            return Err(UploadError::UnsupportedType {
                content_type: upload.content_type.clone(),
            });
        }
        Ok(())
    }
}
