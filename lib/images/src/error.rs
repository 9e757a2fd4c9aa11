//! Error types for the images crate.
//!
//! - `UploadError`: an upload broke the upload rules (client error)
//! - `BlobError`: the blob store failed, reported through rootcause
//! - `GalleryError`: outcome of a gallery operation, for the HTTP layer

use rootcause::Report;
use std::fmt;

/// An upload was rejected before reaching the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// No file part, or a zero-length file.
    Empty,
    /// The file has no usable name.
    MissingName,
    /// The file exceeds the size limit.
    TooLarge { size: u64, limit: u64 },
    /// The request body was cut off at the size limit before the file was read.
    BodyTooLarge { limit: u64 },
    /// The content type is not accepted.
    UnsupportedType { content_type: String },
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "No file provided"),
            Self::MissingName => write!(f, "Invalid file type or missing file name"),
            Self::TooLarge { size, limit } => {
                write!(f, "File is {size} bytes, larger than the {limit} byte limit")
            }
            Self::BodyTooLarge { limit } => {
                write!(f, "File is larger than the {limit} byte limit")
            }
            Self::UnsupportedType { content_type } => {
                write!(f, "File type '{content_type}' is not allowed")
            }
        }
    }
}

impl std::error::Error for UploadError {}

/// Blob store failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobError {
    /// The pathname is not a flat, safe file name.
    InvalidPathname { pathname: String },
    /// No blob exists under the pathname.
    NotFound { pathname: String },
    /// The storage backend failed.
    Io { pathname: String, details: String },
}

impl fmt::Display for BlobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPathname { pathname } => write!(f, "invalid blob pathname '{pathname}'"),
            Self::NotFound { pathname } => write!(f, "blob '{pathname}' not found"),
            Self::Io { pathname, details } => {
                write!(f, "blob storage error on '{pathname}': {details}")
            }
        }
    }
}

impl std::error::Error for BlobError {}

/// Outcome of a failed gallery operation.
#[derive(Debug)]
pub enum GalleryError {
    /// The upload broke the upload rules.
    InvalidUpload(UploadError),
    /// The image belongs to another user.
    NotOwner { pathname: String },
    /// The blob store failed.
    Storage(Report<BlobError>),
}

impl fmt::Display for GalleryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUpload(e) => write!(f, "invalid upload: {e}"),
            Self::NotOwner { pathname } => write!(f, "image '{pathname}' belongs to another user"),
            Self::Storage(report) => write!(f, "storage failure: {report}"),
        }
    }
}

impl std::error::Error for GalleryError {}

impl From<UploadError> for GalleryError {
    fn from(e: UploadError) -> Self {
        Self::InvalidUpload(e)
    }
}

impl From<Report<BlobError>> for GalleryError {
    fn from(report: Report<BlobError>) -> Self {
        Self::Storage(report)
    }
}
