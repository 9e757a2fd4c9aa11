//! HTTP error responses for API routes.
//!
//! Every API failure is reported as `{ statusCode, statusMessage }` with a
//! user-safe message. Internal details are logged, never returned.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use guild_gallery_images::GalleryError;
use serde::Serialize;
use std::fmt;
use tracing::error;

/// An API error with a client-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

/// Wire shape of an API error.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    status_code: u16,
    status_message: &'a str,
}

impl ApiError {
    /// Creates an error with the given status and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// A 500 whose cause has already been logged.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Returns the HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the client-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Maps a gallery failure, using `storage_message` when the store failed.
    pub fn from_gallery(err: GalleryError, storage_message: &str) -> Self {
        match err {
            GalleryError::InvalidUpload(e) => Self::bad_request(e.to_string()),
            GalleryError::NotOwner { .. } => {
                Self::forbidden("You can only delete your own images.")
            }
            GalleryError::Storage(report) => {
                error!(error = %report, "image storage failure");
                Self::internal(storage_message)
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            status_code: self.status.as_u16(),
            status_message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guild_gallery_images::{BlobError, UploadError};

    #[test]
    fn upload_rule_violations_are_bad_requests() {
        let err = ApiError::from_gallery(UploadError::Empty.into(), "Failed to upload image.");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "No file provided");
    }

    #[test]
    fn ownership_violation_is_forbidden() {
        let err = ApiError::from_gallery(
            GalleryError::NotOwner {
                pathname: "eve-cat.png".to_string(),
            },
            "Failed to delete image.",
        );
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.message(), "You can only delete your own images.");
    }

    #[test]
    fn storage_failure_hides_details() {
        let report: rootcause::Report<BlobError> = BlobError::Io {
            pathname: "ada-cat.png".to_string(),
            details: "disk on fire".to_string(),
        }
        .into();
        let err = ApiError::from_gallery(report.into(), "Failed to delete image.");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Failed to delete image.");
    }
}
