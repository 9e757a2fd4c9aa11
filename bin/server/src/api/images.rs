//! Image listing, upload and deletion.

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
};
use guild_gallery_images::{Blob, ImageUpload, Owner, UploadError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    app::AppState,
    auth::{ApiSiteAccess, ApiUser},
    error::ApiError,
};

/// Lists every image in the gallery.
pub async fn list(
    State(state): State<Arc<AppState>>,
    _access: ApiSiteAccess,
) -> Result<Json<Vec<Blob>>, ApiError> {
    let blobs = state
        .gallery
        .list_all()
        .await
        .map_err(|e| ApiError::from_gallery(e, "Failed to list images."))?;
    Ok(Json(blobs))
}

/// Lists the images uploaded by the logged-in user.
pub async fn user_images(
    State(state): State<Arc<AppState>>,
    ApiUser(user): ApiUser,
) -> Result<Json<Vec<Blob>>, ApiError> {
    let owner = Owner::from_display_name(user.display_name());
    let blobs = state
        .gallery
        .list_owned(&owner)
        .await
        .map_err(|e| ApiError::from_gallery(e, "Failed to list images."))?;
    Ok(Json(blobs))
}

/// Stores the first image part of a multipart upload.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    ApiUser(user): ApiUser,
    mut multipart: Multipart,
) -> Result<Json<Blob>, ApiError> {
    let limit = state.gallery.policy().max_bytes();
    let upload = first_image(&mut multipart, limit).await?;
    let owner = Owner::from_display_name(user.display_name());

    let blob = state
        .gallery
        .upload(&owner, upload)
        .await
        .map_err(|e| ApiError::from_gallery(e, "Failed to upload image."))?;
    Ok(Json(blob))
}

async fn first_image(multipart: &mut Multipart, limit: u64) -> Result<ImageUpload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        let Some(content_type) = field
            .content_type()
            .filter(|ct| ct.starts_with("image/"))
            .map(str::to_string)
        else {
            continue;
        };
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, limit))?;

        return Ok(ImageUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(ApiError::bad_request(UploadError::Empty.to_string()))
}

/// Oversized bodies are reported like any other oversized upload.
fn multipart_error(e: MultipartError, limit: u64) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::bad_request(UploadError::BodyTooLarge { limit }.to_string())
    } else {
        ApiError::new(e.status(), e.body_text())
    }
}

/// Body of a delete request.
#[derive(Debug, Deserialize)]
pub struct DeleteImageRequest {
    url: Option<String>,
}

/// Result of a successful delete.
#[derive(Debug, Serialize)]
pub struct DeleteImageResponse {
    success: bool,
    message: &'static str,
}

/// Deletes one of the logged-in user's images.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    ApiUser(user): ApiUser,
    Json(request): Json<DeleteImageRequest>,
) -> Result<Json<DeleteImageResponse>, ApiError> {
    let url = request
        .url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Image URL is required."))?;
    let owner = Owner::from_display_name(user.display_name());

    state
        .gallery
        .delete_by_url(&owner, &url)
        .await
        .map_err(|e| ApiError::from_gallery(e, "Failed to delete image."))?;

    Ok(Json(DeleteImageResponse {
        success: true,
        message: "Image deleted successfully.",
    }))
}
