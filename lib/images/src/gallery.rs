//! Gallery operations: upload rules, naming and ownership over a blob store.

use crate::blob::{Blob, ImageUpload};
use crate::error::GalleryError;
use crate::owner::Owner;
use crate::policy::UploadPolicy;
use crate::store::BlobStore;
use guild_gallery_core::UploadId;
use tracing::{info, instrument, warn};

/// Image gallery backed by a blob store.
#[derive(Debug, Clone)]
pub struct Gallery<S> {
    store: S,
    policy: UploadPolicy,
}

impl<S> Gallery<S>
where
    S: BlobStore,
{
    /// Creates a gallery over `store`.
    #[must_use]
    pub fn new(store: S, policy: UploadPolicy) -> Self {
        Self { store, policy }
    }

    /// Returns the upload rules.
    #[must_use]
    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Returns the underlying blob store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates and stores an upload under the owner's prefix.
    ///
    /// The stored name is `{owner}-{stem}-{suffix}.{ext}` with a random
    /// suffix, so uploads never overwrite each other.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::InvalidUpload`] if the upload breaks the
    /// policy and [`GalleryError::Storage`] if the store fails.
    #[instrument(skip(self, owner, upload), fields(owner = %owner, file_name = %upload.file_name))]
    pub async fn upload(&self, owner: &Owner, upload: ImageUpload) -> Result<Blob, GalleryError> {
        self.policy.check(&upload)?;

        let pathname = stored_name(owner, &upload, UploadId::new());
        let blob = self.store.put(&pathname, &upload.bytes).await?;

        info!(pathname = %blob.pathname, size = blob.size, "image uploaded");
        Ok(blob)
    }

    /// Lists every image in the gallery.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::Storage`] if the store fails.
    pub async fn list_all(&self) -> Result<Vec<Blob>, GalleryError> {
        Ok(self.store.list().await?)
    }

    /// Lists the images stored under the owner's prefix.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::Storage`] if the store fails.
    pub async fn list_owned(&self, owner: &Owner) -> Result<Vec<Blob>, GalleryError> {
        let blobs = self.store.list().await?;
        Ok(blobs
            .into_iter()
            .filter(|blob| owner.owns(&blob.pathname))
            .collect())
    }

    /// Deletes the image a public URL points to, if the owner owns it.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::NotOwner`] if the image name does not carry
    /// the owner's prefix and [`GalleryError::Storage`] if the store fails.
    #[instrument(skip(self, owner), fields(owner = %owner))]
    pub async fn delete_by_url(&self, owner: &Owner, url: &str) -> Result<(), GalleryError> {
        let pathname = pathname_from_url(url);
        if !owner.owns(pathname) {
            warn!(pathname, "refusing to delete another user's image");
            return Err(GalleryError::NotOwner {
                pathname: pathname.to_string(),
            });
        }

        self.store.delete(pathname).await?;
        info!(pathname, "image deleted");
        Ok(())
    }
}

/// Last path segment of a blob URL, without query or fragment.
fn pathname_from_url(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path)
}

fn stored_name(owner: &Owner, upload: &ImageUpload, id: UploadId) -> String {
    let original_stem = upload
        .file_name
        .rsplit_once('.')
        .map_or(upload.file_name.as_str(), |(stem, _)| stem);
    let stem: String = original_stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    let stem = if stem.is_empty() { "upload".to_string() } else { stem };
    format!("{owner}-{stem}-{}.{}", id.suffix(), upload.extension())
}
