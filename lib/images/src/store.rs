//! Blob storage backends.

use crate::blob::Blob;
use crate::error::BlobError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guild_gallery_core::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Flat key/value storage for image files.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes `bytes` under `pathname`, replacing any existing blob.
    async fn put(&self, pathname: &str, bytes: &[u8]) -> Result<Blob, BlobError>;

    /// Lists every stored blob, ordered by pathname.
    async fn list(&self) -> Result<Vec<Blob>, BlobError>;

    /// Removes the blob stored under `pathname`.
    async fn delete(&self, pathname: &str) -> Result<(), BlobError>;
}

/// Stores blobs as files in a single directory.
///
/// Files are served by the HTTP layer under `url_base`.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    url_base: String,
}

impl FsBlobStore {
    /// Creates a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn open(
        root: impl Into<PathBuf>,
        url_base: impl Into<String>,
    ) -> Result<Self, BlobError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| BlobError::Io {
                pathname: root.display().to_string(),
                details: e.to_string(),
            })?;
        Ok(Self {
            root,
            url_base: url_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Returns the directory blobs are stored in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, pathname: &str) -> Result<PathBuf, BlobError> {
        let valid = !pathname.is_empty()
            && !pathname.starts_with('.')
            && !pathname.contains(['/', '\\', '\0']);
        if !valid {
            return Err(BlobError::InvalidPathname {
                pathname: pathname.to_string(),
            }
            .into());
        }
        Ok(self.root.join(pathname))
    }

    fn blob(&self, pathname: String, size: u64, uploaded_at: DateTime<Utc>) -> Blob {
        Blob {
            url: format!("{}/{}", self.url_base, pathname),
            pathname,
            size,
            uploaded_at,
        }
    }
}

fn io_error(pathname: &str, e: std::io::Error) -> BlobError {
    BlobError::Io {
        pathname: pathname.to_string(),
        details: e.to_string(),
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn put(&self, pathname: &str, bytes: &[u8]) -> Result<Blob, BlobError> {
        let path = self.path_for(pathname)?;
        let staging = self.root.join(format!(".{pathname}.partial"));

        tokio::fs::write(&staging, bytes)
            .await
            .map_err(|e| io_error(pathname, e))?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(|e| io_error(pathname, e))?;

        debug!("blob written");
        Ok(self.blob(pathname.to_string(), bytes.len() as u64, Utc::now()))
    }

    async fn list(&self) -> Result<Vec<Blob>, BlobError> {
        let root = self.root.display().to_string();
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| io_error(&root, e))?;

        let mut blobs = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(&root, e))? {
            let Ok(pathname) = entry.file_name().into_string() else {
                continue;
            };
            if pathname.starts_with('.') {
                continue;
            }
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| io_error(&pathname, e))?;
            if !metadata.is_file() {
                continue;
            }
            let uploaded_at = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            blobs.push(self.blob(pathname, metadata.len(), uploaded_at));
        }

        blobs.sort_by(|a, b| a.pathname.cmp(&b.pathname));
        Ok(blobs)
    }

    #[instrument(skip(self))]
    async fn delete(&self, pathname: &str) -> Result<(), BlobError> {
        let path = self.path_for(pathname)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("blob deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(BlobError::NotFound {
                pathname: pathname.to_string(),
            }
            .into()),
            Err(e) => Err(io_error(pathname, e).into()),
        }
    }
}
