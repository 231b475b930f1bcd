//! Filesystem-backed blob store used by the dev server. Blobs live under a
//! root directory and are addressed by `/blobs/<path>` urls that the backend
//! serves back out.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::BlobError;
use crate::{BlobStore, DeleteOutcome};

const URL_PREFIX: &str = "/blobs/";

pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, BlobError> {
        let relative = Path::new(path);
        let traversal = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)));
        if traversal || path.is_empty() {
            return Err(BlobError::InvalidPath(path.to_owned()));
        }
        Ok(self.root.join(relative))
    }

    fn path_of(&self, url: &str) -> Result<PathBuf, BlobError> {
        let path = url
            .strip_prefix(URL_PREFIX)
            .ok_or_else(|| BlobError::ForeignUrl(url.to_owned()))?;
        self.resolve(path)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, path: &str, content: Bytes) -> Result<String, BlobError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &content).await?;
        Ok(format!("{URL_PREFIX}{path}"))
    }

    async fn get(&self, url: &str) -> Result<Option<Bytes>, BlobError> {
        let target = self.path_of(url)?;
        match tokio::fs::read(&target).await {
            Ok(content) => Ok(Some(Bytes::from(content))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, url: &str) -> Result<DeleteOutcome, BlobError> {
        let target = self.path_of(url)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(DeleteOutcome::Deleted),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(DeleteOutcome::AlreadyAbsent)
            }
            Err(err) => Err(err.into()),
        }
    }
}
