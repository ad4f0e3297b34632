//! Filesystem artifact store: one file per `(token, kind)` under a
//! configured root directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::artifact::{ArtifactKind, ArtifactStore, StoreError};

/// Production artifact store backed by the local filesystem.
///
/// Writes go to a temp file in the same directory and are renamed into
/// place, so readers never observe a half-written artifact.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, kind: ArtifactKind, token: &str) -> PathBuf {
        self.root.join(format!("{token}-{}", kind.suffix()))
    }
}

#[async_trait]
impl ArtifactStore for FsStore {
    async fn read(&self, kind: ArtifactKind, token: &str) -> Result<Vec<u8>, StoreError> {
        match fs::read(self.path(kind, token)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound {
                kind,
                token: token.to_string(),
            }),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn write(&self, kind: ArtifactKind, token: &str, data: &[u8]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).await?;
        let path = self.path(kind, token);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, data).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn exists(&self, kind: ArtifactKind, token: &str) -> bool {
        fs::try_exists(self.path(kind, token)).await.unwrap_or(false)
    }

    fn location(&self, kind: ArtifactKind, token: &str) -> String {
        self.path(kind, token).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn read_missing_artifact_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());

        let err = store.read(ArtifactKind::Dataset, "abc123").await.unwrap_err();
        assert_matches!(err, StoreError::NotFound { kind: ArtifactKind::Dataset, .. });
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());

        store
            .write(ArtifactKind::Model, "abc123", b"blob")
            .await
            .unwrap();
        assert!(store.exists(ArtifactKind::Model, "abc123").await);
        assert_eq!(store.read(ArtifactKind::Model, "abc123").await.unwrap(), b"blob");
    }

    #[tokio::test]
    async fn write_replaces_prior_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());

        store.write(ArtifactKind::Evaluation, "t", b"one").await.unwrap();
        store.write(ArtifactKind::Evaluation, "t", b"two").await.unwrap();
        assert_eq!(store.read(ArtifactKind::Evaluation, "t").await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn tokens_do_not_share_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());

        store.write(ArtifactKind::Metadata, "aaaa", b"x").await.unwrap();
        assert!(!store.exists(ArtifactKind::Metadata, "bbbb").await);
    }

    #[test]
    fn locations_are_distinct_per_kind() {
        let store = FsStore::new("/tmp/artifacts");
        let a = store.location(ArtifactKind::Dataset, "t");
        let b = store.location(ArtifactKind::Model, "t");
        assert_ne!(a, b);
        assert!(a.contains("t-dataset.bin"));
    }
}
