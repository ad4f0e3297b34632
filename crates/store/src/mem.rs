//! In-memory artifact store, the test double for the filesystem backend.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::artifact::{ArtifactKind, ArtifactStore, StoreError};

/// Artifact store backed by a map. Used by unit and integration tests so
/// the pipeline can run without touching a disk.
#[derive(Debug, Default)]
pub struct MemStore {
    inner: RwLock<HashMap<(ArtifactKind, String), Vec<u8>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtifactStore for MemStore {
    async fn read(&self, kind: ArtifactKind, token: &str) -> Result<Vec<u8>, StoreError> {
        self.inner
            .read()
            .await
            .get(&(kind, token.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind,
                token: token.to_string(),
            })
    }

    async fn write(&self, kind: ArtifactKind, token: &str, data: &[u8]) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .insert((kind, token.to_string()), data.to_vec());
        Ok(())
    }

    async fn exists(&self, kind: ArtifactKind, token: &str) -> bool {
        self.inner
            .read()
            .await
            .contains_key(&(kind, token.to_string()))
    }

    fn location(&self, kind: ArtifactKind, token: &str) -> String {
        format!("mem://{token}-{}", kind.suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn behaves_like_the_fs_backend() {
        let store = MemStore::new();

        let err = store.read(ArtifactKind::Status, "t").await.unwrap_err();
        assert_matches!(err, StoreError::NotFound { .. });

        store.write(ArtifactKind::Status, "t", b"[]").await.unwrap();
        assert!(store.exists(ArtifactKind::Status, "t").await);
        assert_eq!(store.read(ArtifactKind::Status, "t").await.unwrap(), b"[]");

        store.write(ArtifactKind::Status, "t", b"[1]").await.unwrap();
        assert_eq!(store.read(ArtifactKind::Status, "t").await.unwrap(), b"[1]");
    }
}
