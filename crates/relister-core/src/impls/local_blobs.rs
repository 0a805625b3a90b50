//! LocalBlobStore - ローカルディレクトリ上の Blob
//!
//! key はルートディレクトリからの相対パスとして解釈します。
//! ルートの外を指す key（絶対パス、`..` を含むもの）は拒否します。

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::ports::{BlobError, BlobStore};

#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, BlobError> {
        let relative = Path::new(key);
        let only_normal = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if key.is_empty() || !only_normal {
            return Err(BlobError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn fetch(&self, key: &str) -> Result<Bytes, BlobError> {
        let path = self.resolve(key)?;
        debug!(blob_key = %key, path = %path.display(), "reading blob from disk");

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(BlobError::NotFound(key.to_string())),
            Err(e) => Err(BlobError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_nested_blob() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("chair")).unwrap();
        std::fs::write(dir.path().join("chair/1.jpg"), b"jpeg").unwrap();

        let store = LocalBlobStore::new(dir.path());
        let bytes = store.fetch("chair/1.jpg").await.unwrap();
        assert_eq!(&bytes[..], b"jpeg");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        let err = store.fetch("nope.jpg").await.unwrap_err();
        assert!(matches!(err, BlobError::NotFound(key) if key == "nope.jpg"));
    }

    #[tokio::test]
    async fn keys_outside_root_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        for key in ["../secret", "/etc/passwd", "a/../../b", ""] {
            let err = store.fetch(key).await.unwrap_err();
            assert!(matches!(err, BlobError::InvalidKey(_)), "key {key:?}");
        }
    }
}
