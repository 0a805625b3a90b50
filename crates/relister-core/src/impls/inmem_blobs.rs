//! InMemoryBlobStore - テスト用の Blob store
//!
//! key ごとに遅延と失敗を注入できます（完了順のゆらぎを再現するため）。

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::ports::{BlobError, BlobStore};

#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: HashMap<String, Bytes>,
    latency: HashMap<String, Duration>,
    failing: HashSet<String>,
    completed: AtomicUsize,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(mut self, key: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        self.blobs.insert(key.into(), bytes.into());
        self
    }

    /// `key` の fetch を毎回 `delay` だけ遅らせる
    pub fn with_latency(mut self, key: impl Into<String>, delay: Duration) -> Self {
        self.latency.insert(key.into(), delay);
        self
    }

    /// `key` の fetch を失敗させる（遅延がある場合は遅延の後）
    pub fn with_failure(mut self, key: impl Into<String>) -> Self {
        self.failing.insert(key.into());
        self
    }

    /// 完了した fetch の数（成功・失敗を問わない）
    pub fn completed_fetches(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn fetch(&self, key: &str) -> Result<Bytes, BlobError> {
        if let Some(delay) = self.latency.get(key) {
            tokio::time::sleep(*delay).await;
        }

        let result = if self.failing.contains(key) {
            Err(BlobError::Unavailable(format!("injected failure for {key:?}")))
        } else {
            self.blobs
                .get(key)
                .cloned()
                .ok_or_else(|| BlobError::NotFound(key.to_string()))
        };

        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}
