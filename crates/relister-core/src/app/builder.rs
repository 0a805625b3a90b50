//! AppBuilder - port のワイヤリング
//!
//! # Fail-fast 設計
//! - build() 時に必須 port（RecordStore, BlobStore, PostingService）が
//!   すべて登録されているかをチェック
//! - 不足があれば BuildError を返す

use std::sync::Arc;

use super::orchestrator::BatchOrchestrator;
use super::reconciler::{ItemReconciler, RepostOrder};
use crate::ports::{BlobStore, Clock, PostingService, RecordStore, SystemClock};

/// AppBuilder は BatchOrchestrator を構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new()
///     .record_store(records)
///     .blob_store(blobs)
///     .posting_service(posting)
///     .build()?;
/// let summary = app.run_once().await?;
/// ```
pub struct AppBuilder {
    records: Option<Arc<dyn RecordStore>>,
    blobs: Option<Arc<dyn BlobStore>>,
    posting: Option<Arc<dyn PostingService>>,
    clock: Arc<dyn Clock>,
    repost_order: RepostOrder,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing ports: {0:?}. These must be registered before build().")]
    MissingPorts(Vec<&'static str>),
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            records: None,
            blobs: None,
            posting: None,
            clock: Arc::new(SystemClock),
            repost_order: RepostOrder::default(),
        }
    }

    pub fn record_store<R: RecordStore + 'static>(mut self, records: Arc<R>) -> Self {
        self.records = Some(records);
        self
    }

    pub fn blob_store<B: BlobStore + 'static>(mut self, blobs: Arc<B>) -> Self {
        self.blobs = Some(blobs);
        self
    }

    pub fn posting_service<P: PostingService + 'static>(mut self, posting: Arc<P>) -> Self {
        self.posting = Some(posting);
        self
    }

    /// 省略時は [`SystemClock`]
    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// 省略時は [`RepostOrder::Concurrent`]
    pub fn repost_order(mut self, order: RepostOrder) -> Self {
        self.repost_order = order;
        self
    }

    pub fn build(self) -> Result<BatchOrchestrator, BuildError> {
        match (self.records, self.blobs, self.posting) {
            (Some(records), Some(blobs), Some(posting)) => {
                let reconciler = ItemReconciler::new(
                    Arc::clone(&records),
                    blobs,
                    posting,
                    self.clock,
                    self.repost_order,
                );
                Ok(BatchOrchestrator::new(records, Arc::new(reconciler)))
            }
            (records, blobs, posting) => Err(BuildError::MissingPorts(missing(
                records.is_none(),
                blobs.is_none(),
                posting.is_none(),
            ))),
        }
    }
}

fn missing(records: bool, blobs: bool, posting: bool) -> Vec<&'static str> {
    [
        (records, "record_store"),
        (blobs, "blob_store"),
        (posting, "posting_service"),
    ]
    .into_iter()
    .filter_map(|(is_missing, name)| is_missing.then_some(name))
    .collect()
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{InMemoryBlobStore, InMemoryRecordStore, SandboxPostingService};

    #[test]
    fn test_build_success() {
        let app = AppBuilder::new()
            .record_store(Arc::new(InMemoryRecordStore::new(vec![])))
            .blob_store(Arc::new(InMemoryBlobStore::new()))
            .posting_service(Arc::new(SandboxPostingService::new()))
            .repost_order(RepostOrder::Sequential)
            .build();
        assert!(app.is_ok());
    }

    #[test]
    fn test_build_missing_ports() {
        let app = AppBuilder::new()
            .blob_store(Arc::new(InMemoryBlobStore::new()))
            .build();
        assert!(matches!(
            app,
            Err(BuildError::MissingPorts(missing)) if missing == vec!["record_store", "posting_service"]
        ));
    }
}
