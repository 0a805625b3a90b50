//! PostingService port - 外部の posting service
//!
//! owner の credentials で session を開き（`PostingService::connect`）、
//! 以降の create / remove / status はその session で行います。
//! ネットワーク上のリトライは実装側の責務です。

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Credentials, NewPosting, RemoteId, RemotePostingStatus};

#[derive(Debug, Error)]
pub enum PostingError {
    #[error("session rejected: {0}")]
    Unauthorized(String),

    /// posting が存在しない（削除済みを含む）
    /// 呼び出し側では他の失敗と同じ扱いだが、ログで区別できるよう別の variant にしている
    #[error("posting {0} not found")]
    NotFound(RemoteId),

    #[error("posting rejected: {0}")]
    Rejected(String),

    #[error("posting service unavailable: {0}")]
    Unavailable(String),
}

/// PostingService は owner ごとの session を開く
#[async_trait]
pub trait PostingService: Send + Sync {
    async fn connect(&self, credentials: &Credentials)
    -> Result<Arc<dyn PostingClient>, PostingError>;
}

/// PostingClient は 1 人の owner として操作する session
#[async_trait]
pub trait PostingClient: Send + Sync {
    async fn create(&self, posting: NewPosting) -> Result<RemoteId, PostingError>;

    async fn remove(&self, remote_id: RemoteId) -> Result<(), PostingError>;

    async fn status(&self, remote_id: RemoteId) -> Result<RemotePostingStatus, PostingError>;
}
