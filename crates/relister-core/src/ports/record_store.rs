//! RecordStore port - listing テーブル（正本）
//!
//! RecordStore は listing の読み込みと、remote_id / posted_at の書き戻しだけを
//! 提供します。書き込みは title をキーとするので、listing 同士で競合しません。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{Listing, RemoteId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    #[error("no record with key {0:?}")]
    NotFound(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// テーブルの全 listing を読み込む
    async fn scan_all(&self) -> Result<Vec<Listing>, StoreError>;

    /// 新しい remote_id と投稿時刻を書き戻す
    async fn update_remote_id(
        &self,
        key: &str,
        remote_id: RemoteId,
        posted_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}
