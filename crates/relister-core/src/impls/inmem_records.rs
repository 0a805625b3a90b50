//! InMemoryRecordStore - listing テーブルのインメモリ実装
//!
//! title をキーとする BTreeMap なので、scan_all は title 順に返します。

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use tokio::sync::Mutex;

use crate::domain::{Listing, RemoteId};
use crate::ports::{RecordStore, StoreError};

pub struct InMemoryRecordStore {
    rows: Mutex<BTreeMap<String, Listing>>,
    scan_failure: Option<String>,
    failing_updates: HashSet<String>,
}

impl InMemoryRecordStore {
    /// title が重複した行は後勝ち
    pub fn new(listings: Vec<Listing>) -> Self {
        let rows = listings
            .into_iter()
            .map(|listing| (listing.title.clone(), listing))
            .collect();
        Self {
            rows: Mutex::new(rows),
            scan_failure: None,
            failing_updates: HashSet::new(),
        }
    }

    /// `scan_all` を常に `reason` で失敗させる
    pub fn with_scan_failure(mut self, reason: impl Into<String>) -> Self {
        self.scan_failure = Some(reason.into());
        self
    }

    /// `key` への `update_remote_id` を失敗させる
    pub fn with_failing_update(mut self, key: impl Into<String>) -> Self {
        self.failing_updates.insert(key.into());
        self
    }

    pub async fn get(&self, key: &str) -> Option<Listing> {
        self.rows.lock().await.get(key).cloned()
    }

    /// 全行（key 順）
    pub async fn snapshot(&self) -> Vec<Listing> {
        self.rows.lock().await.values().cloned().collect()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn scan_all(&self) -> Result<Vec<Listing>, StoreError> {
        if let Some(reason) = &self.scan_failure {
            return Err(StoreError::Unavailable(reason.clone()));
        }
        Ok(self.snapshot().await)
    }

    async fn update_remote_id(
        &self,
        key: &str,
        remote_id: RemoteId,
        posted_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if self.failing_updates.contains(key) {
            return Err(StoreError::Unavailable(format!("update of {key:?} rejected")));
        }

        let mut rows = self.rows.lock().await;
        let row = rows
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        row.remote_id = Some(remote_id);
        row.posted_at = Some(posted_at.to_rfc3339_opts(SecondsFormat::Secs, true));
        Ok(())
    }
}
