//! ItemReconciler - 1 件の listing の reconcile
//!
//! # フロー
//! 1. PostingService::connect() で owner の session を開く
//! 2. Unposted なら画像を取得して create → 書き戻し
//! 3. Posted なら status を取得し、stale なら remove + create → 書き戻し
//!
//! 書き戻しは remote 側の操作がすべて成功した後にだけ行います。

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::fetch::fetch_ordered;
use crate::domain::{
    Listing, ListingState, NewPosting, ReconcileError, ReconcileOutcome, RemoteId,
};
use crate::ports::{BlobStore, Clock, PostingClient, PostingService, RecordStore};

/// RepostOrder は repost の remove と create の実行順
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepostOrder {
    /// 旧 posting の remove と新 posting の create を同時に実行
    #[default]
    Concurrent,
    /// remove が成功してから create を実行
    Sequential,
}

impl FromStr for RepostOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concurrent" => Ok(Self::Concurrent),
            "sequential" => Ok(Self::Sequential),
            other => Err(format!(
                "unknown repost order {other:?} (expected \"concurrent\" or \"sequential\")"
            )),
        }
    }
}

impl fmt::Display for RepostOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concurrent => f.write_str("concurrent"),
            Self::Sequential => f.write_str("sequential"),
        }
    }
}

/// ItemReconciler は 1 件の listing の create / repost を判定・実行
///
/// pass 内のすべての listing task で共有されます。
/// 持つのは port のハンドルだけで、listing ごとの状態は持ちません。
pub struct ItemReconciler {
    records: Arc<dyn RecordStore>,
    blobs: Arc<dyn BlobStore>,
    posting: Arc<dyn PostingService>,
    clock: Arc<dyn Clock>,
    repost_order: RepostOrder,
}

impl ItemReconciler {
    pub fn new(
        records: Arc<dyn RecordStore>,
        blobs: Arc<dyn BlobStore>,
        posting: Arc<dyn PostingService>,
        clock: Arc<dyn Clock>,
        repost_order: RepostOrder,
    ) -> Self {
        Self {
            records,
            blobs,
            posting,
            clock,
            repost_order,
        }
    }

    #[tracing::instrument(name = "reconcile", skip_all, fields(listing = %listing.title))]
    pub async fn reconcile(&self, listing: Listing) -> Result<ReconcileOutcome, ReconcileError> {
        let client = self
            .posting
            .connect(&listing.credentials)
            .await
            .map_err(|source| ReconcileError::Credential {
                listing: listing.title.clone(),
                source,
            })?;

        let (previous, posted_at) = match listing.state() {
            ListingState::Unposted => {
                let remote_id = self.create(&listing, client.as_ref()).await?;
                self.persist(&listing, remote_id).await?;
                info!(%remote_id, "posted listing");
                return Ok(ReconcileOutcome::Created { remote_id });
            }
            ListingState::Posted {
                remote_id,
                posted_at,
            } => (remote_id, posted_at),
        };

        let status = client
            .status(previous)
            .await
            .map_err(|source| ReconcileError::RemoteStatus {
                listing: listing.title.clone(),
                remote_id: previous,
                source,
            })?;
        let posted_at = parse_posted_at(&listing.title, posted_at)?;

        let now = self.clock.now();
        let Some(reason) = listing.thresholds().stale_reason(status, posted_at, now) else {
            debug!(remote_id = %previous, rank = status.rank, "posting is fresh");
            return Ok(ReconcileOutcome::Unchanged);
        };

        info!(remote_id = %previous, ?reason, order = %self.repost_order, "reposting stale listing");
        let remote_id = self.repost(&listing, client.as_ref(), previous).await?;
        self.persist(&listing, remote_id).await?;
        info!(previous = %previous, %remote_id, "reposted listing");

        Ok(ReconcileOutcome::Reposted {
            previous,
            remote_id,
        })
    }

    async fn repost(
        &self,
        listing: &Listing,
        client: &dyn PostingClient,
        previous: RemoteId,
    ) -> Result<RemoteId, ReconcileError> {
        if self.repost_order == RepostOrder::Sequential {
            self.remove(listing, client, previous).await?;
            return self.create(listing, client).await;
        }

        let (removed, created) = tokio::join!(
            self.remove(listing, client, previous),
            self.create(listing, client),
        );

        // The removal error wins when both halves fail.
        match (removed, created) {
            (Ok(()), Ok(remote_id)) => Ok(remote_id),
            (Err(err), Ok(orphan)) => {
                warn!(
                    previous = %previous,
                    orphan = %orphan,
                    "replacement posting created but the old one was not removed; replacement is not recorded"
                );
                Err(err)
            }
            (Err(err), Err(_)) => Err(err),
            (Ok(()), Err(err)) => {
                warn!(
                    previous = %previous,
                    "old posting removed but no replacement was created; record still holds the removed id"
                );
                Err(err)
            }
        }
    }

    async fn create(
        &self,
        listing: &Listing,
        client: &dyn PostingClient,
    ) -> Result<RemoteId, ReconcileError> {
        let images = fetch_ordered(&self.blobs, &listing.images)
            .await
            .map_err(|source| ReconcileError::Fetch {
                listing: listing.title.clone(),
                source,
            })?;

        client
            .create(NewPosting::from_listing(listing, images))
            .await
            .map_err(|source| ReconcileError::RemoteCreate {
                listing: listing.title.clone(),
                source,
            })
    }

    async fn remove(
        &self,
        listing: &Listing,
        client: &dyn PostingClient,
        remote_id: RemoteId,
    ) -> Result<(), ReconcileError> {
        client
            .remove(remote_id)
            .await
            .map_err(|source| ReconcileError::RemoteRemove {
                listing: listing.title.clone(),
                remote_id,
                source,
            })
    }

    async fn persist(&self, listing: &Listing, remote_id: RemoteId) -> Result<(), ReconcileError> {
        self.records
            .update_remote_id(listing.key(), remote_id, self.clock.now())
            .await
            .map_err(|source| ReconcileError::Persist {
                listing: listing.title.clone(),
                remote_id,
                source,
            })
    }
}

fn parse_posted_at(listing: &str, raw: Option<&str>) -> Result<DateTime<Utc>, ReconcileError> {
    let Some(raw) = raw else {
        return Err(ReconcileError::TimestampParse {
            listing: listing.to_string(),
            value: String::new(),
            reason: "posted listing has no posting timestamp".to_string(),
        });
    };

    DateTime::parse_from_rfc3339(raw.trim())
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| ReconcileError::TimestampParse {
            listing: listing.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
}
