//! テスト用の fixture（app 層のテストで共有）

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use bytes::Bytes;
use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};

use crate::app::{AppBuilder, BatchOrchestrator, ItemReconciler, RepostOrder};
use crate::domain::{Credentials, Listing, RemoteId};
use crate::impls::{ActivePosting, InMemoryBlobStore, InMemoryRecordStore, SandboxPostingService};
use crate::ports::FixedClock;

pub const NOW_RFC3339: &str = "2026-03-01T12:00:00Z";
pub const OWNER: &str = "owner-session";

static NEXT_ID: AtomicI64 = AtomicI64::new(1_000);

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

/// 閾値に余裕のある未投稿 listing
pub fn listing(title: &str) -> Listing {
    Listing::unposted(title, Credentials::new(OWNER)).with_thresholds(10, 24)
}

/// [`now`] の `age` 前に投稿済みの listing（rank は `max_allowed_rank` まで許容）
pub fn posted(title: &str, max_allowed_rank: u32, age: Duration) -> (Listing, RemoteId) {
    let id = RemoteId::from_stored(NEXT_ID.fetch_add(1, Ordering::Relaxed)).unwrap();
    let posted_at = (now() - age).to_rfc3339_opts(SecondsFormat::Secs, true);
    let listing = listing(title)
        .with_thresholds(max_allowed_rank, 24)
        .posted(id, posted_at);
    (listing, id)
}

pub fn active(listing: &Listing, id: RemoteId, rank: u32) -> ActivePosting {
    ActivePosting {
        id,
        owner: listing.credentials.session_id().to_string(),
        title: listing.title.clone(),
        category_id: listing.category_id,
        rank,
        image_sizes: Vec::new(),
    }
}

/// Harness は固定時刻の Clock と各 adapter をまとめたもの
///
/// 登録した listing の画像 key はすべて Blob store に入っている（中身は key 自身）。
/// ただし `missing` で始まる key だけは登録しない。
pub struct Harness {
    pub records: Arc<InMemoryRecordStore>,
    pub blobs: Arc<InMemoryBlobStore>,
    pub posting: Arc<SandboxPostingService>,
    pub repost_order: RepostOrder,
}

impl Harness {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self::assemble(listings, |p| p, |r| r, |b| b)
    }

    pub fn build(
        listings: Vec<Listing>,
        posting: impl FnOnce(SandboxPostingService) -> SandboxPostingService,
    ) -> Self {
        Self::assemble(listings, posting, |r| r, |b| b)
    }

    pub fn build_with_records(
        listings: Vec<Listing>,
        records: impl FnOnce(InMemoryRecordStore) -> InMemoryRecordStore,
    ) -> Self {
        Self::assemble(listings, |p| p, records, |b| b)
    }

    pub fn build_with_blobs(
        listings: Vec<Listing>,
        blobs: impl FnOnce(InMemoryBlobStore) -> InMemoryBlobStore,
    ) -> Self {
        Self::assemble(listings, |p| p, |r| r, blobs)
    }

    fn assemble(
        listings: Vec<Listing>,
        posting: impl FnOnce(SandboxPostingService) -> SandboxPostingService,
        records: impl FnOnce(InMemoryRecordStore) -> InMemoryRecordStore,
        blobs_fn: impl FnOnce(InMemoryBlobStore) -> InMemoryBlobStore,
    ) -> Self {
        let mut blobs = InMemoryBlobStore::new();
        for key in listings.iter().flat_map(|l| l.images.iter()) {
            if !key.starts_with("missing") {
                blobs = blobs.with_blob(key, Bytes::from(key.clone()));
            }
        }

        Self {
            records: Arc::new(records(InMemoryRecordStore::new(listings))),
            blobs: Arc::new(blobs_fn(blobs)),
            posting: Arc::new(posting(SandboxPostingService::new())),
            repost_order: RepostOrder::Concurrent,
        }
    }

    pub fn with_repost_order(mut self, order: RepostOrder) -> Self {
        self.repost_order = order;
        self
    }

    pub fn reconciler(&self) -> ItemReconciler {
        ItemReconciler::new(
            self.records.clone(),
            self.blobs.clone(),
            self.posting.clone(),
            Arc::new(FixedClock::new(now())),
            self.repost_order,
        )
    }

    pub fn orchestrator(&self) -> BatchOrchestrator {
        AppBuilder::new()
            .record_store(self.records.clone())
            .blob_store(self.blobs.clone())
            .posting_service(self.posting.clone())
            .clock(FixedClock::new(now()))
            .repost_order(self.repost_order)
            .build()
            .unwrap()
    }

    pub async fn listing(&self, title: &str) -> Listing {
        self.records.get(title).await.unwrap()
    }
}
