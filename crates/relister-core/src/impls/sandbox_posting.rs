//! SandboxPostingService - posting service のシミュレータ
//!
//! # 振る舞い
//! - category ごとに rank を管理（新しい posting が rank 1、既存は 1 つずつ下がる）
//! - remove / status は owner の session からのみ許可
//! - すべての呼び出しを PostingCall として記録（テストでの検証用）
//! - create / remove / status の失敗と遅延を注入可能

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::{Credentials, NewPosting, RemoteId, RemotePostingStatus};
use crate::ports::{PostingClient, PostingError, PostingService};

/// ActivePosting は sandbox 上で有効な posting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePosting {
    pub id: RemoteId,
    /// owner の session id
    pub owner: String,
    pub title: String,
    pub category_id: i64,
    pub rank: u32,
    /// 各画像のバイト長（アップロード順）
    #[serde(default)]
    pub image_sizes: Vec<usize>,
}

/// PostingCall は sandbox への呼び出し 1 回分の記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostingCall {
    Connect { owner: String },
    Create { owner: String, title: String },
    Remove(RemoteId),
    Status(RemoteId),
}

#[derive(Debug, Clone, Default)]
struct Faults {
    creates: HashSet<String>,
    removes: HashSet<RemoteId>,
    statuses: HashSet<RemoteId>,
}

#[derive(Debug, Default)]
struct SandboxState {
    postings: BTreeMap<RemoteId, ActivePosting>,
    calls: Vec<PostingCall>,
}

impl SandboxState {
    fn allocate_id(&self) -> RemoteId {
        let mut rng = rand::thread_rng();
        loop {
            if let Some(id) = RemoteId::from_stored(rng.gen_range(100_000..10_000_000_000))
                && !self.postings.contains_key(&id)
            {
                return id;
            }
        }
    }

    fn owned(&self, owner: &str, remote_id: RemoteId) -> Result<&ActivePosting, PostingError> {
        match self.postings.get(&remote_id) {
            Some(posting) if posting.owner == owner => Ok(posting),
            Some(_) => Err(PostingError::Rejected(format!(
                "{remote_id} belongs to another owner"
            ))),
            None => Err(PostingError::NotFound(remote_id)),
        }
    }
}

/// SandboxPostingService は posting service のプロセス内シミュレータ
#[derive(Clone, Default)]
pub struct SandboxPostingService {
    state: Arc<Mutex<SandboxState>>,
    faults: Arc<Faults>,
    latency: Option<Duration>,
    sessions: Option<Arc<HashSet<String>>>,
}

impl SandboxPostingService {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存の posting を登録済みの sandbox
    pub fn from_postings(postings: impl IntoIterator<Item = ActivePosting>) -> Self {
        let state = SandboxState {
            postings: postings.into_iter().map(|p| (p.id, p)).collect(),
            calls: Vec::new(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            ..Self::default()
        }
    }

    /// 指定した session id だけを受け付ける（未指定ならすべて受け付ける）
    pub fn with_sessions<I, S>(mut self, sessions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sessions = Some(Arc::new(sessions.into_iter().map(Into::into).collect()));
        self
    }

    /// create / remove / status を毎回 `delay` だけ遅らせる（connect は即時）
    pub fn with_latency(mut self, delay: Duration) -> Self {
        self.latency = Some(delay);
        self
    }

    pub fn with_failing_create(mut self, title: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.faults).creates.insert(title.into());
        self
    }

    pub fn with_failing_remove(mut self, remote_id: RemoteId) -> Self {
        Arc::make_mut(&mut self.faults).removes.insert(remote_id);
        self
    }

    pub fn with_failing_status(mut self, remote_id: RemoteId) -> Self {
        Arc::make_mut(&mut self.faults).statuses.insert(remote_id);
        self
    }

    pub async fn insert(&self, posting: ActivePosting) {
        self.state.lock().await.postings.insert(posting.id, posting);
    }

    pub async fn set_rank(&self, remote_id: RemoteId, rank: u32) {
        if let Some(posting) = self.state.lock().await.postings.get_mut(&remote_id) {
            posting.rank = rank;
        }
    }

    pub async fn posting(&self, remote_id: RemoteId) -> Option<ActivePosting> {
        self.state.lock().await.postings.get(&remote_id).cloned()
    }

    /// 有効な posting すべて（id 順）
    pub async fn postings(&self) -> Vec<ActivePosting> {
        self.state.lock().await.postings.values().cloned().collect()
    }

    pub async fn calls(&self) -> Vec<PostingCall> {
        self.state.lock().await.calls.clone()
    }
}

#[async_trait]
impl PostingService for SandboxPostingService {
    async fn connect(
        &self,
        credentials: &Credentials,
    ) -> Result<Arc<dyn PostingClient>, PostingError> {
        let owner = credentials.session_id().to_string();
        self.state.lock().await.calls.push(PostingCall::Connect {
            owner: owner.clone(),
        });

        if owner.is_empty() {
            return Err(PostingError::Unauthorized("empty session id".to_string()));
        }
        if let Some(sessions) = &self.sessions
            && !sessions.contains(&owner)
        {
            return Err(PostingError::Unauthorized("unknown session".to_string()));
        }

        Ok(Arc::new(SandboxSession {
            owner,
            state: Arc::clone(&self.state),
            faults: Arc::clone(&self.faults),
            latency: self.latency,
        }))
    }
}

struct SandboxSession {
    owner: String,
    state: Arc<Mutex<SandboxState>>,
    faults: Arc<Faults>,
    latency: Option<Duration>,
}

impl SandboxSession {
    /// 遅延はロックの外で待つので、同時に来た呼び出しは重なって進む
    async fn round_trip(&self) {
        if let Some(delay) = self.latency {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl PostingClient for SandboxSession {
    async fn create(&self, posting: NewPosting) -> Result<RemoteId, PostingError> {
        self.round_trip().await;
        let mut state = self.state.lock().await;
        state.calls.push(PostingCall::Create {
            owner: self.owner.clone(),
            title: posting.title.clone(),
        });

        if self.faults.creates.contains(&posting.title) {
            return Err(PostingError::Unavailable(format!(
                "injected create failure for {:?}",
                posting.title
            )));
        }
        if posting.title.trim().is_empty() {
            return Err(PostingError::Rejected("title is required".to_string()));
        }

        let id = state.allocate_id();
        for other in state.postings.values_mut() {
            if other.category_id == posting.category_id {
                other.rank += 1;
            }
        }
        state.postings.insert(
            id,
            ActivePosting {
                id,
                owner: self.owner.clone(),
                title: posting.title,
                category_id: posting.category_id,
                rank: 1,
                image_sizes: posting.images.iter().map(|image| image.len()).collect(),
            },
        );
        debug!(remote_id = %id, "sandbox created posting");
        Ok(id)
    }

    async fn remove(&self, remote_id: RemoteId) -> Result<(), PostingError> {
        self.round_trip().await;
        let mut state = self.state.lock().await;
        state.calls.push(PostingCall::Remove(remote_id));

        if self.faults.removes.contains(&remote_id) {
            return Err(PostingError::Unavailable(format!(
                "injected remove failure for {remote_id}"
            )));
        }

        let removed = state.owned(&self.owner, remote_id)?;
        let (category_id, rank) = (removed.category_id, removed.rank);
        state.postings.remove(&remote_id);
        for other in state.postings.values_mut() {
            if other.category_id == category_id && other.rank > rank {
                other.rank -= 1;
            }
        }
        debug!(%remote_id, "sandbox removed posting");
        Ok(())
    }

    async fn status(&self, remote_id: RemoteId) -> Result<RemotePostingStatus, PostingError> {
        self.round_trip().await;
        let mut state = self.state.lock().await;
        state.calls.push(PostingCall::Status(remote_id));

        if self.faults.statuses.contains(&remote_id) {
            return Err(PostingError::Unavailable(format!(
                "injected status failure for {remote_id}"
            )));
        }

        let posting = state.owned(&self.owner, remote_id)?;
        Ok(RemotePostingStatus { rank: posting.rank })
    }
}
