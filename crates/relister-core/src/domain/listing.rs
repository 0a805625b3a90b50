//! Listing - 出品レコード
//!
//! Listing は invocation の開始時に RecordStore から読み込まれ、
//! 以降は書き戻し（remote_id, posted_at）以外で変更されません。

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{self, RemoteId};
use super::staleness::Thresholds;

/// Credentials は posting service を操作する owner の session
///
/// session id は bearer secret なので `Debug` には出力しません。
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials {
    session_id: String,
}

impl Credentials {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("session_id", &"<redacted>")
            .finish()
    }
}

/// Listing は listings テーブルの 1 レコード
///
/// `title` がテーブルのキー。`posted_at` は保存された RFC 3339 文字列のまま保持し、
/// staleness の判定時にだけパースします。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    pub description: String,
    pub price: i64,
    pub category_id: i64,

    /// Blob key（posting 上の画像の並び順）
    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default, deserialize_with = "ids::deserialize_stored")]
    pub remote_id: Option<RemoteId>,

    #[serde(default)]
    pub posted_at: Option<String>,

    pub credentials: Credentials,

    pub max_allowed_rank: u32,
    pub max_age_hours: u32,
}

/// ListingState は reconcile 開始時の listing の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingState<'a> {
    /// 未投稿（create へ）
    Unposted,
    /// 投稿済み。`posted_at` が `None` になるのは
    /// 「remote_id があれば投稿時刻もある」に違反したレコードだけ
    Posted {
        remote_id: RemoteId,
        posted_at: Option<&'a str>,
    },
}

impl Listing {
    pub fn key(&self) -> &str {
        &self.title
    }

    pub fn state(&self) -> ListingState<'_> {
        match self.remote_id {
            None => ListingState::Unposted,
            Some(remote_id) => ListingState::Posted {
                remote_id,
                posted_at: self.posted_at.as_deref(),
            },
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            max_allowed_rank: self.max_allowed_rank,
            max_age_hours: self.max_age_hours,
        }
    }

    /// 未投稿の listing を作る（テスト・fixture 用）
    pub fn unposted(title: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            price: 0,
            category_id: 0,
            images: Vec::new(),
            remote_id: None,
            posted_at: None,
            credentials,
            max_allowed_rank: 1,
            max_age_hours: 24,
        }
    }

    pub fn with_images<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images = images.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_thresholds(mut self, max_allowed_rank: u32, max_age_hours: u32) -> Self {
        self.max_allowed_rank = max_allowed_rank;
        self.max_age_hours = max_age_hours;
        self
    }

    pub fn posted(mut self, remote_id: RemoteId, posted_at: impl Into<String>) -> Self {
        self.remote_id = Some(remote_id);
        self.posted_at = Some(posted_at.into());
        self
    }
}
