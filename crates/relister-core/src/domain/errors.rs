//! Errors - reconcile のエラー分類
//!
//! listing 単位のエラーはすべて listing の title を持ち、
//! 元になった port のエラーを `source` として保持します。

use thiserror::Error;
use tokio::task::JoinError;

use super::ids::RemoteId;
use crate::app::fetch::FetchError;
use crate::ports::{PostingError, StoreError};

/// ReconcileError は 1 回の pass で発生しうるエラー
///
/// `Load` だけが batch 全体を止めます。それ以外は 1 件の listing に閉じており、
/// 他の listing の処理には影響しません。
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("loading listings failed")]
    Load(#[source] StoreError),

    #[error("listing {listing:?}: opening a posting session failed")]
    Credential {
        listing: String,
        #[source]
        source: PostingError,
    },

    #[error("listing {listing:?}: fetching images failed")]
    Fetch {
        listing: String,
        #[source]
        source: FetchError,
    },

    #[error("listing {listing:?}: creating the posting failed")]
    RemoteCreate {
        listing: String,
        #[source]
        source: PostingError,
    },

    #[error("listing {listing:?}: removing {remote_id} failed")]
    RemoteRemove {
        listing: String,
        remote_id: RemoteId,
        #[source]
        source: PostingError,
    },

    #[error("listing {listing:?}: querying status of {remote_id} failed")]
    RemoteStatus {
        listing: String,
        remote_id: RemoteId,
        #[source]
        source: PostingError,
    },

    #[error("listing {listing:?}: persisting {remote_id} failed")]
    Persist {
        listing: String,
        remote_id: RemoteId,
        #[source]
        source: StoreError,
    },

    #[error("listing {listing:?}: bad posting timestamp {value:?}: {reason}")]
    TimestampParse {
        listing: String,
        value: String,
        reason: String,
    },

    #[error("listing {listing:?}: reconciliation task failed")]
    TaskFailed {
        listing: String,
        #[source]
        source: JoinError,
    },
}

impl ReconcileError {
    /// エラーが属する listing の title（batch 全体のエラーなら `None`）
    pub fn listing(&self) -> Option<&str> {
        match self {
            Self::Load(_) => None,
            Self::Credential { listing, .. }
            | Self::Fetch { listing, .. }
            | Self::RemoteCreate { listing, .. }
            | Self::RemoteRemove { listing, .. }
            | Self::RemoteStatus { listing, .. }
            | Self::Persist { listing, .. }
            | Self::TimestampParse { listing, .. }
            | Self::TaskFailed { listing, .. } => Some(listing),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_is_reported() {
        let err = ReconcileError::TimestampParse {
            listing: "sofa".to_string(),
            value: "yesterday".to_string(),
            reason: "input contains invalid characters".to_string(),
        };
        assert_eq!(err.listing(), Some("sofa"));
        assert!(err.to_string().contains("yesterday"));

        let err = ReconcileError::Load(StoreError::Unavailable("down".to_string()));
        assert_eq!(err.listing(), None);
    }
}
