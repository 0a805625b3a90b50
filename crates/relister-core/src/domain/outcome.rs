//! Outcome - listing ごとの reconcile 結果

use serde::{Deserialize, Serialize};

use super::ids::RemoteId;

/// ReconcileOutcome は 1 件の listing の成功結果
///
/// 失敗は [`ReconcileError`](super::ReconcileError) で表します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// posting は有効かつ新しい（書き戻しなし）
    Unchanged,
    /// 初回の posting を作成して書き戻した
    Created { remote_id: RemoteId },
    /// stale な posting を remove し、新しい posting を作成して書き戻した
    Reposted {
        previous: RemoteId,
        remote_id: RemoteId,
    },
}

impl ReconcileOutcome {
    /// RecordStore に書き戻した remote_id（あれば）
    pub fn persisted_id(&self) -> Option<RemoteId> {
        match self {
            Self::Unchanged => None,
            Self::Created { remote_id } | Self::Reposted { remote_id, .. } => Some(*remote_id),
        }
    }
}
