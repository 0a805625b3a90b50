//! RemoteId - posting service が払い出す識別子
//!
//! posting service の識別子は符号付き 64-bit 整数です。
//! 保存済みレコードでは `0` が「未投稿」を表すので、読み込み時に `None` に変換します。
//! そのため `RemoteId` が 0 になることはありません。

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// RemoteId は remote の posting のハンドル
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(i64);

impl RemoteId {
    /// 「未投稿」を表す `0` なら `None`
    pub fn from_stored(raw: i64) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "posting-{}", self.0)
    }
}

/// serde helper - `null`、フィールドなし、`0` はすべて「未投稿」
pub(crate) fn deserialize_stored<'de, D>(deserializer: D) -> Result<Option<RemoteId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw.and_then(RemoteId::from_stored))
}
