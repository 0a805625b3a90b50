//! Impls - port の実装
//!
//! # 含まれる実装
//! - **InMemoryRecordStore**: テスト・sandbox 用の listing テーブル
//! - **InMemoryBlobStore**: テスト用の Blob store（失敗・遅延を注入可能）
//! - **LocalBlobStore**: ローカルディレクトリから Blob を読む
//! - **SandboxPostingService**: posting service のシミュレータ
//!
//! 実際の posting service やテーブルへの接続は別クレートに配置します。

pub mod inmem_blobs;
pub mod inmem_records;
pub mod local_blobs;
pub mod sandbox_posting;

pub use self::inmem_blobs::InMemoryBlobStore;
pub use self::inmem_records::InMemoryRecordStore;
pub use self::local_blobs::LocalBlobStore;
pub use self::sandbox_posting::{ActivePosting, PostingCall, SandboxPostingService};
