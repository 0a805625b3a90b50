//! Ports - 抽象化レイヤー
//!
//! 外部システム（テーブル、Blob storage、posting service）への
//! インターフェースを trait として定義し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - すべての port は `Send + Sync`（全 task から共有される長寿命ハンドル）
//! - プロセス全体の可変状態は持たない（AppBuilder で注入する）

pub mod blob_store;
pub mod clock;
pub mod posting;
pub mod record_store;

pub use self::blob_store::{BlobError, BlobStore};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::posting::{PostingClient, PostingError, PostingService};
pub use self::record_store::{RecordStore, StoreError};
