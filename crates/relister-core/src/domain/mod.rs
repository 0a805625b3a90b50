//! Domain - ドメインモデル
//!
//! - listing: 1 件の出品レコードと状態（Unposted / Posted）
//! - posting: posting service とやり取りする値（NewPosting, RemotePostingStatus）
//! - staleness: repost が必要かどうかの判定（純粋関数）
//! - outcome: listing ごとの結果
//! - errors: reconcile 全体のエラー分類

pub mod errors;
pub mod ids;
pub mod listing;
pub mod outcome;
pub mod posting;
pub mod staleness;

pub use self::errors::ReconcileError;
pub use self::ids::RemoteId;
pub use self::listing::{Credentials, Listing, ListingState};
pub use self::outcome::ReconcileOutcome;
pub use self::posting::{NewPosting, RemotePostingStatus};
pub use self::staleness::{StaleReason, Thresholds};
