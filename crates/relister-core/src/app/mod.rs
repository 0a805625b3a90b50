//! App - アプリケーション層
//!
//! ports を組み合わせて reconcile pass を実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: port の注入と起動時検証
//! - **BatchOrchestrator**: listing ごとの fan-out / fan-in（`run_once`）
//! - **ItemReconciler**: 1 件の listing の create / repost
//! - **fetch_ordered**: 画像の並列取得（順序保持）
//! - **FirstError**: 最初のエラーだけを保持する cell

pub mod builder;
pub mod fetch;
pub mod first_error;
pub mod orchestrator;
pub mod reconciler;

pub use self::builder::{AppBuilder, BuildError};
pub use self::fetch::{FetchError, fetch_ordered};
pub use self::first_error::FirstError;
pub use self::orchestrator::BatchOrchestrator;
pub use self::reconciler::{ItemReconciler, RepostOrder};
