//! relister-core
//!
//! listing テーブルと外部 posting service を定期的に突き合わせる reconcile ジョブ
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（Listing, RemoteId, staleness, outcome, errors）
//! - **ports**: 抽象化レイヤー（RecordStore, BlobStore, PostingService, Clock）
//! - **app**: アプリケーションロジック（AppBuilder, BatchOrchestrator, ItemReconciler, fetch_ordered）
//! - **impls**: 実装（InMemory / Local / Sandbox）
//! - **observability**: tracing の初期化と BatchSummary

pub mod app;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;

#[cfg(test)]
mod fixtures;

pub use app::{AppBuilder, BatchOrchestrator, BuildError, RepostOrder};
pub use domain::{Listing, ReconcileError, ReconcileOutcome, RemoteId};
pub use observability::{BatchSummary, init_tracing};
