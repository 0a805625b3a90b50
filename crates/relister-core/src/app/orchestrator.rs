//! BatchOrchestrator - 1 回の reconcile pass
//!
//! # フロー
//! 1. RecordStore::scan_all() で全 listing を取得（失敗したら pass 全体を中止）
//! 2. listing ごとに 1 task を spawn（並列度の上限なし）
//! 3. 全 task の終了を待ち、最初のエラーだけを返す

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::first_error::FirstError;
use super::reconciler::ItemReconciler;
use crate::domain::{ReconcileError, ReconcileOutcome};
use crate::observability::BatchSummary;
use crate::ports::RecordStore;

type ListingResult = Result<ReconcileOutcome, ReconcileError>;

/// BatchOrchestrator は listing ごとに 1 task を起動して結果を集約
///
/// [`AppBuilder`](super::AppBuilder) で構築します。
pub struct BatchOrchestrator {
    records: Arc<dyn RecordStore>,
    reconciler: Arc<ItemReconciler>,
}

impl BatchOrchestrator {
    pub(crate) fn new(records: Arc<dyn RecordStore>, reconciler: Arc<ItemReconciler>) -> Self {
        Self {
            records,
            reconciler,
        }
    }

    /// 全 listing に対して reconcile pass を 1 回実行
    ///
    /// - ある listing が失敗しても、他の listing は最後まで実行される
    /// - 結果はテーブル順に集約するので、複数失敗した場合は
    ///   テーブル順で最初の listing のエラーを返す（残りはログのみ）
    /// - この future を drop すると実行中の task はすべて abort される
    pub async fn run_once(&self) -> Result<BatchSummary, ReconcileError> {
        let listings = self
            .records
            .scan_all()
            .await
            .map_err(ReconcileError::Load)?;
        info!(listings = listings.len(), "starting reconciliation pass");

        let mut tasks = JoinSet::new();
        let mut positions = HashMap::with_capacity(listings.len());
        let mut titles = Vec::with_capacity(listings.len());
        for (index, listing) in listings.into_iter().enumerate() {
            titles.push(listing.title.clone());
            let reconciler = Arc::clone(&self.reconciler);
            let task = tasks.spawn(async move { (index, reconciler.reconcile(listing).await) });
            positions.insert(task.id(), index);
        }

        let mut slots: Vec<Option<ListingResult>> = (0..titles.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(source) => {
                    if let Some(&index) = positions.get(&source.id()) {
                        slots[index] = Some(Err(ReconcileError::TaskFailed {
                            listing: titles[index].clone(),
                            source,
                        }));
                    }
                }
            }
        }

        let mut summary = BatchSummary::new(titles.len());
        let first_error = FirstError::new();

        for (title, result) in titles.iter().zip(slots) {
            match result {
                Some(Ok(outcome)) => summary.record(&outcome),
                Some(Err(err)) => {
                    summary.record_failure();
                    warn!(listing = %title, error = %err, "listing reconciliation failed");
                    if !first_error.record(err) {
                        debug!(listing = %title, "error dropped, an earlier one is kept");
                    }
                }
                None => {}
            }
        }

        summary.log();
        first_error.into_result()?;
        Ok(summary)
    }
}
