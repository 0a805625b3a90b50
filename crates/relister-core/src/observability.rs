//! Observability - tracing の初期化と pass のサマリ

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::domain::ReconcileOutcome;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// fmt subscriber を登録（`RUST_LOG` に従う、省略時は `info`）
///
/// 複数回呼んでも問題ありません。
pub fn init_tracing() {
    if TRACING_INIT.get().is_some() {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();

    let _ = TRACING_INIT.set(());
}

/// BatchSummary は pass ごとの件数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub listings: usize,
    pub created: usize,
    pub reposted: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn new(listings: usize) -> Self {
        Self {
            listings,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &ReconcileOutcome) {
        match outcome {
            ReconcileOutcome::Unchanged => self.unchanged += 1,
            ReconcileOutcome::Created { .. } => self.created += 1,
            ReconcileOutcome::Reposted { .. } => self.reposted += 1,
        }
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    pub fn log(&self) {
        info!(
            listings = self.listings,
            created = self.created,
            reposted = self.reposted,
            unchanged = self.unchanged,
            failed = self.failed,
            "reconciliation pass finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RemoteId;

    #[test]
    fn outcomes_are_counted() {
        let id = RemoteId::from_stored(1).unwrap();
        let mut summary = BatchSummary::new(4);
        summary.record(&ReconcileOutcome::Unchanged);
        summary.record(&ReconcileOutcome::Created { remote_id: id });
        summary.record(&ReconcileOutcome::Reposted {
            previous: id,
            remote_id: id,
        });
        summary.record_failure();

        assert_eq!(
            summary,
            BatchSummary {
                listings: 4,
                created: 1,
                reposted: 1,
                unchanged: 1,
                failed: 1,
            }
        );
    }

    #[test]
    fn init_tracing_twice_is_harmless() {
        init_tracing();
        init_tracing();
    }
}
