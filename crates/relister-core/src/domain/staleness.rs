//! Staleness - repost が必要かどうかの判定
//!
//! 純粋関数として実装（副作用なし、時刻は引数で受け取る）。

use chrono::{DateTime, Duration, Utc};

use super::posting::RemotePostingStatus;

/// Thresholds は listing ごとの閾値（レコードからコピー）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub max_allowed_rank: u32,
    pub max_age_hours: u32,
}

/// StaleReason は repost が必要な理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    Rank { rank: u32, max_allowed: u32 },
    Age { age: Duration, max_age_hours: u32 },
}

impl Thresholds {
    /// 比較はどちらも strict（閾値ちょうどは fresh 扱い）
    /// 両方を超えている場合は rank を理由とする
    pub fn stale_reason(
        &self,
        status: RemotePostingStatus,
        posted_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Option<StaleReason> {
        if status.rank > self.max_allowed_rank {
            return Some(StaleReason::Rank {
                rank: status.rank,
                max_allowed: self.max_allowed_rank,
            });
        }

        let age = now.signed_duration_since(posted_at);
        if age > Duration::hours(i64::from(self.max_age_hours)) {
            return Some(StaleReason::Age {
                age,
                max_age_hours: self.max_age_hours,
            });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn posted_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    const THRESHOLDS: Thresholds = Thresholds {
        max_allowed_rank: 3,
        max_age_hours: 24,
    };

    #[rstest]
    #[case::rank_at_limit(3, 1, false)]
    #[case::rank_over_limit(4, 1, true)]
    #[case::age_at_boundary(1, 24 * 60, false)]
    #[case::age_one_minute_over(1, 24 * 60 + 1, true)]
    #[case::both_fresh(2, 60, false)]
    fn stale_reason_is_strict(#[case] rank: u32, #[case] age_minutes: i64, #[case] stale: bool) {
        let now = posted_at() + Duration::minutes(age_minutes);
        let reason = THRESHOLDS.stale_reason(RemotePostingStatus { rank }, posted_at(), now);
        assert_eq!(reason.is_some(), stale);
    }

    #[test]
    fn rank_alone_triggers_even_when_fresh() {
        let reason = THRESHOLDS.stale_reason(
            RemotePostingStatus { rank: 4 },
            posted_at(),
            posted_at(),
        );
        assert_eq!(
            reason,
            Some(StaleReason::Rank {
                rank: 4,
                max_allowed: 3
            })
        );
    }

    #[test]
    fn posting_from_the_future_is_fresh() {
        let now = posted_at() - Duration::hours(5);
        let reason = THRESHOLDS.stale_reason(RemotePostingStatus { rank: 1 }, posted_at(), now);
        assert_eq!(reason, None);
    }
}
