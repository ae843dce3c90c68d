use crate::record::{DaoPeriodConfig, ProposalRecord};

/// Period index at `now` for a DAO summoned at `summoning_time` with
/// `period_duration` seconds per period. Times before summoning floor into
/// negative periods. A zero or negative duration pins the clock to zero.
pub fn current_period_at(now: i64, summoning_time: i64, period_duration: i64) -> i64 {
    if period_duration <= 0 {
        return 0;
    }
    now.saturating_sub(summoning_time).div_euclid(period_duration)
}

/// Unix timestamp at which `period` begins.
pub fn period_start_time(period: i64, summoning_time: i64, period_duration: i64) -> i64 {
    summoning_time.saturating_add(period.saturating_mul(period_duration))
}

/// Fills the countdown timestamps on a record from the DAO's period
/// geometry. Records whose starting period never coerced are left alone.
pub fn apply_window_times(
    proposal: &mut ProposalRecord,
    summoning_time: i64,
    period_duration: i64,
    config: &DaoPeriodConfig,
) {
    proposal.starting_period.coerce();
    let Some(start) = proposal.starting_period.value() else {
        return;
    };
    let voting_ends = start.saturating_add(config.voting_period_length);
    let grace_ends = voting_ends.saturating_add(config.grace_period_length);
    proposal.voting_period_starts = period_start_time(start, summoning_time, period_duration);
    proposal.voting_period_ends = period_start_time(voting_ends, summoning_time, period_duration);
    proposal.grace_period_ends = period_start_time(grace_ends, summoning_time, period_duration);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PeriodValue;

    #[test]
    fn test_current_period_counts_elapsed_durations() {
        assert_eq!(current_period_at(1_105, 1_000, 10), 10);
        assert_eq!(current_period_at(1_000, 1_000, 10), 0);
        assert_eq!(current_period_at(1_010, 1_000, 10), 1);
    }

    #[test]
    fn test_current_period_floors_before_summoning() {
        assert_eq!(current_period_at(995, 1_000, 10), -1);
    }

    #[test]
    fn test_zero_duration_pins_period_to_zero() {
        assert_eq!(current_period_at(5_000, 1_000, 0), 0);
    }

    #[test]
    fn test_period_start_time_inverts_the_clock() {
        let start = period_start_time(10, 1_000, 10);
        assert_eq!(start, 1_100);
        assert_eq!(current_period_at(start, 1_000, 10), 10);
    }

    #[test]
    fn test_apply_window_times_fills_timestamps() {
        let mut proposal = ProposalRecord {
            starting_period: PeriodValue::Raw("12".to_string()),
            ..Default::default()
        };
        let config = DaoPeriodConfig {
            voting_period_length: 5,
            grace_period_length: 3,
            ..Default::default()
        };
        apply_window_times(&mut proposal, 1_000, 10, &config);
        assert_eq!(proposal.voting_period_starts, 1_120);
        assert_eq!(proposal.voting_period_ends, 1_170);
        assert_eq!(proposal.grace_period_ends, 1_200);
        assert_eq!(proposal.starting_period, PeriodValue::Number(12));
    }

    #[test]
    fn test_apply_window_times_skips_raw_starts() {
        let mut proposal = ProposalRecord {
            starting_period: PeriodValue::Raw("garbage".to_string()),
            ..Default::default()
        };
        apply_window_times(&mut proposal, 1_000, 10, &DaoPeriodConfig::default());
        assert_eq!(proposal.voting_period_starts, 0);
        assert_eq!(proposal.voting_period_ends, 0);
        assert_eq!(proposal.grace_period_ends, 0);
    }
}
