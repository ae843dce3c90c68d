use moloch_lifecycle::record::{DaoPeriodConfig, PeriodValue, ProposalRecord};
use moloch_lifecycle::StatusBuckets;

/// A sponsored, unprocessed proposal parked at `starting_period`, the
/// baseline shape for window classification tests.
pub fn sponsored_proposal(proposal_index: i64, starting_period: i64) -> ProposalRecord {
    ProposalRecord {
        proposal_index,
        sponsored: true,
        starting_period: PeriodValue::Number(starting_period),
        ..Default::default()
    }
}

pub fn period_config(
    current_period: i64,
    voting_period_length: i64,
    grace_period_length: i64,
    version: u32,
) -> DaoPeriodConfig {
    DaoPeriodConfig {
        current_period,
        voting_period_length,
        grace_period_length,
        version,
    }
}

/// Expected bucket contents as proposal indexes, in expected order. Leave
/// a field at its default to assert that subgroup is empty.
#[derive(Debug, Default)]
pub struct ExpectedBuckets {
    pub voting_period: Vec<i64>,
    pub grace_period: Vec<i64>,
    pub ready_for_processing: Vec<i64>,
    pub in_queue: Vec<i64>,
    pub completed: Vec<i64>,
    pub cancelled: Vec<i64>,
    pub unsponsored: Vec<i64>,
}

pub fn assert_buckets(buckets: &StatusBuckets, expected: &ExpectedBuckets) {
    assert_eq!(
        indexes(&buckets.base.voting_period),
        expected.voting_period,
        "VotingPeriod subgroup does not match"
    );
    assert_eq!(
        indexes(&buckets.base.grace_period),
        expected.grace_period,
        "GracePeriod subgroup does not match"
    );
    assert_eq!(
        indexes(&buckets.base.ready_for_processing),
        expected.ready_for_processing,
        "ReadyForProcessing subgroup does not match"
    );
    assert_eq!(
        indexes(&buckets.base.in_queue),
        expected.in_queue,
        "InQueue subgroup does not match"
    );
    assert_eq!(
        indexes(&buckets.base.completed),
        expected.completed,
        "Completed subgroup does not match"
    );
    assert_eq!(
        indexes(&buckets.unsponsored.cancelled),
        expected.cancelled,
        "Cancelled subgroup does not match"
    );
    assert_eq!(
        indexes(&buckets.unsponsored.unsponsored),
        expected.unsponsored,
        "Unsponsored subgroup does not match"
    );
}

fn indexes(proposals: &[ProposalRecord]) -> Vec<i64> {
    proposals.iter().map(|p| p.proposal_index).collect()
}
