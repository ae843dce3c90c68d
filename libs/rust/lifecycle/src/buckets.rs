use serde::Serialize;

use crate::record::ProposalRecord;
use crate::status::ProposalStatus;

/// Proposals that never entered the queue: cancelled ones, and (when the
/// unsponsored view is on) everything still waiting for a sponsor.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UnsponsoredGroup {
    pub cancelled: Vec<ProposalRecord>,
    pub unsponsored: Vec<ProposalRecord>,
}

/// The main lifecycle columns, keyed by classified status. `completed` is a
/// residual that absorbs every status outside the four active columns, so
/// Aborted, Passed, Failed and Unknown all land there.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BaseGroup {
    pub voting_period: Vec<ProposalRecord>,
    pub grace_period: Vec<ProposalRecord>,
    /// Sorted ascending by proposal index, the on-chain processing order.
    pub ready_for_processing: Vec<ProposalRecord>,
    pub in_queue: Vec<ProposalRecord>,
    pub completed: Vec<ProposalRecord>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StatusBuckets {
    pub unsponsored: UnsponsoredGroup,
    pub base: BaseGroup,
}

/// Partitions classified proposals into display buckets. Subgroups are
/// filters over the same input, so one proposal may appear in several of
/// them. Input order is preserved everywhere except the processing queue,
/// which re-sorts by proposal index.
///
/// `unsponsored_view` switches between the two reading modes: on, the
/// unsponsored backlog is populated and `completed` stays empty; off, the
/// other way around. `cancelled` is filled in both modes.
pub fn bucketize(proposals: &[ProposalRecord], unsponsored_view: bool) -> StatusBuckets {
    let with_status = |status: ProposalStatus| -> Vec<ProposalRecord> {
        proposals
            .iter()
            .filter(|p| p.status == Some(status))
            .cloned()
            .collect()
    };

    let mut ready_for_processing = with_status(ProposalStatus::ReadyForProcessing);
    ready_for_processing.sort_by_key(|p| p.proposal_index);

    let completed = proposals
        .iter()
        .filter(|p| {
            !unsponsored_view
                && !matches!(
                    p.status,
                    Some(
                        ProposalStatus::VotingPeriod
                            | ProposalStatus::GracePeriod
                            | ProposalStatus::ReadyForProcessing
                            | ProposalStatus::InQueue
                    )
                )
        })
        .cloned()
        .collect();

    StatusBuckets {
        unsponsored: UnsponsoredGroup {
            cancelled: proposals.iter().filter(|p| p.cancelled).cloned().collect(),
            unsponsored: proposals
                .iter()
                .filter(|p| unsponsored_view && !p.cancelled && !p.processed)
                .cloned()
                .collect(),
        },
        base: BaseGroup {
            voting_period: with_status(ProposalStatus::VotingPeriod),
            grace_period: with_status(ProposalStatus::GracePeriod),
            ready_for_processing,
            in_queue: with_status(ProposalStatus::InQueue),
            completed,
        },
    }
}
