use serde::{Deserialize, Serialize};
use std::fmt;

use crate::record::{DaoPeriodConfig, ProposalRecord};

/// Lifecycle stage of a proposal at a given period.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum ProposalStatus {
    /// Fallback when no rule matched, in practice only reachable when the
    /// starting period never coerced to a number.
    Unknown,
    /// Queued ahead of its voting window.
    InQueue,
    /// Inside the voting window.
    VotingPeriod,
    /// Voting closed, inside the grace window.
    GracePeriod,
    /// Processed after an abort or cancellation.
    Aborted,
    /// Processed with a passing vote.
    Passed,
    /// Processed with a failing vote.
    Failed,
    /// Both windows elapsed, waiting to be processed on chain.
    ReadyForProcessing,
    /// A v2 proposal no member has sponsored yet.
    Unsponsored,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Unknown => "Unknown",
            ProposalStatus::InQueue => "InQueue",
            ProposalStatus::VotingPeriod => "VotingPeriod",
            ProposalStatus::GracePeriod => "GracePeriod",
            ProposalStatus::Aborted => "Aborted",
            ProposalStatus::Passed => "Passed",
            ProposalStatus::Failed => "Failed",
            ProposalStatus::ReadyForProcessing => "ReadyForProcessing",
            ProposalStatus::Unsponsored => "Unsponsored",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True while the proposal is queued ahead of its voting window.
pub fn in_queue(start: i64, config: &DaoPeriodConfig) -> bool {
    config.current_period < start
}

/// Closed voting window `[start, start + votingPeriodLength]`.
pub fn in_voting_period(start: i64, config: &DaoPeriodConfig) -> bool {
    config.current_period >= start
        && config.current_period <= start.saturating_add(config.voting_period_length)
}

/// Half-open grace window `[votingEnd, votingEnd + gracePeriodLength)`.
/// Under v2 an unsponsored proposal is never mid-lifecycle.
pub fn in_grace_period(start: i64, sponsored: bool, config: &DaoPeriodConfig) -> bool {
    if config.version == 2 && !sponsored {
        return false;
    }
    let grace_start = start.saturating_add(config.voting_period_length);
    config.current_period >= grace_start
        && config.current_period < grace_start.saturating_add(config.grace_period_length)
}

/// True once both the voting and grace windows have fully elapsed.
pub fn passed_voting_and_grace(start: i64, sponsored: bool, config: &DaoPeriodConfig) -> bool {
    if config.version == 2 && !sponsored {
        return false;
    }
    let windows_end = start
        .saturating_add(config.voting_period_length)
        .saturating_add(config.grace_period_length);
    config.current_period >= windows_end
}

/// Runs the status ladder over a proposal. Coerces the raw starting period
/// in place first; that coercion is the engine's only record mutation.
///
/// Terminal outcomes are decided before any window math, so they hold even
/// when the starting period never parses. The grace window is checked ahead
/// of the voting window, which makes the shared boundary period resolve to
/// [`ProposalStatus::GracePeriod`].
pub fn determine_status(
    proposal: &mut ProposalRecord,
    config: &DaoPeriodConfig,
) -> ProposalStatus {
    proposal.starting_period.coerce();

    if proposal.processed && (proposal.aborted || proposal.cancelled) {
        return ProposalStatus::Aborted;
    }
    if config.version == 2 && !proposal.sponsored {
        return ProposalStatus::Unsponsored;
    }
    if proposal.processed && proposal.did_pass {
        return ProposalStatus::Passed;
    }
    if proposal.processed && !proposal.did_pass {
        return ProposalStatus::Failed;
    }

    let Some(start) = proposal.starting_period.value() else {
        return ProposalStatus::Unknown;
    };
    if in_grace_period(start, proposal.sponsored, config) {
        ProposalStatus::GracePeriod
    } else if in_voting_period(start, config) {
        ProposalStatus::VotingPeriod
    } else if in_queue(start, config) {
        ProposalStatus::InQueue
    } else if passed_voting_and_grace(start, proposal.sponsored, config) {
        ProposalStatus::ReadyForProcessing
    } else {
        ProposalStatus::Unknown
    }
}

impl ProposalRecord {
    /// Classifies this record and stores the outcome in [`status`].
    ///
    /// [`status`]: ProposalRecord::status
    pub fn classify(&mut self, config: &DaoPeriodConfig) -> ProposalStatus {
        let status = determine_status(self, config);
        self.status = Some(status);
        status
    }
}
