use serde::{Deserialize, Serialize};
use std::fmt;

use crate::status::ProposalStatus;

/// A period count as it arrives from a subgraph, where BigInt fields are
/// serialized as JSON strings. Plain numbers are accepted too, so records
/// that were already coerced round-trip cleanly.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PeriodValue {
    Number(i64),
    Raw(String),
}

impl Default for PeriodValue {
    fn default() -> Self {
        PeriodValue::Number(0)
    }
}

impl PeriodValue {
    /// Folds a raw wire string into a number, in place. An empty string
    /// coerces to zero. Anything unparseable stays raw so that [`value`]
    /// keeps returning `None`. Coercing twice is a no-op.
    ///
    /// [`value`]: PeriodValue::value
    pub fn coerce(&mut self) {
        if let PeriodValue::Raw(raw) = self {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                *self = PeriodValue::Number(0);
            } else if let Ok(number) = trimmed.parse::<i64>() {
                *self = PeriodValue::Number(number);
            }
        }
    }

    /// The coerced period count, or `None` while the value is still raw or
    /// never parsed. Window checks treat `None` as outside every window.
    pub fn value(&self) -> Option<i64> {
        match self {
            PeriodValue::Number(number) => Some(*number),
            PeriodValue::Raw(_) => None,
        }
    }
}

/// Per-DAO inputs for window classification, derived from the moloch entity
/// and the clock at the moment of evaluation.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct DaoPeriodConfig {
    pub current_period: i64,
    pub voting_period_length: i64,
    pub grace_period_length: i64,
    /// Major protocol version, 1 or 2. Sponsorship only exists from v2 on.
    pub version: u32,
}

impl Default for DaoPeriodConfig {
    fn default() -> Self {
        Self {
            current_period: 0,
            voting_period_length: 0,
            grace_period_length: 0,
            version: 1,
        }
    }
}

/// A proposal row in the shape the DAO subgraphs serve. Fields missing from
/// older schema versions fall back to their defaults on deserialization.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ProposalRecord {
    pub proposal_index: i64,
    pub applicant: String,
    /// Held raw until the first classification coerces it.
    pub starting_period: PeriodValue,
    /// Free-form metadata blob; see the accessors in [`crate::metadata`].
    pub details: String,
    pub sponsored: bool,
    pub processed: bool,
    pub did_pass: bool,
    pub aborted: bool,
    pub cancelled: bool,
    pub new_member: bool,
    pub whitelist: bool,
    pub guildkick: bool,
    pub trade: bool,
    /// Unix timestamps backing countdown display. Zero until window times
    /// are applied from the DAO's period geometry.
    pub voting_period_starts: i64,
    pub voting_period_ends: i64,
    pub grace_period_ends: i64,
    /// Set by classification, `None` for records never classified.
    pub status: Option<ProposalStatus>,
}

impl ProposalRecord {
    /// Classifies the proposal shape from its wire flags, first match wins.
    pub fn proposal_type(&self) -> ProposalType {
        if self.new_member {
            ProposalType::Member
        } else if self.whitelist {
            ProposalType::Whitelist
        } else if self.guildkick {
            ProposalType::Guildkick
        } else if self.trade {
            ProposalType::Trade
        } else {
            ProposalType::Funding
        }
    }
}

/// The proposal shapes a DAO can carry, in flag-priority order.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum ProposalType {
    Member,
    Whitelist,
    Guildkick,
    Trade,
    Funding,
}

impl ProposalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalType::Member => "Member Proposal",
            ProposalType::Whitelist => "Whitelist Token Proposal",
            ProposalType::Guildkick => "Guildkick Proposal",
            ProposalType::Trade => "Trade Proposal",
            ProposalType::Funding => "Funding Proposal",
        }
    }
}

impl fmt::Display for ProposalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
