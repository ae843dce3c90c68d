use chrono::Duration;

use crate::record::ProposalRecord;
use crate::status::ProposalStatus;

/// Countdown line for a classified proposal, `None` when there is nothing
/// to show. Window statuses phrase their deadline relative to `now`,
/// terminal statuses collapse to a single word.
pub fn countdown(proposal: &ProposalRecord, now: i64) -> Option<String> {
    let text = match proposal.status? {
        ProposalStatus::InQueue => format!(
            "Voting Begins: {}",
            time_to_now(proposal.voting_period_starts, now)
        ),
        ProposalStatus::VotingPeriod => format!(
            "Voting Ends: {}",
            time_to_now(proposal.voting_period_ends, now)
        ),
        ProposalStatus::GracePeriod => format!(
            "Grace Period Ends: {}",
            time_to_now(proposal.grace_period_ends, now)
        ),
        ProposalStatus::Passed => "Passed".to_string(),
        ProposalStatus::Failed => "Failed".to_string(),
        ProposalStatus::Aborted => "Aborted".to_string(),
        ProposalStatus::ReadyForProcessing => "Ready For Processing".to_string(),
        ProposalStatus::Unsponsored => "Unsponsored".to_string(),
        ProposalStatus::Unknown => return None,
    };
    Some(text)
}

/// Relative phrasing for a unix timestamp seen from `now`: "in 2 hours",
/// "3 days ago", "now" on the dot.
pub fn time_to_now(timestamp: i64, now: i64) -> String {
    if timestamp == now {
        return "now".to_string();
    }
    let delta = timestamp.saturating_sub(now);
    let phrase = humanize(Duration::seconds(delta.saturating_abs()));
    if delta > 0 {
        format!("in {phrase}")
    } else {
        format!("{phrase} ago")
    }
}

fn humanize(duration: Duration) -> String {
    let days = duration.num_days();
    if days > 0 {
        return plural(days, "day");
    }
    let hours = duration.num_hours();
    if hours > 0 {
        return plural(hours, "hour");
    }
    let minutes = duration.num_minutes();
    if minutes > 0 {
        return plural(minutes, "minute");
    }
    plural(duration.num_seconds(), "second")
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

/// Shortens a hex address for display, `0x1234...abcd` style. Strings too
/// short to truncate come back unchanged.
pub fn truncate_addr(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
