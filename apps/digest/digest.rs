use anyhow::{Context, Result};
use chrono::Utc;
use moloch_lifecycle::{
    StatusBuckets, bucketize,
    display::{countdown, truncate_addr},
    periods::apply_window_times,
};
use tracing::{debug, error, info, instrument};
use utils::errors;

use crate::{
    config::{self, DaoEntry},
    subgraph::SubgraphClient,
};

#[instrument(skip_all)]
pub async fn run_digest_task() -> Result<()> {
    let config = config::get_config();
    for (slug, entry) in &config.dao_registry {
        if let Err(e) = digest_dao(slug, entry, config.unsponsored_view).await {
            error!(dao = %slug, error = %e, error_chain = ?e, "Digest failed for DAO");
        }
    }
    Ok(())
}

#[instrument(skip(entry), fields(endpoint = %entry.subgraph_url))]
async fn digest_dao(slug: &str, entry: &DaoEntry, unsponsored_view: bool) -> Result<()> {
    let client = SubgraphClient::new(entry.subgraph_url.clone());

    let moloch = client
        .fetch_moloch()
        .await?
        .context(errors::MOLOCH_NOT_FOUND)?;

    let now = Utc::now().timestamp();
    let config = moloch.to_period_config(now, entry.version);
    let summoning_time = moloch.summoning_time_secs();
    let period_duration = moloch.period_duration_secs();

    info!(
        moloch = %moloch.id,
        summoning_time,
        period_duration,
        total_shares = ?moloch.total_shares,
        "Moloch entity fetched"
    );

    let mut proposals: Vec<_> = client
        .fetch_all_proposals()
        .await?
        .iter()
        .filter_map(|dto| dto.to_record())
        .collect();

    for proposal in &mut proposals {
        proposal.classify(&config);
        apply_window_times(proposal, summoning_time, period_duration, &config);
    }

    let buckets = bucketize(&proposals, unsponsored_view);
    log_summary(slug, config.current_period, &buckets, proposals.len(), now);

    Ok(())
}

fn log_summary(slug: &str, current_period: i64, buckets: &StatusBuckets, total: usize, now: i64) {
    info!(
        dao = %slug,
        current_period,
        total,
        voting = buckets.base.voting_period.len(),
        grace = buckets.base.grace_period.len(),
        ready = buckets.base.ready_for_processing.len(),
        in_queue = buckets.base.in_queue.len(),
        completed = buckets.base.completed.len(),
        cancelled = buckets.unsponsored.cancelled.len(),
        unsponsored = buckets.unsponsored.unsponsored.len(),
        "Digest summary"
    );

    for proposal in &buckets.base.ready_for_processing {
        info!(
            proposal_index = proposal.proposal_index,
            applicant = %truncate_addr(&proposal.applicant),
            proposal_type = proposal.proposal_type().as_str(),
            title = %proposal.title(),
            "Proposal ready for processing"
        );
    }

    for proposal in buckets
        .base
        .in_queue
        .iter()
        .chain(&buckets.base.voting_period)
        .chain(&buckets.base.grace_period)
    {
        if let Some(countdown) = countdown(proposal, now) {
            debug!(
                proposal_index = proposal.proposal_index,
                title = %proposal.title(),
                countdown = %countdown,
                "Active proposal"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_digest_dao_end_to_end() {
        let mut server = Server::new_async().await;

        let moloch_mock = server
            .mock("POST", "/subgraph")
            .match_body(Matcher::Regex("moloches".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data":{"moloches":[{
                    "id":"0xdao",
                    "summoningTime":"1",
                    "periodDuration":"1",
                    "votingPeriodLength":"5",
                    "gracePeriodLength":"3",
                    "version":"2",
                    "totalShares":"100"
                }]}}"#,
            )
            .create_async()
            .await;

        let proposals_mock = server
            .mock("POST", "/subgraph")
            .match_body(Matcher::Regex(r"proposals\(first".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data":{"proposals":[
                    {"id":"0xdao-0","proposalIndex":"0","applicant":"0x1234567890abcdef1234567890abcdefdeadbeef","details":"Fund the guild","startingPeriod":"2","sponsored":true,"processed":true,"didPass":true},
                    {"id":"0xdao-1","proposalIndex":"1","applicant":"0xabc","details":"Summon a minion","startingPeriod":"3","sponsored":false}
                ]}}"#,
            )
            .create_async()
            .await;

        let entry = DaoEntry {
            subgraph_url: format!("{}/subgraph", server.url()),
            version: 2,
        };

        digest_dao("test-dao", &entry, false).await.unwrap();

        moloch_mock.assert_async().await;
        proposals_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_digest_dao_missing_moloch_is_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/subgraph")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":{"moloches":[]}}"#)
            .create_async()
            .await;

        let entry = DaoEntry {
            subgraph_url: format!("{}/subgraph", server.url()),
            version: 1,
        };

        let err = digest_dao("test-dao", &entry, false).await.unwrap_err();
        assert!(err.to_string().contains(errors::MOLOCH_NOT_FOUND));
    }
}
