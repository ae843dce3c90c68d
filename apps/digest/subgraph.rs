use anyhow::{Context, Result};
use moloch_lifecycle::{DaoPeriodConfig, PeriodValue, ProposalRecord, periods::current_period_at};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use utils::errors;

const PROPOSAL_PAGE_SIZE: usize = 100;

pub struct SubgraphClient {
    client: ClientWithMiddleware,
    endpoint: String,
}

impl SubgraphClient {
    pub fn new(endpoint: String) -> Self {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        let client = ClientBuilder::new(reqwest::Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();
        Self { client, endpoint }
    }

    #[instrument(name = "subgraph_fetch_moloch", skip(self), fields(endpoint = %self.endpoint))]
    pub async fn fetch_moloch(&self) -> Result<Option<MolochDto>> {
        let query = r#"{ moloches(first: 1) { id summoningTime periodDuration votingPeriodLength gracePeriodLength version totalShares } }"#;
        let response: MolochResponse = self.fetch_graphql(query).await?;
        Ok(response
            .data
            .and_then(|data| data.moloches.into_iter().next()))
    }

    #[instrument(name = "subgraph_fetch_proposals", skip(self), fields(endpoint = %self.endpoint))]
    pub async fn fetch_all_proposals(&self) -> Result<Vec<ProposalDto>> {
        let mut proposals = Vec::new();
        let mut skip = 0;
        loop {
            let query = format!(
                r#"{{ proposals(first: {PROPOSAL_PAGE_SIZE}, skip: {skip}, orderBy: proposalIndex, orderDirection: asc) {{ id proposalIndex applicant details startingPeriod sponsored processed didPass aborted cancelled newMember whitelist guildkick trade }} }}"#
            );
            let response: ProposalsResponse = self.fetch_graphql(&query).await?;
            let batch = response
                .data
                .map(|data| data.proposals)
                .unwrap_or_default();
            let batch_len = batch.len();
            proposals.extend(batch);
            if batch_len < PROPOSAL_PAGE_SIZE {
                break;
            }
            skip += PROPOSAL_PAGE_SIZE;
        }
        info!(total = proposals.len(), "Fetched proposals from subgraph");
        Ok(proposals)
    }

    async fn fetch_graphql<T>(&self, query: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .body(serde_json::to_string(&serde_json::json!({ "query": query }))?)
            .send()
            .await
            .context(errors::SUBGRAPH_REQUEST_FAILED)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .context(errors::SUBGRAPH_RESPONSE_FAILED)?;
            anyhow::bail!("Subgraph request failed with status {status}: {body}");
        }

        response.json::<T>().await.context(errors::SUBGRAPH_DECODE_FAILED)
    }
}

#[derive(Debug, Deserialize)]
struct MolochResponse {
    data: Option<MolochData>,
}

#[derive(Debug, Deserialize)]
struct MolochData {
    moloches: Vec<MolochDto>,
}

#[derive(Debug, Deserialize)]
struct ProposalsResponse {
    data: Option<ProposalsData>,
}

#[derive(Debug, Deserialize)]
struct ProposalsData {
    proposals: Vec<ProposalDto>,
}

/// Moloch entity as the subgraph reports it. BigInt scalars arrive as
/// strings, and v1 deployments omit the version field entirely.
#[derive(Clone, Debug, Deserialize)]
pub struct MolochDto {
    pub id: String,
    #[serde(rename = "summoningTime")]
    pub summoning_time: String,
    #[serde(rename = "periodDuration")]
    pub period_duration: String,
    #[serde(rename = "votingPeriodLength")]
    pub voting_period_length: String,
    #[serde(rename = "gracePeriodLength")]
    pub grace_period_length: String,
    pub version: Option<String>,
    #[serde(rename = "totalShares")]
    pub total_shares: Option<String>,
}

impl MolochDto {
    pub fn summoning_time_secs(&self) -> i64 {
        parse_big_int(&self.summoning_time)
    }

    pub fn period_duration_secs(&self) -> i64 {
        parse_big_int(&self.period_duration)
    }

    /// Period geometry at `now`, falling back to `fallback_version` when the
    /// subgraph does not report a contract version.
    pub fn to_period_config(&self, now: i64, fallback_version: u32) -> DaoPeriodConfig {
        DaoPeriodConfig {
            current_period: current_period_at(
                now,
                self.summoning_time_secs(),
                self.period_duration_secs(),
            ),
            voting_period_length: parse_big_int(&self.voting_period_length),
            grace_period_length: parse_big_int(&self.grace_period_length),
            version: self
                .version
                .as_deref()
                .and_then(version_major)
                .unwrap_or(fallback_version),
        }
    }
}

fn parse_big_int(raw: &str) -> i64 {
    match raw.trim().parse::<i64>() {
        Ok(value) => value,
        Err(e) => {
            warn!(raw, error = %e, "Failed to parse subgraph integer, using zero");
            0
        }
    }
}

/// Major component of a dotted version string, e.g. "2.1" reads as 2.
fn version_major(raw: &str) -> Option<u32> {
    raw.split('.').next()?.trim().parse::<u32>().ok()
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProposalDto {
    pub id: Option<String>,
    #[serde(rename = "proposalIndex")]
    pub proposal_index: Option<String>,
    pub applicant: Option<String>,
    pub details: Option<String>,
    #[serde(rename = "startingPeriod")]
    pub starting_period: Option<String>,
    pub sponsored: Option<bool>,
    pub processed: Option<bool>,
    #[serde(rename = "didPass")]
    pub did_pass: Option<bool>,
    pub aborted: Option<bool>,
    pub cancelled: Option<bool>,
    #[serde(rename = "newMember")]
    pub new_member: Option<bool>,
    pub whitelist: Option<bool>,
    pub guildkick: Option<bool>,
    pub trade: Option<bool>,
}

impl ProposalDto {
    /// Converts the wire shape into a lifecycle record. Proposals whose index
    /// cannot be parsed are dropped with a warning so one bad row does not
    /// sink the whole digest.
    pub fn to_record(&self) -> Option<ProposalRecord> {
        let proposal_index = match &self.proposal_index {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(index) => index,
                Err(e) => {
                    warn!(id = ?self.id, error = %e, "Skipping proposal with unparseable index");
                    return None;
                }
            },
            None => 0,
        };

        let starting_period = match &self.starting_period {
            Some(raw) => PeriodValue::Raw(raw.clone()),
            None => PeriodValue::default(),
        };

        Some(ProposalRecord {
            proposal_index,
            applicant: self.applicant.clone().unwrap_or_default(),
            starting_period,
            details: self.details.clone().unwrap_or_default(),
            sponsored: self.sponsored.unwrap_or(false),
            processed: self.processed.unwrap_or(false),
            did_pass: self.did_pass.unwrap_or(false),
            aborted: self.aborted.unwrap_or(false),
            cancelled: self.cancelled.unwrap_or(false),
            new_member: self.new_member.unwrap_or(false),
            whitelist: self.whitelist.unwrap_or(false),
            guildkick: self.guildkick.unwrap_or(false),
            trade: self.trade.unwrap_or(false),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_fetch_moloch_parses_entity() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/subgraph")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data":{"moloches":[{
                    "id":"0xdao",
                    "summoningTime":"1000000",
                    "periodDuration":"60",
                    "votingPeriodLength":"35",
                    "gracePeriodLength":"35",
                    "version":"2.1",
                    "totalShares":"420"
                }]}}"#,
            )
            .create_async()
            .await;

        let client = SubgraphClient::new(format!("{}/subgraph", server.url()));
        let moloch = client.fetch_moloch().await.unwrap().unwrap();

        assert_eq!(moloch.id, "0xdao");
        assert_eq!(moloch.summoning_time_secs(), 1_000_000);
        assert_eq!(moloch.period_duration_secs(), 60);

        let config = moloch.to_period_config(1_001_200, 1);
        assert_eq!(config.current_period, 20);
        assert_eq!(config.voting_period_length, 35);
        assert_eq!(config.grace_period_length, 35);
        assert_eq!(config.version, 2);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_moloch_empty_result_is_none() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/subgraph")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":{"moloches":[]}}"#)
            .create_async()
            .await;

        let client = SubgraphClient::new(format!("{}/subgraph", server.url()));
        assert!(client.fetch_moloch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_all_proposals_single_page() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/subgraph")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data":{"proposals":[
                    {"id":"0xdao-0","proposalIndex":"0","applicant":"0xabc","details":"First","startingPeriod":"1","sponsored":true},
                    {"id":"0xdao-1","proposalIndex":"1","applicant":"0xdef","details":"Second","startingPeriod":"4","sponsored":true}
                ]}}"#,
            )
            .create_async()
            .await;

        let client = SubgraphClient::new(format!("{}/subgraph", server.url()));
        let proposals = client.fetch_all_proposals().await.unwrap();

        assert_eq!(proposals.len(), 2);
        assert_eq!(proposals[0].proposal_index.as_deref(), Some("0"));
        assert_eq!(proposals[1].details.as_deref(), Some("Second"));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_all_proposals_null_data_is_empty() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/subgraph")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":null}"#)
            .create_async()
            .await;

        let client = SubgraphClient::new(format!("{}/subgraph", server.url()));
        let proposals = client.fetch_all_proposals().await.unwrap();
        assert!(proposals.is_empty());
    }

    #[test]
    fn test_to_record_maps_wire_fields() {
        let dto = ProposalDto {
            id: Some("0xdao-7".to_string()),
            proposal_index: Some("7".to_string()),
            applicant: Some("0xabc".to_string()),
            details: Some("Fund the guild".to_string()),
            starting_period: Some("12".to_string()),
            sponsored: Some(true),
            did_pass: Some(true),
            trade: Some(true),
            ..Default::default()
        };

        let record = dto.to_record().unwrap();
        assert_eq!(record.proposal_index, 7);
        assert_eq!(record.applicant, "0xabc");
        assert_eq!(record.details, "Fund the guild");
        assert_eq!(record.starting_period, PeriodValue::Raw("12".to_string()));
        assert!(record.sponsored);
        assert!(record.did_pass);
        assert!(record.trade);
        assert!(!record.processed);
    }

    #[test]
    fn test_to_record_missing_index_is_zero() {
        let dto = ProposalDto::default();
        let record = dto.to_record().unwrap();
        assert_eq!(record.proposal_index, 0);
        assert_eq!(record.starting_period, PeriodValue::Number(0));
    }

    #[test]
    fn test_to_record_skips_unparseable_index() {
        let dto = ProposalDto {
            proposal_index: Some("seven".to_string()),
            ..Default::default()
        };
        assert!(dto.to_record().is_none());
    }

    #[test]
    fn test_version_major_takes_leading_component() {
        assert_eq!(version_major("2.1"), Some(2));
        assert_eq!(version_major("1"), Some(1));
        assert_eq!(version_major("v2"), None);
        assert_eq!(version_major(""), None);
    }

    #[test]
    fn test_parse_big_int_garbage_is_zero() {
        assert_eq!(parse_big_int("12345"), 12_345);
        assert_eq!(parse_big_int(" 99 "), 99);
        assert_eq!(parse_big_int("many"), 0);
    }
}
