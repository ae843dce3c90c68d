use anyhow::Result;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::{collections::HashMap, env, fs};
use tracing::{info, warn};
use utils::errors;

pub static CONFIG: OnceCell<DigestConfig> = OnceCell::new();

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    /// DAOs to digest, keyed by a short slug used in log output.
    pub dao_registry: HashMap<String, DaoEntry>,
    /// Seconds to sleep between digest runs.
    pub poll_interval_secs: u64,
    /// When true, proposals are grouped for a sponsorship backlog review
    /// instead of the default voting-centric view.
    pub unsponsored_view: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DaoEntry {
    pub subgraph_url: String,
    /// Contract major version, used when the subgraph does not report one.
    #[serde(default = "default_version")]
    pub version: u32,
}

fn default_version() -> u32 {
    1
}

impl Default for DigestConfig {
    fn default() -> Self {
        let mut dao_registry = HashMap::new();
        dao_registry.insert(
            "moloch-dao".to_string(),
            DaoEntry {
                subgraph_url: "https://api.thegraph.com/subgraphs/name/molochventures/moloch"
                    .to_string(),
                version: 1,
            },
        );
        dao_registry.insert(
            "metacartel-ventures".to_string(),
            DaoEntry {
                subgraph_url: "https://api.thegraph.com/subgraphs/name/odyssy-automaton/daohaus"
                    .to_string(),
                version: 2,
            },
        );
        Self {
            dao_registry,
            poll_interval_secs: 300,
            unsponsored_view: false,
        }
    }
}

pub fn load() -> Result<()> {
    let config = load_config();
    CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!(errors::CONFIG_ALREADY_INITIALIZED))?;
    Ok(())
}

pub fn get_config() -> &'static DigestConfig {
    CONFIG.get().expect(errors::CONFIG_NOT_INITIALIZED)
}

fn load_config() -> DigestConfig {
    let path = env::var("DIGEST_CONFIG_PATH").unwrap_or_else(|_| "digest.yaml".to_string());

    let mut config = match fs::read_to_string(&path) {
        Ok(raw) => match serde_yaml::from_str::<DigestConfig>(&raw) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, path = %path, "Failed to parse digest config, using defaults");
                DigestConfig::default()
            }
        },
        Err(e) => {
            warn!(error = %e, path = %path, "Failed to read digest config, using defaults");
            DigestConfig::default()
        }
    };

    apply_env_overrides(&mut config);

    info!(
        daos = config.dao_registry.len(),
        poll_interval_secs = config.poll_interval_secs,
        unsponsored_view = config.unsponsored_view,
        "Digest config loaded"
    );

    config
}

fn apply_env_overrides(config: &mut DigestConfig) {
    if let Ok(raw) = env::var("DIGEST_DAO_REGISTRY") {
        match serde_json::from_str::<HashMap<String, DaoEntry>>(&raw) {
            Ok(registry) => config.dao_registry = registry,
            Err(e) => warn!(error = %e, "Failed to parse DIGEST_DAO_REGISTRY override"),
        }
    }

    if let Ok(raw) = env::var("DIGEST_POLL_INTERVAL_SECS") {
        match raw.parse::<u64>() {
            Ok(secs) => config.poll_interval_secs = secs,
            Err(e) => warn!(error = %e, "Failed to parse DIGEST_POLL_INTERVAL_SECS override"),
        }
    }

    if let Ok(raw) = env::var("DIGEST_UNSPONSORED_VIEW") {
        match raw.parse::<bool>() {
            Ok(flag) => config.unsponsored_view = flag,
            Err(e) => warn!(error = %e, "Failed to parse DIGEST_UNSPONSORED_VIEW override"),
        }
    }
}
