//! Realms specific settings, stored as YAML next to the Solana CLI config.

use {
    crate::cli::CliError,
    realms_account_query::{Endpoints, QueryCacheConfig},
    realms_governance_state::constants::DEFAULT_GOVERNANCE_PROGRAM_ID,
    serde::{Deserialize, Serialize},
    solana_pubkey::Pubkey,
    std::{path::Path, str::FromStr, time::Duration},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealmsConfig {
    /// RPC endpoint of each cluster; the cache is scoped by the cluster the
    /// active endpoint maps to.
    pub endpoints: Endpoints,
    pub governance_program_id: String,
    /// Overrides the default plugin address of the built-in plugin version.
    pub nft_voter_program_id: Option<String>,
    /// DAS endpoint.  Falls back to the JSON RPC url.
    pub das_url: Option<String>,
    pub cache_stale_after_secs: Option<u64>,
}

impl Default for RealmsConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            governance_program_id: DEFAULT_GOVERNANCE_PROGRAM_ID.to_string(),
            nft_voter_program_id: None,
            das_url: None,
            cache_stale_after_secs: None,
        }
    }
}

fn parse_pubkey(field: &str, value: &str) -> Result<Pubkey, CliError> {
    Pubkey::from_str(value)
        .map_err(|err| CliError::Config(format!("invalid {field} '{value}': {err}")))
}

impl RealmsConfig {
    /// Load from `path`, or defaults when the file does not exist.
    pub fn load(path: &str) -> Result<Self, CliError> {
        if !Path::new(path).exists() {
            return Ok(Self::default());
        }
        solana_cli_config::load_config_file(path)
            .map_err(|err| CliError::Config(format!("failed to load {path}: {err}")))
    }

    pub fn save(&self, path: &str) -> Result<(), CliError> {
        solana_cli_config::save_config_file(self, path)
            .map_err(|err| CliError::Config(format!("failed to save {path}: {err}")))
    }

    pub fn governance_program_id(&self) -> Result<Pubkey, CliError> {
        parse_pubkey("governance_program_id", &self.governance_program_id)
    }

    pub fn nft_voter_program_id(&self) -> Result<Option<Pubkey>, CliError> {
        self.nft_voter_program_id
            .as_deref()
            .map(|value| parse_pubkey("nft_voter_program_id", value))
            .transpose()
    }

    pub fn das_url<'a>(&'a self, json_rpc_url: &'a str) -> &'a str {
        self.das_url.as_deref().unwrap_or(json_rpc_url)
    }

    pub fn cache_config(&self) -> QueryCacheConfig {
        QueryCacheConfig {
            stale_after: self.cache_stale_after_secs.map(Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, assert_matches::assert_matches};

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("realms.yml");
        let config = RealmsConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config, RealmsConfig::default());
        assert_eq!(
            config.governance_program_id().unwrap(),
            DEFAULT_GOVERNANCE_PROGRAM_ID
        );
        assert_eq!(config.cache_config(), QueryCacheConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("realms.yml");
        let path = path.to_str().unwrap();
        let config = RealmsConfig {
            das_url: Some("https://das.example.com".to_string()),
            cache_stale_after_secs: Some(30),
            ..RealmsConfig::default()
        };
        config.save(path).unwrap();

        let loaded = RealmsConfig::load(path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.das_url("https://rpc"), "https://das.example.com");
        assert_eq!(
            loaded.cache_config().stale_after,
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("realms.yml");
        std::fs::write(&path, "cache_stale_after_secs: 5\n").unwrap();
        let loaded = RealmsConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.endpoints, Endpoints::default());
        assert_eq!(loaded.cache_stale_after_secs, Some(5));
        assert_eq!(loaded.das_url("https://rpc"), "https://rpc");
    }

    #[test]
    fn test_invalid_program_id() {
        let config = RealmsConfig {
            nft_voter_program_id: Some("nope".to_string()),
            ..RealmsConfig::default()
        };
        assert_matches!(config.nft_voter_program_id(), Err(CliError::Config(_)));
    }
}
