use {
    crate::{
        config::RealmsConfig,
        vote_record::{process_vote_record_command, VoteRecordCliCommand},
        voter_weight::{process_voter_weight_command, VoterWeightCliCommand},
    },
    log::*,
    realms_account_query::{AccountFetcher, QueryCache, QueryClient, QueryError},
    realms_nft_voter_client::NftVoterError,
    serde::Serialize,
    solana_cli_output::OutputFormat,
    solana_commitment_config::CommitmentConfig,
    solana_rpc_client::nonblocking::rpc_client::RpcClient,
    std::sync::Arc,
    thiserror::Error,
};

#[derive(Debug, PartialEq, Eq)]
pub enum CliCommand {
    VoteRecord(VoteRecordCliCommand),
    VoterWeight(VoterWeightCliCommand),
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Bad parameter: {0}")]
    BadParameter(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    NftVoter(#[from] NftVoterError),
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

pub type ProcessResult = Result<String, CliError>;

#[derive(Debug)]
pub struct CliConfig {
    pub command: CliCommand,
    pub json_rpc_url: String,
    pub commitment: CommitmentConfig,
    pub output_format: OutputFormat,
    pub realms: RealmsConfig,
}

impl CliConfig {
    /// Render `value` in the configured output format.
    pub fn render<T: Serialize + std::fmt::Display>(&self, value: &T) -> ProcessResult {
        match self.output_format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::JsonCompact => Ok(serde_json::to_string(value)?),
            _ => Ok(value.to_string()),
        }
    }
}

/// Query client over the configured RPC endpoint, with a fresh cache.
pub fn query_client(config: &CliConfig) -> Result<QueryClient, CliError> {
    let rpc_client = Arc::new(RpcClient::new_with_commitment(
        config.json_rpc_url.clone(),
        config.commitment,
    ));
    let cache = Arc::new(QueryCache::new(config.realms.cache_config()));
    let client = QueryClient::new(
        rpc_client as Arc<dyn AccountFetcher>,
        cache,
        &config.realms.endpoints,
    )?;
    debug!("using {client:?}");
    Ok(client)
}

pub async fn process_command(config: &CliConfig) -> ProcessResult {
    let query = query_client(config)?;
    match &config.command {
        CliCommand::VoteRecord(command) => process_vote_record_command(&query, config, command).await,
        CliCommand::VoterWeight(command) => {
            process_voter_weight_command(&query, config, command).await
        }
    }
}
