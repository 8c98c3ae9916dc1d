use {
    crate::{
        cli::{CliCommand, CliConfig, CliError, ProcessResult},
        vote_record::required_pubkey,
    },
    clap::{App, AppSettings, Arg, ArgMatches, SubCommand},
    realms_account_query::{Cluster, QueryClient},
    realms_governance_state::state::VoterWeightAction,
    realms_nft_voter_client::{
        connect, DasClient, InstructionSummary, UpdateVoterWeightInstructions,
        VoterWeightPluginClient,
    },
    serde::Serialize,
    solana_clap_utils::input_validators::is_valid_pubkey,
    solana_pubkey::Pubkey,
    std::{fmt, str::FromStr, sync::Arc},
};

#[derive(Debug, PartialEq, Eq)]
pub enum VoterWeightCliCommand {
    Calculate {
        realm: Pubkey,
        mint: Pubkey,
        voter: Pubkey,
    },
    Update {
        realm: Pubkey,
        mint: Pubkey,
        voter: Pubkey,
        action: VoterWeightAction,
    },
}

fn is_valid_action(s: String) -> Result<(), String> {
    VoterWeightAction::from_str(&s).map(|_| ())
}

// ── Output ──────────────────────────────────────────────────────────
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CliVoterWeight {
    pub plugin_program_id: String,
    pub plugin_version: String,
    pub voter: String,
    /// `None` when the voter has no token owner record or the realm no
    /// registrar.
    pub voter_weight: Option<u64>,
}

impl fmt::Display for CliVoterWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "NFT Voter Weight")?;
        writeln!(
            f,
            "  Plugin:         {} ({})",
            self.plugin_program_id, self.plugin_version
        )?;
        writeln!(f, "  Voter:          {}", self.voter)?;
        match self.voter_weight {
            Some(weight) => writeln!(f, "  Voter Weight:   {weight}"),
            None => writeln!(f, "  Voter Weight:   unavailable"),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CliVoterWeightUpdate {
    pub plugin_program_id: String,
    pub plugin_version: String,
    pub action: String,
    pub pre: Vec<InstructionSummary>,
    pub post: Option<Vec<InstructionSummary>>,
}

impl CliVoterWeightUpdate {
    fn new(
        client: &dyn VoterWeightPluginClient,
        action: VoterWeightAction,
        instructions: &UpdateVoterWeightInstructions,
    ) -> Self {
        Self {
            plugin_program_id: client.program_id().to_string(),
            plugin_version: client.version().to_string(),
            action: action.to_string(),
            pre: instructions.pre.iter().map(InstructionSummary::from).collect(),
            post: instructions
                .post
                .as_ref()
                .map(|post| post.iter().map(InstructionSummary::from).collect()),
        }
    }
}

fn write_instructions(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    instructions: &[InstructionSummary],
) -> fmt::Result {
    for (i, ix) in instructions.iter().enumerate() {
        writeln!(f, "  {label} #{i}: program {}", ix.program_id)?;
        for account in &ix.accounts {
            writeln!(
                f,
                "    {:<44} {}{}",
                account.pubkey,
                if account.is_signer { "signer " } else { "" },
                if account.is_writable { "writable" } else { "" },
            )?;
        }
        writeln!(f, "    data: {}", ix.data)?;
    }
    Ok(())
}

impl fmt::Display for CliVoterWeightUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Update voter weight for {} on {} ({})",
            self.action, self.plugin_program_id, self.plugin_version
        )?;
        write_instructions(f, "pre", &self.pre)?;
        if let Some(post) = &self.post {
            write_instructions(f, "post", post)?;
        }
        Ok(())
    }
}

// ── Subcommands ─────────────────────────────────────────────────────
fn voter_args<'a, 'b>(subcommand: App<'a, 'b>) -> App<'a, 'b> {
    subcommand
        .setting(AppSettings::DeriveDisplayOrder)
        .arg(pubkey_arg!(
            Arg::with_name("realm")
                .long("realm")
                .value_name("ADDRESS")
                .required(true),
            "Realm address"
        ))
        .arg(pubkey_arg!(
            Arg::with_name("mint")
                .long("mint")
                .value_name("MINT_ADDRESS")
                .required(true),
            "Governing token mint the plugin is registered for"
        ))
        .arg(pubkey_arg!(
            Arg::with_name("voter")
                .long("voter")
                .value_name("ADDRESS")
                .required(true),
            "Voter wallet"
        ))
}

pub trait VoterWeightSubCommands {
    fn voter_weight_subcommands(self) -> Self;
}

impl VoterWeightSubCommands for App<'_, '_> {
    fn voter_weight_subcommands(self) -> Self {
        self.subcommand(voter_args(
            SubCommand::with_name("voter-weight")
                .about("Calculate a voter's NFT governance power"),
        ))
        .subcommand(
            voter_args(
                SubCommand::with_name("update-voter-weight")
                    .about("Build the instructions refreshing a voter weight record"),
            )
            .arg(
                Arg::with_name("action")
                    .long("action")
                    .value_name("ACTION")
                    .takes_value(true)
                    .default_value("cast-vote")
                    .validator(is_valid_action)
                    .help(
                        "Action the weight is for: cast-vote, comment-proposal, \
                         create-governance, create-proposal, sign-off-proposal",
                    ),
            ),
        )
    }
}

pub fn parse_voter_weight_command(
    name: &str,
    matches: &ArgMatches<'_>,
) -> Result<CliCommand, CliError> {
    let realm = required_pubkey(matches, "realm")?;
    let mint = required_pubkey(matches, "mint")?;
    let voter = required_pubkey(matches, "voter")?;
    let command = match name {
        "voter-weight" => VoterWeightCliCommand::Calculate { realm, mint, voter },
        "update-voter-weight" => {
            let action = matches
                .value_of("action")
                .map(VoterWeightAction::from_str)
                .transpose()
                .map_err(CliError::BadParameter)?
                .unwrap_or(VoterWeightAction::CastVote);
            VoterWeightCliCommand::Update {
                realm,
                mint,
                voter,
                action,
            }
        }
        _ => return Err(CliError::BadParameter(format!("unknown command {name}"))),
    };
    Ok(CliCommand::VoterWeight(command))
}

// ── Processing ──────────────────────────────────────────────────────
fn plugin_client(
    query: &QueryClient,
    config: &CliConfig,
) -> Result<Arc<dyn VoterWeightPluginClient>, CliError> {
    let das = DasClient::new(config.realms.das_url(&config.json_rpc_url))?;
    Ok(connect(
        query.clone(),
        Arc::new(das),
        config.realms.governance_program_id()?,
        config.realms.nft_voter_program_id()?,
        query.cluster() == Cluster::Devnet,
    ))
}

pub async fn process_voter_weight_command(
    query: &QueryClient,
    config: &CliConfig,
    command: &VoterWeightCliCommand,
) -> ProcessResult {
    let client = plugin_client(query, config)?;
    process_with_client(client.as_ref(), config, command).await
}

async fn process_with_client(
    client: &dyn VoterWeightPluginClient,
    config: &CliConfig,
    command: &VoterWeightCliCommand,
) -> ProcessResult {
    match command {
        VoterWeightCliCommand::Calculate { realm, mint, voter } => {
            let voter_weight = client.calculate_voter_weight(voter, realm, mint).await?;
            config.render(&CliVoterWeight {
                plugin_program_id: client.program_id().to_string(),
                plugin_version: client.version().to_string(),
                voter: voter.to_string(),
                voter_weight,
            })
        }
        VoterWeightCliCommand::Update {
            realm,
            mint,
            voter,
            action,
        } => {
            let instructions = client
                .update_voter_weight_record(voter, realm, mint, *action)
                .await?;
            config.render(&CliVoterWeightUpdate::new(client, *action, &instructions))
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{clap_app::get_clap_app, config::RealmsConfig},
        realms_account_query::{mock::MockAccountFetcher, AccountFetcher, QueryCache},
        realms_governance_state::constants::DEFAULT_GOVERNANCE_PROGRAM_ID,
        realms_nft_voter_client::{
            connect_version, das::StaticAssetSource, pda::registrar_address, CollectionConfig,
            PluginVersion, Registrar,
        },
        solana_cli_output::OutputFormat,
        solana_commitment_config::CommitmentConfig,
        test_case::test_case,
    };

    fn args(subcommand: &str, extra: &[&str]) -> Vec<String> {
        let mut args = vec![
            "realms".to_string(),
            subcommand.to_string(),
            "--realm".to_string(),
            Pubkey::new_unique().to_string(),
            "--mint".to_string(),
            Pubkey::new_unique().to_string(),
            "--voter".to_string(),
            Pubkey::new_unique().to_string(),
        ];
        args.extend(extra.iter().map(|arg| arg.to_string()));
        args
    }

    #[test_case(&[], VoterWeightAction::CastVote ; "default action")]
    #[test_case(&["--action", "create-proposal"], VoterWeightAction::CreateProposal ; "explicit action")]
    fn test_parse_update(extra: &[&str], expected: VoterWeightAction) {
        let matches = get_clap_app("realms", "test", "0")
            .get_matches_from(args("update-voter-weight", extra));
        let (name, sub_matches) = matches.subcommand();
        let command = parse_voter_weight_command(name, sub_matches.unwrap()).unwrap();
        assert!(matches!(
            command,
            CliCommand::VoterWeight(VoterWeightCliCommand::Update { action, .. }) if action == expected
        ));
    }

    #[test]
    fn test_rejects_unknown_action() {
        let result = get_clap_app("realms", "test", "0")
            .get_matches_from_safe(args("update-voter-weight", &["--action", "vote"]));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_update_output_lists_instructions() {
        let fetcher = MockAccountFetcher::default().into_arc();
        let query = QueryClient::with_cluster(
            Arc::clone(&fetcher) as Arc<dyn AccountFetcher>,
            Arc::new(QueryCache::default()),
            Cluster::Devnet,
        );
        let realm = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let voter = Pubkey::new_unique();
        let collection = Pubkey::new_unique();
        let assets = StaticAssetSource::default()
            .with_assets(voter, vec![StaticAssetSource::nft(&Pubkey::new_unique(), &collection)]);
        let client = connect_version(
            PluginVersion::V2,
            query,
            Arc::new(assets),
            DEFAULT_GOVERNANCE_PROGRAM_ID,
            None,
            true,
        );
        let registrar = Registrar {
            governance_program_id: DEFAULT_GOVERNANCE_PROGRAM_ID,
            realm,
            governing_token_mint: mint,
            collection_configs: vec![CollectionConfig {
                collection,
                size: 1,
                weight: 1,
                reserved: [0; 8],
            }],
        };
        fetcher.add_account(
            registrar_address(client.program_id(), &realm, &mint),
            *client.program_id(),
            registrar.to_account_data().unwrap(),
        );

        let command = VoterWeightCliCommand::Update {
            realm,
            mint,
            voter,
            action: VoterWeightAction::CastVote,
        };
        let config = CliConfig {
            command: CliCommand::VoterWeight(VoterWeightCliCommand::Calculate {
                realm,
                mint,
                voter,
            }),
            json_rpc_url: "https://api.devnet.solana.com".to_string(),
            commitment: CommitmentConfig::confirmed(),
            output_format: OutputFormat::Json,
            realms: RealmsConfig::default(),
        };
        let output = process_with_client(client.as_ref(), &config, &command)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["pluginVersion"], "v2");
        assert_eq!(json["action"], "cast-vote");
        assert_eq!(json["pre"].as_array().unwrap().len(), 1);
        assert_eq!(json["post"].as_array().unwrap().len(), 1);
    }
}
