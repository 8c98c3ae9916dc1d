use {
    crate::cli::{CliCommand, CliConfig, CliError, ProcessResult},
    clap::{App, AppSettings, Arg, ArgMatches, SubCommand},
    realms_account_query::{QueryClient, RealmRef},
    realms_governance_state::{
        state::{AccountVersion, VoteRecord},
        ProgramAccount,
    },
    serde::Serialize,
    solana_clap_utils::{input_parsers::pubkey_of, input_validators::is_valid_pubkey},
    solana_pubkey::Pubkey,
    std::fmt,
};

#[derive(Debug, PartialEq, Eq)]
pub enum VoteRecordCliCommand {
    Show {
        pubkey: Pubkey,
    },
    List {
        realm: Pubkey,
        owner: Pubkey,
        governance_program_id: Option<Pubkey>,
    },
}

// ── Output ──────────────────────────────────────────────────────────
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CliVoteRecord {
    pub address: String,
    pub version: String,
    pub proposal: String,
    pub governing_token_owner: String,
    pub is_relinquished: bool,
    pub voter_weight: u64,
    pub vote: String,
}

impl From<&ProgramAccount<VoteRecord>> for CliVoteRecord {
    fn from(record: &ProgramAccount<VoteRecord>) -> Self {
        let version = match record.account.version {
            AccountVersion::V1 => "v1",
            AccountVersion::V2 => "v2",
        };
        Self {
            address: record.pubkey.to_string(),
            version: version.to_string(),
            proposal: record.account.proposal.to_string(),
            governing_token_owner: record.account.governing_token_owner.to_string(),
            is_relinquished: record.account.is_relinquished,
            voter_weight: record.account.voter_weight,
            vote: record.account.vote.to_string(),
        }
    }
}

impl fmt::Display for CliVoteRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Vote Record {}", self.address)?;
        writeln!(f, "  Version:        {}", self.version)?;
        writeln!(f, "  Proposal:       {}", self.proposal)?;
        writeln!(f, "  Voter:          {}", self.governing_token_owner)?;
        writeln!(f, "  Vote:           {}", self.vote)?;
        writeln!(f, "  Voter Weight:   {}", self.voter_weight)?;
        writeln!(f, "  Relinquished:   {}", self.is_relinquished)?;
        Ok(())
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CliVoteRecordLookup {
    pub address: String,
    pub vote_record: Option<CliVoteRecord>,
}

impl fmt::Display for CliVoteRecordLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.vote_record {
            Some(record) => write!(f, "{record}"),
            None => writeln!(f, "Vote record {} not found", self.address),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CliVoteRecordList {
    pub realm: String,
    pub owner: String,
    pub vote_records: Vec<CliVoteRecord>,
    /// Per-pubkey lookups answered from the cache after the listing.
    pub cached_lookups: usize,
}

impl fmt::Display for CliVoteRecordList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.vote_records.is_empty() {
            return writeln!(f, "No vote records found.");
        }
        writeln!(
            f,
            "{:<44} {:<44} {:<4} {:<10} {:>20}",
            "Address", "Proposal", "Ver", "Vote", "Weight"
        )?;
        writeln!(f, "{}", "-".repeat(126))?;
        for record in &self.vote_records {
            writeln!(
                f,
                "{:<44} {:<44} {:<4} {:<10} {:>20}",
                record.address, record.proposal, record.version, record.vote, record.voter_weight,
            )?;
        }
        writeln!(
            f,
            "\n{} of {} lookups by address served from cache",
            self.cached_lookups,
            self.vote_records.len()
        )
    }
}

// ── Subcommands ─────────────────────────────────────────────────────
pub trait VoteRecordSubCommands {
    fn vote_record_subcommands(self) -> Self;
}

impl VoteRecordSubCommands for App<'_, '_> {
    fn vote_record_subcommands(self) -> Self {
        self.subcommand(
            SubCommand::with_name("vote-record")
                .about("Show a vote record")
                .arg(pubkey_arg!(
                    Arg::with_name("pubkey")
                        .index(1)
                        .value_name("ADDRESS")
                        .required(true),
                    "Address of the vote record"
                )),
        )
        .subcommand(
            SubCommand::with_name("vote-records")
                .about("List the vote records a wallet cast in a realm")
                .setting(AppSettings::DeriveDisplayOrder)
                .arg(pubkey_arg!(
                    Arg::with_name("realm")
                        .long("realm")
                        .value_name("ADDRESS")
                        .required(true),
                    "Realm address"
                ))
                .arg(pubkey_arg!(
                    Arg::with_name("owner")
                        .long("owner")
                        .value_name("ADDRESS")
                        .required(true),
                    "Wallet that cast the votes"
                ))
                .arg(pubkey_arg!(
                    Arg::with_name("governance_program")
                        .long("governance-program")
                        .value_name("PROGRAM_ID"),
                    "Governance program of the realm [default: from the realms config]"
                )),
        )
    }
}

pub(crate) fn required_pubkey(matches: &ArgMatches<'_>, name: &str) -> Result<Pubkey, CliError> {
    pubkey_of(matches, name).ok_or_else(|| CliError::BadParameter(format!("missing {name}")))
}

pub fn parse_vote_record_command(
    name: &str,
    matches: &ArgMatches<'_>,
) -> Result<CliCommand, CliError> {
    let command = match name {
        "vote-record" => VoteRecordCliCommand::Show {
            pubkey: required_pubkey(matches, "pubkey")?,
        },
        "vote-records" => VoteRecordCliCommand::List {
            realm: required_pubkey(matches, "realm")?,
            owner: required_pubkey(matches, "owner")?,
            governance_program_id: pubkey_of(matches, "governance_program"),
        },
        _ => return Err(CliError::BadParameter(format!("unknown command {name}"))),
    };
    Ok(CliCommand::VoteRecord(command))
}

// ── Processing ──────────────────────────────────────────────────────
pub async fn process_vote_record_command(
    query: &QueryClient,
    config: &CliConfig,
    command: &VoteRecordCliCommand,
) -> ProcessResult {
    match command {
        VoteRecordCliCommand::Show { pubkey } => process_show(query, config, pubkey).await,
        VoteRecordCliCommand::List {
            realm,
            owner,
            governance_program_id,
        } => {
            let governance_program_id = match governance_program_id {
                Some(program_id) => *program_id,
                None => config.realms.governance_program_id()?,
            };
            let realm = RealmRef {
                pubkey: *realm,
                governance_program_id,
            };
            process_list(query, config, &realm, owner).await
        }
    }
}

async fn process_show(query: &QueryClient, config: &CliConfig, pubkey: &Pubkey) -> ProcessResult {
    let found = query.fetch_vote_record_by_pubkey(pubkey).await?;
    let lookup = CliVoteRecordLookup {
        address: pubkey.to_string(),
        vote_record: found.result().map(CliVoteRecord::from),
    };
    config.render(&lookup)
}

async fn process_list(
    query: &QueryClient,
    config: &CliConfig,
    realm: &RealmRef,
    owner: &Pubkey,
) -> ProcessResult {
    let records = query
        .query_vote_records_for_realm_by_owner(Some(realm), Some(owner))
        .await?
        .ready()
        .unwrap_or_default();

    // The listing primed every by-address entry, so these should not miss.
    let mut cached_lookups = 0usize;
    for record in &records {
        let misses = query.cache().stats().misses;
        let found = query.fetch_vote_record_by_pubkey(&record.pubkey).await?;
        if found.is_found() && query.cache().stats().misses == misses {
            cached_lookups = cached_lookups.saturating_add(1);
        }
    }

    let list = CliVoteRecordList {
        realm: realm.pubkey.to_string(),
        owner: owner.to_string(),
        vote_records: records.iter().map(CliVoteRecord::from).collect(),
        cached_lookups,
    };
    config.render(&list)
}
