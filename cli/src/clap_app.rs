use {
    crate::{
        cli::{CliConfig, CliError},
        config::RealmsConfig,
        vote_record::{parse_vote_record_command, VoteRecordSubCommands},
        voter_weight::{parse_voter_weight_command, VoterWeightSubCommands},
    },
    clap::{App, AppSettings, Arg, ArgMatches},
    solana_clap_utils::input_validators::is_url_or_moniker,
    solana_cli_config::{Config, ConfigInput},
    solana_cli_output::OutputFormat,
    std::path::Path,
};

pub const DEFAULT_REALMS_CONFIG_FILE: &str = "realms.yml";

pub fn get_clap_app<'ab, 'v>(name: &str, about: &'ab str, version: &'v str) -> App<'ab, 'v> {
    App::new(name)
        .about(about)
        .version(version)
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .setting(AppSettings::VersionlessSubcommands)
        .arg(
            Arg::with_name("config_file")
                .short("C")
                .long("config")
                .value_name("FILEPATH")
                .takes_value(true)
                .global(true)
                .help("Solana CLI configuration file to use"),
        )
        .arg(
            Arg::with_name("realms_config_file")
                .long("realms-config")
                .value_name("FILEPATH")
                .takes_value(true)
                .global(true)
                .help(
                    "Realms configuration file (YAML) with the endpoint table, program ids \
                     and DAS url [default: realms.yml next to the Solana CLI config]",
                ),
        )
        .arg(
            Arg::with_name("json_rpc_url")
                .short("u")
                .long("url")
                .value_name("URL_OR_MONIKER")
                .takes_value(true)
                .global(true)
                .validator(is_url_or_moniker)
                .help(
                    "URL for Solana's JSON RPC or moniker (or their first letter): \
                     [mainnet-beta, testnet, devnet, localhost]",
                ),
        )
        .arg(
            Arg::with_name("commitment")
                .long("commitment")
                .value_name("COMMITMENT_LEVEL")
                .takes_value(true)
                .global(true)
                .possible_values(&["processed", "confirmed", "finalized"])
                .help("Commitment level of the account reads [default: from the Solana CLI config]"),
        )
        .arg(
            Arg::with_name("output_format")
                .long("output")
                .value_name("FORMAT")
                .global(true)
                .takes_value(true)
                .possible_values(&["json", "json-compact"])
                .help("Return information in specified output format"),
        )
        .arg(
            Arg::with_name("verbose")
                .long("verbose")
                .short("v")
                .global(true)
                .help("Show additional information"),
        )
        .vote_record_subcommands()
        .voter_weight_subcommands()
}

fn realms_config_path(matches: &ArgMatches<'_>, config_file: &str) -> String {
    match matches.value_of("realms_config_file") {
        Some(path) => path.to_string(),
        None => Path::new(config_file)
            .with_file_name(DEFAULT_REALMS_CONFIG_FILE)
            .to_string_lossy()
            .into_owned(),
    }
}

pub fn parse_command(matches: &ArgMatches<'_>) -> Result<CliConfig, CliError> {
    let config_file = matches
        .value_of("config_file")
        .map(str::to_string)
        .or_else(|| solana_cli_config::CONFIG_FILE.as_ref().cloned())
        .unwrap_or_default();
    // A missing Solana CLI config falls back to its defaults.
    let config = Config::load(&config_file).unwrap_or_default();

    let (_, json_rpc_url) = ConfigInput::compute_json_rpc_url_setting(
        matches.value_of("json_rpc_url").unwrap_or(""),
        &config.json_rpc_url,
    );
    let (_, commitment) = ConfigInput::compute_commitment_config(
        matches.value_of("commitment").unwrap_or(""),
        &config.commitment,
    );
    let output_format = match matches.value_of("output_format") {
        Some("json") => OutputFormat::Json,
        Some("json-compact") => OutputFormat::JsonCompact,
        _ if matches.is_present("verbose") => OutputFormat::DisplayVerbose,
        _ => OutputFormat::Display,
    };
    let realms = RealmsConfig::load(&realms_config_path(matches, &config_file))?;

    let command = match matches.subcommand() {
        (name @ ("vote-record" | "vote-records"), Some(sub_matches)) => {
            parse_vote_record_command(name, sub_matches)?
        }
        (name @ ("voter-weight" | "update-voter-weight"), Some(sub_matches)) => {
            parse_voter_weight_command(name, sub_matches)?
        }
        (name, _) => {
            return Err(CliError::BadParameter(format!("unknown command '{name}'")));
        }
    };

    Ok(CliConfig {
        command,
        json_rpc_url,
        commitment,
        output_format,
        realms,
    })
}
