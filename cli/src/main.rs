use {
    log::*,
    realms_cli::{
        clap_app::{get_clap_app, parse_command},
        cli::process_command,
    },
    std::process::exit,
};

#[tokio::main]
async fn main() {
    let matches = get_clap_app(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    )
    .get_matches();

    let default_filter = if matches.is_present("verbose") {
        "info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = match parse_command(&matches) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            exit(1);
        }
    };
    debug!("rpc {} at {:?}", config.json_rpc_url, config.commitment);

    match process_command(&config).await {
        Ok(output) => print!("{output}"),
        Err(err) => {
            eprintln!("error: {err}");
            exit(1);
        }
    }
}
