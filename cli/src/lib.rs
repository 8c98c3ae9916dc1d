macro_rules! pubkey_arg {
    ($arg:expr, $help:expr) => {
        $arg.takes_value(true)
            .validator(is_valid_pubkey)
            .help(concat!($help, " (base58 public key)"))
    };
}

pub mod clap_app;
pub mod cli;
pub mod config;
pub mod vote_record;
pub mod voter_weight;
