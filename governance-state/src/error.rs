//! Errors raised while decoding governance account data.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("{kind} account data is empty")]
    EmptyAccountData { kind: &'static str },

    #[error("unexpected {kind} account type {found}")]
    InvalidAccountType { kind: &'static str, found: u8 },

    #[error("{kind} account discriminator mismatch")]
    InvalidDiscriminator { kind: &'static str },

    #[error("failed to deserialize {kind}: {source}")]
    Deserialize {
        kind: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {kind}: {source}")]
    Serialize {
        kind: &'static str,
        #[source]
        source: std::io::Error,
    },
}
