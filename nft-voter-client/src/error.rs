use {
    realms_account_query::QueryError,
    realms_governance_state::StateError,
    solana_pubkey::Pubkey,
    thiserror::Error,
};

#[derive(Error, Debug)]
pub enum NftVoterError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("DAS request failed: {0}")]
    Das(#[from] reqwest::Error),

    #[error("DAS error {code}: {message}")]
    DasRpc { code: i64, message: String },

    #[error("invalid digital asset {id}: {reason}")]
    InvalidAsset { id: String, reason: String },

    #[error("registrar {0} not found")]
    RegistrarNotFound(Pubkey),

    #[error("voter weight overflow")]
    Overflow,
}
