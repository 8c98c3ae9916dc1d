use {
    realms_governance_state::StateError,
    solana_rpc_client_api::client_error::Error as ClientError,
    thiserror::Error,
};

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("rpc request failed: {0}")]
    Rpc(#[from] Box<ClientError>),

    #[error("account fetch failed: {0}")]
    Fetch(String),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("rpc endpoint {0} does not belong to a known cluster")]
    UnknownEndpoint(String),

    #[error("cached value under {key} is not a {expected}")]
    TypeMismatch { key: String, expected: &'static str },
}

impl From<ClientError> for QueryError {
    fn from(err: ClientError) -> Self {
        Self::Rpc(Box::new(err))
    }
}
