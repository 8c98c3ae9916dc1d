//! Account fetching over JSON-RPC.

use {
    crate::error::QueryError,
    async_trait::async_trait,
    solana_account::Account,
    solana_pubkey::Pubkey,
    solana_rpc_client::nonblocking::rpc_client::RpcClient,
    solana_rpc_client_api::{
        config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
        filter::{Memcmp, RpcFilterType},
    },
};

/// Server-side filter of a `getProgramAccounts` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountFilter {
    /// Account data must contain `bytes` at `offset`.
    Memcmp { offset: usize, bytes: Vec<u8> },
}

impl AccountFilter {
    pub fn memcmp_pubkey(offset: usize, pubkey: &Pubkey) -> Self {
        Self::Memcmp {
            offset,
            bytes: pubkey.to_bytes().to_vec(),
        }
    }

    pub fn memcmp_account_type(account_type: u8) -> Self {
        Self::Memcmp {
            offset: 0,
            bytes: vec![account_type],
        }
    }

    /// Evaluate the filter locally, the way the RPC node does.
    pub fn matches(&self, data: &[u8]) -> bool {
        match self {
            Self::Memcmp { offset, bytes } => offset
                .checked_add(bytes.len())
                .and_then(|end| data.get(*offset..end))
                .is_some_and(|window| window == bytes.as_slice()),
        }
    }

    fn to_rpc_filter(&self) -> RpcFilterType {
        match self {
            Self::Memcmp { offset, bytes } => {
                RpcFilterType::Memcmp(Memcmp::new_base58_encoded(*offset, bytes))
            }
        }
    }
}

/// Source of raw account data.
#[async_trait]
pub trait AccountFetcher: Send + Sync {
    /// RPC endpoint the fetcher talks to; used to resolve the cluster.
    fn endpoint(&self) -> String;

    /// Fetch one account.  `Ok(None)` when it does not exist.
    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, QueryError>;

    /// Fetch every account of `program_id` matching all `filters`.
    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Pubkey, Account)>, QueryError>;
}

#[async_trait]
impl AccountFetcher for RpcClient {
    fn endpoint(&self) -> String {
        self.url()
    }

    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, QueryError> {
        let response = self
            .get_account_with_commitment(pubkey, self.commitment())
            .await?;
        Ok(response.value)
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Pubkey, Account)>, QueryError> {
        let config = RpcProgramAccountsConfig {
            filters: Some(filters.iter().map(AccountFilter::to_rpc_filter).collect()),
            account_config: RpcAccountInfoConfig {
                commitment: Some(self.commitment()),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };
        Ok(self
            .get_program_accounts_with_config(program_id, config)
            .await?)
    }
}
