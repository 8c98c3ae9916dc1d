//! In-memory [`AccountFetcher`] for tests.

use {
    crate::{
        error::QueryError,
        fetcher::{AccountFetcher, AccountFilter},
    },
    async_trait::async_trait,
    dashmap::DashMap,
    solana_account::Account,
    solana_pubkey::Pubkey,
    std::{
        sync::{
            atomic::{AtomicBool, AtomicUsize, Ordering},
            Arc,
        },
        time::Duration,
    },
};

pub const MOCK_ENDPOINT: &str = "https://api.devnet.solana.com";

#[derive(Debug)]
pub struct MockAccountFetcher {
    endpoint: String,
    accounts: DashMap<Pubkey, Account>,
    latency: Option<Duration>,
    failing: AtomicBool,
    get_account_calls: AtomicUsize,
    get_program_accounts_calls: AtomicUsize,
}

impl Default for MockAccountFetcher {
    fn default() -> Self {
        Self::new(MOCK_ENDPOINT)
    }
}

impl MockAccountFetcher {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            accounts: DashMap::new(),
            latency: None,
            failing: AtomicBool::new(false),
            get_account_calls: AtomicUsize::new(0),
            get_program_accounts_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn add_account(&self, pubkey: Pubkey, owner: Pubkey, data: Vec<u8>) {
        self.accounts.insert(
            pubkey,
            Account {
                lamports: 1_000_000,
                data,
                owner,
                executable: false,
                rent_epoch: 0,
            },
        );
    }

    /// Make every subsequent call fail with a fetch error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn get_account_calls(&self) -> usize {
        self.get_account_calls.load(Ordering::SeqCst)
    }

    pub fn get_program_accounts_calls(&self) -> usize {
        self.get_program_accounts_calls.load(Ordering::SeqCst)
    }

    async fn round_trip(&self) -> Result<(), QueryError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(QueryError::Fetch("mock fetcher is failing".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountFetcher for MockAccountFetcher {
    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }

    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, QueryError> {
        self.get_account_calls.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await?;
        Ok(self.accounts.get(pubkey).map(|account| account.value().clone()))
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Pubkey, Account)>, QueryError> {
        self.get_program_accounts_calls.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await?;
        let mut matching: Vec<_> = self
            .accounts
            .iter()
            .filter(|entry| entry.value().owner == *program_id)
            .filter(|entry| filters.iter().all(|filter| filter.matches(&entry.value().data)))
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        matching.sort_by_key(|(pubkey, _)| *pubkey);
        Ok(matching)
    }
}
