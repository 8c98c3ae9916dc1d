//! Cached account queries against one connection.

use {
    crate::{
        cache::QueryCache,
        cluster::{Cluster, Endpoints},
        error::QueryError,
        fetcher::{AccountFetcher, AccountFilter},
        findable::{Findable, QueryState},
        query_key::QueryKey,
    },
    futures::future::try_join_all,
    log::*,
    realms_governance_state::{GovernanceAccount, ProgramAccount},
    solana_account::Account,
    solana_pubkey::Pubkey,
    std::{any::Any, sync::Arc},
};

/// A realm as seen by queries: its address and the governance program that
/// owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealmRef {
    pub pubkey: Pubkey,
    pub governance_program_id: Pubkey,
}

/// Bound of every account type the client can cache.
pub trait CachedAccount: GovernanceAccount + Any + Clone + Send + Sync {}

impl<T: GovernanceAccount + Any + Clone + Send + Sync> CachedAccount for T {}

/// Runs queries over an [`AccountFetcher`] and stores results in a shared
/// [`QueryCache`].  Cheap to clone.
#[derive(Clone)]
pub struct QueryClient {
    fetcher: Arc<dyn AccountFetcher>,
    cache: Arc<QueryCache>,
    cluster: Cluster,
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("endpoint", &self.fetcher.endpoint())
            .field("cluster", &self.cluster)
            .field("cached_entries", &self.cache.len())
            .finish()
    }
}

fn decode<T: GovernanceAccount>(
    pubkey: Pubkey,
    account: Account,
) -> Result<ProgramAccount<T>, QueryError> {
    Ok(ProgramAccount {
        pubkey,
        owner: account.owner,
        account: T::try_from_account_data(&account.data)?,
    })
}

impl QueryClient {
    /// Create a client, resolving the cluster from the fetcher's endpoint.
    pub fn new(
        fetcher: Arc<dyn AccountFetcher>,
        cache: Arc<QueryCache>,
        endpoints: &Endpoints,
    ) -> Result<Self, QueryError> {
        let cluster = endpoints.cluster_for(&fetcher.endpoint())?;
        Ok(Self::with_cluster(fetcher, cache, cluster))
    }

    pub fn with_cluster(
        fetcher: Arc<dyn AccountFetcher>,
        cache: Arc<QueryCache>,
        cluster: Cluster,
    ) -> Self {
        Self {
            fetcher,
            cache,
            cluster,
        }
    }

    pub fn cluster(&self) -> Cluster {
        self.cluster
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn fetcher(&self) -> &Arc<dyn AccountFetcher> {
        &self.fetcher
    }

    /// Scope of every cached `T` on this client's cluster.
    pub fn all_key<T: GovernanceAccount>(&self) -> QueryKey {
        QueryKey::all(self.cluster, T::ACCOUNT_KIND)
    }

    /// Key of the single-account entry of `T` at `pubkey`.
    pub fn pubkey_key<T: GovernanceAccount>(&self, pubkey: &Pubkey) -> QueryKey {
        self.all_key::<T>().with(pubkey)
    }

    /// Fetch and decode the account at `pubkey`, uncached.
    pub async fn get_account<T: GovernanceAccount>(
        &self,
        pubkey: &Pubkey,
    ) -> Result<Findable<ProgramAccount<T>>, QueryError> {
        match self.fetcher.get_account(pubkey).await? {
            Some(account) => Ok(Findable::Found(decode(*pubkey, account)?)),
            None => Ok(Findable::Absent),
        }
    }

    /// Look up the account at `pubkey` through the cache.
    ///
    /// A missing account resolves to `Findable::Absent`; only transport and
    /// decoding failures are errors.
    pub async fn fetch_by_key<T: CachedAccount>(
        &self,
        pubkey: &Pubkey,
    ) -> Result<Findable<ProgramAccount<T>>, QueryError> {
        let key = self.pubkey_key::<T>(pubkey);
        let value = self
            .cache
            .fetch(&key, || self.get_account::<T>(pubkey))
            .await?;
        Ok(Findable::clone(&value))
    }

    /// [`fetch_by_key`](Self::fetch_by_key), disabled while `pubkey` is
    /// unknown.
    pub async fn query_by_key<T: CachedAccount>(
        &self,
        pubkey: Option<&Pubkey>,
    ) -> Result<QueryState<Findable<ProgramAccount<T>>>, QueryError> {
        let Some(pubkey) = pubkey else {
            return Ok(QueryState::Disabled);
        };
        self.fetch_by_key(pubkey).await.map(QueryState::Ready)
    }

    /// Fetch every account of `program_id` matching any of `filter_sets`
    /// (each set is AND-ed; the sets are OR-ed), cached under `key`.
    ///
    /// Every returned account is also written to its single-account entry,
    /// so a later [`fetch_by_key`](Self::fetch_by_key) for it is served from
    /// the cache.
    pub async fn fetch_by_relation<T: CachedAccount>(
        &self,
        key: QueryKey,
        program_id: &Pubkey,
        filter_sets: &[Vec<AccountFilter>],
    ) -> Result<Vec<ProgramAccount<T>>, QueryError> {
        let value = self
            .cache
            .fetch(&key, || async {
                let responses = try_join_all(
                    filter_sets
                        .iter()
                        .map(|filters| self.fetcher.get_program_accounts(program_id, filters)),
                )
                .await?;
                let accounts = responses
                    .into_iter()
                    .flatten()
                    .map(|(pubkey, account)| decode::<T>(pubkey, account))
                    .collect::<Result<Vec<_>, _>>()?;

                for account in &accounts {
                    self.cache.set_query_data(
                        self.pubkey_key::<T>(&account.pubkey),
                        Findable::Found(account.clone()),
                    );
                }
                debug!(
                    "primed {} {} entries from {key}",
                    accounts.len(),
                    T::ACCOUNT_KIND
                );
                Ok::<_, QueryError>(accounts)
            })
            .await?;
        Ok(Vec::clone(&value))
    }

    /// Drop every cached `T` on this client's cluster.
    pub fn invalidate_all<T: GovernanceAccount>(&self) -> usize {
        self.cache.invalidate(&self.all_key::<T>())
    }
}
