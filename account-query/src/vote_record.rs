//! Vote record queries.

use {
    crate::{
        client::{QueryClient, RealmRef},
        cluster::Cluster,
        error::QueryError,
        fetcher::AccountFilter,
        findable::{Findable, QueryState},
        query_key::QueryKey,
    },
    log::*,
    realms_governance_state::{
        address::vote_record_address,
        constants::{VOTE_RECORD_ACCOUNT_TYPES, VOTE_RECORD_OWNER_OFFSET},
        state::VoteRecord,
        GovernanceAccount, ProgramAccount,
    },
    solana_pubkey::Pubkey,
};

/// `[cluster, VoteRecord]`: every vote record query on `cluster`.
pub fn all_key(cluster: Cluster) -> QueryKey {
    QueryKey::all(cluster, VoteRecord::ACCOUNT_KIND)
}

/// `[cluster, VoteRecord, pubkey]`
pub fn by_pubkey_key(cluster: Cluster, pubkey: &Pubkey) -> QueryKey {
    all_key(cluster).with(pubkey)
}

/// `[cluster, VoteRecord, realm, owner]`
pub fn by_realm_x_owner_key(cluster: Cluster, realm: &Pubkey, owner: &Pubkey) -> QueryKey {
    all_key(cluster).with(realm).with(owner)
}

/// One filter set per vote record layout: the account type byte plus the
/// voter at the owner offset.
fn owner_filter_sets(owner: &Pubkey) -> Vec<Vec<AccountFilter>> {
    VOTE_RECORD_ACCOUNT_TYPES
        .iter()
        .map(|account_type| {
            vec![
                AccountFilter::memcmp_account_type(*account_type),
                AccountFilter::memcmp_pubkey(VOTE_RECORD_OWNER_OFFSET, owner),
            ]
        })
        .collect()
}

impl QueryClient {
    pub async fn fetch_vote_record_by_pubkey(
        &self,
        pubkey: &Pubkey,
    ) -> Result<Findable<ProgramAccount<VoteRecord>>, QueryError> {
        self.fetch_by_key::<VoteRecord>(pubkey).await
    }

    pub async fn query_vote_record_by_pubkey(
        &self,
        pubkey: Option<&Pubkey>,
    ) -> Result<QueryState<Findable<ProgramAccount<VoteRecord>>>, QueryError> {
        self.query_by_key::<VoteRecord>(pubkey).await
    }

    /// Every vote record `owner` has cast under the realm's governance
    /// program.  Each returned record also lands in its by-pubkey entry.
    pub async fn query_vote_records_for_realm_by_owner(
        &self,
        realm: Option<&RealmRef>,
        owner: Option<&Pubkey>,
    ) -> Result<QueryState<Vec<ProgramAccount<VoteRecord>>>, QueryError> {
        let (Some(realm), Some(owner)) = (realm, owner) else {
            return Ok(QueryState::Disabled);
        };
        let key = by_realm_x_owner_key(self.cluster(), &realm.pubkey, owner);
        let records = self
            .fetch_by_relation::<VoteRecord>(
                key,
                &realm.governance_program_id,
                &owner_filter_sets(owner),
            )
            .await?;
        debug!(
            "{} vote records for owner {owner} in realm {}",
            records.len(),
            realm.pubkey
        );
        Ok(QueryState::Ready(records))
    }

    /// The vote record `token_owner_record` cast on `proposal`, if any.
    pub async fn query_vote_record_by_token_owner_record(
        &self,
        governance_program_id: &Pubkey,
        proposal: Option<&Pubkey>,
        token_owner_record: Option<&Pubkey>,
    ) -> Result<QueryState<Findable<ProgramAccount<VoteRecord>>>, QueryError> {
        let (Some(proposal), Some(token_owner_record)) = (proposal, token_owner_record) else {
            return Ok(QueryState::Disabled);
        };
        let pubkey = vote_record_address(governance_program_id, proposal, token_owner_record);
        self.query_vote_record_by_pubkey(Some(&pubkey)).await
    }

    /// Drop every cached vote record query on this cluster.
    pub fn invalidate_vote_records(&self) -> usize {
        self.cache().invalidate(&all_key(self.cluster()))
    }
}
