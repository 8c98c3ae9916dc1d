//! Token owner record queries.

use {
    crate::{
        client::{QueryClient, RealmRef},
        error::QueryError,
        findable::{Findable, QueryState},
    },
    realms_governance_state::{
        address::token_owner_record_address, state::TokenOwnerRecord, ProgramAccount,
    },
    solana_pubkey::Pubkey,
};

impl QueryClient {
    pub async fn fetch_token_owner_record_by_pubkey(
        &self,
        pubkey: &Pubkey,
    ) -> Result<Findable<ProgramAccount<TokenOwnerRecord>>, QueryError> {
        self.fetch_by_key::<TokenOwnerRecord>(pubkey).await
    }

    /// The record of `owner` for `governing_token_mint` in `realm`, located by
    /// its derived address.
    pub async fn query_token_owner_record(
        &self,
        realm: Option<&RealmRef>,
        governing_token_mint: Option<&Pubkey>,
        owner: Option<&Pubkey>,
    ) -> Result<QueryState<Findable<ProgramAccount<TokenOwnerRecord>>>, QueryError> {
        let (Some(realm), Some(mint), Some(owner)) = (realm, governing_token_mint, owner) else {
            return Ok(QueryState::Disabled);
        };
        let pubkey =
            token_owner_record_address(&realm.governance_program_id, &realm.pubkey, mint, owner);
        self.query_by_key::<TokenOwnerRecord>(Some(&pubkey)).await
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            cache::QueryCache, cluster::Endpoints, fetcher::AccountFetcher,
            mock::MockAccountFetcher,
        },
        realms_governance_state::constants::DEFAULT_GOVERNANCE_PROGRAM_ID,
        std::sync::Arc,
    };

    #[tokio::test]
    async fn test_query_by_derived_address() {
        let fetcher = MockAccountFetcher::default().into_arc();
        let client = QueryClient::new(
            Arc::clone(&fetcher) as Arc<dyn AccountFetcher>,
            Arc::new(QueryCache::default()),
            &Endpoints::default(),
        )
        .unwrap();
        let realm = RealmRef {
            pubkey: Pubkey::new_unique(),
            governance_program_id: DEFAULT_GOVERNANCE_PROGRAM_ID,
        };
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let record = TokenOwnerRecord {
            realm: realm.pubkey,
            governing_token_mint: mint,
            governing_token_owner: owner,
            governing_token_deposit_amount: 1,
        };
        let address =
            token_owner_record_address(&DEFAULT_GOVERNANCE_PROGRAM_ID, &realm.pubkey, &mint, &owner);
        fetcher.add_account(
            address,
            DEFAULT_GOVERNANCE_PROGRAM_ID,
            record.to_account_data().unwrap(),
        );

        assert!(client
            .query_token_owner_record(Some(&realm), None, Some(&owner))
            .await
            .unwrap()
            .is_disabled());

        let found = client
            .query_token_owner_record(Some(&realm), Some(&mint), Some(&owner))
            .await
            .unwrap()
            .ready()
            .unwrap();
        assert_eq!(found.into_result().unwrap().account, record);

        // Served from the entry the query above filled.
        let again = client.fetch_token_owner_record_by_pubkey(&address).await.unwrap();
        assert!(again.is_found());
        assert_eq!(fetcher.get_account_calls(), 1);
    }
}
