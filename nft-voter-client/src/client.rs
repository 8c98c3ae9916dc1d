//! Voter weight plugin clients.
//!
//! [`connect`] picks the client for the plugin version this build targets.
//! The choice is made once; every instruction a client builds is addressed
//! to its own program id.

use {
    crate::{
        constants::{DEFAULT_NFT_VOTER_PLUGIN_V1, DEFAULT_NFT_VOTER_PLUGIN_V2, ON_NFT_VOTER_V2},
        das::{nft_voter_weight, voting_nfts, DigitalAssetSource, VotingNft},
        error::NftVoterError,
        instruction::{
            create_nft_action_tickets, update_voter_weight_record_v1,
            update_voter_weight_record_v2, UpdateVoterWeightInstructions,
        },
        pda::{registrar_address, voter_weight_record_address},
        registrar::Registrar,
    },
    async_trait::async_trait,
    log::*,
    realms_account_query::QueryClient,
    realms_governance_state::{address::token_owner_record_address, state::VoterWeightAction},
    serde::Serialize,
    solana_instruction::Instruction,
    solana_pubkey::Pubkey,
    std::{fmt, sync::Arc},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PluginVersion {
    V1,
    V2,
}

impl PluginVersion {
    pub const fn for_flag(on_nft_voter_v2: bool) -> Self {
        if on_nft_voter_v2 {
            Self::V2
        } else {
            Self::V1
        }
    }

    /// Version selected by the `nft-voter-v2` feature.
    pub const fn current() -> Self {
        Self::for_flag(ON_NFT_VOTER_V2)
    }

    pub const fn default_program_id(self) -> Pubkey {
        match self {
            Self::V1 => DEFAULT_NFT_VOTER_PLUGIN_V1,
            Self::V2 => DEFAULT_NFT_VOTER_PLUGIN_V2,
        }
    }
}

impl fmt::Display for PluginVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => f.write_str("v1"),
            Self::V2 => f.write_str("v2"),
        }
    }
}

/// Operations the governance UI runs against a voter weight plugin.
#[async_trait]
pub trait VoterWeightPluginClient: Send + Sync {
    fn program_id(&self) -> &Pubkey;

    fn version(&self) -> PluginVersion;

    /// Whether the plugin consumes the weight of a preceding plugin.
    fn requires_input_voter_weight(&self) -> bool {
        false
    }

    /// Current governance power of `voter`, or `None` when the voter has no
    /// token owner record or the realm has no registrar.
    async fn calculate_voter_weight(
        &self,
        voter: &Pubkey,
        realm: &Pubkey,
        governing_token_mint: &Pubkey,
    ) -> Result<Option<u64>, NftVoterError>;

    /// Instructions writing a fresh voter weight for `action`.
    async fn update_voter_weight_record(
        &self,
        voter: &Pubkey,
        realm: &Pubkey,
        governing_token_mint: &Pubkey,
        action: VoterWeightAction,
    ) -> Result<UpdateVoterWeightInstructions, NftVoterError>;

    async fn create_voter_weight_record(
        &self,
        _voter: &Pubkey,
        _realm: &Pubkey,
        _governing_token_mint: &Pubkey,
    ) -> Result<Option<Instruction>, NftVoterError> {
        Ok(None)
    }

    async fn create_max_voter_weight_record(
        &self,
        _realm: &Pubkey,
        _governing_token_mint: &Pubkey,
    ) -> Result<Option<Instruction>, NftVoterError> {
        Ok(None)
    }

    async fn update_max_voter_weight_record(
        &self,
        _realm: &Pubkey,
        _governing_token_mint: &Pubkey,
    ) -> Result<Option<Instruction>, NftVoterError> {
        Ok(None)
    }
}

/// State shared by both clients.
#[derive(Clone)]
pub struct NftVoterContext {
    pub query: QueryClient,
    pub assets: Arc<dyn DigitalAssetSource>,
    pub governance_program_id: Pubkey,
    pub program_id: Pubkey,
    pub devnet: bool,
}

impl fmt::Debug for NftVoterContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NftVoterContext")
            .field("query", &self.query)
            .field("governance_program_id", &self.governance_program_id)
            .field("program_id", &self.program_id)
            .field("devnet", &self.devnet)
            .finish()
    }
}

/// Accounts every update instruction needs.
struct UpdateAccounts {
    registrar: Pubkey,
    voter_weight_record: Pubkey,
    nfts: Vec<VotingNft>,
}

impl NftVoterContext {
    async fn registrar(
        &self,
        realm: &Pubkey,
        governing_token_mint: &Pubkey,
    ) -> Result<(Pubkey, Option<Registrar>), NftVoterError> {
        let address = registrar_address(&self.program_id, realm, governing_token_mint);
        let registrar = self
            .query
            .fetch_by_key::<Registrar>(&address)
            .await?
            .into_result()
            .map(|account| account.account);
        Ok((address, registrar))
    }

    async fn voting_nfts(
        &self,
        owner: &Pubkey,
        registrar: &Registrar,
    ) -> Result<Vec<VotingNft>, NftVoterError> {
        let assets = self.assets.get_assets_by_owner(owner).await?;
        let nfts = voting_nfts(&assets, registrar);
        debug!(
            "{} of {} assets of {owner} carry voting power",
            nfts.len(),
            assets.len()
        );
        Ok(nfts)
    }

    async fn calculate_voter_weight(
        &self,
        voter: &Pubkey,
        realm: &Pubkey,
        governing_token_mint: &Pubkey,
    ) -> Result<Option<u64>, NftVoterError> {
        let token_owner_record = token_owner_record_address(
            &self.governance_program_id,
            realm,
            governing_token_mint,
            voter,
        );
        let Some(record) = self
            .query
            .fetch_token_owner_record_by_pubkey(&token_owner_record)
            .await?
            .into_result()
        else {
            debug!("no token owner record {token_owner_record}");
            return Ok(None);
        };
        let (address, Some(registrar)) = self.registrar(realm, governing_token_mint).await? else {
            debug!("no registrar for realm {realm}");
            return Ok(None);
        };
        trace!("registrar {address}");

        let nfts = self
            .voting_nfts(&record.account.governing_token_owner, &registrar)
            .await?;
        nft_voter_weight(&nfts).map(Some)
    }

    async fn update_accounts(
        &self,
        voter: &Pubkey,
        realm: &Pubkey,
        governing_token_mint: &Pubkey,
    ) -> Result<UpdateAccounts, NftVoterError> {
        let (address, registrar) = self.registrar(realm, governing_token_mint).await?;
        let registrar = registrar.ok_or(NftVoterError::RegistrarNotFound(address))?;
        Ok(UpdateAccounts {
            registrar: address,
            voter_weight_record: voter_weight_record_address(
                &self.program_id,
                realm,
                governing_token_mint,
                voter,
            ),
            nfts: self.voting_nfts(voter, &registrar).await?,
        })
    }
}

/// Client of the V1 plugin, which reads the NFTs straight from the update
/// instruction.
#[derive(Debug, Clone)]
pub struct NftVoterClientV1 {
    context: NftVoterContext,
}

impl NftVoterClientV1 {
    pub fn new(context: NftVoterContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl VoterWeightPluginClient for NftVoterClientV1 {
    fn program_id(&self) -> &Pubkey {
        &self.context.program_id
    }

    fn version(&self) -> PluginVersion {
        PluginVersion::V1
    }

    async fn calculate_voter_weight(
        &self,
        voter: &Pubkey,
        realm: &Pubkey,
        governing_token_mint: &Pubkey,
    ) -> Result<Option<u64>, NftVoterError> {
        self.context
            .calculate_voter_weight(voter, realm, governing_token_mint)
            .await
    }

    async fn update_voter_weight_record(
        &self,
        voter: &Pubkey,
        realm: &Pubkey,
        governing_token_mint: &Pubkey,
        action: VoterWeightAction,
    ) -> Result<UpdateVoterWeightInstructions, NftVoterError> {
        let accounts = self
            .context
            .update_accounts(voter, realm, governing_token_mint)
            .await?;
        debug!("building v1 voter weight update with {} nfts", accounts.nfts.len());
        let ix = update_voter_weight_record_v1(
            self.program_id(),
            voter,
            &accounts.registrar,
            &accounts.voter_weight_record,
            &accounts.nfts,
            action,
        );
        Ok(UpdateVoterWeightInstructions {
            pre: vec![ix],
            post: None,
        })
    }
}

/// Client of the V2 plugin, which records each NFT in an action ticket
/// before the update consumes the tickets.
#[derive(Debug, Clone)]
pub struct NftVoterClientV2 {
    context: NftVoterContext,
}

impl NftVoterClientV2 {
    pub fn new(context: NftVoterContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl VoterWeightPluginClient for NftVoterClientV2 {
    fn program_id(&self) -> &Pubkey {
        &self.context.program_id
    }

    fn version(&self) -> PluginVersion {
        PluginVersion::V2
    }

    async fn calculate_voter_weight(
        &self,
        voter: &Pubkey,
        realm: &Pubkey,
        governing_token_mint: &Pubkey,
    ) -> Result<Option<u64>, NftVoterError> {
        self.context
            .calculate_voter_weight(voter, realm, governing_token_mint)
            .await
    }

    async fn update_voter_weight_record(
        &self,
        voter: &Pubkey,
        realm: &Pubkey,
        governing_token_mint: &Pubkey,
        action: VoterWeightAction,
    ) -> Result<UpdateVoterWeightInstructions, NftVoterError> {
        let accounts = self
            .context
            .update_accounts(voter, realm, governing_token_mint)
            .await?;
        debug!("building v2 voter weight update with {} nfts", accounts.nfts.len());
        let update = update_voter_weight_record_v2(
            self.program_id(),
            voter,
            &accounts.registrar,
            &accounts.voter_weight_record,
            &accounts.nfts,
            action,
        );
        let tickets = create_nft_action_tickets(
            self.program_id(),
            voter,
            &accounts.registrar,
            &accounts.voter_weight_record,
            &accounts.nfts,
            action,
        );
        Ok(UpdateVoterWeightInstructions {
            pre: vec![update],
            post: Some(tickets),
        })
    }
}

/// Build the client of `version`, bound to `program_id` or the default
/// plugin address of `version`.
pub fn connect_version(
    version: PluginVersion,
    query: QueryClient,
    assets: Arc<dyn DigitalAssetSource>,
    governance_program_id: Pubkey,
    program_id: Option<Pubkey>,
    devnet: bool,
) -> Arc<dyn VoterWeightPluginClient> {
    let program_id = program_id.unwrap_or(version.default_program_id());
    info!("nft voter {version} client on program {program_id}, devnet: {devnet}");
    let context = NftVoterContext {
        query,
        assets,
        governance_program_id,
        program_id,
        devnet,
    };
    match version {
        PluginVersion::V1 => Arc::new(NftVoterClientV1::new(context)),
        PluginVersion::V2 => Arc::new(NftVoterClientV2::new(context)),
    }
}

/// Build the client of the plugin version this build targets, bound to
/// [`DEFAULT_NFT_VOTER_PLUGIN`](crate::constants::DEFAULT_NFT_VOTER_PLUGIN) unless `program_id` overrides it.
pub fn connect(
    query: QueryClient,
    assets: Arc<dyn DigitalAssetSource>,
    governance_program_id: Pubkey,
    program_id: Option<Pubkey>,
    devnet: bool,
) -> Arc<dyn VoterWeightPluginClient> {
    connect_version(
        PluginVersion::current(),
        query,
        assets,
        governance_program_id,
        program_id,
        devnet,
    )
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            constants::DEFAULT_NFT_VOTER_PLUGIN, das::StaticAssetSource,
            registrar::CollectionConfig,
        },
        assert_matches::assert_matches,
        realms_account_query::{
            mock::MockAccountFetcher, AccountFetcher, Cluster, QueryCache,
        },
        realms_governance_state::{
            constants::DEFAULT_GOVERNANCE_PROGRAM_ID, state::TokenOwnerRecord,
        },
        test_case::test_case,
    };

    struct Fixture {
        fetcher: Arc<MockAccountFetcher>,
        realm: Pubkey,
        mint: Pubkey,
        voter: Pubkey,
        collection: Pubkey,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                fetcher: MockAccountFetcher::default().into_arc(),
                realm: Pubkey::new_unique(),
                mint: Pubkey::new_unique(),
                voter: Pubkey::new_unique(),
                collection: Pubkey::new_unique(),
            }
        }

        fn add_token_owner_record(&self) {
            let record = TokenOwnerRecord {
                realm: self.realm,
                governing_token_mint: self.mint,
                governing_token_owner: self.voter,
                governing_token_deposit_amount: 0,
            };
            self.fetcher.add_account(
                token_owner_record_address(
                    &DEFAULT_GOVERNANCE_PROGRAM_ID,
                    &self.realm,
                    &self.mint,
                    &self.voter,
                ),
                DEFAULT_GOVERNANCE_PROGRAM_ID,
                record.to_account_data().unwrap(),
            );
        }

        fn add_registrar(&self, program_id: &Pubkey, weight: u64) {
            let registrar = Registrar {
                governance_program_id: DEFAULT_GOVERNANCE_PROGRAM_ID,
                realm: self.realm,
                governing_token_mint: self.mint,
                collection_configs: vec![CollectionConfig {
                    collection: self.collection,
                    size: 10,
                    weight,
                    reserved: [0; 8],
                }],
            };
            self.fetcher.add_account(
                registrar_address(program_id, &self.realm, &self.mint),
                *program_id,
                registrar.to_account_data().unwrap(),
            );
        }

        fn assets(&self, nfts: usize) -> Arc<dyn DigitalAssetSource> {
            let mut assets: Vec<_> = (0..nfts)
                .map(|_| StaticAssetSource::nft(&Pubkey::new_unique(), &self.collection))
                .collect();
            // Not in a configured collection.
            assets.push(StaticAssetSource::nft(
                &Pubkey::new_unique(),
                &Pubkey::new_unique(),
            ));
            Arc::new(StaticAssetSource::default().with_assets(self.voter, assets))
        }

        fn client(&self, version: PluginVersion, nfts: usize) -> Arc<dyn VoterWeightPluginClient> {
            let query = QueryClient::with_cluster(
                Arc::clone(&self.fetcher) as Arc<dyn AccountFetcher>,
                Arc::new(QueryCache::default()),
                Cluster::Devnet,
            );
            connect_version(
                version,
                query,
                self.assets(nfts),
                DEFAULT_GOVERNANCE_PROGRAM_ID,
                None,
                true,
            )
        }
    }

    #[test_case(PluginVersion::V1, DEFAULT_NFT_VOTER_PLUGIN_V1 ; "v1")]
    #[test_case(PluginVersion::V2, DEFAULT_NFT_VOTER_PLUGIN_V2 ; "v2")]
    fn test_connect_version_binds_default_program(version: PluginVersion, program_id: Pubkey) {
        let client = Fixture::new().client(version, 0);
        assert_eq!(client.version(), version);
        assert_eq!(*client.program_id(), program_id);
        assert!(!client.requires_input_voter_weight());
    }

    #[test_case(false, PluginVersion::V1, DEFAULT_NFT_VOTER_PLUGIN_V1 ; "flag off")]
    #[test_case(true, PluginVersion::V2, DEFAULT_NFT_VOTER_PLUGIN_V2 ; "flag on")]
    fn test_flag_selects_version_and_program(
        on_nft_voter_v2: bool,
        version: PluginVersion,
        program_id: Pubkey,
    ) {
        let selected = PluginVersion::for_flag(on_nft_voter_v2);
        assert_eq!(selected, version);
        let client = Fixture::new().client(selected, 0);
        assert_eq!(client.version(), version);
        assert_eq!(*client.program_id(), program_id);
    }

    #[test]
    fn test_connect_follows_build_flag() {
        let (version, program_id) = if cfg!(feature = "nft-voter-v2") {
            (PluginVersion::V2, DEFAULT_NFT_VOTER_PLUGIN_V2)
        } else {
            (PluginVersion::V1, DEFAULT_NFT_VOTER_PLUGIN_V1)
        };
        assert_eq!(PluginVersion::current(), version);
        assert_eq!(DEFAULT_NFT_VOTER_PLUGIN, program_id);

        let fixture = Fixture::new();
        let query = QueryClient::with_cluster(
            Arc::clone(&fixture.fetcher) as Arc<dyn AccountFetcher>,
            Arc::new(QueryCache::default()),
            Cluster::Devnet,
        );
        let client = connect(
            query,
            fixture.assets(0),
            DEFAULT_GOVERNANCE_PROGRAM_ID,
            None,
            false,
        );
        assert_eq!(client.version(), version);
        assert_eq!(*client.program_id(), program_id);
    }

    #[test]
    fn test_connect_honours_program_override() {
        let fixture = Fixture::new();
        let program_id = Pubkey::new_unique();
        let query = QueryClient::with_cluster(
            Arc::clone(&fixture.fetcher) as Arc<dyn AccountFetcher>,
            Arc::new(QueryCache::default()),
            Cluster::Devnet,
        );
        let client = connect(
            query,
            fixture.assets(0),
            DEFAULT_GOVERNANCE_PROGRAM_ID,
            Some(program_id),
            false,
        );
        assert_eq!(*client.program_id(), program_id);
    }

    #[test_case(PluginVersion::V1 ; "v1")]
    #[test_case(PluginVersion::V2 ; "v2")]
    #[tokio::test]
    async fn test_calculate_voter_weight(version: PluginVersion) {
        let fixture = Fixture::new();
        let client = fixture.client(version, 3);

        assert_eq!(
            client
                .calculate_voter_weight(&fixture.voter, &fixture.realm, &fixture.mint)
                .await
                .unwrap(),
            None
        );

        fixture.add_token_owner_record();
        fixture.add_registrar(client.program_id(), 4);
        // Absent lookups above are cached.
        client
            .calculate_voter_weight(&fixture.voter, &fixture.realm, &fixture.mint)
            .await
            .unwrap();

        let client = fixture.client(version, 3);
        let weight = client
            .calculate_voter_weight(&fixture.voter, &fixture.realm, &fixture.mint)
            .await
            .unwrap();
        assert_eq!(weight, Some(12));
        let again = client
            .calculate_voter_weight(&fixture.voter, &fixture.realm, &fixture.mint)
            .await
            .unwrap();
        assert_eq!(again, weight);
    }

    #[tokio::test]
    async fn test_calculate_voter_weight_without_registrar() {
        let fixture = Fixture::new();
        fixture.add_token_owner_record();
        let client = fixture.client(PluginVersion::V1, 2);
        assert_eq!(
            client
                .calculate_voter_weight(&fixture.voter, &fixture.realm, &fixture.mint)
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_v1_update_has_no_post() {
        let fixture = Fixture::new();
        let client = fixture.client(PluginVersion::V1, 2);
        fixture.add_registrar(client.program_id(), 1);

        let ixs = client
            .update_voter_weight_record(
                &fixture.voter,
                &fixture.realm,
                &fixture.mint,
                VoterWeightAction::CastVote,
            )
            .await
            .unwrap();
        assert_eq!(ixs.pre.len(), 1);
        assert!(ixs.post.is_none());
        assert_eq!(ixs.pre[0].program_id, DEFAULT_NFT_VOTER_PLUGIN_V1);
        assert_eq!(ixs.pre[0].accounts.len(), 2 + 2 * 2);
        assert_eq!(
            ixs.pre[0].accounts[1].pubkey,
            voter_weight_record_address(
                &DEFAULT_NFT_VOTER_PLUGIN_V1,
                &fixture.realm,
                &fixture.mint,
                &fixture.voter
            )
        );
    }

    #[tokio::test]
    async fn test_v2_update_has_ticket_post() {
        let fixture = Fixture::new();
        let client = fixture.client(PluginVersion::V2, 2);
        fixture.add_registrar(client.program_id(), 1);

        let ixs = client
            .update_voter_weight_record(
                &fixture.voter,
                &fixture.realm,
                &fixture.mint,
                VoterWeightAction::CastVote,
            )
            .await
            .unwrap();
        assert_eq!(ixs.pre.len(), 1);
        let post = ixs.post.clone().unwrap();
        assert!(!post.is_empty());
        assert!(ixs
            .in_order()
            .iter()
            .all(|ix| ix.program_id == DEFAULT_NFT_VOTER_PLUGIN_V2));
        // update: registrar, vwr, payer and one ticket per nft
        assert_eq!(ixs.pre[0].accounts.len(), 3 + 2);
    }

    #[tokio::test]
    async fn test_update_requires_registrar() {
        let fixture = Fixture::new();
        let client = fixture.client(PluginVersion::V1, 1);
        assert_matches!(
            client
                .update_voter_weight_record(
                    &fixture.voter,
                    &fixture.realm,
                    &fixture.mint,
                    VoterWeightAction::CastVote,
                )
                .await,
            Err(NftVoterError::RegistrarNotFound(_))
        );
    }

    #[tokio::test]
    async fn test_no_op_instructions() {
        let fixture = Fixture::new();
        for version in [PluginVersion::V1, PluginVersion::V2] {
            let client = fixture.client(version, 0);
            assert!(client
                .create_voter_weight_record(&fixture.voter, &fixture.realm, &fixture.mint)
                .await
                .unwrap()
                .is_none());
            assert!(client
                .create_max_voter_weight_record(&fixture.realm, &fixture.mint)
                .await
                .unwrap()
                .is_none());
            assert!(client
                .update_max_voter_weight_record(&fixture.realm, &fixture.mint)
                .await
                .unwrap()
                .is_none());
        }
    }
}
