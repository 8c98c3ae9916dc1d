//! NFT voter registrar: the plugin's per-realm configuration.

use {
    borsh::{BorshDeserialize, BorshSerialize},
    realms_governance_state::{
        state::{to_anchor_account_data, try_from_anchor_account_data},
        GovernanceAccount, StateError,
    },
    serde::Serialize,
    solana_pubkey::Pubkey,
};

/// Anchor account name of the registrar.
const REGISTRAR_ACCOUNT_NAME: &str = "Registrar";

/// A collection whose NFTs carry voting power.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize)]
pub struct CollectionConfig {
    pub collection: Pubkey,
    /// Number of NFTs in the collection; used for max voter weight.
    pub size: u32,
    /// Voting power of each NFT of the collection.
    pub weight: u64,
    pub reserved: [u8; 8],
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize)]
pub struct Registrar {
    pub governance_program_id: Pubkey,
    pub realm: Pubkey,
    pub governing_token_mint: Pubkey,
    pub collection_configs: Vec<CollectionConfig>,
}

impl Registrar {
    pub fn collection_config(&self, collection: &Pubkey) -> Option<&CollectionConfig> {
        self.collection_configs
            .iter()
            .find(|config| config.collection == *collection)
    }

    pub fn to_account_data(&self) -> Result<Vec<u8>, StateError> {
        to_anchor_account_data(Self::ACCOUNT_KIND, REGISTRAR_ACCOUNT_NAME, self)
    }
}

impl GovernanceAccount for Registrar {
    const ACCOUNT_KIND: &'static str = "NftVoterRegistrar";

    fn try_from_account_data(data: &[u8]) -> Result<Self, StateError> {
        try_from_anchor_account_data(Self::ACCOUNT_KIND, REGISTRAR_ACCOUNT_NAME, data)
    }
}
