//! Client of the SPL governance NFT voter weight plugin.
//!
//! The plugin derives a voter's weight from the NFTs they hold in the
//! collections configured on the realm's [`Registrar`].  Two incompatible
//! program versions exist:
//!
//! | Version | Update instruction reads NFTs from | Extra instructions |
//! |---------|------------------------------------|--------------------|
//! | V1      | `(token account, metadata)` pairs  | none               |
//! | V2      | NFT action tickets                 | `create_nft_action_ticket` per chunk |
//!
//! The version is chosen at build time by the `nft-voter-v2` feature and
//! exposed as [`ON_NFT_VOTER_V2`]; [`connect`] returns the matching
//! [`VoterWeightPluginClient`].

pub mod client;
pub mod constants;
pub mod das;
pub mod error;
pub mod instruction;
pub mod pda;
pub mod registrar;

pub use {
    client::{
        connect, connect_version, NftVoterClientV1, NftVoterClientV2, NftVoterContext,
        PluginVersion, VoterWeightPluginClient,
    },
    constants::ON_NFT_VOTER_V2,
    das::{DasClient, DigitalAsset, DigitalAssetSource, VotingNft},
    error::NftVoterError,
    instruction::{InstructionSummary, UpdateVoterWeightInstructions},
    registrar::{CollectionConfig, Registrar},
};
