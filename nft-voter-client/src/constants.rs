//! Program addresses and seeds of the NFT voter plugin.

use solana_pubkey::{pubkey, Pubkey};

/// Whether this build targets the V2 plugin.  Fixed at compile time by the
/// `nft-voter-v2` feature.
pub const ON_NFT_VOTER_V2: bool = cfg!(feature = "nft-voter-v2");

pub const DEFAULT_NFT_VOTER_PLUGIN_V1: Pubkey =
    pubkey!("GnftV5kLjd67tvHpNGyodwWveEKivz3ZWvvE3Z4xi2iw");

pub const DEFAULT_NFT_VOTER_PLUGIN_V2: Pubkey =
    pubkey!("GnftVc21v2BRchsRa9dGdrVmJPLZiRHe9j2HQwMXGCkP");

/// Default plugin address of the version selected by [`ON_NFT_VOTER_V2`].
pub const DEFAULT_NFT_VOTER_PLUGIN: Pubkey = if ON_NFT_VOTER_V2 {
    DEFAULT_NFT_VOTER_PLUGIN_V2
} else {
    DEFAULT_NFT_VOTER_PLUGIN_V1
};

pub const TOKEN_METADATA_PROGRAM_ID: Pubkey =
    pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

pub const TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

pub const REGISTRAR_SEED: &[u8] = b"registrar";
pub const METADATA_SEED: &[u8] = b"metadata";
pub const NFT_ACTION_TICKET_SEED: &[u8] = b"nft-action-ticket";

/// NFTs covered by one V2 `create_nft_action_ticket` instruction.  Each NFT
/// adds three accounts, so larger chunks overflow the transaction size.
pub const NFT_TICKET_CHUNK_SIZE: usize = 5;

/// Page size of DAS `getAssetsByOwner`; the API maximum.
pub const DAS_PAGE_LIMIT: u32 = 1000;

/// Most `getAssetsByOwner` pages read for one owner.
pub const DAS_MAX_PAGES: u32 = 100;
