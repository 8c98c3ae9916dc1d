//! Program derived addresses used by the NFT voter plugin.

use {
    crate::constants::{
        ASSOCIATED_TOKEN_PROGRAM_ID, METADATA_SEED, NFT_ACTION_TICKET_SEED, REGISTRAR_SEED,
        TOKEN_METADATA_PROGRAM_ID, TOKEN_PROGRAM_ID,
    },
    solana_pubkey::Pubkey,
};

pub use realms_governance_state::address::voter_weight_record_address;

pub fn registrar_address(
    plugin_program_id: &Pubkey,
    realm: &Pubkey,
    governing_token_mint: &Pubkey,
) -> Pubkey {
    Pubkey::find_program_address(
        &[
            REGISTRAR_SEED,
            realm.as_ref(),
            governing_token_mint.as_ref(),
        ],
        plugin_program_id,
    )
    .0
}

/// V2 ticket proving `owner` already counted `nft_mint` for the pending
/// action.
pub fn nft_action_ticket_address(
    plugin_program_id: &Pubkey,
    registrar: &Pubkey,
    owner: &Pubkey,
    nft_mint: &Pubkey,
) -> Pubkey {
    Pubkey::find_program_address(
        &[
            NFT_ACTION_TICKET_SEED,
            registrar.as_ref(),
            owner.as_ref(),
            nft_mint.as_ref(),
        ],
        plugin_program_id,
    )
    .0
}

pub fn associated_token_address(wallet: &Pubkey, mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[wallet.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .0
}

pub fn metadata_address(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[
            METADATA_SEED,
            TOKEN_METADATA_PROGRAM_ID.as_ref(),
            mint.as_ref(),
        ],
        &TOKEN_METADATA_PROGRAM_ID,
    )
    .0
}
