//! Program derived addresses of governance accounts.

use {
    crate::constants::{PROGRAM_AUTHORITY_SEED, VOTER_WEIGHT_RECORD_SEED},
    solana_pubkey::Pubkey,
};

/// Address of the token owner record of `owner` for `mint` in `realm`.
pub fn token_owner_record_address(
    governance_program_id: &Pubkey,
    realm: &Pubkey,
    governing_token_mint: &Pubkey,
    governing_token_owner: &Pubkey,
) -> Pubkey {
    Pubkey::find_program_address(
        &[
            PROGRAM_AUTHORITY_SEED,
            realm.as_ref(),
            governing_token_mint.as_ref(),
            governing_token_owner.as_ref(),
        ],
        governance_program_id,
    )
    .0
}

/// Address of the vote record a token owner record casts on `proposal`.
pub fn vote_record_address(
    governance_program_id: &Pubkey,
    proposal: &Pubkey,
    token_owner_record: &Pubkey,
) -> Pubkey {
    Pubkey::find_program_address(
        &[
            PROGRAM_AUTHORITY_SEED,
            proposal.as_ref(),
            token_owner_record.as_ref(),
        ],
        governance_program_id,
    )
    .0
}

/// Address of a plugin's voter weight record for `(realm, mint, owner)`.
pub fn voter_weight_record_address(
    plugin_program_id: &Pubkey,
    realm: &Pubkey,
    governing_token_mint: &Pubkey,
    governing_token_owner: &Pubkey,
) -> Pubkey {
    Pubkey::find_program_address(
        &[
            VOTER_WEIGHT_RECORD_SEED,
            realm.as_ref(),
            governing_token_mint.as_ref(),
            governing_token_owner.as_ref(),
        ],
        plugin_program_id,
    )
    .0
}

#[cfg(test)]
mod tests {
    use {super::*, crate::constants::DEFAULT_GOVERNANCE_PROGRAM_ID};

    #[test]
    fn test_token_owner_record_address_is_deterministic() {
        let realm = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();

        let a = token_owner_record_address(&DEFAULT_GOVERNANCE_PROGRAM_ID, &realm, &mint, &owner);
        let b = token_owner_record_address(&DEFAULT_GOVERNANCE_PROGRAM_ID, &realm, &mint, &owner);
        assert_eq!(a, b);
        assert!(!a.is_on_curve());

        let other_owner = Pubkey::new_unique();
        assert_ne!(
            a,
            token_owner_record_address(&DEFAULT_GOVERNANCE_PROGRAM_ID, &realm, &mint, &other_owner)
        );
    }

    #[test]
    fn test_seed_order_matters() {
        let proposal = Pubkey::new_unique();
        let tor = Pubkey::new_unique();
        assert_ne!(
            vote_record_address(&DEFAULT_GOVERNANCE_PROGRAM_ID, &proposal, &tor),
            vote_record_address(&DEFAULT_GOVERNANCE_PROGRAM_ID, &tor, &proposal),
        );
    }

    #[test]
    fn test_voter_weight_record_depends_on_program() {
        let realm = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        assert_ne!(
            voter_weight_record_address(&Pubkey::new_unique(), &realm, &mint, &owner),
            voter_weight_record_address(&Pubkey::new_unique(), &realm, &mint, &owner),
        );
    }
}
