//! Constants for the SPL Governance program.
//!
//! Program addresses, PDA seed prefixes and the account type bytes used to
//! tell governance accounts apart.

use solana_pubkey::{pubkey, Pubkey};

/// Default SPL Governance program deployment used by Realms.
pub const DEFAULT_GOVERNANCE_PROGRAM_ID: Pubkey =
    pubkey!("GovER5Lthms3bLBqWub97yVrMmEogzX7xNjdXpPPCVZw");

/// Seed prefix shared by governance PDAs (token owner records, vote records).
pub const PROGRAM_AUTHORITY_SEED: &[u8] = b"governance";

/// Seed prefix of plugin voter weight records.
pub const VOTER_WEIGHT_RECORD_SEED: &[u8] = b"voter-weight-record";

// ---------------------------------------------------------------------------
// GovernanceAccountType bytes (first byte of every governance account)
// ---------------------------------------------------------------------------

pub const TOKEN_OWNER_RECORD_V1: u8 = 2;
pub const VOTE_RECORD_V1: u8 = 7;
pub const VOTE_RECORD_V2: u8 = 12;
pub const TOKEN_OWNER_RECORD_V2: u8 = 17;

/// Account types a vote record query must cover.
pub const VOTE_RECORD_ACCOUNT_TYPES: [u8; 2] = [VOTE_RECORD_V1, VOTE_RECORD_V2];

// ---------------------------------------------------------------------------
// Field offsets used by `getProgramAccounts` memcmp filters
// ---------------------------------------------------------------------------

/// Offset of `governing_token_owner` in a vote record:
/// account type (1) + proposal (32).
pub const VOTE_RECORD_OWNER_OFFSET: usize = 1 + 32;
