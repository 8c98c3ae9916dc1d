//! Account state types for SPL Governance and its voter weight plugins.

use {
    crate::{
        constants::{
            TOKEN_OWNER_RECORD_V1, TOKEN_OWNER_RECORD_V2, VOTE_RECORD_V1, VOTE_RECORD_V2,
        },
        discriminator::{account_discriminator, DISCRIMINATOR_LEN},
        error::StateError,
    },
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    solana_pubkey::Pubkey,
    std::{fmt, str::FromStr},
};

/// An account type the query layer knows how to decode and cache.
pub trait GovernanceAccount: Sized {
    /// Entity kind segment used in cache keys, e.g. `"VoteRecord"`.
    const ACCOUNT_KIND: &'static str;

    fn try_from_account_data(data: &[u8]) -> Result<Self, StateError>;
}

/// A decoded account together with its address and owning program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramAccount<T> {
    pub pubkey: Pubkey,
    pub owner: Pubkey,
    pub account: T,
}

fn split_account_type<'a>(kind: &'static str, data: &'a [u8]) -> Result<(u8, &'a [u8]), StateError> {
    data.split_first()
        .map(|(account_type, rest)| (*account_type, rest))
        .ok_or(StateError::EmptyAccountData { kind })
}

fn borsh_decode<T: BorshDeserialize>(kind: &'static str, mut cursor: &[u8]) -> Result<T, StateError> {
    // Accounts are allocated with spare room, so trailing bytes are expected.
    T::deserialize_reader(&mut cursor).map_err(|source| StateError::Deserialize { kind, source })
}

fn borsh_encode<T: BorshSerialize>(
    kind: &'static str,
    prefix: &[u8],
    value: &T,
) -> Result<Vec<u8>, StateError> {
    let mut data = prefix.to_vec();
    BorshSerialize::serialize(value, &mut data)
        .map_err(|source| StateError::Serialize { kind, source })?;
    Ok(data)
}

/// Decode an anchor account of type `account_name`: the 8-byte account
/// discriminator followed by the borsh body.
pub fn try_from_anchor_account_data<T: BorshDeserialize>(
    kind: &'static str,
    account_name: &str,
    data: &[u8],
) -> Result<T, StateError> {
    let (discriminator, body) = data
        .split_at_checked(DISCRIMINATOR_LEN)
        .ok_or(StateError::EmptyAccountData { kind })?;
    if discriminator != account_discriminator(account_name) {
        return Err(StateError::InvalidDiscriminator { kind });
    }
    borsh_decode(kind, body)
}

pub fn to_anchor_account_data<T: BorshSerialize>(
    kind: &'static str,
    account_name: &str,
    value: &T,
) -> Result<Vec<u8>, StateError> {
    borsh_encode(kind, &account_discriminator(account_name), value)
}

// ---------------------------------------------------------------------------
// Votes
// ---------------------------------------------------------------------------

/// A single ranked choice of an `Approve` vote.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct VoteChoice {
    pub rank: u8,
    pub weight_percentage: u8,
}

/// The vote cast by a voter.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum Vote {
    Approve(Vec<VoteChoice>),
    Deny,
    Abstain,
    Veto,
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vote::Approve(choices) => write!(f, "approve ({} choices)", choices.len()),
            Vote::Deny => write!(f, "deny"),
            Vote::Abstain => write!(f, "abstain"),
            Vote::Veto => write!(f, "veto"),
        }
    }
}

/// Vote weight as stored by V1 vote records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum VoteWeightV1 {
    Yes(u64),
    No(u64),
}

// ---------------------------------------------------------------------------
// VoteRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountVersion {
    V1,
    V2,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct VoteRecordV1Data {
    proposal: Pubkey,
    governing_token_owner: Pubkey,
    is_relinquished: bool,
    vote_weight: VoteWeightV1,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct VoteRecordV2Data {
    proposal: Pubkey,
    governing_token_owner: Pubkey,
    is_relinquished: bool,
    voter_weight: u64,
    vote: Vote,
    reserved_v2: [u8; 8],
}

/// A voter's cast vote on a proposal, normalised across account versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    /// Layout the record was decoded from.
    pub version: AccountVersion,

    /// The proposal voted on.
    pub proposal: Pubkey,

    /// Owner of the token owner record that cast the vote.
    pub governing_token_owner: Pubkey,

    /// Set once the vote has been relinquished and the weight withdrawn.
    pub is_relinquished: bool,

    /// Voting power applied to the vote.
    pub voter_weight: u64,

    pub vote: Vote,
}

impl VoteRecord {
    /// Encode back into account data using the record's own layout.
    pub fn to_account_data(&self) -> Result<Vec<u8>, StateError> {
        match self.version {
            AccountVersion::V1 => {
                let vote_weight = match self.vote {
                    Vote::Deny => VoteWeightV1::No(self.voter_weight),
                    _ => VoteWeightV1::Yes(self.voter_weight),
                };
                borsh_encode(
                    Self::ACCOUNT_KIND,
                    &[VOTE_RECORD_V1],
                    &VoteRecordV1Data {
                        proposal: self.proposal,
                        governing_token_owner: self.governing_token_owner,
                        is_relinquished: self.is_relinquished,
                        vote_weight,
                    },
                )
            }
            AccountVersion::V2 => borsh_encode(
                Self::ACCOUNT_KIND,
                &[VOTE_RECORD_V2],
                &VoteRecordV2Data {
                    proposal: self.proposal,
                    governing_token_owner: self.governing_token_owner,
                    is_relinquished: self.is_relinquished,
                    voter_weight: self.voter_weight,
                    vote: self.vote.clone(),
                    reserved_v2: [0; 8],
                },
            ),
        }
    }
}

impl GovernanceAccount for VoteRecord {
    const ACCOUNT_KIND: &'static str = "VoteRecord";

    fn try_from_account_data(data: &[u8]) -> Result<Self, StateError> {
        let (account_type, body) = split_account_type(Self::ACCOUNT_KIND, data)?;
        match account_type {
            VOTE_RECORD_V1 => {
                let v1: VoteRecordV1Data = borsh_decode(Self::ACCOUNT_KIND, body)?;
                // V1 only knew yes/no; a yes is a full-weight approval of the
                // single option.
                let (voter_weight, vote) = match v1.vote_weight {
                    VoteWeightV1::Yes(weight) => (
                        weight,
                        Vote::Approve(vec![VoteChoice {
                            rank: 0,
                            weight_percentage: 100,
                        }]),
                    ),
                    VoteWeightV1::No(weight) => (weight, Vote::Deny),
                };
                Ok(Self {
                    version: AccountVersion::V1,
                    proposal: v1.proposal,
                    governing_token_owner: v1.governing_token_owner,
                    is_relinquished: v1.is_relinquished,
                    voter_weight,
                    vote,
                })
            }
            VOTE_RECORD_V2 => {
                let v2: VoteRecordV2Data = borsh_decode(Self::ACCOUNT_KIND, body)?;
                Ok(Self {
                    version: AccountVersion::V2,
                    proposal: v2.proposal,
                    governing_token_owner: v2.governing_token_owner,
                    is_relinquished: v2.is_relinquished,
                    voter_weight: v2.voter_weight,
                    vote: v2.vote,
                })
            }
            found => Err(StateError::InvalidAccountType {
                kind: Self::ACCOUNT_KIND,
                found,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// TokenOwnerRecord
// ---------------------------------------------------------------------------

/// Leading fields of a token owner record.  Both versions share them; the
/// remainder of the account is not needed by the client.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct TokenOwnerRecord {
    pub realm: Pubkey,
    pub governing_token_mint: Pubkey,
    pub governing_token_owner: Pubkey,
    pub governing_token_deposit_amount: u64,
}

impl TokenOwnerRecord {
    /// Encode as a V2 token owner record header.
    pub fn to_account_data(&self) -> Result<Vec<u8>, StateError> {
        borsh_encode(Self::ACCOUNT_KIND, &[TOKEN_OWNER_RECORD_V2], self)
    }
}

impl GovernanceAccount for TokenOwnerRecord {
    const ACCOUNT_KIND: &'static str = "TokenOwnerRecord";

    fn try_from_account_data(data: &[u8]) -> Result<Self, StateError> {
        let (account_type, body) = split_account_type(Self::ACCOUNT_KIND, data)?;
        match account_type {
            TOKEN_OWNER_RECORD_V1 | TOKEN_OWNER_RECORD_V2 => borsh_decode(Self::ACCOUNT_KIND, body),
            found => Err(StateError::InvalidAccountType {
                kind: Self::ACCOUNT_KIND,
                found,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Voter weight plugins
// ---------------------------------------------------------------------------

/// The governance action a voter weight was computed for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
#[borsh(use_discriminant = true)]
pub enum VoterWeightAction {
    CastVote = 0,
    CommentProposal = 1,
    CreateGovernance = 2,
    CreateProposal = 3,
    SignOffProposal = 4,
}

impl FromStr for VoterWeightAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cast-vote" => Ok(Self::CastVote),
            "comment-proposal" => Ok(Self::CommentProposal),
            "create-governance" => Ok(Self::CreateGovernance),
            "create-proposal" => Ok(Self::CreateProposal),
            "sign-off-proposal" => Ok(Self::SignOffProposal),
            _ => Err(format!(
                "Invalid voter weight action '{s}'. Valid: cast-vote, comment-proposal, \
                 create-governance, create-proposal, sign-off-proposal"
            )),
        }
    }
}

impl fmt::Display for VoterWeightAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CastVote => "cast-vote",
            Self::CommentProposal => "comment-proposal",
            Self::CreateGovernance => "create-governance",
            Self::CreateProposal => "create-proposal",
            Self::SignOffProposal => "sign-off-proposal",
        };
        f.write_str(s)
    }
}

/// Voting power computed by a plugin, read by the governance program when
/// a vote is tallied.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct VoterWeightRecord {
    pub realm: Pubkey,
    pub governing_token_mint: Pubkey,
    pub governing_token_owner: Pubkey,
    pub voter_weight: u64,

    /// Slot after which the weight is stale.  `None` never expires.
    pub voter_weight_expiry: Option<u64>,

    pub weight_action: Option<VoterWeightAction>,
    pub weight_action_target: Option<Pubkey>,
    pub reserved: [u8; 8],
}

impl VoterWeightRecord {
    pub fn to_account_data(&self) -> Result<Vec<u8>, StateError> {
        to_anchor_account_data(Self::ACCOUNT_KIND, Self::ACCOUNT_KIND, self)
    }

    /// Whether the weight can still be used at `slot`.
    pub fn is_current(&self, slot: u64) -> bool {
        self.voter_weight_expiry.is_none_or(|expiry| expiry >= slot)
    }
}

impl GovernanceAccount for VoterWeightRecord {
    const ACCOUNT_KIND: &'static str = "VoterWeightRecord";

    fn try_from_account_data(data: &[u8]) -> Result<Self, StateError> {
        try_from_anchor_account_data(Self::ACCOUNT_KIND, Self::ACCOUNT_KIND, data)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, assert_matches::assert_matches, test_case::test_case};

    fn vote_record(version: AccountVersion, vote: Vote) -> VoteRecord {
        VoteRecord {
            version,
            proposal: Pubkey::new_unique(),
            governing_token_owner: Pubkey::new_unique(),
            is_relinquished: false,
            voter_weight: 42,
            vote,
        }
    }

    #[test]
    fn test_vote_record_v2_decodes() {
        let record = vote_record(
            AccountVersion::V2,
            Vote::Approve(vec![VoteChoice {
                rank: 0,
                weight_percentage: 100,
            }]),
        );
        let data = record.to_account_data().unwrap();
        assert_eq!(data[0], VOTE_RECORD_V2);
        assert_eq!(VoteRecord::try_from_account_data(&data).unwrap(), record);
    }

    #[test_case(Vote::Deny, Vote::Deny ; "no vote is a deny")]
    #[test_case(Vote::Abstain, Vote::Approve(vec![VoteChoice { rank: 0, weight_percentage: 100 }]) ; "yes vote is a full approval")]
    fn test_vote_record_v1_normalises(cast: Vote, expected: Vote) {
        let record = vote_record(AccountVersion::V1, cast);
        let data = record.to_account_data().unwrap();
        assert_eq!(data[0], VOTE_RECORD_V1);

        let decoded = VoteRecord::try_from_account_data(&data).unwrap();
        assert_eq!(decoded.version, AccountVersion::V1);
        assert_eq!(decoded.voter_weight, 42);
        assert_eq!(decoded.vote, expected);
    }

    #[test]
    fn test_vote_record_owner_offset() {
        let record = vote_record(AccountVersion::V2, Vote::Veto);
        let data = record.to_account_data().unwrap();
        let offset = crate::constants::VOTE_RECORD_OWNER_OFFSET;
        assert_eq!(
            &data[offset..offset + 32],
            record.governing_token_owner.as_ref()
        );
    }

    #[test]
    fn test_vote_record_tolerates_trailing_bytes() {
        let record = vote_record(AccountVersion::V2, Vote::Abstain);
        let mut data = record.to_account_data().unwrap();
        data.resize(data.len() + 64, 0);
        assert_eq!(VoteRecord::try_from_account_data(&data).unwrap(), record);
    }

    #[test]
    fn test_vote_record_rejects_other_accounts() {
        let tor = TokenOwnerRecord {
            realm: Pubkey::new_unique(),
            governing_token_mint: Pubkey::new_unique(),
            governing_token_owner: Pubkey::new_unique(),
            governing_token_deposit_amount: 1,
        };
        let data = tor.to_account_data().unwrap();
        assert_matches!(
            VoteRecord::try_from_account_data(&data),
            Err(StateError::InvalidAccountType { found: TOKEN_OWNER_RECORD_V2, .. })
        );
        assert_matches!(
            VoteRecord::try_from_account_data(&[]),
            Err(StateError::EmptyAccountData { .. })
        );
    }

    #[test]
    fn test_vote_record_truncated() {
        let data = vote_record(AccountVersion::V2, Vote::Deny)
            .to_account_data()
            .unwrap();
        assert_matches!(
            VoteRecord::try_from_account_data(&data[..40]),
            Err(StateError::Deserialize { .. })
        );
    }

    #[test]
    fn test_token_owner_record_v1_and_v2() {
        let tor = TokenOwnerRecord {
            realm: Pubkey::new_unique(),
            governing_token_mint: Pubkey::new_unique(),
            governing_token_owner: Pubkey::new_unique(),
            governing_token_deposit_amount: 5_000,
        };
        let mut data = tor.to_account_data().unwrap();
        assert_eq!(TokenOwnerRecord::try_from_account_data(&data).unwrap(), tor);

        data[0] = TOKEN_OWNER_RECORD_V1;
        assert_eq!(TokenOwnerRecord::try_from_account_data(&data).unwrap(), tor);
    }

    #[test]
    fn test_voter_weight_record() {
        let record = VoterWeightRecord {
            realm: Pubkey::new_unique(),
            governing_token_mint: Pubkey::new_unique(),
            governing_token_owner: Pubkey::new_unique(),
            voter_weight: 3,
            voter_weight_expiry: Some(100),
            weight_action: Some(VoterWeightAction::CastVote),
            weight_action_target: None,
            reserved: [0; 8],
        };
        let mut data = record.to_account_data().unwrap();
        assert_eq!(
            VoterWeightRecord::try_from_account_data(&data).unwrap(),
            record
        );
        assert!(record.is_current(100));
        assert!(!record.is_current(101));

        data[0] ^= 0xff;
        assert_matches!(
            VoterWeightRecord::try_from_account_data(&data),
            Err(StateError::InvalidDiscriminator { .. })
        );
    }

    #[test_case("cast-vote", VoterWeightAction::CastVote)]
    #[test_case("sign-off-proposal", VoterWeightAction::SignOffProposal)]
    fn test_voter_weight_action_from_str(s: &str, expected: VoterWeightAction) {
        assert_eq!(s.parse::<VoterWeightAction>().unwrap(), expected);
        assert_eq!(expected.to_string(), s);
    }

    #[test]
    fn test_voter_weight_action_borsh_tag() {
        assert_eq!(
            borsh::to_vec(&VoterWeightAction::CreateProposal).unwrap(),
            vec![3]
        );
        assert!("vote".parse::<VoterWeightAction>().is_err());
    }
}
