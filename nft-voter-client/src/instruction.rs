//! Instruction builders for both plugin versions.
//!
//! Data is the anchor instruction discriminator followed by the borsh
//! encoded `VoterWeightAction`.

use {
    crate::{
        constants::NFT_TICKET_CHUNK_SIZE,
        das::VotingNft,
        pda::{associated_token_address, metadata_address, nft_action_ticket_address},
    },
    realms_governance_state::{discriminator::instruction_discriminator, state::VoterWeightAction},
    serde::Serialize,
    solana_instruction::{AccountMeta, Instruction},
    solana_pubkey::Pubkey,
};

/// Instructions refreshing a voter weight record.
///
/// `pre` runs before the governance instruction that consumes the weight.
/// `post` carries the V2 ticket instructions, which must also land on chain
/// before `pre` runs; see [`UpdateVoterWeightInstructions::in_order`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateVoterWeightInstructions {
    pub pre: Vec<Instruction>,
    pub post: Option<Vec<Instruction>>,
}

impl UpdateVoterWeightInstructions {
    /// Execution order: ticket creation first, then the weight update.
    pub fn in_order(&self) -> Vec<Instruction> {
        self.post
            .iter()
            .flatten()
            .chain(self.pre.iter())
            .cloned()
            .collect()
    }
}

/// Printable form of an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionSummary {
    pub program_id: String,
    pub accounts: Vec<AccountSummary>,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub pubkey: String,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl From<&Instruction> for InstructionSummary {
    fn from(ix: &Instruction) -> Self {
        Self {
            program_id: ix.program_id.to_string(),
            accounts: ix
                .accounts
                .iter()
                .map(|meta| AccountSummary {
                    pubkey: meta.pubkey.to_string(),
                    is_signer: meta.is_signer,
                    is_writable: meta.is_writable,
                })
                .collect(),
            data: ix.data.iter().map(|byte| format!("{byte:02x}")).collect(),
        }
    }
}

fn action_data(method: &str, action: VoterWeightAction) -> Vec<u8> {
    let mut data = instruction_discriminator(method).to_vec();
    // borsh encodes the fieldless enum as its u8 tag.
    data.push(action as u8);
    data
}

fn nft_accounts(voter: &Pubkey, nft: &VotingNft) -> [AccountMeta; 2] {
    [
        AccountMeta::new_readonly(associated_token_address(voter, &nft.mint), false),
        AccountMeta::new_readonly(metadata_address(&nft.mint), false),
    ]
}

/// V1 `update_voter_weight_record`: the NFTs are passed directly as
/// `(token account, metadata)` pairs.
pub fn update_voter_weight_record_v1(
    program_id: &Pubkey,
    voter: &Pubkey,
    registrar: &Pubkey,
    voter_weight_record: &Pubkey,
    nfts: &[VotingNft],
    action: VoterWeightAction,
) -> Instruction {
    let mut accounts = vec![
        AccountMeta::new_readonly(*registrar, false),
        AccountMeta::new(*voter_weight_record, false),
    ];
    accounts.extend(nfts.iter().flat_map(|nft| nft_accounts(voter, nft)));
    Instruction {
        program_id: *program_id,
        accounts,
        data: action_data("update_voter_weight_record", action),
    }
}

/// V2 `update_voter_weight_record`: the NFTs are proven by their action
/// tickets, which the instruction closes into `payer`.
pub fn update_voter_weight_record_v2(
    program_id: &Pubkey,
    voter: &Pubkey,
    registrar: &Pubkey,
    voter_weight_record: &Pubkey,
    nfts: &[VotingNft],
    action: VoterWeightAction,
) -> Instruction {
    let mut accounts = vec![
        AccountMeta::new_readonly(*registrar, false),
        AccountMeta::new(*voter_weight_record, false),
        AccountMeta::new(*voter, true),
    ];
    accounts.extend(nfts.iter().map(|nft| {
        AccountMeta::new(
            nft_action_ticket_address(program_id, registrar, voter, &nft.mint),
            false,
        )
    }));
    Instruction {
        program_id: *program_id,
        accounts,
        data: action_data("update_voter_weight_record", action),
    }
}

/// V2 `create_nft_action_ticket`, one instruction per chunk of
/// [`NFT_TICKET_CHUNK_SIZE`] NFTs.
pub fn create_nft_action_tickets(
    program_id: &Pubkey,
    voter: &Pubkey,
    registrar: &Pubkey,
    voter_weight_record: &Pubkey,
    nfts: &[VotingNft],
    action: VoterWeightAction,
) -> Vec<Instruction> {
    nfts.chunks(NFT_TICKET_CHUNK_SIZE)
        .map(|chunk| {
            let mut accounts = vec![
                AccountMeta::new_readonly(*registrar, false),
                AccountMeta::new_readonly(*voter_weight_record, false),
                AccountMeta::new_readonly(*voter, true),
                AccountMeta::new(*voter, true),
                AccountMeta::new_readonly(solana_sdk_ids::system_program::id(), false),
            ];
            for nft in chunk {
                accounts.extend(nft_accounts(voter, nft));
                accounts.push(AccountMeta::new(
                    nft_action_ticket_address(program_id, registrar, voter, &nft.mint),
                    false,
                ));
            }
            Instruction {
                program_id: *program_id,
                accounts,
                data: action_data("create_nft_action_ticket", action),
            }
        })
        .collect()
}
