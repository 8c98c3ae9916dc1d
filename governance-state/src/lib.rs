//! SPL Governance account state for the Realms client.
//!
//! Decoders and address derivation for the governance accounts the client
//! reads: vote records, token owner records and plugin voter weight records.
//!
//! ## Account versions
//!
//! The governance program has shipped two layouts for several accounts.  The
//! first byte of every governance account is its `GovernanceAccountType`, so
//! decoders dispatch on it and normalise both versions into one type:
//!
//! | Account          | V1 type byte | V2 type byte |
//! |------------------|:------------:|:------------:|
//! | TokenOwnerRecord | 2            | 17           |
//! | VoteRecord       | 7            | 12           |
//!
//! Plugin-owned accounts (voter weight records, registrars) are anchor
//! accounts instead and start with an 8-byte discriminator.

pub mod address;
pub mod constants;
pub mod discriminator;
pub mod error;
pub mod state;

pub use {
    error::StateError,
    state::{GovernanceAccount, ProgramAccount},
};
