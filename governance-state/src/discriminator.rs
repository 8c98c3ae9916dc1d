//! Anchor discriminators.
//!
//! Anchor prefixes account data and instruction data with the first 8 bytes
//! of `sha256("<namespace>:<name>")`.

use sha2::{Digest, Sha256};

pub const DISCRIMINATOR_LEN: usize = 8;

fn discriminator(namespace: &str, name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let digest = Sha256::new()
        .chain_update(namespace.as_bytes())
        .chain_update(b":")
        .chain_update(name.as_bytes())
        .finalize();
    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
    out
}

/// Discriminator of an anchor account type, e.g. `"Registrar"`.
pub fn account_discriminator(account_name: &str) -> [u8; DISCRIMINATOR_LEN] {
    discriminator("account", account_name)
}

/// Discriminator of an anchor instruction, e.g. `"update_voter_weight_record"`.
pub fn instruction_discriminator(method_name: &str) -> [u8; DISCRIMINATOR_LEN] {
    discriminator("global", method_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaces_differ() {
        assert_ne!(
            account_discriminator("VoterWeightRecord"),
            instruction_discriminator("VoterWeightRecord")
        );
    }

    #[test]
    fn test_matches_manual_digest() {
        let digest = Sha256::digest(b"global:update_voter_weight_record");
        assert_eq!(
            instruction_discriminator("update_voter_weight_record"),
            digest[..8]
        );
    }
}
