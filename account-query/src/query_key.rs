//! Hierarchical cache keys.
//!
//! A key is an ordered list of segments, `[cluster, kind, ...ids]`.  Order is
//! significant: a key is inside the scope of every key it starts with, so
//! `[mainnet, VoteRecord, realm, owner]` lives under `[mainnet, VoteRecord]`
//! and is dropped when that scope is invalidated.

use {
    crate::cluster::Cluster,
    solana_pubkey::Pubkey,
    std::fmt,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeySegment {
    Cluster(Cluster),
    Kind(&'static str),
    Pubkey(Pubkey),
}

impl fmt::Display for KeySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySegment::Cluster(cluster) => write!(f, "{cluster}"),
            KeySegment::Kind(kind) => f.write_str(kind),
            KeySegment::Pubkey(pubkey) => write!(f, "{pubkey}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<KeySegment>);

impl QueryKey {
    /// Scope of every entry of `kind` on `cluster`.
    pub fn all(cluster: Cluster, kind: &'static str) -> Self {
        Self(vec![KeySegment::Cluster(cluster), KeySegment::Kind(kind)])
    }

    /// Extend the key with an identifier segment.
    pub fn with(mut self, pubkey: &Pubkey) -> Self {
        self.0.push(KeySegment::Pubkey(*pubkey));
        self
    }

    pub fn segments(&self) -> &[KeySegment] {
        &self.0
    }

    /// Whether this key is `prefix` or lies inside its scope.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{segment}")?;
        }
        f.write_str("]")
    }
}
