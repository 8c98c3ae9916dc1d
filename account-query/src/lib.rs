//! Cached governance account queries.
//!
//! A thin query layer over a Solana JSON-RPC connection:
//!
//! - single-account lookups resolve to [`Findable`], so a missing account is
//!   an ordinary `Absent` outcome rather than an error,
//! - relation lookups (`getProgramAccounts` with memcmp filters) return every
//!   matching account and prime the single-account cache entries as a side
//!   effect,
//! - every result is stored in a shared [`QueryCache`] addressed by
//!   hierarchical [`QueryKey`]s of the shape `[cluster, kind, ...ids]`.
//!
//! Queries whose inputs are not known yet resolve to
//! [`QueryState::Disabled`] without touching the network.

pub mod cache;
pub mod client;
pub mod cluster;
pub mod error;
pub mod fetcher;
pub mod findable;
#[cfg(any(test, feature = "dev-context-only-utils"))]
pub mod mock;
pub mod query_key;
pub mod token_owner_record;
pub mod vote_record;

pub use {
    cache::{CacheStats, QueryCache, QueryCacheConfig},
    client::{QueryClient, RealmRef},
    cluster::{Cluster, Endpoints},
    error::QueryError,
    fetcher::{AccountFetcher, AccountFilter},
    findable::{Findable, QueryState},
    query_key::{KeySegment, QueryKey},
};
