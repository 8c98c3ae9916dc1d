//! Cluster resolution from RPC endpoints.
//!
//! Cache keys are scoped by cluster so that data fetched from devnet never
//! answers a mainnet query.  The cluster is looked up from the connection's
//! endpoint in a configured endpoint table.

use {
    crate::error::QueryError,
    serde::{Deserialize, Serialize},
    std::fmt,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cluster {
    Mainnet,
    Devnet,
    Localnet,
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Cluster::Mainnet => "mainnet",
            Cluster::Devnet => "devnet",
            Cluster::Localnet => "localnet",
        };
        f.write_str(s)
    }
}

/// RPC endpoint of each cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub mainnet: String,
    pub devnet: String,
    pub localnet: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            mainnet: "https://api.mainnet-beta.solana.com".to_string(),
            devnet: "https://api.devnet.solana.com".to_string(),
            localnet: "http://127.0.0.1:8899".to_string(),
        }
    }
}

impl Endpoints {
    pub fn url(&self, cluster: Cluster) -> &str {
        match cluster {
            Cluster::Mainnet => &self.mainnet,
            Cluster::Devnet => &self.devnet,
            Cluster::Localnet => &self.localnet,
        }
    }

    /// Resolve the cluster an endpoint belongs to.  Endpoints must match
    /// exactly, except that a trailing slash is ignored and `localhost` and
    /// `127.0.0.1` name the same host.
    pub fn cluster_for(&self, endpoint: &str) -> Result<Cluster, QueryError> {
        let wanted = normalize_endpoint(endpoint);
        [Cluster::Mainnet, Cluster::Devnet, Cluster::Localnet]
            .into_iter()
            .find(|cluster| normalize_endpoint(self.url(*cluster)) == wanted)
            .ok_or_else(|| QueryError::UnknownEndpoint(endpoint.to_string()))
    }
}

fn normalize_endpoint(endpoint: &str) -> String {
    endpoint
        .trim_end_matches('/')
        .replacen("://127.0.0.1", "://localhost", 1)
}

#[cfg(test)]
mod tests {
    use {super::*, assert_matches::assert_matches, test_case::test_case};

    #[test_case("https://api.mainnet-beta.solana.com", Cluster::Mainnet)]
    #[test_case("https://api.devnet.solana.com/", Cluster::Devnet)]
    #[test_case("http://127.0.0.1:8899", Cluster::Localnet)]
    #[test_case("http://localhost:8899", Cluster::Localnet ; "localhost moniker")]
    #[test_case("http://localhost:8899/", Cluster::Localnet ; "localhost trailing slash")]
    fn test_cluster_for_known_endpoints(endpoint: &str, expected: Cluster) {
        assert_eq!(Endpoints::default().cluster_for(endpoint).unwrap(), expected);
    }

    #[test]
    fn test_cluster_for_unknown_endpoint() {
        assert_matches!(
            Endpoints::default().cluster_for("https://example.invalid"),
            Err(QueryError::UnknownEndpoint(url)) if url == "https://example.invalid"
        );
    }

    #[test]
    fn test_localhost_port_must_match() {
        assert_matches!(
            Endpoints::default().cluster_for("http://localhost:9000"),
            Err(QueryError::UnknownEndpoint(_))
        );
    }

    #[test]
    fn test_custom_endpoint_table() {
        let endpoints = Endpoints {
            mainnet: "https://rpc.example.com/abc".to_string(),
            ..Endpoints::default()
        };
        assert_eq!(
            endpoints.cluster_for("https://rpc.example.com/abc").unwrap(),
            Cluster::Mainnet
        );
        assert_eq!(Cluster::Devnet.to_string(), "devnet");
    }
}
