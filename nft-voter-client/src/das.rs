//! Digital asset lookup over the DAS JSON-RPC API, and the rule deciding
//! which assets carry voting power.

use {
    crate::{
        constants::{DAS_MAX_PAGES, DAS_PAGE_LIMIT},
        error::NftVoterError,
        registrar::Registrar,
    },
    async_trait::async_trait,
    log::*,
    serde::{Deserialize, Serialize},
    serde_json::json,
    solana_pubkey::Pubkey,
    std::{collections::HashSet, future::Future, str::FromStr, time::Duration},
};

const COLLECTION_GROUP_KEY: &str = "collection";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCompression {
    #[serde(default)]
    pub compressed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCreator {
    pub address: String,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetGroup {
    pub group_key: String,
    pub group_value: String,
}

/// The subset of a DAS asset the plugin looks at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalAsset {
    /// Mint address, base58.
    pub id: String,
    #[serde(default)]
    pub compression: AssetCompression,
    #[serde(default)]
    pub grouping: Vec<AssetGroup>,
    #[serde(default)]
    pub creators: Vec<AssetCreator>,
}

impl DigitalAsset {
    pub fn mint(&self) -> Result<Pubkey, NftVoterError> {
        parse_pubkey(&self.id, &self.id)
    }

    /// Collection the asset belongs to, if grouped into one.
    pub fn collection(&self) -> Result<Option<Pubkey>, NftVoterError> {
        self.grouping
            .iter()
            .find(|group| group.group_key == COLLECTION_GROUP_KEY)
            .map(|group| parse_pubkey(&self.id, &group.group_value))
            .transpose()
    }
}

fn parse_pubkey(id: &str, value: &str) -> Result<Pubkey, NftVoterError> {
    Pubkey::from_str(value).map_err(|err| NftVoterError::InvalidAsset {
        id: id.to_string(),
        reason: format!("{value}: {err}"),
    })
}

/// An NFT that counts towards the voter's weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VotingNft {
    pub mint: Pubkey,
    pub collection: Pubkey,
    pub weight: u64,
}

/// Decide whether `asset` carries voting power under `registrar`.
///
/// An asset counts when it is an uncompressed NFT, its first creator is
/// verified, and it belongs to a collection the registrar configures.
pub fn voting_nft(
    asset: &DigitalAsset,
    registrar: &Registrar,
) -> Result<Option<VotingNft>, NftVoterError> {
    if asset.compression.compressed {
        trace!("skipping compressed asset {}", asset.id);
        return Ok(None);
    }
    if !asset.creators.first().is_some_and(|creator| creator.verified) {
        return Ok(None);
    }
    let Some(collection) = asset.collection()? else {
        return Ok(None);
    };
    let Some(config) = registrar.collection_config(&collection) else {
        return Ok(None);
    };
    Ok(Some(VotingNft {
        mint: asset.mint()?,
        collection,
        weight: config.weight,
    }))
}

/// Filter `assets` down to the voter's NFTs, in input order.
pub fn voting_nfts(assets: &[DigitalAsset], registrar: &Registrar) -> Vec<VotingNft> {
    let mut nfts = Vec::new();
    for asset in assets {
        match voting_nft(asset, registrar) {
            Ok(Some(nft)) => nfts.push(nft),
            Ok(None) => {}
            Err(err) => warn!("skipping asset: {err}"),
        }
    }
    nfts
}

/// Summed weight of `nfts`.
pub fn nft_voter_weight(nfts: &[VotingNft]) -> Result<u64, NftVoterError> {
    nfts.iter().try_fold(0u64, |total, nft| {
        total.checked_add(nft.weight).ok_or(NftVoterError::Overflow)
    })
}

/// Source of the assets held by a wallet.
#[async_trait]
pub trait DigitalAssetSource: Send + Sync {
    async fn get_assets_by_owner(&self, owner: &Pubkey) -> Result<Vec<DigitalAsset>, NftVoterError>;
}

#[derive(Debug, Deserialize)]
struct AssetPage {
    #[serde(default)]
    items: Vec<DigitalAsset>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<AssetPage>,
    error: Option<RpcErrorObject>,
}

/// `getAssetsByOwner` over HTTP.
#[derive(Debug, Clone)]
pub struct DasClient {
    http: reqwest::Client,
    url: String,
}

impl DasClient {
    pub fn new(url: impl Into<String>) -> Result<Self, NftVoterError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn get_page(&self, owner: &Pubkey, page: u32) -> Result<AssetPage, NftVoterError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": "realms",
            "method": "getAssetsByOwner",
            "params": {
                "ownerAddress": owner.to_string(),
                "page": page,
                "limit": DAS_PAGE_LIMIT,
            },
        });
        let response: RpcResponse = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if let Some(error) = response.error {
            return Err(NftVoterError::DasRpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(response.result.unwrap_or(AssetPage { items: Vec::new() }))
    }
}

/// Read pages `1..=max_pages` until one comes back short of `page_limit`.
///
/// A full page that adds no asset not already seen also ends the read, so a
/// server ignoring the page number cannot keep the loop going.
async fn collect_pages<F, Fut>(
    page_limit: u32,
    max_pages: u32,
    mut get_page: F,
) -> Result<Vec<DigitalAsset>, NftVoterError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<DigitalAsset>, NftVoterError>>,
{
    let mut assets = Vec::new();
    let mut seen = HashSet::new();
    for page in 1..=max_pages {
        let items = get_page(page).await?;
        let full = u32::try_from(items.len()).is_ok_and(|len| len >= page_limit);
        let before = assets.len();
        assets.extend(items.into_iter().filter(|asset| seen.insert(asset.id.clone())));
        if !full {
            return Ok(assets);
        }
        if assets.len() == before {
            warn!("page {page} repeated earlier assets, stopping");
            return Ok(assets);
        }
    }
    warn!("stopped after {max_pages} full pages");
    Ok(assets)
}

#[async_trait]
impl DigitalAssetSource for DasClient {
    async fn get_assets_by_owner(&self, owner: &Pubkey) -> Result<Vec<DigitalAsset>, NftVoterError> {
        let assets = collect_pages(DAS_PAGE_LIMIT, DAS_MAX_PAGES, |page| async move {
            self.get_page(owner, page).await.map(|response| response.items)
        })
        .await?;
        debug!("{} assets owned by {owner}", assets.len());
        Ok(assets)
    }
}

#[cfg(any(test, feature = "dev-context-only-utils"))]
pub use static_source::StaticAssetSource;

#[cfg(any(test, feature = "dev-context-only-utils"))]
mod static_source {
    use {super::*, std::collections::HashMap};

    /// Fixed asset lists per owner.
    #[derive(Debug, Default)]
    pub struct StaticAssetSource {
        assets: HashMap<Pubkey, Vec<DigitalAsset>>,
    }

    impl StaticAssetSource {
        pub fn with_assets(mut self, owner: Pubkey, assets: Vec<DigitalAsset>) -> Self {
            self.assets.entry(owner).or_default().extend(assets);
            self
        }

        /// A verified, uncompressed NFT of `collection`.
        pub fn nft(mint: &Pubkey, collection: &Pubkey) -> DigitalAsset {
            DigitalAsset {
                id: mint.to_string(),
                compression: AssetCompression::default(),
                grouping: vec![AssetGroup {
                    group_key: COLLECTION_GROUP_KEY.to_string(),
                    group_value: collection.to_string(),
                }],
                creators: vec![AssetCreator {
                    address: collection.to_string(),
                    verified: true,
                }],
            }
        }
    }

    #[async_trait]
    impl DigitalAssetSource for StaticAssetSource {
        async fn get_assets_by_owner(
            &self,
            owner: &Pubkey,
        ) -> Result<Vec<DigitalAsset>, NftVoterError> {
            Ok(self.assets.get(owner).cloned().unwrap_or_default())
        }
    }
}
