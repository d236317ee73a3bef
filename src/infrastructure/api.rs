//! Pool-list clients.
//!
//! The canonical pool list is the Raydium liquidity file: a JSON document
//! with `official` and `unOfficial` arrays of pool keys. Listings with a
//! version this crate cannot price, or with unparseable addresses, are
//! skipped with a warning instead of failing the whole list.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use tracing::{info, warn};

use crate::domain::pool::{PoolKeys, PoolListing, PoolVersion};
use crate::shared::config::ApiCfg;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiquidityFile {
    #[serde(default)]
    official: Vec<PoolListEntry>,
    #[serde(default)]
    un_official: Vec<PoolListEntry>,
}

/// One listing from the liquidity file. Unknown fields are ignored; the
/// file carries far more than quoting needs. `lpSupply` is optional: the
/// hosted list omits it, user-local lists may pin a snapshot value for
/// duplicate-pool selection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolListEntry {
    pub id: String,
    pub base_mint: String,
    pub quote_mint: String,
    pub base_decimals: u8,
    pub quote_decimals: u8,
    pub lp_decimals: u8,
    pub version: u8,
    pub program_id: String,
    #[serde(default)]
    pub lp_supply: u64,
}

impl PoolListEntry {
    pub fn to_keys(&self) -> Result<PoolKeys> {
        let version = PoolVersion::from_number(self.version)
            .ok_or_else(|| anyhow!("unsupported pool version {}", self.version))?;
        Ok(PoolKeys {
            id: Pubkey::from_str(&self.id).with_context(|| format!("pool id {}", self.id))?,
            base_mint: Pubkey::from_str(&self.base_mint)
                .with_context(|| format!("base mint {}", self.base_mint))?,
            quote_mint: Pubkey::from_str(&self.quote_mint)
                .with_context(|| format!("quote mint {}", self.quote_mint))?,
            base_decimals: self.base_decimals,
            quote_decimals: self.quote_decimals,
            lp_decimals: self.lp_decimals,
            version,
            program_id: Pubkey::from_str(&self.program_id)
                .with_context(|| format!("program id {}", self.program_id))?,
        })
    }
}

/// The parsed pool list, official listings first, each tagged with its
/// provenance and snapshot LP supply.
#[derive(Debug, Clone, Default)]
pub struct PoolList {
    pub listings: Vec<PoolListing>,
}

impl PoolList {
    pub fn parse(bytes: &[u8]) -> Result<PoolList> {
        let file: LiquidityFile =
            serde_json::from_slice(bytes).context("parse liquidity file")?;
        let mut listings = convert(&file.official, true);
        listings.extend(convert(&file.un_official, false));
        Ok(PoolList { listings })
    }

    /// Keys of every listed pool, preserving list order.
    pub fn keys(&self) -> Vec<PoolKeys> {
        self.listings.iter().map(|listing| listing.keys.clone()).collect()
    }

    pub fn is_official(&self, id: &Pubkey) -> bool {
        self.listings.iter().any(|listing| listing.official && listing.keys.id == *id)
    }

    pub fn official_count(&self) -> usize {
        self.listings.iter().filter(|listing| listing.official).count()
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

fn convert(entries: &[PoolListEntry], official: bool) -> Vec<PoolListing> {
    entries
        .iter()
        .filter_map(|entry| match entry.to_keys() {
            Ok(keys) => Some(PoolListing { keys, official, lp_supply: entry.lp_supply }),
            Err(err) => {
                warn!(pool = %entry.id, error = %err, "skipping unusable pool listing");
                None
            }
        })
        .collect()
}

/// Where the pool list comes from.
#[async_trait]
pub trait PoolListSource: Send + Sync {
    async fn fetch_pool_list(&self) -> Result<PoolList>;
}

/// Fetches the liquidity file over HTTP.
pub struct HttpPoolListClient {
    http: Client,
    url: String,
}

impl HttpPoolListClient {
    pub fn new(cfg: &ApiCfg) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .context("build http client")?;
        Ok(Self { http, url: cfg.pool_list_url.clone() })
    }
}

#[async_trait]
impl PoolListSource for HttpPoolListClient {
    async fn fetch_pool_list(&self) -> Result<PoolList> {
        info!(url = %self.url, "fetching pool list");
        let response = self.http.get(&self.url).send().await.context("pool list request")?;
        if !response.status().is_success() {
            return Err(anyhow!("pool list request failed with status {}", response.status()));
        }
        let bytes = response.bytes().await.context("pool list body")?;
        let list = PoolList::parse(&bytes)?;
        info!(
            official = list.official_count(),
            unofficial = list.len() - list.official_count(),
            "pool list loaded"
        );
        Ok(list)
    }
}

/// Reads a saved liquidity file from disk, for quoting without the API.
pub struct FilePoolListSource {
    path: PathBuf,
}

impl FilePoolListSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PoolListSource for FilePoolListSource {
    async fn fetch_pool_list(&self) -> Result<PoolList> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("read pool list {}", self.path.display()))?;
        PoolList::parse(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pool::keys::{AMM_STABLE_PROGRAM, AMM_V4_PROGRAM};
    use serde_json::json;

    fn entry_json(id: &Pubkey, version: u8, program: &Pubkey) -> serde_json::Value {
        json!({
            "id": id.to_string(),
            "baseMint": Pubkey::new_unique().to_string(),
            "quoteMint": Pubkey::new_unique().to_string(),
            "lpMint": Pubkey::new_unique().to_string(),
            "baseDecimals": 9,
            "quoteDecimals": 6,
            "lpDecimals": 9,
            "version": version,
            "programId": program.to_string(),
            "marketId": Pubkey::new_unique().to_string(),
        })
    }

    #[test]
    fn test_parse_splits_provenance_and_skips_bad_entries() {
        let official_id = Pubkey::new_unique();
        let unofficial_id = Pubkey::new_unique();
        let file = json!({
            "name": "mainnet",
            "official": [entry_json(&official_id, 4, &AMM_V4_PROGRAM)],
            "unOfficial": [
                entry_json(&unofficial_id, 5, &AMM_STABLE_PROGRAM),
                entry_json(&Pubkey::new_unique(), 7, &AMM_V4_PROGRAM),
                {
                    "id": "not-a-pubkey",
                    "baseMint": Pubkey::new_unique().to_string(),
                    "quoteMint": Pubkey::new_unique().to_string(),
                    "baseDecimals": 6,
                    "quoteDecimals": 6,
                    "lpDecimals": 6,
                    "version": 4,
                    "programId": AMM_V4_PROGRAM.to_string(),
                },
            ],
        });

        let list = PoolList::parse(serde_json::to_vec(&file).unwrap().as_slice()).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.official_count(), 1);
        assert_eq!(list.listings[0].keys.id, official_id);
        assert_eq!(list.listings[0].keys.version, PoolVersion::V4);
        assert!(list.listings[0].official);
        assert_eq!(list.listings[1].keys.id, unofficial_id);
        assert_eq!(list.listings[1].keys.version, PoolVersion::V5);
        assert!(!list.listings[1].official);
        assert!(list.is_official(&official_id));
        assert!(!list.is_official(&unofficial_id));
    }

    #[test]
    fn test_keys_lists_official_first() {
        let official_id = Pubkey::new_unique();
        let unofficial_id = Pubkey::new_unique();
        let file = json!({
            "official": [entry_json(&official_id, 4, &AMM_V4_PROGRAM)],
            "unOfficial": [entry_json(&unofficial_id, 4, &AMM_V4_PROGRAM)],
        });

        let list = PoolList::parse(serde_json::to_vec(&file).unwrap().as_slice()).unwrap();
        let keys = list.keys();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].id, official_id);
        assert_eq!(keys[1].id, unofficial_id);
    }

    #[test]
    fn test_lp_supply_defaults_to_zero_and_parses_when_present() {
        let id = Pubkey::new_unique();
        let mut with_supply = entry_json(&id, 4, &AMM_V4_PROGRAM);
        with_supply["lpSupply"] = json!(777_000u64);
        let file = json!({
            "official": [with_supply],
            "unOfficial": [entry_json(&Pubkey::new_unique(), 4, &AMM_V4_PROGRAM)],
        });

        let list = PoolList::parse(serde_json::to_vec(&file).unwrap().as_slice()).unwrap();
        assert_eq!(list.listings[0].lp_supply, 777_000);
        assert_eq!(list.listings[1].lp_supply, 0);
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let list = PoolList::parse(br#"{"name": "mainnet"}"#).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_garbage_json_is_an_error() {
        assert!(PoolList::parse(b"not json").is_err());
    }
}
