//! TOML configuration for the router service and CLI.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Debug, Clone, Deserialize)]
pub struct RpcCfg {
    pub url: String,
    #[serde(default = "default_commitment")]
    pub commitment: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCfg {
    pub pool_list_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradeCfg {
    pub slippage_bps: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    pub rpc: RpcCfg,
    pub api: ApiCfg,
    pub trade: TradeCfg,
}

fn default_commitment() -> String {
    "confirmed".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl RouterConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())
            .with_context(|| format!("read config file {}", path.as_ref().display()))?;
        let cfg: Self = toml::from_str(&s).context("parse router config")?;
        Ok(cfg)
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            rpc: RpcCfg {
                url: "https://api.mainnet-beta.solana.com".to_string(),
                commitment: default_commitment(),
            },
            api: ApiCfg {
                pool_list_url: "https://api.raydium.io/v2/sdk/liquidity/mainnet.json"
                    .to_string(),
                timeout_ms: default_timeout_ms(),
            },
            trade: TradeCfg { slippage_bps: 50 },
        }
    }
}
