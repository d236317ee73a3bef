//! Chain access for pool snapshots.
//!
//! Reserves never live on the AMM account itself: the account names two
//! vaults and a pnl holdback, and the tradable reserve is the vault balance
//! minus that holdback. A refresh is therefore two batched reads: the AMM
//! accounts, then every referenced vault and LP mint. Pools that fail to
//! decode are dropped with a warning so one corrupt account cannot poison a
//! whole refresh.

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::try_join_all;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::epoch_info::EpochInfo;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, warn};

use crate::domain::pool::keys::{AMM_STABLE_PROGRAM, AMM_V4_PROGRAM, STABLE_MODEL_DATA_ACCOUNT};
use crate::domain::pool::{PoolState, PoolStateV4, PoolStateV5, PoolStatus};
use crate::domain::pricing::StableCurveTable;
use crate::infrastructure::layout::{self, AmmStateV4, AmmStateV5};
use crate::shared::config::RpcCfg;

/// getMultipleAccounts caps the batch at 100 accounts.
const ACCOUNT_BATCH: usize = 100;

/// Read side of the chain, abstracted for tests.
#[async_trait]
pub trait ChainSource: Send + Sync {
    /// Fresh snapshots for the given AMM accounts, keyed by pool id.
    /// Undecodable or missing pools are omitted rather than failing the
    /// batch.
    async fn fetch_pool_states(&self, ids: &[Pubkey]) -> Result<HashMap<Pubkey, PoolState>>;

    /// The stable-swap model table.
    async fn fetch_curve_table(&self) -> Result<StableCurveTable>;

    async fn fetch_epoch_info(&self) -> Result<EpochInfo>;
}

/// [`ChainSource`] over a Solana JSON-RPC endpoint.
pub struct SolanaChainSource {
    client: RpcClient,
}

impl SolanaChainSource {
    pub fn new(cfg: &RpcCfg) -> Self {
        let commitment = commitment_from_str(&cfg.commitment);
        Self { client: RpcClient::new_with_commitment(cfg.url.clone(), commitment) }
    }

    /// Fetches accounts in RPC-sized batches joined concurrently, keeping
    /// owner and data for each account that exists.
    async fn fetch_accounts(
        &self,
        ids: &[Pubkey],
    ) -> Result<HashMap<Pubkey, (Pubkey, Vec<u8>)>> {
        let chunks: Vec<&[Pubkey]> = ids.chunks(ACCOUNT_BATCH).collect();
        let fetched = try_join_all(
            chunks.iter().map(|chunk| self.client.get_multiple_accounts(chunk)),
        )
        .await
        .context("getMultipleAccounts")?;

        let mut out = HashMap::with_capacity(ids.len());
        for (chunk, accounts) in chunks.into_iter().zip(fetched) {
            for (id, account) in chunk.iter().zip(accounts) {
                match account {
                    Some(account) => {
                        out.insert(*id, (account.owner, account.data));
                    }
                    None => debug!(account = %id, "account not found"),
                }
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl ChainSource for SolanaChainSource {
    async fn fetch_pool_states(&self, ids: &[Pubkey]) -> Result<HashMap<Pubkey, PoolState>> {
        let accounts = self.fetch_accounts(ids).await?;

        let mut decoded = Vec::with_capacity(accounts.len());
        let mut referenced = Vec::new();
        for (id, (owner, data)) in &accounts {
            let state = if *owner == AMM_V4_PROGRAM {
                layout::decode_amm_state_v4(id, data).map(DecodedAmm::V4)
            } else if *owner == AMM_STABLE_PROGRAM {
                layout::decode_amm_state_v5(id, data).map(DecodedAmm::V5)
            } else {
                warn!(account = %id, owner = %owner, "account owned by unexpected program");
                continue;
            };
            match state {
                Ok(state) => {
                    let (base_vault, quote_vault, lp_mint) = state.referenced_accounts();
                    referenced.extend([base_vault, quote_vault, lp_mint]);
                    decoded.push((*id, state));
                }
                Err(err) => warn!(account = %id, error = %err, "undecodable pool account"),
            }
        }

        referenced.sort_unstable();
        referenced.dedup();
        let balances = self.fetch_accounts(&referenced).await?;
        let mut states = HashMap::with_capacity(decoded.len());
        for (id, state) in decoded {
            match assemble_state(state, &balances) {
                Ok(pool_state) => {
                    states.insert(id, pool_state);
                }
                Err(reason) => warn!(account = %id, reason, "dropping pool snapshot"),
            }
        }
        Ok(states)
    }

    async fn fetch_curve_table(&self) -> Result<StableCurveTable> {
        let data = self
            .client
            .get_account_data(&STABLE_MODEL_DATA_ACCOUNT)
            .await
            .context("model data account")?;
        Ok(layout::decode_curve_table(&STABLE_MODEL_DATA_ACCOUNT, &data)?)
    }

    async fn fetch_epoch_info(&self) -> Result<EpochInfo> {
        self.client.get_epoch_info().await.context("getEpochInfo")
    }
}

enum DecodedAmm {
    V4(AmmStateV4),
    V5(AmmStateV5),
}

impl DecodedAmm {
    fn referenced_accounts(&self) -> (Pubkey, Pubkey, Pubkey) {
        match self {
            DecodedAmm::V4(raw) => (raw.base_vault, raw.quote_vault, raw.lp_mint),
            DecodedAmm::V5(raw) => (raw.base_vault, raw.quote_vault, raw.lp_mint),
        }
    }
}

/// Combines a decoded AMM account with its vault balances and LP supply.
fn assemble_state(
    decoded: DecodedAmm,
    accounts: &HashMap<Pubkey, (Pubkey, Vec<u8>)>,
) -> Result<PoolState, &'static str> {
    let (base_vault, quote_vault, lp_mint) = decoded.referenced_accounts();
    let base_balance = token_amount_of(accounts, &base_vault).ok_or("base vault unreadable")?;
    let quote_balance = token_amount_of(accounts, &quote_vault).ok_or("quote vault unreadable")?;
    let lp_supply = mint_supply_of(accounts, &lp_mint).ok_or("lp mint unreadable")?;

    match decoded {
        DecodedAmm::V4(raw) => {
            let status = PoolStatus::from_number(raw.status).ok_or("unknown status")?;
            Ok(PoolState::V4(PoolStateV4 {
                status,
                base_reserve: base_balance.saturating_sub(raw.base_need_take_pnl),
                quote_reserve: quote_balance.saturating_sub(raw.quote_need_take_pnl),
                lp_supply,
                start_time: raw.pool_open_time,
                trade_fee_numerator: raw.trade_fee_numerator,
                trade_fee_denominator: raw.trade_fee_denominator,
            }))
        }
        DecodedAmm::V5(raw) => {
            let status = PoolStatus::from_number(raw.status).ok_or("unknown status")?;
            Ok(PoolState::V5(PoolStateV5 {
                status,
                base_reserve: base_balance.saturating_sub(raw.base_need_take_pnl),
                quote_reserve: quote_balance.saturating_sub(raw.quote_need_take_pnl),
                lp_supply,
                start_time: raw.pool_open_time,
                model_data_account: raw.model_data_account,
            }))
        }
    }
}

fn token_amount_of(
    accounts: &HashMap<Pubkey, (Pubkey, Vec<u8>)>,
    key: &Pubkey,
) -> Option<u64> {
    let (_, data) = accounts.get(key)?;
    layout::decode_token_amount(key, data).ok()
}

fn mint_supply_of(accounts: &HashMap<Pubkey, (Pubkey, Vec<u8>)>, key: &Pubkey) -> Option<u64> {
    let (_, data) = accounts.get(key)?;
    layout::decode_mint_supply(key, data).ok().map(|(supply, _)| supply)
}

fn commitment_from_str(value: &str) -> CommitmentConfig {
    match value {
        "processed" => CommitmentConfig::processed(),
        "finalized" => CommitmentConfig::finalized(),
        _ => CommitmentConfig::confirmed(),
    }
}
