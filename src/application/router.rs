//! Best-route quoting service.
//!
//! `SwapRouter` wires the collaborators around the pricing core: it fetches
//! the pool list, canonicalizes duplicate listings, builds the route graph,
//! runs the one batched state fetch a quote is allowed, and hands everything
//! to the composer. A router instance pins the pool list and the stable
//! curve table it first fetched; refreshing either means constructing a new
//! router.

use anyhow::{Context, Result};
use chrono::Utc;
use solana_sdk::pubkey::Pubkey;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::pool::{BestPoolSelector, PoolKeys, PoolListing};
use crate::domain::pricing::{StableCurveTable, TransferFeeConfig};
use crate::domain::routing::{PoolGraphBuilder, QuoteParams, RouteComposer, RouteQuote};
use crate::infrastructure::api::{PoolList, PoolListSource};
use crate::infrastructure::rpc::ChainSource;
use crate::shared::math::Percent;
use crate::shared::types::TokenAmount;

/// A swap quote request as callers hand it to the router.
#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub input: TokenAmount,
    pub output_mint: Pubkey,
    pub slippage: Percent,
    /// Transfer-fee schedules for token-2022 endpoints, when the caller
    /// knows them. Epoch info is only fetched if one is present.
    pub input_fee_config: Option<TransferFeeConfig>,
    pub output_fee_config: Option<TransferFeeConfig>,
}

impl SwapRequest {
    pub fn new(input: TokenAmount, output_mint: Pubkey, slippage: Percent) -> Self {
        Self { input, output_mint, slippage, input_fee_config: None, output_fee_config: None }
    }
}

pub struct SwapRouter {
    pools: Box<dyn PoolListSource>,
    chain: Box<dyn ChainSource>,
    pool_list: OnceCell<PoolList>,
    curve_table: OnceCell<StableCurveTable>,
}

impl SwapRouter {
    pub fn new(pools: Box<dyn PoolListSource>, chain: Box<dyn ChainSource>) -> Self {
        Self { pools, chain, pool_list: OnceCell::new(), curve_table: OnceCell::new() }
    }

    /// Computes the best route for `request` over the current pool list.
    ///
    /// Returns the empty quote when nothing is tradable; an `Err` means the
    /// request itself or a collaborator failed, not that no route exists.
    pub async fn best_route(&self, request: &SwapRequest) -> Result<RouteQuote> {
        let request_id = Uuid::new_v4();
        let started = Utc::now();
        info!(
            request = %request_id,
            input_mint = %request.input.mint,
            output_mint = %request.output_mint,
            amount_in = %request.input.amount,
            "routing swap"
        );

        let list = self.pool_list().await?;
        let graph = PoolGraphBuilder::build(
            request.input.mint,
            request.output_mint,
            &canonical_keys(list),
        )?;
        if graph.is_empty() {
            info!(request = %request_id, "no candidate pools for the pair");
            return Ok(RouteQuote::empty(
                request.input.clone(),
                request.output_mint,
                graph.output_decimals.unwrap_or(0),
            ));
        }

        let states = self
            .chain
            .fetch_pool_states(&graph.amm_pool_ids)
            .await
            .context("fetch pool states")?;
        let curve_table =
            if graph.needs_curve_table { Some(self.curve_table().await?) } else { None };
        let epoch_info =
            if request.input_fee_config.is_some() || request.output_fee_config.is_some() {
                Some(self.chain.fetch_epoch_info().await.context("fetch epoch info")?)
            } else {
                None
            };

        let params = QuoteParams {
            input: request.input.clone(),
            output_mint: request.output_mint,
            slippage: request.slippage.clone(),
            now: started.timestamp().max(0) as u64,
            epoch_info: epoch_info.as_ref(),
            input_fee_config: request.input_fee_config.as_ref(),
            output_fee_config: request.output_fee_config.as_ref(),
        };
        let quote = RouteComposer::best_route(&graph, &states, curve_table, &params);

        let elapsed_ms = (Utc::now() - started).num_milliseconds();
        info!(
            request = %request_id,
            route_type = quote.route_type.as_str(),
            hops = quote.routes.len(),
            amount_out = %quote.amount_out.amount,
            elapsed_ms,
            "route quoted"
        );
        Ok(quote)
    }

    /// The canonical pool for one mint pair, selected with live LP supplies.
    pub async fn best_pool(
        &self,
        mint_a: &Pubkey,
        mint_b: &Pubkey,
    ) -> Result<Option<PoolListing>> {
        let list = self.pool_list().await?;
        let mut group: Vec<PoolListing> = list
            .listings
            .iter()
            .filter(|listing| listing.keys.pairs(mint_a, mint_b))
            .cloned()
            .collect();
        if group.is_empty() {
            return Ok(None);
        }

        let ids: Vec<Pubkey> = group
            .iter()
            .filter(|listing| !listing.keys.version.is_concentrated())
            .map(|listing| listing.keys.id)
            .collect();
        let states = self.chain.fetch_pool_states(&ids).await.context("fetch pool states")?;
        for listing in &mut group {
            match states.get(&listing.keys.id) {
                Some(state) => listing.lp_supply = state.lp_supply(),
                None => {
                    debug!(pool = %listing.keys.id, "no live state, keeping snapshot supply")
                }
            }
        }
        Ok(BestPoolSelector::select(&group).cloned())
    }

    async fn pool_list(&self) -> Result<&PoolList> {
        self.pool_list
            .get_or_try_init(|| self.pools.fetch_pool_list())
            .await
            .context("fetch pool list")
    }

    async fn curve_table(&self) -> Result<&StableCurveTable> {
        self.curve_table
            .get_or_try_init(|| self.chain.fetch_curve_table())
            .await
            .context("fetch stable curve table")
    }
}

/// Keys for graph construction: amm listings collapsed to one pool per mint
/// pair, concentrated listings passed through. A concentrated pool is never
/// priced here, so it must not displace a priceable pool in selection.
fn canonical_keys(list: &PoolList) -> Vec<PoolKeys> {
    let (concentrated, amm): (Vec<_>, Vec<_>) = list
        .listings
        .iter()
        .cloned()
        .partition(|listing| listing.keys.version.is_concentrated());
    BestPoolSelector::dedupe(&amm)
        .into_iter()
        .chain(concentrated)
        .map(|listing| listing.keys)
        .collect()
}
