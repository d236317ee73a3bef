//! Best-route selection across every priced candidate.
//!
//! The composer takes the candidate index built by the graph, fresh pool
//! snapshots keyed by pool id, and prices every candidate with the pricer
//! matching its program version. Candidates that fail to price are logged
//! and dropped; the survivor with the highest output wins. When nothing
//! survives the result is the empty quote, not an error, so a caller can
//! tell "no market" apart from a broken request.

use std::collections::HashMap;

use num_bigint::BigUint;
use num_traits::{CheckedSub, Zero};
use solana_sdk::epoch_info::EpochInfo;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::domain::pool::{PoolKeys, PoolState};
use crate::domain::pricing::{
    ConstantProductPricer, FeeAdjuster, StableCurvePricer, StableCurveTable, SwapQuote,
    TransferFeeConfig,
};
use crate::domain::routing::graph::{RouteCandidate, RouteGraph};
use crate::domain::routing::quote::{RouteLeg, RouteQuote, RouteType};
use crate::shared::errors::QuoteError;
use crate::shared::math::{Fraction, Percent};
use crate::shared::types::{Price, TokenAmount};

/// One best-route request.
///
/// `now` is unix seconds and gates pools that have not opened yet. The
/// transfer-fee configs are present only for token-2022 mints that carry
/// the extension; the epoch info is required to pick the active schedule.
#[derive(Debug, Clone)]
pub struct QuoteParams<'a> {
    pub input: TokenAmount,
    pub output_mint: Pubkey,
    pub slippage: Percent,
    pub now: u64,
    pub epoch_info: Option<&'a EpochInfo>,
    pub input_fee_config: Option<&'a TransferFeeConfig>,
    pub output_fee_config: Option<&'a TransferFeeConfig>,
}

/// Prices candidates and keeps the one with the highest output.
pub struct RouteComposer;

impl RouteComposer {
    /// Computes the best route for `params` over `graph`.
    ///
    /// Selection keeps a running best by output amount under strict
    /// greater-than, so among equal outputs the earliest candidate wins
    /// and direct pools beat routed ones on a tie. Input-side transfer
    /// fees come off before any pool is priced; output-side fees come off
    /// the winning amounts afterwards. Leg amounts always show what the
    /// pools themselves saw.
    pub fn best_route(
        graph: &RouteGraph,
        states: &HashMap<Pubkey, PoolState>,
        curve_table: Option<&StableCurveTable>,
        params: &QuoteParams<'_>,
    ) -> RouteQuote {
        let (priced_in, input_expiry) = match (params.input_fee_config, params.epoch_info) {
            (Some(config), Some(epoch_info)) => {
                let adjusted = FeeAdjuster::adjust(&params.input.amount, config, epoch_info, false);
                let net = params.input.amount.checked_sub(&adjusted.fee).unwrap_or_default();
                (net, adjusted.expiration_seconds)
            }
            _ => (params.input.amount.clone(), None),
        };

        let mut best: Option<RouteQuote> = None;
        for candidate in graph.candidates() {
            match Self::price_candidate(graph, states, curve_table, params, &candidate, &priced_in)
            {
                Ok(quote) => {
                    let better = best
                        .as_ref()
                        .map_or(true, |current| quote.amount_out.amount > current.amount_out.amount);
                    if better {
                        best = Some(quote);
                    }
                }
                Err(err) => {
                    debug!(pools = ?candidate.pool_ids(), error = %err, "route candidate skipped");
                }
            }
        }

        let mut quote = best.unwrap_or_else(|| {
            RouteQuote::empty(
                params.input.clone(),
                params.output_mint,
                graph.output_decimals.unwrap_or(0),
            )
        });
        // The user-facing input is what they send, before any transfer fee.
        quote.amount_in = params.input.clone();

        let output_expiry = match (params.output_fee_config, params.epoch_info) {
            (Some(config), Some(epoch_info)) => {
                let out_adj = FeeAdjuster::adjust(&quote.amount_out.amount, config, epoch_info, false);
                let min_adj =
                    FeeAdjuster::adjust(&quote.min_amount_out.amount, config, epoch_info, false);
                quote.amount_out.amount =
                    quote.amount_out.amount.checked_sub(&out_adj.fee).unwrap_or_default();
                quote.min_amount_out.amount =
                    quote.min_amount_out.amount.checked_sub(&min_adj.fee).unwrap_or_default();
                out_adj.expiration_seconds
            }
            _ => None,
        };

        quote.expiration_seconds = merge_expiry(input_expiry, output_expiry);
        quote
    }

    fn price_candidate(
        graph: &RouteGraph,
        states: &HashMap<Pubkey, PoolState>,
        curve_table: Option<&StableCurveTable>,
        params: &QuoteParams<'_>,
        candidate: &RouteCandidate,
        priced_in: &BigUint,
    ) -> Result<RouteQuote, QuoteError> {
        if !candidate.is_well_formed(&graph.input_mint, &graph.output_mint) {
            return Err(QuoteError::NotRoutable {
                pool_id: candidate.pool_ids()[0],
                detail: "hop adjacency violated",
            });
        }
        match candidate {
            RouteCandidate::Direct { pool } => {
                let in_decimals = pool.decimals_of(&graph.input_mint).unwrap_or(0);
                let amount_in =
                    TokenAmount::new(graph.input_mint, priced_in.clone(), in_decimals);
                let swap =
                    Self::price_pool(states, curve_table, params, pool, &amount_in, &params.slippage)?;
                Ok(Self::direct_quote(pool, swap))
            }
            RouteCandidate::TwoHop { first, second } => {
                let in_decimals = first.decimals_of(&graph.input_mint).unwrap_or(0);
                let amount_in =
                    TokenAmount::new(graph.input_mint, priced_in.clone(), in_decimals);
                // The interior hop takes no slippage; its exact output is
                // what the second pool will receive.
                let leg_one = Self::price_pool(
                    states,
                    curve_table,
                    params,
                    first,
                    &amount_in,
                    &Percent::zero(),
                )?;
                let middle_in = leg_one.amount_out.clone();
                let leg_two = Self::price_pool(
                    states,
                    curve_table,
                    params,
                    second,
                    &middle_in,
                    &params.slippage,
                )?;
                Ok(Self::routed_quote(first, second, leg_one, leg_two))
            }
        }
    }

    fn price_pool(
        states: &HashMap<Pubkey, PoolState>,
        curve_table: Option<&StableCurveTable>,
        params: &QuoteParams<'_>,
        pool: &PoolKeys,
        amount_in: &TokenAmount,
        slippage: &Percent,
    ) -> Result<SwapQuote, QuoteError> {
        if pool.version.is_concentrated() {
            return Err(QuoteError::InvalidVersion {
                pool_id: pool.id,
                version: pool.version.number(),
            });
        }
        let state = states
            .get(&pool.id)
            .ok_or(QuoteError::MissingPoolState { pool_id: pool.id })?;
        if state.version() != pool.version {
            return Err(QuoteError::InvalidVersion {
                pool_id: pool.id,
                version: state.version().number(),
            });
        }
        if !state.allows_swap(params.now) {
            return Err(QuoteError::UnsupportedPoolStatus {
                pool_id: pool.id,
                status: state.status().name(),
            });
        }
        match state {
            PoolState::V4(_) => {
                ConstantProductPricer::compute_amount_out(pool, state, amount_in, slippage)
            }
            PoolState::V5(_) => {
                let table = curve_table
                    .ok_or(QuoteError::CurveTableUnavailable { pool_id: pool.id })?;
                StableCurvePricer::compute_amount_out(pool, state, table, amount_in, slippage)
            }
        }
    }

    fn direct_quote(pool: &PoolKeys, swap: SwapQuote) -> RouteQuote {
        let leg = RouteLeg {
            pool_id: pool.id,
            version: pool.version,
            input_mint: swap.amount_in.mint,
            output_mint: swap.amount_out.mint,
            amount_in: swap.amount_in.clone(),
            amount_out: swap.amount_out.clone(),
        };
        RouteQuote {
            route_type: RouteType::Amm,
            routes: vec![leg],
            amount_in: swap.amount_in,
            amount_out: swap.amount_out,
            min_amount_out: swap.min_amount_out,
            execution_price: swap.execution_price,
            price_impact: swap.price_impact,
            fees: vec![swap.fee],
            expiration_seconds: None,
        }
    }

    fn routed_quote(
        first: &PoolKeys,
        second: &PoolKeys,
        leg_one: SwapQuote,
        leg_two: SwapQuote,
    ) -> RouteQuote {
        let legs = vec![
            RouteLeg {
                pool_id: first.id,
                version: first.version,
                input_mint: leg_one.amount_in.mint,
                output_mint: leg_one.amount_out.mint,
                amount_in: leg_one.amount_in.clone(),
                amount_out: leg_one.amount_out.clone(),
            },
            RouteLeg {
                pool_id: second.id,
                version: second.version,
                input_mint: leg_two.amount_in.mint,
                output_mint: leg_two.amount_out.mint,
                amount_in: leg_two.amount_in.clone(),
                amount_out: leg_two.amount_out.clone(),
            },
        ];
        // Gross price over the whole path; per-hop prices live in the legs.
        let execution_price = if leg_one.amount_in.amount.is_zero()
            || leg_two.amount_out.amount.is_zero()
        {
            None
        } else {
            Fraction::new(
                leg_two.amount_out.amount.clone(),
                leg_one.amount_in.amount.clone(),
            )
            .map(|raw| {
                Price::new(
                    leg_one.amount_in.mint,
                    leg_two.amount_out.mint,
                    leg_one.amount_in.decimals,
                    leg_two.amount_out.decimals,
                    raw,
                )
            })
        };
        RouteQuote {
            route_type: RouteType::Route,
            routes: legs,
            amount_in: leg_one.amount_in,
            amount_out: leg_two.amount_out,
            min_amount_out: leg_two.min_amount_out,
            execution_price,
            price_impact: leg_one.price_impact.add(&leg_two.price_impact),
            fees: vec![leg_one.fee, leg_two.fee],
            expiration_seconds: None,
        }
    }
}

fn merge_expiry(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (some, None) => some,
        (None, some) => some,
    }
}
