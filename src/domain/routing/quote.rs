//! Composed route results.
//!
//! A [`RouteQuote`] is the outcome of comparing every candidate path for a
//! mint pair. It either describes the winning path leg by leg or, when no
//! candidate priced successfully, carries zero legs and a zero output so the
//! caller can distinguish "nothing tradable" from a failed request.

use num_bigint::BigUint;
use solana_sdk::pubkey::Pubkey;

use crate::domain::pool::PoolVersion;
use crate::shared::math::Percent;
use crate::shared::types::{Price, TokenAmount};

/// Shape of the winning path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteType {
    /// Single pool swap.
    Amm,
    /// Two-hop swap through a middle mint.
    Route,
}

impl RouteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteType::Amm => "amm",
            RouteType::Route => "route",
        }
    }
}

/// One hop of the winning path, with the amounts at the pool boundary.
#[derive(Debug, Clone)]
pub struct RouteLeg {
    pub pool_id: Pubkey,
    pub version: PoolVersion,
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    pub amount_in: TokenAmount,
    pub amount_out: TokenAmount,
}

/// Best route for one request, or the empty result when no path priced.
#[derive(Debug, Clone)]
pub struct RouteQuote {
    pub route_type: RouteType,
    /// Hops in execution order. Empty when no candidate was viable.
    pub routes: Vec<RouteLeg>,
    pub amount_in: TokenAmount,
    pub amount_out: TokenAmount,
    pub min_amount_out: TokenAmount,
    /// Gross output per input across the whole path. `None` when either
    /// side of the trade is zero.
    pub execution_price: Option<Price>,
    pub price_impact: Percent,
    /// Trade fees charged along the path, in hop order.
    pub fees: Vec<TokenAmount>,
    /// Seconds until a pending transfer fee schedule takes over, when one
    /// of the mints carries such a schedule.
    pub expiration_seconds: Option<u64>,
}

impl RouteQuote {
    /// The zero-route result: no legs, zero output, zero impact.
    pub fn empty(input: TokenAmount, output_mint: Pubkey, output_decimals: u8) -> Self {
        Self {
            route_type: RouteType::Amm,
            routes: Vec::new(),
            amount_in: input,
            amount_out: TokenAmount::new(output_mint, BigUint::from(0u64), output_decimals),
            min_amount_out: TokenAmount::new(output_mint, BigUint::from(0u64), output_decimals),
            execution_price: None,
            price_impact: Percent::zero(),
            fees: Vec::new(),
            expiration_seconds: None,
        }
    }

    /// True when no candidate survived pricing.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
