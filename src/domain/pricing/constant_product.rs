//! Constant-product AMM pricing with protocol fee.

use num_bigint::BigUint;
use num_traits::{CheckedSub, Zero};

use crate::domain::pool::{PoolKeys, PoolState};
use crate::domain::pricing::{price_impact, SwapQuote};
use crate::shared::errors::QuoteError;
use crate::shared::math::{mul_div_floor, reduce_by_rate, Fraction, Percent};
use crate::shared::types::{Price, TokenAmount};

/// Prices swaps against `x * y = k` pools.
///
/// All divisions floor, matching the on-chain program; a quote that rounds
/// differently from the chain reverts the user's transaction.
pub struct ConstantProductPricer;

impl ConstantProductPricer {
    pub fn compute_amount_out(
        keys: &PoolKeys,
        state: &PoolState,
        amount_in: &TokenAmount,
        slippage: &Percent,
    ) -> Result<SwapQuote, QuoteError> {
        let (reserve_in, reserve_out, output_mint, in_decimals, out_decimals) =
            if amount_in.mint == keys.base_mint {
                (
                    state.base_reserve(),
                    state.quote_reserve(),
                    keys.quote_mint,
                    keys.base_decimals,
                    keys.quote_decimals,
                )
            } else if amount_in.mint == keys.quote_mint {
                (
                    state.quote_reserve(),
                    state.base_reserve(),
                    keys.base_mint,
                    keys.quote_decimals,
                    keys.base_decimals,
                )
            } else {
                return Err(QuoteError::NotRoutable {
                    pool_id: keys.id,
                    detail: "input mint not in pool",
                });
            };

        let (fee_numerator, fee_denominator) = state.trade_fee();
        if fee_denominator == 0 {
            return Err(QuoteError::NotRoutable {
                pool_id: keys.id,
                detail: "trade_fee_denominator is zero",
            });
        }

        // Zero input or an empty side prices to zero output, never an error.
        if amount_in.amount.is_zero() || reserve_in == 0 || reserve_out == 0 {
            let raw = Fraction::new(BigUint::from(reserve_out), BigUint::from(reserve_in))
                .unwrap_or_else(Fraction::zero);
            let current_price =
                Price::new(amount_in.mint, output_mint, in_decimals, out_decimals, raw);
            return Ok(SwapQuote {
                amount_in: amount_in.clone(),
                amount_out: TokenAmount::new(output_mint, BigUint::zero(), out_decimals),
                min_amount_out: TokenAmount::new(output_mint, BigUint::zero(), out_decimals),
                current_price,
                execution_price: None,
                price_impact: Percent::zero(),
                fee: TokenAmount::new(amount_in.mint, BigUint::zero(), in_decimals),
            });
        }

        let fee = mul_div_floor(
            &amount_in.amount,
            &BigUint::from(fee_numerator),
            &BigUint::from(fee_denominator),
        )
        .unwrap_or_default();
        let amount_in_with_fee = amount_in.amount.checked_sub(&fee).unwrap_or_default();

        let reserve_in_big = BigUint::from(reserve_in);
        let reserve_out_big = BigUint::from(reserve_out);
        let denominator = &reserve_in_big + &amount_in_with_fee;
        let amount_out = mul_div_floor(&reserve_out_big, &amount_in_with_fee, &denominator)
            .unwrap_or_default();
        let min_amount_out = reduce_by_rate(&amount_out, slippage);

        let current_price = Price::new(
            amount_in.mint,
            output_mint,
            in_decimals,
            out_decimals,
            Fraction::new(reserve_out_big, reserve_in_big).unwrap_or_else(Fraction::zero),
        );
        let execution_price = if !amount_in_with_fee.is_zero() && !amount_out.is_zero() {
            Fraction::new(amount_out.clone(), amount_in_with_fee).map(|raw| {
                Price::new(amount_in.mint, output_mint, in_decimals, out_decimals, raw)
            })
        } else {
            None
        };
        let impact = price_impact(&current_price, execution_price.as_ref());

        Ok(SwapQuote {
            amount_in: amount_in.clone(),
            amount_out: TokenAmount::new(output_mint, amount_out.clone(), out_decimals),
            min_amount_out: TokenAmount::new(output_mint, min_amount_out, out_decimals),
            current_price,
            execution_price,
            price_impact: impact,
            fee: TokenAmount::new(amount_in.mint, fee, in_decimals),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pool::keys::AMM_V4_PROGRAM;
    use crate::domain::pool::{PoolStateV4, PoolStatus, PoolVersion};
    use rand::{Rng, SeedableRng};
    use solana_sdk::pubkey::Pubkey;

    fn pool(base_reserve: u64, quote_reserve: u64) -> (PoolKeys, PoolState) {
        let keys = PoolKeys {
            id: Pubkey::new_unique(),
            base_mint: Pubkey::new_unique(),
            quote_mint: Pubkey::new_unique(),
            base_decimals: 6,
            quote_decimals: 6,
            lp_decimals: 6,
            version: PoolVersion::V4,
            program_id: AMM_V4_PROGRAM,
        };
        let state = PoolState::V4(PoolStateV4 {
            status: PoolStatus::Swap,
            base_reserve,
            quote_reserve,
            lp_supply: 1_000_000,
            start_time: 0,
            trade_fee_numerator: 25,
            trade_fee_denominator: 10_000,
        });
        (keys, state)
    }

    fn amount(mint: Pubkey, value: u64) -> TokenAmount {
        TokenAmount::from_raw_u64(mint, value, 6)
    }

    #[test]
    fn test_regression_fixture() {
        let (keys, state) = pool(1_000_000, 2_000_000);
        let quote = ConstantProductPricer::compute_amount_out(
            &keys,
            &state,
            &amount(keys.base_mint, 10_000),
            &Percent::zero(),
        )
        .unwrap();
        // fee = floor(10_000 * 25 / 10_000) = 25
        assert_eq!(quote.fee.amount, BigUint::from(25u32));
        // amount_out = floor(2_000_000 * 9_975 / 1_009_975) = 19_752
        assert_eq!(quote.amount_out.amount, BigUint::from(19_752u32));
        assert!(quote.execution_price.is_some());
        assert!(!quote.price_impact.is_zero());
    }

    #[test]
    fn test_zero_slippage_is_idempotent() {
        let (keys, state) = pool(5_000_000, 3_000_000);
        let quote = ConstantProductPricer::compute_amount_out(
            &keys,
            &state,
            &amount(keys.base_mint, 123_456),
            &Percent::zero(),
        )
        .unwrap();
        assert_eq!(quote.min_amount_out.amount, quote.amount_out.amount);
    }

    #[test]
    fn test_slippage_reduces_min_amount_out() {
        let (keys, state) = pool(5_000_000, 3_000_000);
        let slippage = Percent::new(1, 100).unwrap();
        let quote = ConstantProductPricer::compute_amount_out(
            &keys,
            &state,
            &amount(keys.base_mint, 123_456),
            &slippage,
        )
        .unwrap();
        let expected =
            &quote.amount_out.amount * BigUint::from(100u32) / BigUint::from(101u32);
        assert_eq!(quote.min_amount_out.amount, expected);
        assert!(quote.min_amount_out.amount < quote.amount_out.amount);
    }

    #[test]
    fn test_quote_to_base_direction_swaps_reserves() {
        let (keys, state) = pool(1_000_000, 2_000_000);
        let quote = ConstantProductPricer::compute_amount_out(
            &keys,
            &state,
            &amount(keys.quote_mint, 10_000),
            &Percent::zero(),
        )
        .unwrap();
        // reserve_in = 2_000_000, reserve_out = 1_000_000:
        // floor(1_000_000 * 9_975 / 2_009_975) = 4_962
        assert_eq!(quote.amount_out.amount, BigUint::from(4_962u32));
        assert_eq!(quote.amount_out.mint, keys.base_mint);
    }

    #[test]
    fn test_zero_amount_prices_to_zero() {
        let (keys, state) = pool(1_000_000, 2_000_000);
        let quote = ConstantProductPricer::compute_amount_out(
            &keys,
            &state,
            &amount(keys.base_mint, 0),
            &Percent::zero(),
        )
        .unwrap();
        assert!(quote.amount_out.amount.is_zero());
        assert!(quote.fee.amount.is_zero());
        assert!(quote.execution_price.is_none());
        assert!(quote.price_impact.is_zero());
    }

    #[test]
    fn test_empty_reserve_prices_to_zero() {
        let (keys, state) = pool(0, 2_000_000);
        let quote = ConstantProductPricer::compute_amount_out(
            &keys,
            &state,
            &amount(keys.base_mint, 10_000),
            &Percent::zero(),
        )
        .unwrap();
        assert!(quote.amount_out.amount.is_zero());
        assert!(quote.execution_price.is_none());
    }

    #[test]
    fn test_foreign_mint_is_rejected() {
        let (keys, state) = pool(1_000_000, 2_000_000);
        let err = ConstantProductPricer::compute_amount_out(
            &keys,
            &state,
            &amount(Pubkey::new_unique(), 10_000),
            &Percent::zero(),
        )
        .unwrap_err();
        assert!(matches!(err, QuoteError::NotRoutable { pool_id, .. } if pool_id == keys.id));
    }

    #[test]
    fn test_output_grows_with_input_and_never_drains_pool() {
        let (keys, state) = pool(10_000_000, 40_000_000);
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let small: u64 = rng.gen_range(1_000..1_000_000);
            let large = small + rng.gen_range(10_000..10_000_000);
            let out_small = ConstantProductPricer::compute_amount_out(
                &keys,
                &state,
                &amount(keys.base_mint, small),
                &Percent::zero(),
            )
            .unwrap()
            .amount_out
            .amount;
            let out_large = ConstantProductPricer::compute_amount_out(
                &keys,
                &state,
                &amount(keys.base_mint, large),
                &Percent::zero(),
            )
            .unwrap()
            .amount_out
            .amount;
            assert!(out_small < out_large, "{small} vs {large}");
            assert!(out_large < BigUint::from(40_000_000u64));
        }
        // Even an absurd input cannot drain the pool.
        let out_max = ConstantProductPricer::compute_amount_out(
            &keys,
            &state,
            &amount(keys.base_mint, u64::MAX),
            &Percent::zero(),
        )
        .unwrap()
        .amount_out
        .amount;
        assert!(out_max < BigUint::from(40_000_000u64));
    }
}
