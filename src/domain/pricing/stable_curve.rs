//! Stable-swap pricing over the precomputed model table.
//!
//! The stable program does not expose a closed-form curve. It publishes a
//! table of up to 50,000 normalized `(x, y, price)` samples in one on-chain
//! account; pricing locates the pool on that curve and walks the trade along
//! it. Each call costs two binary searches: one to fit the real reserves to
//! the normalized curve, one to bracket the traded coordinate.

use bytemuck::{Pod, Zeroable};
use num_bigint::BigUint;
use num_traits::{CheckedSub, One, Zero};
use solana_sdk::pubkey::Pubkey;

use crate::domain::pool::{PoolKeys, PoolState};
use crate::domain::pricing::{price_impact, SwapQuote};
use crate::shared::errors::QuoteError;
use crate::shared::math::{mul_div_floor, reduce_by_rate, ten_pow, Fraction, Percent};
use crate::shared::types::{Price, TokenAmount};

/// Hard cap on table length; the on-chain account never exceeds it.
pub const MAX_CURVE_SAMPLES: usize = 50_000;

/// One normalized point of the stable curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct CurveSample {
    pub x: u64,
    pub y: u64,
    pub price: u64,
}

/// The normalized stable-swap curve.
///
/// Samples are ordered by ascending `x` and descending `y`, so the
/// `x * multiplier / y` ratio is strictly increasing. `multiplier` is the
/// fixed-point scale of both that ratio and the `price` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StableCurveTable {
    pub multiplier: u64,
    pub samples: Vec<CurveSample>,
}

impl StableCurveTable {
    /// Whether the table can interpolate at all.
    pub fn is_usable(&self) -> bool {
        self.multiplier > 0 && self.samples.len() >= 2
    }

    fn sample_ratio(&self, sample: &CurveSample) -> Fraction {
        fraction(
            BigUint::from(sample.x) * BigUint::from(self.multiplier),
            BigUint::from(sample.y),
        )
    }

    /// Bracket `i` in `[0, len-2]` such that the ratio axis straddles
    /// `target` between samples `i` and `i + 1`.
    fn ratio_bracket(&self, target: &Fraction) -> Option<usize> {
        let len = self.samples.len();
        if *target < self.sample_ratio(&self.samples[0])
            || *target > self.sample_ratio(&self.samples[len - 1])
        {
            return None;
        }
        let after = self.samples.partition_point(|s| self.sample_ratio(s) <= *target);
        Some((after - 1).min(len - 2))
    }

    /// Bracket on the ascending `x` axis.
    fn x_bracket(&self, target: &Fraction) -> Option<usize> {
        let len = self.samples.len();
        if *target < integer(self.samples[0].x) || *target > integer(self.samples[len - 1].x) {
            return None;
        }
        let after = self.samples.partition_point(|s| integer(s.x) <= *target);
        Some((after - 1).min(len - 2))
    }

    /// Bracket on the descending `y` axis.
    fn y_bracket(&self, target: &Fraction) -> Option<usize> {
        let len = self.samples.len();
        if *target > integer(self.samples[0].y) || *target < integer(self.samples[len - 1].y) {
            return None;
        }
        let after = self.samples.partition_point(|s| integer(s.y) >= *target);
        Some((after - 1).min(len - 2))
    }

    /// Normalized `x` at `ratio` within bracket `i`, by linear interpolation.
    fn x_at_ratio(&self, ratio: &Fraction, i: usize) -> Fraction {
        let (a, b) = (&self.samples[i], &self.samples[i + 1]);
        let ratio_a = self.sample_ratio(a);
        let ratio_b = self.sample_ratio(b);
        let f = span_fraction(ratio, &ratio_a, &ratio_b);
        lerp(a.x, b.x, &f)
    }

    /// `(y, price)` at `x` within bracket `i`, by linear interpolation.
    fn at_x(&self, x: &Fraction, i: usize) -> (Fraction, Fraction) {
        let (a, b) = (&self.samples[i], &self.samples[i + 1]);
        let f = span_fraction(x, &integer(a.x), &integer(b.x));
        (lerp(a.y, b.y, &f), lerp(a.price, b.price, &f))
    }

    /// `(x, price)` at `y` within bracket `i`, by linear interpolation.
    ///
    /// `y` runs downward across the table, so the interpolation fraction is
    /// measured from the larger endpoint.
    fn at_y(&self, y: &Fraction, i: usize) -> (Fraction, Fraction) {
        let (a, b) = (&self.samples[i], &self.samples[i + 1]);
        let f = span_fraction_desc(y, &integer(a.y), &integer(b.y));
        (lerp(a.x, b.x, &f), lerp(a.price, b.price, &f))
    }
}

fn fraction(numerator: BigUint, denominator: BigUint) -> Fraction {
    Fraction::new(numerator, denominator).unwrap_or_else(Fraction::zero)
}

fn integer(value: u64) -> Fraction {
    Fraction::from_integer(BigUint::from(value))
}

/// `(at - from) / (to - from)` clamped into `[0, 1]`, for `from <= to`.
fn span_fraction(at: &Fraction, from: &Fraction, to: &Fraction) -> Fraction {
    let Some(span) = to.checked_sub(from) else {
        return Fraction::zero();
    };
    if span.is_zero() {
        return Fraction::zero();
    }
    let Some(offset) = at.checked_sub(from) else {
        return Fraction::zero();
    };
    let f = offset.mul(&fraction(span.denominator().clone(), span.numerator().clone()));
    if f > Fraction::one() {
        Fraction::one()
    } else {
        f
    }
}

/// `(from - at) / (from - to)` clamped into `[0, 1]`, for `from >= to`.
fn span_fraction_desc(at: &Fraction, from: &Fraction, to: &Fraction) -> Fraction {
    let Some(span) = from.checked_sub(to) else {
        return Fraction::zero();
    };
    if span.is_zero() {
        return Fraction::zero();
    }
    let Some(offset) = from.checked_sub(at) else {
        return Fraction::zero();
    };
    let f = offset.mul(&fraction(span.denominator().clone(), span.numerator().clone()));
    if f > Fraction::one() {
        Fraction::one()
    } else {
        f
    }
}

/// Linear interpolation between two table values; `f` must be in `[0, 1]`.
fn lerp(from: u64, to: u64, f: &Fraction) -> Fraction {
    let start = integer(from);
    if to >= from {
        start.add(&f.mul(&integer(to - from)))
    } else {
        start
            .checked_sub(&f.mul(&integer(from - to)))
            .unwrap_or_else(Fraction::zero)
    }
}

/// Prices swaps against stable pools through the curve table.
pub struct StableCurvePricer;

impl StableCurvePricer {
    pub fn compute_amount_out(
        keys: &PoolKeys,
        state: &PoolState,
        table: &StableCurveTable,
        amount_in: &TokenAmount,
        slippage: &Percent,
    ) -> Result<SwapQuote, QuoteError> {
        let base_in = if amount_in.mint == keys.base_mint {
            true
        } else if amount_in.mint == keys.quote_mint {
            false
        } else {
            return Err(QuoteError::NotRoutable {
                pool_id: keys.id,
                detail: "input mint not in pool",
            });
        };
        if !table.is_usable() {
            return Err(QuoteError::CurveTableUnavailable { pool_id: keys.id });
        }

        let (output_mint, in_decimals, out_decimals) = if base_in {
            (keys.quote_mint, keys.base_decimals, keys.quote_decimals)
        } else {
            (keys.base_mint, keys.quote_decimals, keys.base_decimals)
        };
        // The base side of the pool is the curve's x axis.
        let x_real = state.base_reserve();
        let y_real = state.quote_reserve();

        if amount_in.amount.is_zero() || x_real == 0 || y_real == 0 {
            return Ok(Self::zero_quote(amount_in, output_mint, in_decimals, out_decimals));
        }

        let (fee_numerator, fee_denominator) = state.trade_fee();
        let fee = mul_div_floor(
            &amount_in.amount,
            &BigUint::from(fee_numerator),
            &BigUint::from(fee_denominator),
        )
        .unwrap_or_default();
        let amount_after_fee = match amount_in.amount.checked_sub(&fee) {
            Some(v) if !v.is_zero() => v,
            _ => return Ok(Self::zero_quote(amount_in, output_mint, in_decimals, out_decimals)),
        };

        let multiplier = BigUint::from(table.multiplier);

        // Stage 1: fit the real reserves onto the normalized curve. The
        // y reserve only enters through the ratio; both trade endpoints are
        // read back off the interpolated curve itself.
        let target_ratio = fraction(BigUint::from(x_real) * &multiplier, BigUint::from(y_real));
        let ratio_idx = table.ratio_bracket(&target_ratio).ok_or(
            QuoteError::CurveDomainExceeded { pool_id: keys.id, field: "reserve_ratio" },
        )?;
        let x_table = table.x_at_ratio(&target_ratio, ratio_idx);
        // conversion = x_real * multiplier / x_table; real = table * conversion / multiplier
        let conversion = Fraction::from_integer(BigUint::from(x_real) * &multiplier)
            .mul(&x_table.invert().ok_or(QuoteError::CurveDomainExceeded {
                pool_id: keys.id,
                field: "normalized_x",
            })?);
        let conversion_inv = conversion.invert().ok_or(QuoteError::CurveDomainExceeded {
            pool_id: keys.id,
            field: "conversion",
        })?;

        // Current point on the curve: y and marginal price at x_table.
        let (y_table, price_now) = table.at_x(&x_table, ratio_idx);
        let price_quote_per_base =
            price_now.mul(&fraction(BigUint::one(), multiplier.clone()));

        // Stage 2: walk the trade along the curve.
        let amount_in_table = Fraction::from_integer(amount_after_fee.clone())
            .mul(&Fraction::from_integer(multiplier.clone()))
            .mul(&conversion_inv);
        let amount_out_table = if base_in {
            let x_after = x_table.add(&amount_in_table);
            let bracket = table.x_bracket(&x_after).ok_or(QuoteError::CurveDomainExceeded {
                pool_id: keys.id,
                field: "amount_in",
            })?;
            let (y_after, _) = table.at_x(&x_after, bracket);
            y_table.checked_sub(&y_after).unwrap_or_else(Fraction::zero)
        } else {
            let y_after = y_table.add(&amount_in_table);
            let bracket = table.y_bracket(&y_after).ok_or(QuoteError::CurveDomainExceeded {
                pool_id: keys.id,
                field: "amount_in",
            })?;
            let (x_after, _) = table.at_y(&y_after, bracket);
            x_table.checked_sub(&x_after).unwrap_or_else(Fraction::zero)
        };
        let amount_out = amount_out_table
            .mul(&conversion)
            .mul(&fraction(BigUint::one(), multiplier.clone()))
            .floor();
        let min_amount_out = reduce_by_rate(&amount_out, slippage);

        let price_human = if base_in {
            price_quote_per_base
        } else {
            price_quote_per_base.invert().unwrap_or_else(Fraction::zero)
        };
        let current_price = Price::new(
            amount_in.mint,
            output_mint,
            in_decimals,
            out_decimals,
            // Stored raw so that decimal adjustment lands on the curve price.
            price_human.mul(&fraction(ten_pow(out_decimals as u32), ten_pow(in_decimals as u32))),
        );
        let execution_price = if !amount_out.is_zero() {
            Fraction::new(amount_out.clone(), amount_after_fee).map(|raw| {
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

    fn zero_quote(
        amount_in: &TokenAmount,
        output_mint: Pubkey,
        in_decimals: u8,
        out_decimals: u8,
    ) -> SwapQuote {
        SwapQuote {
            amount_in: amount_in.clone(),
            amount_out: TokenAmount::new(output_mint, BigUint::zero(), out_decimals),
            min_amount_out: TokenAmount::new(output_mint, BigUint::zero(), out_decimals),
            current_price: Price::new(
                amount_in.mint,
                output_mint,
                in_decimals,
                out_decimals,
                Fraction::zero(),
            ),
            execution_price: None,
            price_impact: Percent::zero(),
            fee: TokenAmount::new(amount_in.mint, BigUint::zero(), in_decimals),
        }
    }
}
