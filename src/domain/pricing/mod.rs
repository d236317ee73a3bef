//! Pool pricing - exact quote computation per pool class

pub mod constant_product;
pub mod stable_curve;
pub mod transfer_fee;

pub use constant_product::ConstantProductPricer;
pub use stable_curve::{CurveSample, StableCurvePricer, StableCurveTable, MAX_CURVE_SAMPLES};
pub use transfer_fee::{AdjustedAmount, FeeAdjuster, TransferFee, TransferFeeConfig};

use num_bigint::BigUint;
use num_traits::Zero;

use crate::shared::math::{Fraction, Percent};
use crate::shared::types::{Price, TokenAmount};

/// Result of pricing one pool for one input amount.
#[derive(Debug, Clone)]
pub struct SwapQuote {
    pub amount_in: TokenAmount,
    pub amount_out: TokenAmount,
    pub min_amount_out: TokenAmount,
    pub current_price: Price,
    /// Undefined when the post-fee input or the output rounds to zero.
    pub execution_price: Option<Price>,
    pub price_impact: Percent,
    pub fee: TokenAmount,
}

const IMPACT_SCALE: u64 = 1_000_000_000;

/// `|execution - current| / current` over decimal-adjusted prices rendered
/// to x1e9 fixed point with floor division.
///
/// Both pool classes go through this same rounding so their impact figures
/// are comparable when a route mixes them.
pub(crate) fn price_impact(current: &Price, execution: Option<&Price>) -> Percent {
    let Some(execution) = execution else {
        return Percent::zero();
    };
    let scale = BigUint::from(IMPACT_SCALE);
    let current_e9 = to_fixed_e9(&current.adjusted(), &scale);
    let execution_e9 = to_fixed_e9(&execution.adjusted(), &scale);
    if current_e9.is_zero() {
        return Percent::zero();
    }
    let diff = if execution_e9 >= current_e9 {
        &execution_e9 - &current_e9
    } else {
        &current_e9 - &execution_e9
    };
    Fraction::new(diff, current_e9)
        .map(Percent::from_fraction)
        .unwrap_or_else(Percent::zero)
}

fn to_fixed_e9(value: &Fraction, scale: &BigUint) -> BigUint {
    value.numerator() * scale / value.denominator()
}
