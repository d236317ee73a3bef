//! Exact integer arithmetic for pool pricing.
//!
//! On-chain programs compute swap amounts with unsigned integer division,
//! so every economic value here is a `BigUint` and every division states
//! its rounding direction. Floating point is never used for amounts.

use num_bigint::BigUint;
use num_traits::{One, Zero};

/// `10^exp` as a big integer, used for decimal normalization.
pub fn ten_pow(exp: u32) -> BigUint {
    BigUint::from(10u32).pow(exp)
}

/// `floor(a * mul / div)`. Returns `None` when `div` is zero.
pub fn mul_div_floor(a: &BigUint, mul: &BigUint, div: &BigUint) -> Option<BigUint> {
    if div.is_zero() {
        return None;
    }
    Some(a * mul / div)
}

/// `ceil(a * mul / div)`. Returns `None` when `div` is zero.
pub fn mul_div_ceil(a: &BigUint, mul: &BigUint, div: &BigUint) -> Option<BigUint> {
    if div.is_zero() {
        return None;
    }
    let product = a * mul;
    Some((product + div - BigUint::one()) / div)
}

/// `ceil(n / d)`. Returns `None` when `d` is zero.
pub fn ceil_div(n: &BigUint, d: &BigUint) -> Option<BigUint> {
    if d.is_zero() {
        return None;
    }
    Some((n + d - BigUint::one()) / d)
}

/// An exact non-negative rational.
///
/// The denominator is guaranteed non-zero by construction. Fractions are
/// not reduced; equality and ordering compare by cross multiplication, so
/// shared factors are harmless and reduction would only burn cycles on the
/// hot pricing path.
#[derive(Debug, Clone, Eq)]
pub struct Fraction {
    numerator: BigUint,
    denominator: BigUint,
}

impl Fraction {
    /// Builds a fraction, rejecting a zero denominator.
    pub fn new(numerator: BigUint, denominator: BigUint) -> Option<Self> {
        if denominator.is_zero() {
            return None;
        }
        Some(Self { numerator, denominator })
    }

    pub fn from_u64s(numerator: u64, denominator: u64) -> Option<Self> {
        Self::new(BigUint::from(numerator), BigUint::from(denominator))
    }

    pub fn from_integer(value: BigUint) -> Self {
        Self { numerator: value, denominator: BigUint::one() }
    }

    pub fn zero() -> Self {
        Self { numerator: BigUint::zero(), denominator: BigUint::one() }
    }

    pub fn one() -> Self {
        Self { numerator: BigUint::one(), denominator: BigUint::one() }
    }

    pub fn numerator(&self) -> &BigUint {
        &self.numerator
    }

    pub fn denominator(&self) -> &BigUint {
        &self.denominator
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    /// Integer part, rounding toward zero.
    pub fn floor(&self) -> BigUint {
        &self.numerator / &self.denominator
    }

    /// Integer part, rounding away from zero.
    pub fn ceil(&self) -> BigUint {
        (&self.numerator + &self.denominator - BigUint::one()) / &self.denominator
    }

    pub fn add(&self, other: &Fraction) -> Fraction {
        Fraction {
            numerator: &self.numerator * &other.denominator
                + &other.numerator * &self.denominator,
            denominator: &self.denominator * &other.denominator,
        }
    }

    pub fn mul(&self, other: &Fraction) -> Fraction {
        Fraction {
            numerator: &self.numerator * &other.numerator,
            denominator: &self.denominator * &other.denominator,
        }
    }

    /// `self - other`; `None` when the result would be negative.
    pub fn checked_sub(&self, other: &Fraction) -> Option<Fraction> {
        let lhs = &self.numerator * &other.denominator;
        let rhs = &other.numerator * &self.denominator;
        if lhs < rhs {
            return None;
        }
        Some(Fraction {
            numerator: lhs - rhs,
            denominator: &self.denominator * &other.denominator,
        })
    }

    /// Reciprocal; `None` when the numerator is zero.
    pub fn invert(&self) -> Option<Fraction> {
        if self.numerator.is_zero() {
            return None;
        }
        Some(Fraction {
            numerator: self.denominator.clone(),
            denominator: self.numerator.clone(),
        })
    }

    /// Renders the exact value with `places` fractional digits, truncated.
    pub fn to_decimal_string(&self, places: usize) -> String {
        let whole = &self.numerator / &self.denominator;
        if places == 0 {
            return whole.to_string();
        }
        let rem = &self.numerator % &self.denominator;
        let scaled = rem * ten_pow(places as u32) / &self.denominator;
        format!("{whole}.{scaled:0>places$}", places = places)
    }
}

impl PartialEq for Fraction {
    // Equality must agree with `cmp`, which ignores representation.
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Cross multiplication keeps the comparison exact.
        let lhs = &self.numerator * &other.denominator;
        let rhs = &other.numerator * &self.denominator;
        lhs.cmp(&rhs)
    }
}

/// A fractional rate such as a slippage tolerance or a price impact.
///
/// Callers supply slippage as an exact `(numerator, denominator)` pair;
/// this type never passes through a float.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Percent(Fraction);

impl Percent {
    pub fn new(numerator: u64, denominator: u64) -> Option<Self> {
        Fraction::from_u64s(numerator, denominator).map(Self)
    }

    /// Basis points over the conventional 10 000 denominator.
    pub fn from_bps(bps: u64) -> Self {
        Self(Fraction {
            numerator: BigUint::from(bps),
            denominator: BigUint::from(10_000u64),
        })
    }

    pub fn zero() -> Self {
        Self(Fraction::zero())
    }

    pub fn from_fraction(fraction: Fraction) -> Self {
        Self(fraction)
    }

    pub fn fraction(&self) -> &Fraction {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn add(&self, other: &Percent) -> Percent {
        Percent(self.0.add(&other.0))
    }

    pub fn to_decimal_string(&self, places: usize) -> String {
        self.0.to_decimal_string(places)
    }
}

/// `floor(amount / (1 + rate))` computed as `amount * d / (n + d)`.
///
/// This is the slippage haircut: with a zero rate the amount passes
/// through unchanged.
pub fn reduce_by_rate(amount: &BigUint, rate: &Percent) -> BigUint {
    let n = rate.fraction().numerator();
    let d = rate.fraction().denominator();
    amount * d / (n + d)
}
