//! Common value types shared across the pricing and routing layers.

use num_bigint::BigUint;
use num_traits::Zero;
use solana_sdk::pubkey::Pubkey;

use crate::shared::math::{ten_pow, Fraction};

/// A raw token amount in base units, tagged with its mint and decimals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAmount {
    pub mint: Pubkey,
    pub amount: BigUint,
    pub decimals: u8,
}

impl TokenAmount {
    pub fn new(mint: Pubkey, amount: BigUint, decimals: u8) -> Self {
        Self { mint, amount, decimals }
    }

    pub fn from_raw_u64(mint: Pubkey, amount: u64, decimals: u8) -> Self {
        Self { mint, amount: BigUint::from(amount), decimals }
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Human-readable value with the mint's full decimal precision.
    pub fn to_ui_string(&self) -> String {
        let f = Fraction::new(self.amount.clone(), ten_pow(self.decimals as u32))
            .unwrap_or_else(Fraction::zero);
        f.to_decimal_string(self.decimals as usize)
    }
}

/// An exact price quoting `quote` base units per `base` base unit.
///
/// The raw fraction is in on-chain base units; `adjusted()` rescales by the
/// two mints' decimals to the human-readable value. Keeping both forms exact
/// lets price impact be computed without rounding until the final step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Price {
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub base_decimals: u8,
    pub quote_decimals: u8,
    raw: Fraction,
}

impl Price {
    pub fn new(
        base_mint: Pubkey,
        quote_mint: Pubkey,
        base_decimals: u8,
        quote_decimals: u8,
        raw: Fraction,
    ) -> Self {
        Self { base_mint, quote_mint, base_decimals, quote_decimals, raw }
    }

    /// Price in raw base units (quote units out per base unit in).
    pub fn raw(&self) -> &Fraction {
        &self.raw
    }

    /// Decimal-adjusted price: `raw * 10^base_decimals / 10^quote_decimals`.
    pub fn adjusted(&self) -> Fraction {
        let scale = Fraction::new(
            ten_pow(self.base_decimals as u32),
            ten_pow(self.quote_decimals as u32),
        )
        .unwrap_or_else(Fraction::one);
        self.raw.mul(&scale)
    }

    /// Adjusted value rendered with `places` fractional digits.
    pub fn to_decimal_string(&self, places: usize) -> String {
        self.adjusted().to_decimal_string(places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_amount_ui_string() {
        let amount = TokenAmount::from_raw_u64(Pubkey::new_unique(), 1_500_000, 6);
        assert_eq!(amount.to_ui_string(), "1.500000");
    }

    #[test]
    fn test_price_adjustment() {
        // 2 quote units per base unit in raw terms, base 9 decimals,
        // quote 6 decimals: adjusted = 2 * 10^9 / 10^6 = 2000.
        let price = Price::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            9,
            6,
            Fraction::from_u64s(2, 1).unwrap(),
        );
        assert_eq!(price.to_decimal_string(2), "2000.00");
    }

    #[test]
    fn test_price_adjustment_identity_when_decimals_match() {
        let raw = Fraction::from_u64s(3, 7).unwrap();
        let price = Price::new(Pubkey::new_unique(), Pubkey::new_unique(), 6, 6, raw.clone());
        assert_eq!(price.adjusted().cmp(&raw), std::cmp::Ordering::Equal);
    }
}
