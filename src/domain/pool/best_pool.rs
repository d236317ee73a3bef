//! Canonicalization of duplicate pool listings for the same mint pair.

use std::collections::HashMap;

use num_bigint::BigUint;
use solana_sdk::pubkey::Pubkey;

use crate::domain::pool::keys::PoolKeys;
use crate::shared::math::ten_pow;

/// A pool as it appears in a list source, with its provenance and the
/// LP supply snapshot the list carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolListing {
    pub keys: PoolKeys,
    pub official: bool,
    pub lp_supply: u64,
}

/// Picks the canonical pool when several listings trade the same pair.
///
/// Selection order: a lone listing wins outright; a lone official listing
/// wins over any number of unofficial ones; otherwise the largest
/// normalized LP supply wins, except that a stable pool never wins a size
/// comparison against a constant-product pool.
pub struct BestPoolSelector;

impl BestPoolSelector {
    /// Selects the canonical listing among candidates for one mint pair.
    pub fn select(group: &[PoolListing]) -> Option<&PoolListing> {
        if group.is_empty() {
            return None;
        }
        let indices: Vec<usize> = (0..group.len()).collect();
        Some(&group[Self::select_among(group, &indices)])
    }

    /// Collapses a mixed pool list to one listing per unordered mint pair,
    /// preserving the input order of the kept listings.
    pub fn dedupe(listings: &[PoolListing]) -> Vec<PoolListing> {
        let mut groups: HashMap<(Pubkey, Pubkey), Vec<usize>> = HashMap::new();
        for (idx, listing) in listings.iter().enumerate() {
            groups.entry(ordered_pair(&listing.keys)).or_default().push(idx);
        }
        let mut kept = vec![false; listings.len()];
        for group in groups.values() {
            kept[Self::select_among(listings, group)] = true;
        }
        listings
            .iter()
            .zip(kept)
            .filter_map(|(listing, keep)| keep.then(|| listing.clone()))
            .collect()
    }

    fn select_among(listings: &[PoolListing], group: &[usize]) -> usize {
        if group.len() == 1 {
            return group[0];
        }
        let officials: Vec<usize> =
            group.iter().copied().filter(|&i| listings[i].official).collect();
        let field: &[usize] = match officials.len() {
            0 => group,
            1 => return officials[0],
            _ => &officials,
        };
        let mut best = field[0];
        for &idx in &field[1..] {
            if Self::beats(&listings[idx], &listings[best]) {
                best = idx;
            }
        }
        best
    }

    fn beats(challenger: &PoolListing, incumbent: &PoolListing) -> bool {
        let challenger_stable = challenger.keys.version.is_stable();
        let incumbent_stable = incumbent.keys.version.is_stable();
        if challenger_stable != incumbent_stable {
            // A stable pool never wins on size against a constant-product pool.
            return incumbent_stable;
        }
        Self::normalized_supply_gt(challenger, incumbent)
    }

    /// `a.lp_supply / 10^a.lp_decimals > b.lp_supply / 10^b.lp_decimals`,
    /// compared exactly by cross multiplication.
    fn normalized_supply_gt(a: &PoolListing, b: &PoolListing) -> bool {
        let lhs = BigUint::from(a.lp_supply) * ten_pow(b.keys.lp_decimals as u32);
        let rhs = BigUint::from(b.lp_supply) * ten_pow(a.keys.lp_decimals as u32);
        lhs > rhs
    }
}

fn ordered_pair(keys: &PoolKeys) -> (Pubkey, Pubkey) {
    if keys.base_mint <= keys.quote_mint {
        (keys.base_mint, keys.quote_mint)
    } else {
        (keys.quote_mint, keys.base_mint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pool::keys::{PoolVersion, AMM_STABLE_PROGRAM, AMM_V4_PROGRAM};

    fn listing(
        base: Pubkey,
        quote: Pubkey,
        version: PoolVersion,
        official: bool,
        lp_supply: u64,
        lp_decimals: u8,
    ) -> PoolListing {
        let program_id = match version {
            PoolVersion::V5 => AMM_STABLE_PROGRAM,
            _ => AMM_V4_PROGRAM,
        };
        PoolListing {
            keys: PoolKeys {
                id: Pubkey::new_unique(),
                base_mint: base,
                quote_mint: quote,
                base_decimals: 9,
                quote_decimals: 6,
                lp_decimals,
                version,
                program_id,
            },
            official,
            lp_supply,
        }
    }

    #[test]
    fn test_single_listing_wins_outright() {
        let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());
        let group = vec![listing(a, b, PoolVersion::V4, false, 1, 9)];
        let best = BestPoolSelector::select(&group).unwrap();
        assert_eq!(best.keys.id, group[0].keys.id);
    }

    #[test]
    fn test_lone_official_beats_larger_unofficial() {
        let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());
        let group = vec![
            listing(a, b, PoolVersion::V4, false, 1_000_000_000, 9),
            listing(a, b, PoolVersion::V4, true, 10, 9),
        ];
        let best = BestPoolSelector::select(&group).unwrap();
        assert_eq!(best.keys.id, group[1].keys.id);
    }

    #[test]
    fn test_constant_product_beats_stable_at_equal_supply() {
        let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());
        let group = vec![
            listing(a, b, PoolVersion::V5, true, 500_000, 9),
            listing(a, b, PoolVersion::V4, true, 500_000, 9),
        ];
        let best = BestPoolSelector::select(&group).unwrap();
        assert_eq!(best.keys.version, PoolVersion::V4);
    }

    #[test]
    fn test_stable_never_wins_on_size() {
        let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());
        let group = vec![
            listing(a, b, PoolVersion::V4, false, 10, 9),
            listing(a, b, PoolVersion::V5, false, u64::MAX, 9),
        ];
        let best = BestPoolSelector::select(&group).unwrap();
        assert_eq!(best.keys.version, PoolVersion::V4);
    }

    #[test]
    fn test_supply_comparison_normalizes_decimals() {
        let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());
        // 200 units at 6 decimals vs 100 units at 9 decimals:
        // 200e6/1e6 = 200 > 100e9/1e9 = 100.
        let group = vec![
            listing(a, b, PoolVersion::V4, false, 100_000_000_000, 9),
            listing(a, b, PoolVersion::V4, false, 200_000_000, 6),
        ];
        let best = BestPoolSelector::select(&group).unwrap();
        assert_eq!(best.keys.id, group[1].keys.id);
    }

    #[test]
    fn test_dedupe_is_pair_order_insensitive() {
        let (a, b, c) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let listings = vec![
            listing(a, b, PoolVersion::V4, false, 100, 9),
            // Same pair written the other way around.
            listing(b, a, PoolVersion::V4, false, 900, 9),
            listing(a, c, PoolVersion::V4, false, 5, 9),
        ];
        let kept = BestPoolSelector::dedupe(&listings);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].keys.id, listings[1].keys.id);
        assert_eq!(kept[1].keys.id, listings[2].keys.id);
    }
}
