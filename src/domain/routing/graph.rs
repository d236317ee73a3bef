//! Candidate discovery over a pool list.
//!
//! One linear scan over the deduplicated pool list classifies every pool for
//! a given mint pair: pools trading the pair directly, and pools usable as a
//! first or second hop through a middle mint. The resulting [`RouteGraph`]
//! also splits the participating pool ids by program family so the caller
//! knows which accounts to refresh before pricing.

use std::collections::{BTreeMap, HashSet};

use solana_sdk::pubkey::Pubkey;

use crate::domain::pool::{PoolKeys, PoolVersion};
use crate::shared::errors::GraphError;

/// Pools bridging the request pair through one middle mint.
#[derive(Debug, Clone, Default)]
pub struct MiddleRoutes {
    pub middle_decimals: u8,
    /// Pools pairing the input mint with the middle mint.
    pub in_pools: Vec<PoolKeys>,
    /// Pools pairing the middle mint with the output mint.
    pub out_pools: Vec<PoolKeys>,
}

/// One path the composer can price.
#[derive(Debug, Clone)]
pub enum RouteCandidate {
    Direct { pool: PoolKeys },
    TwoHop { first: PoolKeys, second: PoolKeys },
}

impl RouteCandidate {
    /// Pool ids touched by this candidate, in hop order.
    pub fn pool_ids(&self) -> Vec<Pubkey> {
        match self {
            RouteCandidate::Direct { pool } => vec![pool.id],
            RouteCandidate::TwoHop { first, second } => vec![first.id, second.id],
        }
    }

    /// Checks the hop-adjacency invariant: a two-hop pair must share exactly
    /// one mint, and the remaining two mints must be the request endpoints.
    pub fn is_well_formed(&self, input_mint: &Pubkey, output_mint: &Pubkey) -> bool {
        match self {
            RouteCandidate::Direct { pool } => pool.pairs(input_mint, output_mint),
            RouteCandidate::TwoHop { first, second } => {
                let first_mints: HashSet<Pubkey> = [first.base_mint, first.quote_mint].into();
                let second_mints: HashSet<Pubkey> = [second.base_mint, second.quote_mint].into();
                let shared: HashSet<_> = first_mints.intersection(&second_mints).collect();
                if shared.len() != 1 {
                    return false;
                }
                let outer: HashSet<_> =
                    first_mints.symmetric_difference(&second_mints).copied().collect();
                outer == HashSet::from([*input_mint, *output_mint])
            }
        }
    }
}

/// Candidate index for one request pair, plus the account ids that need a
/// state refresh before any candidate can be priced.
#[derive(Debug, Clone)]
pub struct RouteGraph {
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    /// Decimals of the endpoints as observed on the pool list. `None` when
    /// no listed pool carries the mint.
    pub input_decimals: Option<u8>,
    pub output_decimals: Option<u8>,
    /// Pools trading the pair directly.
    pub direct: Vec<PoolKeys>,
    /// Two-hop buckets keyed by middle mint. Ordered so candidate
    /// enumeration is deterministic.
    pub routes: BTreeMap<Pubkey, MiddleRoutes>,
    /// Participating v4/v5 pools whose AMM state must be refreshed.
    pub amm_pool_ids: Vec<Pubkey>,
    /// Participating concentrated pools, which need tick data instead.
    pub clmm_pool_ids: Vec<Pubkey>,
    /// True when a stable pool participates and the model table is needed.
    pub needs_curve_table: bool,
}

impl RouteGraph {
    /// All paths worth pricing, direct ones first. Two-hop candidates are
    /// every cross pairing of a bucket's in and out pools.
    pub fn candidates(&self) -> Vec<RouteCandidate> {
        let mut out: Vec<RouteCandidate> = self
            .direct
            .iter()
            .map(|pool| RouteCandidate::Direct { pool: pool.clone() })
            .collect();
        for bucket in self.routes.values() {
            for first in &bucket.in_pools {
                for second in &bucket.out_pools {
                    if first.id == second.id {
                        continue;
                    }
                    out.push(RouteCandidate::TwoHop {
                        first: first.clone(),
                        second: second.clone(),
                    });
                }
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.routes.is_empty()
    }
}

/// Builds a [`RouteGraph`] from the static pool list.
pub struct PoolGraphBuilder;

impl PoolGraphBuilder {
    pub fn build(
        input_mint: Pubkey,
        output_mint: Pubkey,
        pools: &[PoolKeys],
    ) -> Result<RouteGraph, GraphError> {
        if input_mint == output_mint {
            return Err(GraphError::IdenticalMints { mint: input_mint });
        }

        let mut direct = Vec::new();
        let mut routes: BTreeMap<Pubkey, MiddleRoutes> = BTreeMap::new();
        let mut input_decimals = None;
        let mut output_decimals = None;

        for pool in pools {
            if pool.base_mint == pool.quote_mint {
                return Err(GraphError::MalformedPool {
                    pool_id: pool.id,
                    field: "base_mint equals quote_mint",
                });
            }
            if input_decimals.is_none() {
                input_decimals = pool.decimals_of(&input_mint);
            }
            if output_decimals.is_none() {
                output_decimals = pool.decimals_of(&output_mint);
            }

            let has_input = pool.contains_mint(&input_mint);
            let has_output = pool.contains_mint(&output_mint);
            if has_input && has_output {
                direct.push(pool.clone());
            } else if has_input {
                // Unreachable `None`: has_input guarantees membership.
                if let Some(middle) = pool.other_mint(&input_mint) {
                    let bucket = routes.entry(middle).or_default();
                    bucket.middle_decimals = pool.decimals_of(&middle).unwrap_or(0);
                    bucket.in_pools.push(pool.clone());
                }
            } else if has_output {
                if let Some(middle) = pool.other_mint(&output_mint) {
                    let bucket = routes.entry(middle).or_default();
                    bucket.middle_decimals = pool.decimals_of(&middle).unwrap_or(0);
                    bucket.out_pools.push(pool.clone());
                }
            }
        }

        // A bucket is only usable with pools on both sides, and a lone pool
        // serving as both hops is a self-loop, not a route.
        routes.retain(|_, bucket| {
            if bucket.in_pools.is_empty() || bucket.out_pools.is_empty() {
                return false;
            }
            !(bucket.in_pools.len() == 1
                && bucket.out_pools.len() == 1
                && bucket.in_pools[0].id == bucket.out_pools[0].id)
        });

        let mut amm_pool_ids = Vec::new();
        let mut clmm_pool_ids = Vec::new();
        let mut seen: HashSet<Pubkey> = HashSet::new();
        let mut needs_curve_table = false;
        {
            let mut classify = |pool: &PoolKeys| {
                if !seen.insert(pool.id) {
                    return;
                }
                match pool.version {
                    PoolVersion::V4 => amm_pool_ids.push(pool.id),
                    PoolVersion::V5 => {
                        amm_pool_ids.push(pool.id);
                        needs_curve_table = true;
                    }
                    PoolVersion::V6 => clmm_pool_ids.push(pool.id),
                }
            };
            for pool in &direct {
                classify(pool);
            }
            for bucket in routes.values() {
                for pool in bucket.in_pools.iter().chain(bucket.out_pools.iter()) {
                    classify(pool);
                }
            }
        }

        Ok(RouteGraph {
            input_mint,
            output_mint,
            input_decimals,
            output_decimals,
            direct,
            routes,
            amm_pool_ids,
            clmm_pool_ids,
            needs_curve_table,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pool::keys::{AMM_STABLE_PROGRAM, AMM_V4_PROGRAM, CLMM_PROGRAM};

    fn pool(base: Pubkey, quote: Pubkey, version: PoolVersion) -> PoolKeys {
        let program_id = match version {
            PoolVersion::V4 => AMM_V4_PROGRAM,
            PoolVersion::V5 => AMM_STABLE_PROGRAM,
            PoolVersion::V6 => CLMM_PROGRAM,
        };
        PoolKeys {
            id: Pubkey::new_unique(),
            base_mint: base,
            quote_mint: quote,
            base_decimals: 6,
            quote_decimals: 6,
            lp_decimals: 6,
            version,
            program_id,
        }
    }

    #[test]
    fn test_direct_and_two_hop_classification() {
        let (sol, usdc, usdt) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let direct = pool(sol, usdc, PoolVersion::V4);
        let leg_in = pool(sol, usdt, PoolVersion::V4);
        let leg_out = pool(usdt, usdc, PoolVersion::V4);
        let unrelated = pool(Pubkey::new_unique(), Pubkey::new_unique(), PoolVersion::V4);

        let graph = PoolGraphBuilder::build(
            sol,
            usdc,
            &[direct.clone(), leg_in.clone(), leg_out.clone(), unrelated],
        )
        .unwrap();

        assert_eq!(graph.direct.len(), 1);
        assert_eq!(graph.direct[0].id, direct.id);
        assert_eq!(graph.routes.len(), 1);
        let bucket = graph.routes.get(&usdt).unwrap();
        assert_eq!(bucket.in_pools[0].id, leg_in.id);
        assert_eq!(bucket.out_pools[0].id, leg_out.id);

        let candidates = graph.candidates();
        assert_eq!(candidates.len(), 2);
        assert!(matches!(&candidates[0], RouteCandidate::Direct { pool } if pool.id == direct.id));
        assert!(matches!(&candidates[1], RouteCandidate::TwoHop { .. }));
    }

    #[test]
    fn test_one_sided_middle_bucket_is_dropped() {
        let (sol, usdc, usdt) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        // Only the input side of the usdt bridge exists.
        let leg_in = pool(sol, usdt, PoolVersion::V4);

        let graph = PoolGraphBuilder::build(sol, usdc, &[leg_in]).unwrap();
        assert!(graph.routes.is_empty());
        assert!(graph.is_empty());
        assert!(graph.candidates().is_empty());
    }

    #[test]
    fn test_malformed_pool_is_rejected() {
        let mint = Pubkey::new_unique();
        let bad = pool(mint, mint, PoolVersion::V4);
        let err = PoolGraphBuilder::build(Pubkey::new_unique(), Pubkey::new_unique(), &[bad.clone()])
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::MalformedPool { pool_id: bad.id, field: "base_mint equals quote_mint" }
        );
    }

    #[test]
    fn test_identical_request_mints_are_rejected() {
        let mint = Pubkey::new_unique();
        let err = PoolGraphBuilder::build(mint, mint, &[]).unwrap_err();
        assert_eq!(err, GraphError::IdenticalMints { mint });
    }

    #[test]
    fn test_fetch_sets_split_by_program_family() {
        let (sol, usdc, usdt) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let v4 = pool(sol, usdc, PoolVersion::V4);
        let v5 = pool(usdc, usdt, PoolVersion::V5);
        let v6 = pool(sol, usdt, PoolVersion::V6);

        let graph =
            PoolGraphBuilder::build(sol, usdc, &[v4.clone(), v5.clone(), v6.clone()]).unwrap();

        // v4 trades the pair directly; v6 bridges sol->usdt, v5 usdt->usdc.
        assert_eq!(graph.amm_pool_ids, vec![v4.id, v5.id]);
        assert_eq!(graph.clmm_pool_ids, vec![v6.id]);
        assert!(graph.needs_curve_table);
    }

    #[test]
    fn test_curve_table_not_requested_without_stable_pools() {
        let (sol, usdc) = (Pubkey::new_unique(), Pubkey::new_unique());
        let v4 = pool(sol, usdc, PoolVersion::V4);
        let graph = PoolGraphBuilder::build(sol, usdc, &[v4]).unwrap();
        assert!(!graph.needs_curve_table);
    }

    #[test]
    fn test_endpoint_decimals_recorded_from_list() {
        let (sol, usdc) = (Pubkey::new_unique(), Pubkey::new_unique());
        let mut keys = pool(sol, usdc, PoolVersion::V4);
        keys.base_decimals = 9;
        keys.quote_decimals = 6;
        let graph = PoolGraphBuilder::build(sol, usdc, &[keys]).unwrap();
        assert_eq!(graph.input_decimals, Some(9));
        assert_eq!(graph.output_decimals, Some(6));
    }

    #[test]
    fn test_every_two_hop_candidate_is_well_formed() {
        // A soup of pools around four mints; every emitted candidate must
        // satisfy the hop-adjacency invariant.
        let mints: Vec<Pubkey> = (0..4).map(|_| Pubkey::new_unique()).collect();
        let mut pools = Vec::new();
        for i in 0..mints.len() {
            for j in (i + 1)..mints.len() {
                pools.push(pool(mints[i], mints[j], PoolVersion::V4));
                pools.push(pool(mints[j], mints[i], PoolVersion::V4));
            }
        }

        let graph = PoolGraphBuilder::build(mints[0], mints[1], &pools).unwrap();
        let candidates = graph.candidates();
        assert!(!candidates.is_empty());
        for candidate in &candidates {
            assert!(candidate.is_well_formed(&mints[0], &mints[1]));
        }
    }
}
