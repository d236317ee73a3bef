//! Static pool identity loaded from the pool-list source.

use solana_sdk::pubkey::Pubkey;

/// Raydium constant-product AMM program (version 4 pools).
pub const AMM_V4_PROGRAM: Pubkey =
    Pubkey::from_str_const("675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8");

/// Raydium stable-swap AMM program (version 5 pools).
pub const AMM_STABLE_PROGRAM: Pubkey =
    Pubkey::from_str_const("5quBtoiQqxF9Jv6KYKctB59NT3gtJD2Y65kdnB1Uev3h");

/// Raydium concentrated-liquidity program (version 6 pools).
pub const CLMM_PROGRAM: Pubkey =
    Pubkey::from_str_const("CAMMCzo5YL8w4VFF8KVHrK22GGUsp5VTaW7grrKgrWqK");

/// The single on-chain account holding the stable-swap model table.
pub const STABLE_MODEL_DATA_ACCOUNT: Pubkey =
    Pubkey::from_str_const("CDSr3ssLcRB6XYPJwAfFt18MZvEZp4LjHcvzBVZ45duo");

/// Program version of a liquidity pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolVersion {
    /// Constant-product AMM.
    V4,
    /// Stable-swap curve priced through the precomputed model table.
    V5,
    /// Concentrated liquidity. Classified for fetching but never priced here.
    V6,
}

impl PoolVersion {
    pub fn from_number(version: u8) -> Option<Self> {
        match version {
            4 => Some(Self::V4),
            5 => Some(Self::V5),
            6 => Some(Self::V6),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Self::V4 => 4,
            Self::V5 => 5,
            Self::V6 => 6,
        }
    }

    pub fn is_stable(self) -> bool {
        matches!(self, Self::V5)
    }

    pub fn is_concentrated(self) -> bool {
        matches!(self, Self::V6)
    }
}

/// Static identity and configuration of a pool.
///
/// Loaded once from the pool-list source and never mutated; the volatile
/// side of a pool lives in `PoolState`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolKeys {
    pub id: Pubkey,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub base_decimals: u8,
    pub quote_decimals: u8,
    pub lp_decimals: u8,
    pub version: PoolVersion,
    pub program_id: Pubkey,
}

impl PoolKeys {
    pub fn contains_mint(&self, mint: &Pubkey) -> bool {
        self.base_mint == *mint || self.quote_mint == *mint
    }

    /// The mint paired with `mint` in this pool, if `mint` belongs to it.
    pub fn other_mint(&self, mint: &Pubkey) -> Option<Pubkey> {
        if self.base_mint == *mint {
            Some(self.quote_mint)
        } else if self.quote_mint == *mint {
            Some(self.base_mint)
        } else {
            None
        }
    }

    /// Whether this pool trades exactly the unordered pair `{a, b}`.
    pub fn pairs(&self, a: &Pubkey, b: &Pubkey) -> bool {
        (self.base_mint == *a && self.quote_mint == *b)
            || (self.base_mint == *b && self.quote_mint == *a)
    }

    pub fn decimals_of(&self, mint: &Pubkey) -> Option<u8> {
        if self.base_mint == *mint {
            Some(self.base_decimals)
        } else if self.quote_mint == *mint {
            Some(self.quote_decimals)
        } else {
            None
        }
    }
}
