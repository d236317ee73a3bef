//! Mutable on-chain pool snapshots and the status capability table.

use solana_sdk::pubkey::Pubkey;

use crate::domain::pool::keys::PoolVersion;

/// Lifecycle status stored in the first field of an AMM account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolStatus {
    Uninitialized,
    Initialized,
    Disabled,
    RemoveLiquidityOnly,
    LiquidityOnly,
    OrderBook,
    Swap,
    WaitingForStart,
}

impl PoolStatus {
    pub fn from_number(status: u64) -> Option<Self> {
        match status {
            0 => Some(Self::Uninitialized),
            1 => Some(Self::Initialized),
            2 => Some(Self::Disabled),
            3 => Some(Self::RemoveLiquidityOnly),
            4 => Some(Self::LiquidityOnly),
            5 => Some(Self::OrderBook),
            6 => Some(Self::Swap),
            7 => Some(Self::WaitingForStart),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::Disabled => "disabled",
            Self::RemoveLiquidityOnly => "remove_liquidity_only",
            Self::LiquidityOnly => "liquidity_only",
            Self::OrderBook => "order_book",
            Self::Swap => "swap",
            Self::WaitingForStart => "waiting_for_start",
        }
    }

    /// Whether swapping is open at `now` (unix seconds).
    ///
    /// `WaitingForStart` opens at `start_time` inclusive.
    pub fn allows_swap(self, now: u64, start_time: u64) -> bool {
        match self {
            Self::Initialized | Self::Swap => true,
            Self::WaitingForStart => now >= start_time,
            _ => false,
        }
    }

    pub fn allows_add_liquidity(self) -> bool {
        matches!(
            self,
            Self::Initialized
                | Self::LiquidityOnly
                | Self::OrderBook
                | Self::Swap
                | Self::WaitingForStart
        )
    }

    pub fn allows_remove_liquidity(self) -> bool {
        !matches!(self, Self::Uninitialized | Self::Disabled)
    }
}

/// Snapshot of a constant-product pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStateV4 {
    pub status: PoolStatus,
    pub base_reserve: u64,
    pub quote_reserve: u64,
    pub lp_supply: u64,
    pub start_time: u64,
    pub trade_fee_numerator: u64,
    pub trade_fee_denominator: u64,
}

/// Snapshot of a stable-swap pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStateV5 {
    pub status: PoolStatus,
    pub base_reserve: u64,
    pub quote_reserve: u64,
    pub lp_supply: u64,
    pub start_time: u64,
    pub model_data_account: Pubkey,
}

/// On-chain snapshot of a pool, tagged by layout version.
///
/// Replaced wholesale on every refresh; nothing mutates a snapshot in
/// place once it is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolState {
    V4(PoolStateV4),
    V5(PoolStateV5),
}

impl PoolState {
    pub fn version(&self) -> PoolVersion {
        match self {
            Self::V4(_) => PoolVersion::V4,
            Self::V5(_) => PoolVersion::V5,
        }
    }

    pub fn status(&self) -> PoolStatus {
        match self {
            Self::V4(s) => s.status,
            Self::V5(s) => s.status,
        }
    }

    pub fn base_reserve(&self) -> u64 {
        match self {
            Self::V4(s) => s.base_reserve,
            Self::V5(s) => s.base_reserve,
        }
    }

    pub fn quote_reserve(&self) -> u64 {
        match self {
            Self::V4(s) => s.quote_reserve,
            Self::V5(s) => s.quote_reserve,
        }
    }

    pub fn lp_supply(&self) -> u64 {
        match self {
            Self::V4(s) => s.lp_supply,
            Self::V5(s) => s.lp_supply,
        }
    }

    pub fn start_time(&self) -> u64 {
        match self {
            Self::V4(s) => s.start_time,
            Self::V5(s) => s.start_time,
        }
    }

    pub fn allows_swap(&self, now: u64) -> bool {
        self.status().allows_swap(now, self.start_time())
    }

    /// The swap fee ratio for this pool as `(numerator, denominator)`.
    ///
    /// Stable pools charge a fixed 2/10000 regardless of account fields.
    pub fn trade_fee(&self) -> (u64, u64) {
        match self {
            Self::V4(s) => (s.trade_fee_numerator, s.trade_fee_denominator),
            Self::V5(_) => (2, 10_000),
        }
    }
}
