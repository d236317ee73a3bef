//! Pool identity, on-chain snapshots, and duplicate-listing selection

pub mod best_pool;
pub mod keys;
pub mod state;

pub use best_pool::{BestPoolSelector, PoolListing};
pub use keys::{PoolKeys, PoolVersion};
pub use state::{PoolState, PoolStateV4, PoolStateV5, PoolStatus};
