//! Off-chain and on-chain data access - pool list API, account layouts, RPC

pub mod api;
pub mod layout;
pub mod rpc;

pub use api::{FilePoolListSource, HttpPoolListClient, PoolList, PoolListEntry, PoolListSource};
pub use rpc::{ChainSource, SolanaChainSource};
