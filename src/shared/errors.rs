//! Error types for pricing, routing, and account decoding.
//!
//! Every variant carries the offending pool or account id plus the field
//! that failed, so a skipped candidate is always diagnosable from the logs.

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Errors raised while pricing a single route candidate.
///
/// The route composer catches these per candidate and drops only that
/// candidate; they never abort the overall best-route search.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuoteError {
    #[error("pools not routable through {pool_id}: {detail}")]
    NotRoutable { pool_id: Pubkey, detail: &'static str },

    #[error("pool {pool_id} status {status} does not allow swaps now")]
    UnsupportedPoolStatus { pool_id: Pubkey, status: &'static str },

    #[error("stable curve domain exceeded for pool {pool_id} while bracketing {field}")]
    CurveDomainExceeded { pool_id: Pubkey, field: &'static str },

    #[error("pool {pool_id} has unrecognized version {version}")]
    InvalidVersion { pool_id: Pubkey, version: u8 },

    #[error("no on-chain state supplied for pool {pool_id}")]
    MissingPoolState { pool_id: Pubkey },

    #[error("stable curve table unavailable for pool {pool_id}")]
    CurveTableUnavailable { pool_id: Pubkey },
}

/// Errors raised while building the route graph from a pool list.
///
/// A malformed list leaves no usable partial graph, so these propagate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("malformed pool {pool_id}: {field}")]
    MalformedPool { pool_id: Pubkey, field: &'static str },

    #[error("input and output mint are identical: {mint}")]
    IdenticalMints { mint: Pubkey },
}

/// Errors raised while decoding on-chain account data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("account {account} too short for {field}: need {needed} bytes, have {len}")]
    TooShort { account: Pubkey, field: &'static str, needed: usize, len: usize },

    #[error("account {account} field {field} invalid: {prefix}")]
    InvalidField { account: Pubkey, field: &'static str, prefix: String },
}

impl LayoutError {
    /// Builds an `InvalidField` carrying a hex snippet of the bad bytes.
    pub fn invalid_field(account: Pubkey, field: &'static str, bytes: &[u8]) -> Self {
        let end = bytes.len().min(16);
        Self::InvalidField { account, field, prefix: hex::encode(&bytes[..end]) }
    }
}
