//! Solroute - swap route discovery and AMM pricing for Raydium pools
//! Quotes reproduce on-chain integer math exactly; no floats in pricing

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use application::{SwapRequest, SwapRouter};
pub use domain::pool::{BestPoolSelector, PoolKeys, PoolState, PoolStatus, PoolVersion};
pub use domain::pricing::{ConstantProductPricer, FeeAdjuster, StableCurvePricer, StableCurveTable};
pub use domain::routing::{PoolGraphBuilder, RouteComposer, RouteQuote};
pub use shared::math::Percent;
pub use shared::types::TokenAmount;
