//! Domain layer - pool identity, pricing, and routing logic

pub mod pool;
pub mod pricing;
pub mod routing;
