//! Application layer - the route quoting service

pub mod router;

pub use router::{SwapRequest, SwapRouter};
