//! Route discovery and best-route composition

pub mod compose;
pub mod graph;
pub mod quote;

pub use compose::{QuoteParams, RouteComposer};
pub use graph::{MiddleRoutes, PoolGraphBuilder, RouteCandidate, RouteGraph};
pub use quote::{RouteLeg, RouteQuote, RouteType};
