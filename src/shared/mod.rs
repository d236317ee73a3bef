//! Shared components - value types, exact math, errors, and configuration

pub mod config;
pub mod errors;
pub mod math;
pub mod types;
