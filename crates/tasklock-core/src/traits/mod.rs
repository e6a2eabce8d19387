//! Core traits implemented by store backends.

pub mod limiter;

pub use limiter::{ConcurrencyLimiter, MAX_HOLDER_TTL};
