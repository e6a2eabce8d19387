//! In-memory limiter.

pub mod limiter;

pub use limiter::MemoryLimiter;
