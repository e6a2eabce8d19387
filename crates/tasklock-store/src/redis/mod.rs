//! Redis-backed limiter.

pub mod client;
pub mod limiter;
pub mod scripts;

pub use client::RedisClient;
pub use limiter::RedisLimiter;
