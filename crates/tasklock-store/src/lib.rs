//! # tasklock-store
//!
//! Store-backed implementations of
//! [`ConcurrencyLimiter`](tasklock_core::traits::ConcurrencyLimiter):
//!
//! - **redis**: admission and release run as server-side Lua scripts, so the
//!   check and the write are one indivisible round trip shared by every
//!   process talking to the same Redis.
//! - **memory**: a single-process limiter with the same semantics, used for
//!   local runs and tests.
//!
//! The backend is selected at runtime from configuration via [`LimiterManager`].

#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::LimiterManager;
