//! # tasklock-service
//!
//! The public surface of tasklock: [`TaskLocker`] exposes exactly two
//! operations, `try_acquire` and `release`, over whichever store backend the
//! configuration selects. [`retry`] holds the optional calling-layer loop for
//! callers that want to wait for a slot instead of failing fast.

pub mod locker;
pub mod retry;

pub use locker::TaskLocker;
pub use retry::{RetryPolicy, acquire_with_backoff};
