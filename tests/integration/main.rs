//! Integration tests for the acquire/release protocol.

mod helpers;
mod memory_test;
mod redis_test;
