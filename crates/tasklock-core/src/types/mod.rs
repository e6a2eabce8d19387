//! Shared domain types.

pub mod holder;
pub mod outcome;
pub mod strategy;

pub use holder::{HolderKey, TaskClass};
pub use outcome::{AcquireOutcome, ClassStatus};
pub use strategy::CountingStrategy;
