//! # tasklock-core
//!
//! Core crate for tasklock. Contains the limiter trait, configuration
//! schemas, task-class and holder identifiers, acquire outcomes,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other tasklock crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
