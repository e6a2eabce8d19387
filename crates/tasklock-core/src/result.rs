//! Convenience result type alias for tasklock.

use crate::error::AppError;

/// A specialized `Result` type for tasklock operations.
pub type AppResult<T> = Result<T, AppError>;
