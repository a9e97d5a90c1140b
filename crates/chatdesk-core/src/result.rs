//! Convenience result type alias for Chatdesk.

use crate::error::AppError;

/// A specialized `Result` type for Chatdesk operations.
pub type AppResult<T> = Result<T, AppError>;
