//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username (case-insensitive, surrounding whitespace ignored).
    #[validate(length(min = 1, max = 64, message = "Username is required"))]
    pub username: String,
}

/// Admin request to enable or disable an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeStatusRequest {
    /// New active flag.
    #[serde(alias = "isActive")]
    pub is_active: bool,
}
