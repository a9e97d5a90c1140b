//! Role guards for admin routes.

use chatdesk_core::config::AdminConfig;
use chatdesk_core::error::AppError;

use crate::extractors::AuthUser;

/// Checks that the authenticated user has the Admin role.
pub fn require_admin(auth: &AuthUser) -> Result<(), AppError> {
    if !auth.is_admin() {
        return Err(AppError::authorization("Admin access required"));
    }
    Ok(())
}

/// Protected accounts may only be acted on by another protected account.
pub fn require_unprotected(
    auth: &AuthUser,
    target_username: &str,
    admin: &AdminConfig,
) -> Result<(), AppError> {
    if admin.is_protected(target_username) && !admin.is_protected(&auth.username) {
        return Err(AppError::authorization("Not allowed"));
    }
    Ok(())
}

