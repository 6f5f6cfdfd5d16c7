// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) -> Protected (JWT auth). Admin-only endpoints live in the
// protected tier and check the caller's roles themselves.
pub mod public;
pub mod protected;

use crate::error::ApiError;
use crate::middleware::AuthUser;

/// Refuse callers without the admin role
pub(crate) fn require_admin(user: &AuthUser) -> Result<(), ApiError> {
    if user.requester().is_admin() {
        Ok(())
    } else {
        Err(ApiError::unauthorized("admin role required"))
    }
}

/// Query strings arrive as text; treat blank values as absent
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
