// handlers/protected/auth.rs - account management for the authenticated caller

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{hash_password, validate_password_strength};
use crate::database::models::User;
use crate::error::ApiError;
use crate::handlers::require_admin;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::AccountRemoval;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RolesRequest {
    pub roles: Vec<String>,
}

/// PUT /auth/password - Replace the caller's password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<PasswordRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(payload) = payload?;
    let password = payload
        .password
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("password is required"))?;
    validate_password_strength(&password, state.config.security.password_min_length)
        .map_err(ApiError::bad_request)?;

    let hash = hash_password(&password)?;
    if !state.users().update_user_password(&user.id.to_string(), &hash).await? {
        return Err(ApiError::not_found("did not find user"));
    }
    Ok(ApiResponse::success(json!({ "updated": true })))
}

/// DELETE /auth/delete - Remove the caller with their collections and cards
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<AccountRemoval> {
    let removal = state.users().delete_account(&user.id.to_string()).await?;
    if removal.deleted_users == 0 {
        return Err(ApiError::not_found("did not find user"));
    }
    Ok(ApiResponse::success(removal))
}

/// GET /auth/users - Username directory (admin)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Value> {
    require_admin(&user)?;
    let users = state.users().get_all_users().await?;
    Ok(ApiResponse::success(json!({ "users": users })))
}

/// PUT /auth/users/:username/roles - Replace a user's roles (admin)
pub async fn update_roles(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(username): Path<String>,
    payload: Result<Json<RolesRequest>, JsonRejection>,
) -> ApiResult<User> {
    require_admin(&user)?;
    let Json(payload) = payload?;

    let updated = state
        .users()
        .update_user_roles(&username, &payload.roles)
        .await?
        .ok_or_else(|| ApiError::not_found("did not find user"))?;
    Ok(ApiResponse::success(updated))
}
