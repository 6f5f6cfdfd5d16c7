// handlers/protected/admin.rs - demo collection maintenance (admin)

use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::handlers::require_admin;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::DemoReset;
use crate::state::AppState;

/// POST /admin/demo - Rebuild the demo collection from the seed users
pub async fn reset_demo(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<DemoReset> {
    require_admin(&user)?;
    Ok(ApiResponse::success(state.demo().reset_demo_collection().await?))
}

/// DELETE /admin/demo - Purge every demo copy
pub async fn remove_demo(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    require_admin(&user)?;
    let removed = state.demo().remove_demo_collection().await?;
    Ok(ApiResponse::success(json!({ "deletedCount": removed })))
}
