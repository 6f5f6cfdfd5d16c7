// handlers/public/auth.rs - signup, login, logout

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::auth::{generate_jwt, hash_password, validate_password_strength, verify_password};
use crate::database::models::NewUser;
use crate::database::DataError;
use crate::error::ApiError;
use crate::handlers::non_blank;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::SignupResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /auth/signup - Create a user and their main collection
///
/// Returns `{ user, collection }`. 400 when username or password is blank,
/// 409 when the username or email is taken.
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<SignupResult> {
    let Json(payload) = payload?;

    let (Some(username), Some(password)) = (
        non_blank(payload.username.as_deref()),
        payload.password.as_deref().filter(|p| !p.trim().is_empty()),
    ) else {
        return Err(ApiError::bad_request("username and password are required"));
    };
    validate_password_strength(password, state.config.security.password_min_length)
        .map_err(ApiError::bad_request)?;

    let hash = hash_password(password)?;
    let email = non_blank(payload.email.as_deref()).map(str::to_string);
    let new_user = NewUser::with_default_role(username.to_string(), email, hash);

    match state.users().create_user(&new_user).await {
        Ok(result) => Ok(ApiResponse::success(result)),
        Err(DataError::DuplicateKey(_)) => Err(ApiError::conflict("username already used")),
        Err(e) => Err(e.into()),
    }
}

/// POST /auth/login - Exchange credentials for a JWT
///
/// Accepts `username` or `email` with `password`; returns `{ username, token }`.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(payload) = payload?;

    let Some(password) = payload.password.as_deref().filter(|p| !p.trim().is_empty()) else {
        return Err(ApiError::bad_request("password is required"));
    };

    let users = state.users();
    let stored = match (non_blank(payload.username.as_deref()), non_blank(payload.email.as_deref())) {
        (Some(username), _) => users.get_user(username).await?,
        (None, Some(email)) => users.get_user_by_email(email).await?,
        (None, None) => return Err(ApiError::bad_request("username or email is required")),
    };

    let Some(user) = stored else {
        debug!("Login for unknown user");
        return Err(ApiError::unauthorized("could not find user"));
    };
    if !verify_password(password, &user.password)? {
        debug!("Login with wrong password for {}", user.username);
        return Err(ApiError::unauthorized("invalid password"));
    }

    let token = generate_jwt(&user, &state.config.security)?;
    info!("User {} logged in", user.username);
    Ok(ApiResponse::success(json!({
        "username": user.username,
        "token": token
    })))
}

/// POST /auth/logout - Tokens are stateless; acknowledge when one was presented
pub async fn logout(headers: HeaderMap) -> Result<StatusCode, ApiError> {
    if headers.contains_key(AUTHORIZATION) {
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::not_found("no session to log out"))
    }
}
