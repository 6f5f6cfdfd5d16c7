// handlers/protected/cards.rs - trading card endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{CardPatch, NewCard};
use crate::error::ApiError;
use crate::handlers::{non_blank, require_admin};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

/// POST /cards - Create a card in the caller's main collection
pub async fn create_card(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<NewCard>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(card) = payload?;
    let card = state
        .cards()
        .create_card_in_main_collection(&card, &user.requester())
        .await?;
    Ok(ApiResponse::success(json!({ "card": card })))
}

/// GET /cards - Every card (admin)
pub async fn list_cards(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    require_admin(&user)?;
    let cards = state.cards().get_all_cards().await?;
    Ok(ApiResponse::success(json!({ "cards": cards })))
}

/// GET /cards/search?search=term - Ranked full-text search
pub async fn search_cards(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Value> {
    let Query(params) = params?;
    let term = non_blank(params.search.as_deref()).ok_or_else(|| ApiError::bad_request("search term is required"))?;

    let cards = state.cards().search(term).await?;
    if cards.is_empty() {
        return Err(ApiError::not_found("no cards matched the search"));
    }
    Ok(ApiResponse::success(json!({ "cards": cards })))
}

/// GET /cards/cert/:company/:cert - Lookup by grading company and certification number
pub async fn get_card_by_cert(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((company, cert)): Path<(String, String)>,
) -> ApiResult<Value> {
    let cards = state.cards();
    let found = cards
        .get_card_by_cert(&company, &cert)
        .await?
        .ok_or_else(|| ApiError::not_found("card not found"))?;

    // Same read rules as a lookup by id
    let card = cards
        .get_card(&found.id.to_string(), &user.requester())
        .await?
        .ok_or_else(|| ApiError::not_found("card not found"))?;
    Ok(ApiResponse::success(json!({ "card": card })))
}

/// GET /cards/:id
pub async fn get_card(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(card_id): Path<String>,
) -> ApiResult<Value> {
    let card = state
        .cards()
        .get_card(&card_id, &user.requester())
        .await?
        .ok_or_else(|| ApiError::not_found("card not found"))?;
    Ok(ApiResponse::success(json!({ "card": card })))
}

/// PUT /cards/:id - Partial update; owner or admin
pub async fn update_card(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(card_id): Path<String>,
    payload: Result<Json<CardPatch>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(patch) = payload?;
    if patch.is_empty() {
        return Err(ApiError::bad_request("no card fields to update"));
    }

    let card = state
        .cards()
        .update_card(&card_id, &patch, &user.requester())
        .await?
        .ok_or_else(|| ApiError::not_found("card not found"))?;
    Ok(ApiResponse::success(json!({ "card": card })))
}

/// DELETE /cards/:id - Remove the card and its memberships; owner or admin
pub async fn delete_card(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(card_id): Path<String>,
) -> ApiResult<Value> {
    let deleted = state.cards().delete_card(&card_id, &user.requester()).await?;
    if deleted == 0 {
        return Err(ApiError::not_found("card not found"));
    }
    Ok(ApiResponse::success(json!({ "deletedCount": deleted })))
}
