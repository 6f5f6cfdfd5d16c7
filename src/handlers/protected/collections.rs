// handlers/protected/collections.rs - card collection endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::parse_id;
use crate::database::sort::{CardSort, SortDirection};
use crate::error::ApiError;
use crate::handlers::{non_blank, require_admin};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub get_all: Option<String>,
    pub owner_name: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollectionRequest {
    pub collection_title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCardRequest {
    pub card_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortParams {
    pub sort_by: Option<String>,
    pub asc_desc: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UnlinkParams {
    pub collection: Option<String>,
    pub card: Option<String>,
}

/// GET /collections?getAll=true | ?ownerName=name[&title=title]
pub async fn list_collections(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Value> {
    let Query(params) = params?;
    let collections = state.collections();

    if params.get_all.as_deref() == Some("true") {
        require_admin(&user)?;
        let all = collections.get_all_card_collections().await?;
        return Ok(ApiResponse::success(json!({ "collections": all })));
    }

    let Some(owner_name) = non_blank(params.owner_name.as_deref()) else {
        return Err(ApiError::bad_request("getAll or ownerName is required"));
    };
    if owner_name != user.username && !user.requester().is_admin() {
        return Err(ApiError::unauthorized(
            "user does not have read permissions for these collections",
        ));
    }

    match non_blank(params.title.as_deref()) {
        Some(title) => {
            let collection = collections.get_collection_by_owner_and_title(title, owner_name).await?;
            Ok(ApiResponse::success(json!({ "collection": collection })))
        }
        None => {
            let owned = collections
                .get_card_collections_for_user(owner_name)
                .await?
                .ok_or_else(|| ApiError::not_found("did not find user"))?;
            Ok(ApiResponse::success(json!({ "collections": owned })))
        }
    }
}

/// POST /collections - Create a collection owned by the caller
pub async fn create_collection(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateCollectionRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(payload) = payload?;
    let title = non_blank(payload.collection_title.as_deref())
        .ok_or_else(|| ApiError::bad_request("collectionTitle is required"))?;

    let collection = state.collections().create_card_collection(title, user.id).await?;
    Ok(ApiResponse::success(json!({ "collection": collection })))
}

/// GET /collections/search?search=term - Ranked search over collection titles
pub async fn search_collections(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Value> {
    let Query(params) = params?;
    let term = non_blank(params.search.as_deref()).ok_or_else(|| ApiError::bad_request("search term is required"))?;

    let found = state.collections().search_collections(term).await?;
    if found.is_empty() {
        return Err(ApiError::not_found("no collections matched the search"));
    }
    Ok(ApiResponse::success(json!({ "collections": found })))
}

/// GET /collections/count - Number of collections the caller owns
pub async fn count_collections(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    let count = state.collections().count_collections_for_user(user.id).await?;
    Ok(ApiResponse::success(json!({ "count": count })))
}

/// GET /collections/forcard/:cardId - Collections that contain a card the caller may read
pub async fn collections_for_card(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(card_id): Path<String>,
) -> ApiResult<Value> {
    state
        .cards()
        .get_card(&card_id, &user.requester())
        .await?
        .ok_or_else(|| ApiError::not_found("card not found"))?;

    let found = state.collections().get_collections_for_card(&card_id).await?;
    Ok(ApiResponse::success(json!({ "collections": found })))
}

/// DELETE /collections/forcard?collection=id&card=id - Unlink one card
pub async fn remove_card_from_collection(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    params: Result<Query<UnlinkParams>, QueryRejection>,
) -> ApiResult<Value> {
    let Query(params) = params?;
    let (Some(collection_id), Some(card_id)) = (
        non_blank(params.collection.as_deref()),
        non_blank(params.card.as_deref()),
    ) else {
        return Err(ApiError::bad_request("collection and card are required"));
    };

    let collections = state.collections();
    let id = parse_id(collection_id, "card collection")?;
    collections.authorize_write(id, &user.requester()).await?;

    let removed = collections.remove_card_from_collection(card_id, collection_id).await?;
    if removed == 0 {
        return Err(ApiError::not_found("card is not in collection"));
    }
    Ok(ApiResponse::success(json!({ "deletedCount": removed })))
}

/// GET /collections/:id - The collection with its card count
pub async fn get_collection(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(collection_id): Path<String>,
) -> ApiResult<Value> {
    let collections = state.collections();
    let collection = collections.authorize_read(&collection_id, &user.requester()).await?;
    let card_count = collections.count_cards_in_collection(&collection_id).await?;
    Ok(ApiResponse::success(json!({
        "collection": collection,
        "cardCount": card_count
    })))
}

/// GET /collections/:id/cards?sortBy=year&ascDesc=DESC
pub async fn cards_in_collection(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(collection_id): Path<String>,
    params: Result<Query<SortParams>, QueryRejection>,
) -> ApiResult<Value> {
    let Query(params) = params?;
    let collections = state.collections();
    collections.authorize_read(&collection_id, &user.requester()).await?;

    let cards = collections
        .get_cards_in_collection(
            &collection_id,
            CardSort::parse(params.sort_by.as_deref()),
            SortDirection::parse(params.asc_desc.as_deref()),
        )
        .await?;
    Ok(ApiResponse::success(json!({ "cards": cards })))
}

/// GET /collections/:id/search?search=term - Ranked search within one collection
pub async fn search_in_collection(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(collection_id): Path<String>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Value> {
    let Query(params) = params?;
    let term = non_blank(params.search.as_deref()).ok_or_else(|| ApiError::bad_request("search term is required"))?;

    let collections = state.collections();
    collections.authorize_read(&collection_id, &user.requester()).await?;

    let cards = collections.search_for_card_in_collection(&collection_id, term).await?;
    if cards.is_empty() {
        return Err(ApiError::not_found("no cards matched the search"));
    }
    Ok(ApiResponse::success(json!({ "cards": cards })))
}

/// POST /collections/:id - Add a card to the collection
pub async fn add_card(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(collection_id): Path<String>,
    payload: Result<Json<AddCardRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(payload) = payload?;
    let card_id = non_blank(payload.card_id.as_deref()).ok_or_else(|| ApiError::bad_request("cardId is required"))?;

    let membership = state
        .collections()
        .add_card_to_collection(&collection_id, card_id, &user.requester())
        .await?;
    Ok(ApiResponse::success(json!({ "collectionForCard": membership })))
}

/// PUT /collections/:id - Rename
pub async fn rename_collection(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(collection_id): Path<String>,
    payload: Result<Json<CreateCollectionRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(payload) = payload?;
    let title = non_blank(payload.collection_title.as_deref())
        .ok_or_else(|| ApiError::bad_request("collectionTitle is required"))?;

    let collection = state
        .collections()
        .update_card_collection_title(&collection_id, &user.requester(), title)
        .await?;
    Ok(ApiResponse::success(json!({ "collection": collection })))
}

/// DELETE /collections/:id - Remove the collection and its memberships
pub async fn delete_collection(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(collection_id): Path<String>,
) -> ApiResult<Value> {
    let deleted = state
        .collections()
        .remove_card_collection_as(&collection_id, &user.requester())
        .await?;
    if deleted == 0 {
        return Err(ApiError::not_found("did not find card collection"));
    }
    Ok(ApiResponse::success(json!({ "deletedCount": deleted })))
}
