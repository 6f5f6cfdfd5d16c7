use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::database::DatabaseManager;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Full application router with global middleware
pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .merge(auth_routes())
        .merge(card_routes())
        .merge(collection_routes())
        .merge(admin_routes())
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected
        .merge(protected_routes)
        // Global middleware, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.security.cors_origins))
                .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes)),
        )
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
}

fn auth_routes() -> Router<AppState> {
    use axum::routing::delete;
    use protected::auth;

    Router::new()
        .route("/auth/password", put(auth::change_password))
        .route("/auth/delete", delete(auth::delete_account))
        .route("/auth/users", get(auth::list_users))
        .route("/auth/users/:username/roles", put(auth::update_roles))
}

fn card_routes() -> Router<AppState> {
    use protected::cards;

    Router::new()
        .route("/cards", get(cards::list_cards).post(cards::create_card))
        .route("/cards/search", get(cards::search_cards))
        .route("/cards/cert/:company/:cert", get(cards::get_card_by_cert))
        .route(
            "/cards/:id",
            get(cards::get_card).put(cards::update_card).delete(cards::delete_card),
        )
}

fn collection_routes() -> Router<AppState> {
    use protected::collections;

    Router::new()
        .route(
            "/collections",
            get(collections::list_collections).post(collections::create_collection),
        )
        .route("/collections/search", get(collections::search_collections))
        .route("/collections/count", get(collections::count_collections))
        .route("/collections/forcard", axum::routing::delete(collections::remove_card_from_collection))
        .route("/collections/forcard/:card_id", get(collections::collections_for_card))
        .route(
            "/collections/:id",
            get(collections::get_collection)
                .post(collections::add_card)
                .put(collections::rename_collection)
                .delete(collections::delete_collection),
        )
        .route("/collections/:id/cards", get(collections::cards_in_collection))
        .route("/collections/:id/search", get(collections::search_in_collection))
}

fn admin_routes() -> Router<AppState> {
    use protected::admin;

    Router::new().route("/admin/demo", post(admin::reset_demo).delete(admin::remove_demo))
}

/// Only an explicit `*` allows every origin; an empty list allows none
fn cors_layer(origins: &[String]) -> CorsLayer {
    match allowed_origins(origins) {
        None => CorsLayer::permissive(),
        Some(allowed) => CorsLayer::new().allow_origin(allowed).allow_methods(Any).allow_headers(Any),
    }
}

/// `None` means any origin
fn allowed_origins(origins: &[String]) -> Option<Vec<HeaderValue>> {
    if origins.iter().any(|o| o.trim() == "*") {
        return None;
    }
    if origins.is_empty() {
        warn!("No CORS origins configured; cross-origin requests will be refused");
    }

    Some(
        origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin {}", origin);
                    None
                }
            })
            .collect(),
    )
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Cardvault API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Graded trading card collections",
            "endpoints": {
                "auth": "/auth/signup, /auth/login, /auth/logout (public); /auth/password, /auth/delete, /auth/users (protected)",
                "cards": "/cards[/:id], /cards/search, /cards/cert/:company/:cert (protected)",
                "collections": "/collections[/:id], /collections/search, /collections/forcard (protected)",
                "admin": "/admin/demo (admin)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "code": "SERVICE_UNAVAILABLE",
                "data": { "status": "degraded", "timestamp": now, "database_error": e.to_string() }
            })),
        ),
    }
}
