use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::{make_span_with_request_id, request_id_middleware};

pub mod catalog;
pub mod comments;
pub mod extract;
pub mod lists;
pub mod state;

pub use state::AppState;

/// Creates the application router with all routes.
///
/// The request id is assigned outside the trace layer so every span carries it.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/search", get(catalog::search))
        .route("/trending/:media_type", get(catalog::trending))
        .route("/catalog/:media_type/:tmdb_id", get(catalog::details))
        // Comments
        .route(
            "/titles/:media_type/:tmdb_id/comments",
            get(comments::thread).post(comments::create),
        )
        .route("/comments/:id", delete(comments::delete))
        .route("/comments/:id/like", post(comments::toggle_like))
        // Lists
        .route("/users/:user_id/lists", get(lists::get_lists))
        .route("/users/:user_id/lists/:list_key/items", get(lists::items))
        .route("/me/lists/:list_key", post(lists::update))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
