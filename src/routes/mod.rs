use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{ImageUrls, MovieProvider, WishlistService},
};

pub mod movies;
pub mod wishlist;

/// Shared application state
///
/// There is exactly one `WishlistService` per process; every handler reaches
/// it through this state.
#[derive(Clone)]
pub struct AppState {
    pub wishlist: Arc<WishlistService>,
    pub provider: Arc<dyn MovieProvider>,
    pub images: ImageUrls,
}

impl AppState {
    pub fn new(
        wishlist: Arc<WishlistService>,
        provider: Arc<dyn MovieProvider>,
        images: ImageUrls,
    ) -> Self {
        Self {
            wishlist,
            provider,
            images,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/movies", get(movies::list))
        .route("/movies/:id", get(movies::details))
        // Wishlist
        .route("/wishlist", get(wishlist::get_wishlist))
        .route("/wishlist/count", get(wishlist::count))
        .route("/wishlist/movies", get(wishlist::movies))
        .route("/wishlist/events", get(wishlist::events))
        .route(
            "/wishlist/items/:id",
            put(wishlist::add).delete(wishlist::remove),
        )
        .route("/wishlist/items/:id/toggle", post(wishlist::toggle))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
