use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{Category, MovieId},
    routes::AppState,
    services::catalog::{self, ListRequest, MovieDetailsView, MovieListView},
};

fn first_page() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default = "first_page")]
    pub page: u32,
}

/// Handler for the movie list: a category page, or search results
pub async fn list(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<MovieListView>> {
    tracing::info!(
        request_id = %request_id,
        category = %params.category,
        query = ?params.query,
        page = params.page,
        "Listing movies"
    );

    let wishlist = state.wishlist.snapshot().await;
    let request = ListRequest {
        category: params.category,
        query: params.query,
        page: params.page,
    };

    let view = catalog::list_movies(state.provider.as_ref(), &state.images, &wishlist, request).await?;
    Ok(Json(view))
}

/// Handler for a movie's details page
pub async fn details(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<u64>,
) -> AppResult<Json<MovieDetailsView>> {
    let id = MovieId(id);
    tracing::info!(request_id = %request_id, movie_id = %id, "Fetching movie details");

    let wishlist = state.wishlist.snapshot().await;
    let view = catalog::movie_details(state.provider.as_ref(), &state.images, &wishlist, id).await?;
    Ok(Json(view))
}
