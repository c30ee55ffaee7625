use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Extension, Json,
};
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{MovieId, Wishlist},
    routes::AppState,
    services::catalog::{self, WishlistMoviesView},
};

#[derive(Debug, Serialize)]
pub struct WishlistResponse {
    pub ids: Vec<MovieId>,
    pub count: usize,
}

impl From<&Wishlist> for WishlistResponse {
    fn from(wishlist: &Wishlist) -> Self {
        Self {
            ids: wishlist.entries().to_vec(),
            count: wishlist.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub id: MovieId,
    pub in_wishlist: bool,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct WishlistMoviesParams {
    #[serde(default)]
    pub q: Option<String>,
}

/// Current wishlist ids, in insertion order
pub async fn get_wishlist(State(state): State<AppState>) -> Json<WishlistResponse> {
    let wishlist = state.wishlist.snapshot().await;
    Json(WishlistResponse::from(&wishlist))
}

/// Navbar badge count
pub async fn count(State(state): State<AppState>) -> Json<CountResponse> {
    Json(CountResponse {
        count: state.wishlist.size().await,
    })
}

/// Wishlist page: details for every saved movie, optionally filtered by title
pub async fn movies(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<WishlistMoviesParams>,
) -> AppResult<Json<WishlistMoviesView>> {
    let wishlist = state.wishlist.snapshot().await;
    tracing::info!(
        request_id = %request_id,
        entries = wishlist.len(),
        filter = ?params.q,
        "Fetching wishlist movies"
    );

    let view = catalog::wishlist_movies(
        state.provider.clone(),
        &state.images,
        &wishlist,
        params.q.as_deref(),
    )
    .await?;
    Ok(Json(view))
}

pub async fn add(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<u64>,
) -> Json<WishlistResponse> {
    let id = MovieId(id);
    let update = state.wishlist.add(id).await;
    tracing::debug!(request_id = %request_id, movie_id = %id, added = update.changed, "Add to wishlist");

    Json(WishlistResponse::from(&update.wishlist))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<u64>,
) -> Json<WishlistResponse> {
    let id = MovieId(id);
    let update = state.wishlist.remove(id).await;
    tracing::debug!(request_id = %request_id, movie_id = %id, removed = update.changed, "Remove from wishlist");

    Json(WishlistResponse::from(&update.wishlist))
}

/// Details-page button: adds when absent, removes when present
pub async fn toggle(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<u64>,
) -> Json<ToggleResponse> {
    let id = MovieId(id);
    let update = state.wishlist.toggle(id).await;
    let in_wishlist = update.wishlist.contains(id);
    tracing::debug!(request_id = %request_id, movie_id = %id, in_wishlist, "Toggle wishlist");

    Json(ToggleResponse {
        id,
        in_wishlist,
        count: update.wishlist.len(),
    })
}

/// Server-sent events: the current wishlist, then the latest wishlist after
/// each change. Changes made faster than the client reads are coalesced.
pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.wishlist.subscribe();

    let stream = futures_util::stream::unfold((receiver, true), |(mut receiver, first)| async move {
        if !first {
            receiver.changed().await.ok()?;
        }
        let payload = WishlistResponse::from(&*receiver.borrow_and_update());
        let event = Event::default().event("wishlist").json_data(payload).ok()?;
        Some((Ok(event), (receiver, false)))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryKeyValueStore, WishlistStore};
    use crate::routes::create_router;
    use crate::services::{providers::MockMovieProvider, ImageUrls, WishlistService};
    use axum::body::{Body, Bytes};
    use axum::http::{header, Request, StatusCode};
    use futures_util::StreamExt;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    async fn test_state() -> AppState {
        let store = WishlistStore::new(Arc::new(MemoryKeyValueStore::new()), "wishlist");
        let (wishlist, _handle) = WishlistService::initialize(store).await;
        AppState::new(
            Arc::new(wishlist),
            Arc::new(MockMovieProvider::new()),
            ImageUrls::new("https://image.tmdb.org/t/p"),
        )
    }

    /// Reads body chunks until one complete SSE event is buffered
    async fn next_event<S>(frames: &mut S) -> String
    where
        S: futures_util::Stream<Item = Result<Bytes, axum::Error>> + Unpin,
    {
        let mut event = String::new();
        while !event.ends_with("\n\n") {
            let chunk = tokio::time::timeout(Duration::from_secs(5), frames.next())
                .await
                .expect("timed out waiting for event")
                .expect("event stream ended")
                .unwrap();
            event.push_str(std::str::from_utf8(&chunk).unwrap());
        }
        event
    }

    #[tokio::test]
    async fn test_events_send_current_state_then_changes() {
        let state = test_state().await;
        let wishlist = state.wishlist.clone();
        wishlist.add(MovieId(27205)).await;

        let response = create_router(state)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/wishlist/events")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/event-stream"
        );

        let mut frames = Box::pin(response.into_body().into_data_stream());

        let first = next_event(&mut frames).await;
        assert!(first.contains("event: wishlist"));
        assert!(first.contains(r#"{"ids":[27205],"count":1}"#));

        wishlist.add(MovieId(550)).await;
        let second = next_event(&mut frames).await;
        assert!(second.contains("event: wishlist"));
        assert!(second.contains(r#"{"ids":[27205,550],"count":2}"#));

        wishlist.remove(MovieId(27205)).await;
        let third = next_event(&mut frames).await;
        assert!(third.contains(r#"{"ids":[550],"count":1}"#));
    }
}
