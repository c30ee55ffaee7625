/// TMDB (The Movie Database) v3 provider
///
/// Every request is a GET authenticated with the `api_key` query parameter.
/// Responses are converted into catalog models and, when Redis is configured,
/// cached per endpoint and page.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        ApiCredits, ApiMovieDetails, ApiMoviePage, CastMember, Category, MovieDetails, MovieId,
        MoviePage,
    },
    services::providers::MovieProvider,
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

const LIST_CACHE_TTL: u64 = 3600; // 1 hour
const DETAILS_CACHE_TTL: u64 = 86400; // 1 day

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Option<Cache>,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String, cache: Option<Cache>) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            cache,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        // Strip URLs from transport errors; they carry the api key
        let response = self
            .http_client
            .get(self.endpoint(path))
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::HttpClient(e.without_url()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("TMDB resource '{}'", path)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::HttpClient(e.without_url()))
    }
}

#[async_trait::async_trait]
impl MovieProvider for TmdbProvider {
    async fn movie_details(&self, id: MovieId) -> AppResult<MovieDetails> {
        let key = CacheKey::MovieDetails(id);
        cached!(self.cache.as_ref(), key, DETAILS_CACHE_TTL, async move {
            let details: ApiMovieDetails = self.get_json(&format!("movie/{}", id), &[]).await?;
            tracing::debug!(movie_id = %id, provider = "tmdb", "Movie details fetched");
            Ok::<_, AppError>(MovieDetails::from(details))
        })
    }

    async fn movie_credits(&self, id: MovieId) -> AppResult<Vec<CastMember>> {
        let key = CacheKey::Credits(id);
        cached!(self.cache.as_ref(), key, DETAILS_CACHE_TTL, async move {
            let credits: ApiCredits = self
                .get_json(&format!("movie/{}/credits", id), &[])
                .await?;
            let cast: Vec<CastMember> = credits.cast.into_iter().map(CastMember::from).collect();
            Ok::<_, AppError>(cast)
        })
    }

    async fn similar_movies(&self, id: MovieId, page: u32) -> AppResult<MoviePage> {
        let key = CacheKey::Similar(id, page);
        cached!(self.cache.as_ref(), key, DETAILS_CACHE_TTL, async move {
            let response: ApiMoviePage = self
                .get_json(
                    &format!("movie/{}/similar", id),
                    &[("page", page.to_string())],
                )
                .await?;
            Ok::<_, AppError>(response.into_page(page))
        })
    }

    async fn list_category(&self, category: Category, page: u32) -> AppResult<MoviePage> {
        let key = CacheKey::Category(category, page);
        cached!(self.cache.as_ref(), key, LIST_CACHE_TTL, async move {
            let response: ApiMoviePage = self
                .get_json(
                    &format!("movie/{}", category),
                    &[("page", page.to_string())],
                )
                .await?;
            let movie_page = response.into_page(page);

            tracing::info!(
                category = %category,
                page = page,
                results = movie_page.results.len(),
                provider = "tmdb",
                "Category listing fetched"
            );

            Ok::<_, AppError>(movie_page)
        })
    }

    async fn search_movies(&self, query: &str, page: u32) -> AppResult<MoviePage> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let key = CacheKey::Search(query.to_string(), page);
        cached!(self.cache.as_ref(), key, LIST_CACHE_TTL, async move {
            let response: ApiMoviePage = self
                .get_json(
                    "search/movie",
                    &[("query", query.to_string()), ("page", page.to_string())],
                )
                .await?;
            let movie_page = response.into_page(page);

            tracing::info!(
                query = %query,
                page = page,
                results = movie_page.results.len(),
                provider = "tmdb",
                "Movie search completed"
            );

            Ok::<_, AppError>(movie_page)
        })
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Path, Query},
        http::StatusCode as HttpStatus,
        response::IntoResponse,
        routing::get,
        Json, Router,
    };
    use serde_json::json;
    use std::collections::HashMap;

    const TEST_KEY: &str = "test_key";

    type Params = Query<HashMap<String, String>>;

    fn authorized(params: &HashMap<String, String>) -> bool {
        params.get("api_key").map(String::as_str) == Some(TEST_KEY)
    }

    async fn movie(Path(segment): Path<String>, Query(params): Params) -> axum::response::Response {
        if !authorized(&params) {
            return HttpStatus::UNAUTHORIZED.into_response();
        }
        match segment.as_str() {
            "popular" | "now_playing" | "top_rated" | "upcoming" => Json(json!({
                "page": params.get("page").and_then(|p| p.parse::<u32>().ok()).unwrap_or(1),
                "total_pages": 42,
                "results": [
                    { "id": 550, "title": "Fight Club", "vote_average": 8.4, "release_date": "1999-10-15" },
                    { "id": 680, "title": "Pulp Fiction", "vote_average": 8.5, "release_date": "1994-09-10" }
                ]
            }))
            .into_response(),
            "27205" => Json(json!({
                "id": 27205,
                "title": "Inception",
                "poster_path": "/inception.jpg",
                "backdrop_path": "/inception-backdrop.jpg",
                "vote_average": 8.4,
                "overview": "Dreams within dreams.",
                "release_date": "2010-07-15",
                "runtime": 148,
                "genres": [{ "id": 28, "name": "Action" }]
            }))
            .into_response(),
            "500" => (HttpStatus::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
            _ => (
                HttpStatus::NOT_FOUND,
                Json(json!({ "status_code": 34, "status_message": "The resource you requested could not be found." })),
            )
                .into_response(),
        }
    }

    async fn credits(Path(_id): Path<u64>, Query(params): Params) -> axum::response::Response {
        if !authorized(&params) {
            return HttpStatus::UNAUTHORIZED.into_response();
        }
        Json(json!({
            "id": 27205,
            "cast": [
                { "id": 6193, "name": "Leonardo DiCaprio", "character": "Cobb", "profile_path": "/leo.jpg" },
                { "id": 24045, "name": "Joseph Gordon-Levitt", "character": "Arthur", "profile_path": null }
            ]
        }))
        .into_response()
    }

    async fn similar(Path(_id): Path<u64>, Query(params): Params) -> axum::response::Response {
        if !authorized(&params) {
            return HttpStatus::UNAUTHORIZED.into_response();
        }
        Json(json!({
            "page": 1,
            "results": [{ "id": 157336, "title": "Interstellar", "vote_average": 8.5 }]
        }))
        .into_response()
    }

    async fn search(Query(params): Params) -> axum::response::Response {
        if !authorized(&params) {
            return HttpStatus::UNAUTHORIZED.into_response();
        }
        let query = params.get("query").cloned().unwrap_or_default();
        Json(json!({
            "page": 1,
            "total_pages": 1,
            "results": [{ "id": 603, "title": query, "vote_average": 8.2 }]
        }))
        .into_response()
    }

    async fn spawn_fake_tmdb() -> String {
        let app = Router::new()
            .route("/movie/:id", get(movie))
            .route("/movie/:id/credits", get(credits))
            .route("/movie/:id/similar", get(similar))
            .route("/search/movie", get(search));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn create_test_provider() -> TmdbProvider {
        TmdbProvider::new(TEST_KEY.to_string(), spawn_fake_tmdb().await, None)
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let provider = TmdbProvider::new(
            TEST_KEY.to_string(),
            "https://api.themoviedb.org/3/".to_string(),
            None,
        );
        assert_eq!(
            provider.endpoint("/movie/550"),
            "https://api.themoviedb.org/3/movie/550"
        );
        assert_eq!(
            provider.endpoint("search/movie"),
            "https://api.themoviedb.org/3/search/movie"
        );
    }

    #[tokio::test]
    async fn test_movie_details() {
        let provider = create_test_provider().await;

        let details = provider.movie_details(MovieId(27205)).await.unwrap();
        assert_eq!(details.id, MovieId(27205));
        assert_eq!(details.title, "Inception");
        assert_eq!(details.runtime, Some(148));
        assert_eq!(details.genres[0].name, "Action");
    }

    #[tokio::test]
    async fn test_movie_details_not_found() {
        let provider = create_test_provider().await;

        let result = provider.movie_details(MovieId(999_999)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_external_api_error() {
        let provider = create_test_provider().await;

        let result = provider.movie_details(MovieId(500)).await;
        match result {
            Err(AppError::ExternalApi(message)) => assert!(message.contains("500")),
            other => panic!("expected ExternalApi error, got {:?}", other.map(|d| d.id)),
        }
    }

    #[tokio::test]
    async fn test_wrong_api_key_is_external_api_error() {
        let provider = TmdbProvider::new("wrong".to_string(), spawn_fake_tmdb().await, None);

        let result = provider.list_category(Category::Popular, 1).await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }

    #[tokio::test]
    async fn test_movie_credits() {
        let provider = create_test_provider().await;

        let cast = provider.movie_credits(MovieId(27205)).await.unwrap();
        assert_eq!(cast.len(), 2);
        assert_eq!(cast[0].name, "Leonardo DiCaprio");
        assert_eq!(cast[1].profile_path, None);
    }

    #[tokio::test]
    async fn test_similar_movies_defaults_total_pages() {
        let provider = create_test_provider().await;

        let page = provider.similar_movies(MovieId(27205), 1).await.unwrap();
        assert_eq!(page.results[0].id, MovieId(157336));
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn test_list_category_forwards_page() {
        let provider = create_test_provider().await;

        let page = provider.list_category(Category::TopRated, 3).await.unwrap();
        assert_eq!(page.page, 3);
        assert_eq!(page.total_pages, 42);
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[1].title, "Pulp Fiction");
    }

    #[tokio::test]
    async fn test_search_forwards_trimmed_query() {
        let provider = create_test_provider().await;

        let page = provider.search_movies("  The Matrix ", 1).await.unwrap();
        assert_eq!(page.results[0].title, "The Matrix");
    }

    #[tokio::test]
    async fn test_search_rejects_blank_query() {
        let provider = TmdbProvider::new(
            TEST_KEY.to_string(),
            "http://127.0.0.1:9".to_string(),
            None,
        );

        let result = provider.search_movies("   ", 1).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
