use serde::Serialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{
        CastMember, Category, MovieDetails, MovieId, MovieSummary, Pagination, Wishlist,
    },
    services::providers::MovieProvider,
};

/// Cast members shown on a details page
pub const CAST_LIMIT: usize = 10;
/// Similar movies shown on a details page
pub const SIMILAR_LIMIT: usize = 10;

const POSTER_SIZE: &str = "w500";
const BACKDROP_SIZE: &str = "original";
const PROFILE_SIZE: &str = "w200";

/// Builds absolute TMDB image URLs from relative image paths
#[derive(Debug, Clone)]
pub struct ImageUrls {
    base_url: String,
}

impl ImageUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, size: &str, path: Option<&str>) -> Option<String> {
        path.map(|p| format!("{}/{}/{}", self.base_url, size, p.trim_start_matches('/')))
    }

    pub fn poster(&self, path: Option<&str>) -> Option<String> {
        self.url(POSTER_SIZE, path)
    }

    pub fn backdrop(&self, path: Option<&str>) -> Option<String> {
        self.url(BACKDROP_SIZE, path)
    }

    pub fn profile(&self, path: Option<&str>) -> Option<String> {
        self.url(PROFILE_SIZE, path)
    }
}

/// A movie tile with its wishlist affordance
#[derive(Debug, Clone, Serialize)]
pub struct MovieCard {
    #[serde(flatten)]
    pub movie: MovieSummary,
    pub poster_url: Option<String>,
    pub in_wishlist: bool,
}

impl MovieCard {
    fn new(movie: MovieSummary, images: &ImageUrls, wishlist: &Wishlist) -> Self {
        Self {
            poster_url: images.poster(movie.poster_path.as_deref()),
            in_wishlist: wishlist.contains(movie.id),
            movie,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CastCard {
    #[serde(flatten)]
    pub member: CastMember,
    pub profile_url: Option<String>,
}

/// Parameters of the movie list view
#[derive(Debug, Clone, Default)]
pub struct ListRequest {
    pub category: Category,
    pub query: Option<String>,
    pub page: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MovieListView {
    /// Set when browsing a category; `None` for search results
    pub category: Option<Category>,
    pub query: Option<String>,
    pub movies: Vec<MovieCard>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize)]
pub struct MovieDetailsView {
    #[serde(flatten)]
    pub movie: MovieDetails,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub runtime_display: Option<String>,
    pub in_wishlist: bool,
    pub cast: Vec<CastCard>,
    pub similar: Vec<MovieCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WishlistMoviesView {
    pub movies: Vec<MovieCard>,
    /// Number of ids in the wishlist, before filtering
    pub count: usize,
    /// Wishlisted ids whose details could not be fetched
    pub unavailable: Vec<MovieId>,
}

/// Lists a category page, or search results when `query` is non-blank
pub async fn list_movies(
    provider: &dyn MovieProvider,
    images: &ImageUrls,
    wishlist: &Wishlist,
    request: ListRequest,
) -> AppResult<MovieListView> {
    if request.page == 0 {
        return Err(AppError::InvalidInput("Page must be at least 1".to_string()));
    }

    let query = request
        .query
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty());

    let (category, page) = match &query {
        Some(q) => (None, provider.search_movies(q, request.page).await?),
        None => (
            Some(request.category),
            provider.list_category(request.category, request.page).await?,
        ),
    };

    let pagination = Pagination::new(page.page, page.total_pages);
    let movies = page
        .results
        .into_iter()
        .map(|movie| MovieCard::new(movie, images, wishlist))
        .collect();

    Ok(MovieListView {
        category,
        query,
        movies,
        pagination,
    })
}

/// Fetches details, cast and similar titles in parallel
pub async fn movie_details(
    provider: &dyn MovieProvider,
    images: &ImageUrls,
    wishlist: &Wishlist,
    id: MovieId,
) -> AppResult<MovieDetailsView> {
    let (movie, cast, similar) = tokio::try_join!(
        provider.movie_details(id),
        provider.movie_credits(id),
        provider.similar_movies(id, 1)
    )?;

    let cast = cast
        .into_iter()
        .take(CAST_LIMIT)
        .map(|member| CastCard {
            profile_url: images.profile(member.profile_path.as_deref()),
            member,
        })
        .collect();

    let similar = similar
        .results
        .into_iter()
        .take(SIMILAR_LIMIT)
        .map(|movie| MovieCard::new(movie, images, wishlist))
        .collect();

    Ok(MovieDetailsView {
        poster_url: images.poster(movie.poster_path.as_deref()),
        backdrop_url: images.backdrop(movie.backdrop_path.as_deref()),
        runtime_display: movie.formatted_runtime(),
        in_wishlist: wishlist.contains(movie.id),
        movie,
        cast,
        similar,
    })
}

/// Fetches every wishlisted movie in parallel, in wishlist order
///
/// Individual failures are logged and reported in `unavailable`. `filter`
/// keeps titles containing it, ignoring case.
pub async fn wishlist_movies(
    provider: Arc<dyn MovieProvider>,
    images: &ImageUrls,
    wishlist: &Wishlist,
    filter: Option<&str>,
) -> AppResult<WishlistMoviesView> {
    let mut tasks = Vec::new();
    for id in wishlist.iter() {
        let provider = provider.clone();
        let task = tokio::spawn(async move { provider.movie_details(id).await });
        tasks.push((id, task));
    }

    let mut movies = Vec::new();
    let mut unavailable = Vec::new();

    for (id, task) in tasks {
        match task.await {
            Ok(Ok(details)) => movies.push(details.summary()),
            Ok(Err(e)) => {
                tracing::error!(movie_id = %id, error = %e, "Wishlist movie fetch failed");
                unavailable.push(id);
            }
            Err(e) => {
                tracing::error!(movie_id = %id, error = %e, "Task join error");
                unavailable.push(id);
            }
        }
    }

    if !unavailable.is_empty() {
        tracing::warn!(
            success_count = movies.len(),
            error_count = unavailable.len(),
            "Partial wishlist fetch failure"
        );
    }

    if movies.is_empty() && !unavailable.is_empty() {
        return Err(AppError::ExternalApi(
            "Failed to fetch any wishlist movies".to_string(),
        ));
    }

    let needle = filter
        .map(|f| f.trim().to_lowercase())
        .filter(|f| !f.is_empty());

    let movies = movies
        .into_iter()
        .filter(|movie| match &needle {
            Some(needle) => movie.title.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .map(|movie| MovieCard::new(movie, images, wishlist))
        .collect();

    Ok(WishlistMoviesView {
        movies,
        count: wishlist.len(),
        unavailable,
    })
}
