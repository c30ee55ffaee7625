/// Movie metadata provider abstraction
///
/// Read-only access to an external movie catalog. Views only rely on the
/// returned integer ids to key the wishlist; everything else is displayed as-is.
use crate::{
    error::AppResult,
    models::{CastMember, Category, MovieDetails, MovieId, MoviePage},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieProvider: Send + Sync {
    /// Full record for one movie
    async fn movie_details(&self, id: MovieId) -> AppResult<MovieDetails>;

    /// Billed cast, in billing order
    async fn movie_credits(&self, id: MovieId) -> AppResult<Vec<CastMember>>;

    /// Movies similar to `id`
    async fn similar_movies(&self, id: MovieId, page: u32) -> AppResult<MoviePage>;

    /// One page of a curated listing
    async fn list_category(&self, category: Category, page: u32) -> AppResult<MoviePage>;

    /// Free-text title search
    async fn search_movies(&self, query: &str, page: u32) -> AppResult<MoviePage>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
