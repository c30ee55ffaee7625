use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod pagination;
pub mod wishlist;

pub use pagination::Pagination;
pub use wishlist::{MovieId, Wishlist};

/// Curated TMDB movie listings
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Popular,
    NowPlaying,
    TopRated,
    Upcoming,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Popular,
        Category::NowPlaying,
        Category::TopRated,
        Category::Upcoming,
    ];

    /// Path segment used by the `/movie/{category}` endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Popular => "popular",
            Category::NowPlaying => "now_playing",
            Category::TopRated => "top_rated",
            Category::Upcoming => "upcoming",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A movie as it appears in listings, search results and the wishlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieSummary {
    pub id: MovieId,
    pub title: String,
    pub poster_path: Option<String>,
    pub vote_average: f64,
    pub overview: Option<String>,
    pub release_date: Option<NaiveDate>,
}

/// Full movie record for the details view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub id: MovieId,
    pub title: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: f64,
    pub overview: Option<String>,
    pub release_date: Option<NaiveDate>,
    /// Runtime in minutes
    pub runtime: Option<u32>,
    pub genres: Vec<Genre>,
}

impl MovieDetails {
    /// Runtime rendered as hours and minutes, e.g. `2h 28min`
    pub fn formatted_runtime(&self) -> Option<String> {
        self.runtime
            .filter(|minutes| *minutes > 0)
            .map(|minutes| format!("{}h {}min", minutes / 60, minutes % 60))
    }

    pub fn summary(&self) -> MovieSummary {
        MovieSummary {
            id: self.id,
            title: self.title.clone(),
            poster_path: self.poster_path.clone(),
            vote_average: self.vote_average,
            overview: self.overview.clone(),
            release_date: self.release_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
}

/// One page of a listing or search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoviePage {
    pub results: Vec<MovieSummary>,
    pub page: u32,
    pub total_pages: u32,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// TMDB sends `""` for unknown release dates
fn parse_release_date(raw: Option<String>) -> Option<NaiveDate> {
    raw.and_then(|date| NaiveDate::parse_from_str(&date, "%Y-%m-%d").ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Movie entry inside TMDB list, search and similar responses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMovie {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl From<ApiMovie> for MovieSummary {
    fn from(movie: ApiMovie) -> Self {
        MovieSummary {
            id: MovieId(movie.id),
            title: movie.title,
            poster_path: non_empty(movie.poster_path),
            vote_average: movie.vote_average,
            overview: non_empty(movie.overview),
            release_date: parse_release_date(movie.release_date),
        }
    }
}

/// TMDB response from GET /movie/{id}
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMovieDetails {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

impl From<ApiMovieDetails> for MovieDetails {
    fn from(details: ApiMovieDetails) -> Self {
        MovieDetails {
            id: MovieId(details.id),
            title: details.title,
            poster_path: non_empty(details.poster_path),
            backdrop_path: non_empty(details.backdrop_path),
            vote_average: details.vote_average,
            overview: non_empty(details.overview),
            release_date: parse_release_date(details.release_date),
            runtime: details.runtime,
            genres: details.genres,
        }
    }
}

/// TMDB response from GET /movie/{id}/credits
#[derive(Debug, Clone, Deserialize)]
pub struct ApiCredits {
    #[serde(default)]
    pub cast: Vec<ApiCastMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

impl From<ApiCastMember> for CastMember {
    fn from(member: ApiCastMember) -> Self {
        CastMember {
            id: member.id,
            name: member.name,
            character: non_empty(member.character),
            profile_path: non_empty(member.profile_path),
        }
    }
}

/// Paginated TMDB response shared by list, search and similar endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMoviePage {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub results: Vec<ApiMovie>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

impl ApiMoviePage {
    /// Converts into a [`MoviePage`], falling back to `requested_page` and a single page
    pub fn into_page(self, requested_page: u32) -> MoviePage {
        MoviePage {
            results: self.results.into_iter().map(MovieSummary::from).collect(),
            page: self.page.unwrap_or(requested_page),
            total_pages: self.total_pages.filter(|total| *total > 0).unwrap_or(1),
        }
    }
}
