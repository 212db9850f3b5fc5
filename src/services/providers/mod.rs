//! Movie metadata provider abstraction
//!
//! The enrichment layer only depends on this contract: a text search returning
//! loosely matching candidates, and a detail lookup by provider ID. TMDb is the
//! only implementation; tests substitute a mock.

use crate::{
    error::AppResult,
    models::{MovieDetailsRecord, SearchCandidate},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Search movies by title, with an optional release year hint
    async fn search_movies(&self, query: &str, year: Option<i32>)
        -> AppResult<Vec<SearchCandidate>>;

    /// Fetch the full record for a provider movie ID, including credits and videos
    async fn fetch_movie(&self, id: u64) -> AppResult<MovieDetailsRecord>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
