//! Metadata enrichment for catalog titles
//!
//! Searches the provider with the cleaned title, then picks exactly one
//! candidate or reports no confident match. Returning nothing is preferred over
//! showing another movie's details under the query title.

use std::sync::Arc;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::AppResult,
    models::{MovieDetails, MovieSummary, SearchCandidate},
    services::{
        providers::MetadataProvider,
        title_match::{clean_title, extract_year, title_similarity},
    },
};

/// Freshness window for cached enrichment results, in seconds
pub const ENRICHMENT_CACHE_TTL: u64 = 3600;

const YEAR_WINDOW: i32 = 1;
const ENGLISH_BONUS: i64 = 100;

fn tie_score(candidate: &SearchCandidate, year: Option<i32>) -> i64 {
    let mut score = if candidate.is_english() { ENGLISH_BONUS } else { 0 };
    if let Some(release_year) = candidate.release_year() {
        score += match year {
            Some(year) => 100 - 10 * i64::from((release_year - year).abs()),
            None => i64::from(release_year) - 1900,
        };
    }
    score
}

fn is_newer(a: &SearchCandidate, b: &SearchCandidate) -> bool {
    matches!((a.release_year(), b.release_year()), (Some(a), Some(b)) if a > b)
}

/// Picks the provider result that refers to `query`, if any
///
/// In order: a title match released within a year of `year`; a title match
/// from exactly `year`; the best title match scored on English original
/// language and year proximity (or recency without a year); the first result
/// if its title matches.
pub fn select_candidate<'a>(
    query: &str,
    year: Option<i32>,
    candidates: &'a [SearchCandidate],
) -> Option<&'a SearchCandidate> {
    let matches_title = |c: &&SearchCandidate| title_similarity(query, &c.title);

    if let Some(year) = year {
        let within_window = candidates.iter().filter(matches_title).find(|c| {
            c.release_year()
                .is_some_and(|r| (r - year).abs() <= YEAR_WINDOW)
        });
        if within_window.is_some() {
            return within_window;
        }

        let exact_year = candidates
            .iter()
            .filter(matches_title)
            .find(|c| c.release_year() == Some(year));
        if exact_year.is_some() {
            return exact_year;
        }
    }

    let mut best: Option<(&SearchCandidate, i64)> = None;
    for candidate in candidates.iter().filter(matches_title) {
        let score = tie_score(candidate, year);
        let replace = match best {
            None => true,
            Some((current, best_score)) => {
                score > best_score || (score == best_score && is_newer(candidate, current))
            }
        };
        if replace {
            best = Some((candidate, score));
        }
    }
    if let Some((candidate, _)) = best {
        return Some(candidate);
    }

    candidates.first().filter(matches_title)
}

/// Enrichment client wrapping a [`MetadataProvider`] with an optional cache
#[derive(Clone)]
pub struct EnrichmentService {
    provider: Arc<dyn MetadataProvider>,
    cache: Option<Cache>,
}

impl EnrichmentService {
    pub fn new(provider: Arc<dyn MetadataProvider>, cache: Option<Cache>) -> Self {
        Self { provider, cache }
    }

    /// Poster, year and rating for a catalog title, `None` when unavailable
    pub async fn movie_summary(&self, title: &str) -> Option<MovieSummary> {
        self.cached_summary(title).await.unwrap_or_else(|e| {
            tracing::warn!(title = %title, error = %e, "Movie summary unavailable");
            None
        })
    }

    /// Full details for a catalog title, `None` when unavailable
    pub async fn movie_details(&self, title: &str) -> Option<MovieDetails> {
        self.cached_details(title).await.unwrap_or_else(|e| {
            tracing::warn!(title = %title, error = %e, "Movie details unavailable");
            None
        })
    }

    async fn cached_summary(&self, title: &str) -> AppResult<Option<MovieSummary>> {
        match &self.cache {
            Some(cache) => cached!(
                cache,
                CacheKey::MovieSummary(title.to_string()),
                ENRICHMENT_CACHE_TTL,
                self.lookup_summary(title)
            ),
            None => self.lookup_summary(title).await,
        }
    }

    async fn cached_details(&self, title: &str) -> AppResult<Option<MovieDetails>> {
        match &self.cache {
            Some(cache) => cached!(
                cache,
                CacheKey::MovieDetails(title.to_string()),
                ENRICHMENT_CACHE_TTL,
                self.lookup_details(title)
            ),
            None => self.lookup_details(title).await,
        }
    }

    /// Searches the provider and applies the selection gate
    async fn find_candidate(&self, title: &str) -> AppResult<Option<(String, SearchCandidate)>> {
        let query = clean_title(title);
        if query.is_empty() {
            return Ok(None);
        }
        let year = extract_year(title);

        let candidates = self.provider.search_movies(&query, year).await?;
        let selected = select_candidate(&query, year, &candidates).cloned();

        if selected.is_none() {
            tracing::info!(
                title = %title,
                query = %query,
                candidates = candidates.len(),
                "No confident provider match"
            );
        }

        Ok(selected.map(|candidate| (query, candidate)))
    }

    async fn lookup_summary(&self, title: &str) -> AppResult<Option<MovieSummary>> {
        let summary = self
            .find_candidate(title)
            .await?
            .map(|(_, candidate)| MovieSummary::from(&candidate));
        Ok(summary)
    }

    async fn lookup_details(&self, title: &str) -> AppResult<Option<MovieDetails>> {
        let Some((query, candidate)) = self.find_candidate(title).await? else {
            return Ok(None);
        };

        let record = self.provider.fetch_movie(candidate.id).await?;

        // The detail endpoint can resolve to a different movie than the search hit
        if !title_similarity(&query, &record.title) {
            tracing::warn!(
                query = %query,
                tmdb_id = candidate.id,
                returned_title = %record.title,
                "Detail record does not match query title, discarding"
            );
            return Ok(None);
        }

        Ok(Some(MovieDetails::from(record)))
    }
}
