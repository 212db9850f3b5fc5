use std::cmp::Ordering;

use crate::{
    models::Recommendation,
    services::{
        model::SimilarityModel,
        title_match::{extract_year, resolve_local},
    },
};

pub const DEFAULT_TOP_N: usize = 10;

/// Candidates below this genre similarity are never recommended
pub const MIN_SIMILARITY: f64 = 0.1;
/// Mean rating below which a candidate needs [`HIGH_SIMILARITY`] to survive
pub const QUALITY_FLOOR: f64 = 2.5;
pub const HIGH_SIMILARITY: f64 = 0.5;

/// Sort sentinel for titles without a parseable year
const UNKNOWN_YEAR: i32 = -1;

#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    index: usize,
    similarity: f64,
    mean_rating: f64,
    rating_count: u32,
    year: i32,
    /// Log-scaled rating count. Not part of the ordering.
    popularity_boost: f64,
}

fn popularity_boost(rating_count: u32) -> f64 {
    if rating_count == 0 {
        return 0.0;
    }
    ((rating_count as f64).ln_1p() / 5.0).min(0.2)
}

fn rank(a: &Candidate, b: &Candidate) -> Ordering {
    b.similarity
        .total_cmp(&a.similarity)
        .then_with(|| b.year.cmp(&a.year))
        .then_with(|| b.mean_rating.total_cmp(&a.mean_rating))
        .then_with(|| a.index.cmp(&b.index))
}

/// Recommends movies similar to `query_title`
///
/// The query resolves to a single anchor movie in the catalog. Other movies are
/// ranked by genre similarity, then by newer release, then by mean rating. An
/// unknown title yields an empty list.
pub fn recommend(query_title: &str, model: &SimilarityModel, top_n: usize) -> Vec<Recommendation> {
    let Some(anchor) = resolve_local(query_title, &model.movies) else {
        tracing::debug!(query = %query_title, "No catalog match for query");
        return Vec::new();
    };

    let mut candidates: Vec<Candidate> = model
        .similarity
        .row(anchor)
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != anchor)
        .filter_map(|(i, &similarity)| {
            if similarity < MIN_SIMILARITY {
                return None;
            }

            let entry = &model.movies[i];
            if entry.stats.mean_rating < QUALITY_FLOOR && similarity < HIGH_SIMILARITY {
                return None;
            }

            Some(Candidate {
                index: i,
                similarity,
                mean_rating: entry.stats.mean_rating,
                rating_count: entry.stats.rating_count,
                year: extract_year(&entry.movie.title).unwrap_or(UNKNOWN_YEAR),
                popularity_boost: popularity_boost(entry.stats.rating_count),
            })
        })
        .collect();

    candidates.sort_by(rank);
    candidates.truncate(top_n);

    tracing::debug!(
        query = %query_title,
        anchor = %model.movies[anchor].movie.title,
        results = candidates.len(),
        "Recommendations ranked"
    );

    candidates
        .into_iter()
        .map(|c| {
            let movie = &model.movies[c.index].movie;
            tracing::trace!(
                title = %movie.title,
                similarity = c.similarity,
                mean_rating = c.mean_rating,
                rating_count = c.rating_count,
                popularity_boost = c.popularity_boost,
                "Recommended candidate"
            );
            Recommendation {
                movie_id: movie.id,
                title: movie.title.clone(),
                genres: movie.genres.clone(),
                year: Some(c.year).filter(|&y| y != UNKNOWN_YEAR),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Movie, Rating};

    fn ratings_for(movie_id: u32, value: f64, count: u32) -> Vec<Rating> {
        (0..count)
            .map(|user_id| Rating {
                movie_id,
                rating: value,
                user_id,
            })
            .collect()
    }

    fn scenario_model() -> SimilarityModel {
        let movies = vec![
            Movie::new(1, "A (2001)", "Action|Drama"),
            Movie::new(2, "B (2010)", "Action|Drama"),
            Movie::new(3, "C (2005)", "Comedy"),
        ];
        let mut ratings = ratings_for(1, 4.0, 10);
        ratings.extend(ratings_for(2, 4.0, 12));
        ratings.extend(ratings_for(3, 1.0, 3));
        SimilarityModel::build(movies, &ratings)
    }

    fn larger_model() -> SimilarityModel {
        let movies = vec![
            Movie::new(1, "Heat (1995)", "Action|Crime|Thriller"),
            Movie::new(2, "Ronin (1998)", "Action|Crime|Thriller"),
            Movie::new(3, "Collateral (2004)", "Action|Crime|Thriller"),
            Movie::new(4, "Thief", "Action|Crime|Thriller"),
            Movie::new(5, "Die Hard (1988)", "Action|Thriller"),
            Movie::new(6, "Taken (2008)", "Action|Crime|Drama|Thriller"),
            Movie::new(7, "Notting Hill (1999)", "Comedy|Romance"),
            Movie::new(8, "Bad Heist (2010)", "Crime|Mystery|War|Western"),
            Movie::new(9, "Worse Heist (2011)", "Action|Crime|Thriller"),
        ];
        let mut ratings = Vec::new();
        for (id, mean) in [(1, 4.2), (2, 3.8), (3, 3.8), (4, 3.9), (5, 4.0), (6, 3.5), (7, 3.6)] {
            ratings.extend(ratings_for(id, mean, 20));
        }
        ratings.extend(ratings_for(8, 1.5, 20));
        ratings.extend(ratings_for(9, 1.0, 20));
        SimilarityModel::build(movies, &ratings)
    }

    #[test]
    fn test_scenario_shared_genres_first() {
        let model = scenario_model();
        let recs = recommend("A (2001)", &model, DEFAULT_TOP_N);

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].title, "B (2010)");
        assert_eq!(recs[0].genres, "Action|Drama");
        assert_eq!(recs[0].year, Some(2010));
    }

    #[test]
    fn test_unknown_title_is_empty() {
        let model = scenario_model();
        assert!(recommend("Nonexistent Movie", &model, DEFAULT_TOP_N).is_empty());
    }

    #[test]
    fn test_empty_catalog() {
        let model = SimilarityModel::build(Vec::new(), &[]);
        assert!(recommend("Heat", &model, DEFAULT_TOP_N).is_empty());
    }

    #[test]
    fn test_never_recommends_anchor() {
        let model = larger_model();
        for entry in &model.movies {
            let recs = recommend(&entry.movie.title, &model, 50);
            assert!(
                recs.iter().all(|r| r.movie_id != entry.movie.id),
                "{} recommended itself",
                entry.movie.title
            );
        }
    }

    #[test]
    fn test_respects_similarity_floor() {
        let model = larger_model();
        for (anchor, entry) in model.movies.iter().enumerate() {
            for rec in recommend(&entry.movie.title, &model, 50) {
                let index = model
                    .movies
                    .iter()
                    .position(|m| m.movie.id == rec.movie_id)
                    .unwrap();
                assert!(model.similarity.get(anchor, index) >= MIN_SIMILARITY);
            }
        }
    }

    #[test]
    fn test_ranking_ties_broken_by_year() {
        let model = larger_model();
        let recs = recommend("Heat (1995)", &model, 10);
        let titles: Vec<&str> = recs.iter().map(|r| r.title.as_str()).collect();

        // Identical genres first, newest first, unknown year last. "Worse Heist"
        // is poorly rated but highly similar, so it stays.
        assert_eq!(
            &titles[..4],
            &["Worse Heist (2011)", "Collateral (2004)", "Ronin (1998)", "Thief"]
        );
        assert_eq!(recs[3].year, None);
        assert!(!titles.contains(&"Notting Hill (1999)"));
    }

    #[test]
    fn test_same_year_ties_broken_by_rating() {
        let movies = vec![
            Movie::new(1, "Anchor (2000)", "Drama"),
            Movie::new(2, "Decent (2000)", "Drama"),
            Movie::new(3, "Great (2000)", "Drama"),
        ];
        let mut ratings = ratings_for(2, 3.0, 15);
        ratings.extend(ratings_for(3, 4.5, 15));
        let model = SimilarityModel::build(movies, &ratings);

        let recs = recommend("Anchor (2000)", &model, 10);
        let titles: Vec<&str> = recs.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Great (2000)", "Decent (2000)"]);
    }

    #[test]
    fn test_quality_floor_drops_weak_matches() {
        let model = larger_model();
        let anchor = 0;
        let bad_heist = 7;
        let similarity = model.similarity.get(anchor, bad_heist);
        assert!(similarity >= MIN_SIMILARITY && similarity < HIGH_SIMILARITY);

        let recs = recommend("Heat (1995)", &model, 50);
        assert!(recs.iter().all(|r| r.title != "Bad Heist (2010)"));
    }

    #[test]
    fn test_top_n_truncates() {
        let model = larger_model();
        assert_eq!(recommend("Heat (1995)", &model, 2).len(), 2);
        assert!(recommend("Heat (1995)", &model, 0).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let model = larger_model();
        let first = recommend("heat", &model, 10);
        let second = recommend("heat", &model, 10);
        assert_eq!(first, second);
    }

    #[test]
    fn test_popularity_boost_is_capped() {
        assert_eq!(popularity_boost(0), 0.0);
        assert!((popularity_boost(1) - (2f64).ln() / 5.0).abs() < 1e-12);
        assert_eq!(popularity_boost(10), 0.2);
        assert_eq!(popularity_boost(1_000_000), 0.2);
    }
}
