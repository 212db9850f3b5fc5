//! Catalog loader
//!
//! Reads the MovieLens-style `movies.csv` and `ratings.csv` tables. The tables are
//! loaded once at startup and never mutated afterwards.

use crate::{
    error::{AppError, AppResult},
    models::{Movie, MovieId, Rating},
};
use serde::Deserialize;
use std::{io::Read, path::Path};

#[derive(Debug, Deserialize)]
struct MovieRow {
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    title: String,
    #[serde(default)]
    genres: String,
}

#[derive(Debug, Deserialize)]
struct RatingRow {
    #[serde(rename = "userId")]
    user_id: u32,
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    rating: f64,
}

/// Movie and rating tables as loaded from storage
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub movies: Vec<Movie>,
    pub ratings: Vec<Rating>,
}

impl Catalog {
    /// Loads both tables. A missing ratings file leaves every movie unrated.
    pub fn load(movies_path: impl AsRef<Path>, ratings_path: impl AsRef<Path>) -> AppResult<Self> {
        let movies = load_movies(movies_path)?;

        let ratings_path = ratings_path.as_ref();
        let ratings = if ratings_path.exists() {
            load_ratings(ratings_path)?
        } else {
            tracing::warn!(
                path = %ratings_path.display(),
                "Ratings file not found, all movie statistics default to zero"
            );
            Vec::new()
        };

        tracing::info!(
            movies = movies.len(),
            ratings = ratings.len(),
            "Catalog loaded"
        );

        Ok(Self { movies, ratings })
    }
}

pub fn load_movies(path: impl AsRef<Path>) -> AppResult<Vec<Movie>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .map_err(|e| AppError::Catalog(format!("{}: {}", path.display(), e)))?;
    read_movies(file)
}

pub fn load_ratings(path: impl AsRef<Path>) -> AppResult<Vec<Rating>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .map_err(|e| AppError::Catalog(format!("{}: {}", path.display(), e)))?;
    read_ratings(file)
}

fn require_columns(headers: &csv::StringRecord, required: &[&str]) -> AppResult<()> {
    for column in required {
        if !headers.iter().any(|h| h.trim() == *column) {
            return Err(AppError::Catalog(format!("missing column '{}'", column)));
        }
    }
    Ok(())
}

/// Parses a movies table, skipping malformed rows
pub fn read_movies<R: Read>(reader: R) -> AppResult<Vec<Movie>> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    require_columns(csv_reader.headers()?, &["movieId", "title", "genres"])?;
    let mut movies = Vec::new();
    let mut skipped = 0usize;

    for row in csv_reader.deserialize::<MovieRow>() {
        match row {
            Ok(row) => movies.push(Movie::new(row.movie_id, row.title, row.genres)),
            Err(e) => {
                skipped += 1;
                tracing::warn!(error = %e, "Skipping malformed movie row");
            }
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "Movie rows skipped");
    }

    Ok(movies)
}

/// Parses a ratings table, skipping malformed rows
pub fn read_ratings<R: Read>(reader: R) -> AppResult<Vec<Rating>> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    require_columns(csv_reader.headers()?, &["userId", "movieId", "rating"])?;
    let mut ratings = Vec::new();
    let mut skipped = 0usize;

    for row in csv_reader.deserialize::<RatingRow>() {
        match row {
            Ok(row) => ratings.push(Rating {
                movie_id: row.movie_id,
                rating: row.rating,
                user_id: row.user_id,
            }),
            Err(e) => {
                skipped += 1;
                tracing::debug!(error = %e, "Skipping malformed rating row");
            }
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "Rating rows skipped");
    }

    Ok(ratings)
}
