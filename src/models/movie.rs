use serde::{Deserialize, Serialize};

/// Catalog movie identifier (MovieLens `movieId`)
pub type MovieId = u32;

/// A movie row from the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    /// Display title, usually with a "(YYYY)" suffix, sometimes in "Title, The" form
    pub title: String,
    /// Pipe-delimited genre tags, e.g. "Action|Sci-Fi"
    pub genres: String,
}

impl Movie {
    pub fn new(id: MovieId, title: impl Into<String>, genres: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            genres: genres.into(),
        }
    }
}

/// A single rating event. Only used in aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    pub movie_id: MovieId,
    pub rating: f64,
    pub user_id: u32,
}

/// Aggregated rating quality for one movie
///
/// Movies with too few ratings carry zeroed statistics rather than being
/// dropped from the catalog.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct MovieStats {
    pub mean_rating: f64,
    pub rating_count: u32,
}

/// A catalog movie joined with its rating statistics
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CatalogMovie {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(flatten)]
    pub stats: MovieStats,
}

/// A ranked recommendation returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub movie_id: MovieId,
    pub title: String,
    pub genres: String,
    pub year: Option<i32>,
}
