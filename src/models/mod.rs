pub mod movie;
pub mod tmdb;

pub use movie::{CatalogMovie, Movie, MovieId, MovieStats, Rating, Recommendation};
pub use tmdb::{
    parse_release_year, MovieDetails, MovieDetailsRecord, MovieSummary, SearchCandidate,
    TmdbSearchResponse,
};
