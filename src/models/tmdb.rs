use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
const POSTER_SIZE: &str = "w500";
const BACKDROP_SIZE: &str = "w1280";
const PROFILE_SIZE: &str = "w185";

const MAX_CAST: usize = 5;
const MAX_COMPANIES: usize = 3;

/// TMDb sends explicit `null` for many fields it documents as strings.
fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Builds a full image URL from a TMDb file path like "/abc.jpg"
pub fn image_url(size: &str, path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{}/{}{}", IMAGE_BASE_URL, size, p))
}

/// Year of a `YYYY-MM-DD` release date, `None` when empty or unparseable
pub fn parse_release_year(release_date: &str) -> Option<i32> {
    if let Ok(date) = NaiveDate::parse_from_str(release_date, "%Y-%m-%d") {
        return Some(date.year());
    }
    release_date.get(..4).and_then(|y| y.parse().ok())
}

// ============================================================================
// TMDb API Types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResponse {
    #[serde(default, deserialize_with = "null_to_default")]
    pub results: Vec<SearchCandidate>,
}

/// One entry of a `/search/movie` result page
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SearchCandidate {
    pub id: u64,
    #[serde(default, deserialize_with = "null_to_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub release_date: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub original_language: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

impl SearchCandidate {
    pub fn release_year(&self) -> Option<i32> {
        parse_release_year(&self.release_date)
    }

    pub fn is_english(&self) -> bool {
        self.original_language.eq_ignore_ascii_case("en")
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct NamedEntity {
    #[serde(default, deserialize_with = "null_to_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CastCredit {
    #[serde(default, deserialize_with = "null_to_default")]
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CrewCredit {
    #[serde(default, deserialize_with = "null_to_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub job: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Credits {
    #[serde(default, deserialize_with = "null_to_default")]
    pub cast: Vec<CastCredit>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub crew: Vec<CrewCredit>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Video {
    #[serde(default, deserialize_with = "null_to_default")]
    pub key: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub site: String,
    #[serde(default, rename = "type", deserialize_with = "null_to_default")]
    pub video_type: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Videos {
    #[serde(default, deserialize_with = "null_to_default")]
    pub results: Vec<Video>,
}

/// Raw `/movie/{id}?append_to_response=credits,videos` payload
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MovieDetailsRecord {
    pub id: u64,
    #[serde(default, deserialize_with = "null_to_default")]
    pub title: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub release_date: String,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u32>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub genres: Vec<NamedEntity>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub credits: Credits,
    #[serde(default, deserialize_with = "null_to_default")]
    pub videos: Videos,
    #[serde(default, deserialize_with = "null_to_default")]
    pub production_companies: Vec<NamedEntity>,
    #[serde(default)]
    pub budget: Option<u64>,
    #[serde(default)]
    pub revenue: Option<u64>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
}

// ============================================================================
// Enrichment results
// ============================================================================

/// Lightweight enrichment shown next to each recommendation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieSummary {
    pub poster: Option<String>,
    pub year: Option<i32>,
    pub rating: Option<f64>,
}

impl From<&SearchCandidate> for MovieSummary {
    fn from(candidate: &SearchCandidate) -> Self {
        Self {
            poster: image_url(POSTER_SIZE, candidate.poster_path.as_deref()),
            year: candidate.release_year(),
            rating: candidate.vote_average,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub name: String,
    pub character: Option<String>,
    pub profile_image: Option<String>,
}

/// Full detail page for a single movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub tmdb_id: u64,
    pub title: String,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub poster: Option<String>,
    pub backdrop: Option<String>,
    pub release_date: Option<String>,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub vote_count: Option<u32>,
    pub runtime: Option<u32>,
    pub genres: Vec<String>,
    pub director: Option<String>,
    pub cast: Vec<CastMember>,
    pub production_companies: Vec<String>,
    pub budget: Option<u64>,
    pub revenue: Option<u64>,
    pub tagline: Option<String>,
    pub status: Option<String>,
    pub trailer_key: Option<String>,
    pub imdb_id: Option<String>,
    pub homepage: Option<String>,
}

impl From<MovieDetailsRecord> for MovieDetails {
    fn from(record: MovieDetailsRecord) -> Self {
        let director = record
            .credits
            .crew
            .iter()
            .find(|person| person.job == "Director")
            .map(|person| person.name.clone());

        let cast = record
            .credits
            .cast
            .iter()
            .take(MAX_CAST)
            .map(|actor| CastMember {
                name: actor.name.clone(),
                character: actor.character.clone(),
                profile_image: image_url(PROFILE_SIZE, actor.profile_path.as_deref()),
            })
            .collect();

        let trailer_key = record
            .videos
            .results
            .iter()
            .find(|v| v.video_type == "Trailer" && v.site == "YouTube")
            .map(|v| v.key.clone());

        let release_date = Some(record.release_date.clone()).filter(|d| !d.is_empty());

        Self {
            tmdb_id: record.id,
            year: parse_release_year(&record.release_date),
            poster: image_url(POSTER_SIZE, record.poster_path.as_deref()),
            backdrop: image_url(BACKDROP_SIZE, record.backdrop_path.as_deref()),
            genres: record.genres.into_iter().map(|g| g.name).collect(),
            production_companies: record
                .production_companies
                .into_iter()
                .take(MAX_COMPANIES)
                .map(|c| c.name)
                .collect(),
            title: record.title,
            original_title: record.original_title,
            overview: record.overview,
            release_date,
            rating: record.vote_average,
            vote_count: record.vote_count,
            runtime: record.runtime,
            director,
            cast,
            budget: record.budget,
            revenue: record.revenue,
            tagline: record.tagline,
            status: record.status,
            trailer_key,
            imdb_id: record.imdb_id,
            homepage: record.homepage,
        }
    }
}
