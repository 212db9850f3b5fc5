//! Title normalization and fuzzy matching
//!
//! One scoring primitive is shared by local catalog lookup and by the
//! disambiguation of external search results.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::models::CatalogMovie;

static YEAR_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\(\d{4}\)").expect("valid year regex"));
static TRAILING_ARTICLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*),\s*(The|An|A)$").expect("valid article regex"));
static EMBEDDED_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((\d{4})\)").expect("valid embedded year regex"));

/// Titles with at most this many significant words must match word-for-word
const SHORT_TITLE_WORDS: usize = 2;
const MIN_OVERLAP_RATIO: f64 = 0.6;

/// Normalizes a catalog title into natural reading order
///
/// `"Matrix, The (1999)"` becomes `"The Matrix"`.
pub fn clean_title(title: &str) -> String {
    let without_year = YEAR_SUFFIX.replace_all(title, "");
    match TRAILING_ARTICLE.captures(&without_year) {
        Some(caps) => format!("{} {}", &caps[2], &caps[1]).trim().to_string(),
        None => without_year.trim().to_string(),
    }
}

/// Release year embedded as "(YYYY)" in a catalog title
pub fn extract_year(title: &str) -> Option<i32> {
    EMBEDDED_YEAR
        .captures(title)
        .and_then(|caps| caps[1].parse().ok())
}

fn normalize(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn significant_words(normalized: &str) -> HashSet<&str> {
    normalized
        .split_whitespace()
        .filter(|w| w.chars().count() > 1)
        .collect()
}

/// Whether two differently formatted titles name the same movie
///
/// Titles of one or two significant words must share every word, so
/// "Black Panther" never matches "Schwarzer Panther". Longer titles need
/// 60% of the smaller word set in common.
pub fn title_similarity(a: &str, b: &str) -> bool {
    let a = normalize(a);
    let b = normalize(b);

    if a == b {
        return true;
    }

    let words_a = significant_words(&a);
    let words_b = significant_words(&b);
    if words_a.is_empty() || words_b.is_empty() {
        return false;
    }

    let common = words_a.intersection(&words_b).count();
    if common == 0 {
        return false;
    }

    let min_words = words_a.len().min(words_b.len());
    if min_words <= SHORT_TITLE_WORDS {
        return common == words_a.len() && common == words_b.len();
    }

    common as f64 / min_words as f64 >= MIN_OVERLAP_RATIO
}

/// Resolves a free-text query to a catalog row
///
/// Exact case-insensitive matches win over substring matches. Among several
/// matches the most recent release is preferred; titles without a year rank
/// last and earlier catalog rows win remaining ties.
pub fn resolve_local(query: &str, movies: &[CatalogMovie]) -> Option<usize> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }

    let lowered: Vec<String> = movies.iter().map(|m| m.movie.title.to_lowercase()).collect();

    let exact: Vec<usize> = (0..movies.len()).filter(|&i| lowered[i] == query).collect();
    let matches = if exact.is_empty() {
        (0..movies.len())
            .filter(|&i| lowered[i].contains(&query))
            .collect()
    } else {
        exact
    };

    // max_by_key keeps the last maximum, so iterate in reverse to favour earlier rows
    matches
        .into_iter()
        .rev()
        .max_by_key(|&i| extract_year(&movies[i].movie.title).unwrap_or(i32::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Movie, MovieStats};

    fn catalog(titles: &[&str]) -> Vec<CatalogMovie> {
        titles
            .iter()
            .enumerate()
            .map(|(i, t)| CatalogMovie {
                movie: Movie::new(i as u32 + 1, *t, "Drama"),
                stats: MovieStats::default(),
            })
            .collect()
    }

    #[test]
    fn test_clean_title_moves_article() {
        assert_eq!(clean_title("Matrix, The (1999)"), "The Matrix");
        assert_eq!(clean_title("Phantom, The (1996)"), "The Phantom");
        assert_eq!(clean_title("Clockwork Orange, A (1971)"), "A Clockwork Orange");
        assert_eq!(clean_title("Officer and a Gentleman, An (1982)"), "An Officer and a Gentleman");
    }

    #[test]
    fn test_clean_title_strips_year() {
        assert_eq!(clean_title("Up (2009)"), "Up");
        assert_eq!(clean_title("  Heat  "), "Heat");
        assert_eq!(clean_title("Inception"), "Inception");
    }

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year("Inception (2010)"), Some(2010));
        assert_eq!(extract_year("Inception"), None);
        assert_eq!(extract_year("Babylon 5"), None);
    }

    #[test]
    fn test_similarity_exact_after_cleaning() {
        assert!(title_similarity("Spider-Man: Homecoming", "spiderman homecoming"));
        assert!(title_similarity("Up", "up"));
    }

    #[test]
    fn test_similarity_short_title_requires_all_words() {
        // "the matrix" has two words, only "matrix" is shared
        assert!(!title_similarity("the matrix", "matrix"));
        assert!(!title_similarity("Black Panther", "Schwarzer Panther"));
        assert!(title_similarity("Black Panther", "panther black"));
    }

    #[test]
    fn test_similarity_long_titles_use_overlap_ratio() {
        // {the, dark, knight, rises} vs {dark, knight, rises}: 3 of 3 shared
        assert!(title_similarity("The Dark Knight Rises", "Dark Knight Rises"));
        // {lord, of, the, rings, fellowship, ring} vs {lord, of, the, rings}: 4 of 4
        assert!(title_similarity(
            "The Lord of the Rings: The Fellowship of the Ring",
            "Lord of the Rings"
        ));
        // {star, wars, new, hope} vs {star, trek, beyond}: 1 of 3
        assert!(!title_similarity("Star Wars: A New Hope", "Star Trek Beyond"));
    }

    #[test]
    fn test_similarity_ignores_single_characters() {
        assert!(!title_similarity("A", "B"));
        assert!(!title_similarity("!!!", "Avatar"));
    }

    #[test]
    fn test_similarity_no_common_words() {
        assert!(!title_similarity("Xyzzy Qwerty Plugh", "Avatar"));
    }

    #[test]
    fn test_resolve_exact_before_contains() {
        let movies = catalog(&["Heat (1995)", "Heatwave (2020)", "heat (1995)"]);
        assert_eq!(resolve_local("Heat (1995)", &movies), Some(0));
    }

    #[test]
    fn test_resolve_contains_prefers_recent() {
        let movies = catalog(&[
            "Hamlet (1948)",
            "Hamlet (1996)",
            "Hamlet Goes Business",
            "Hamlet 2 (2008)",
        ]);
        assert_eq!(resolve_local("hamlet", &movies), Some(3));
    }

    #[test]
    fn test_resolve_unknown_year_ranks_last() {
        let movies = catalog(&["Solaris", "Solaris (1972)"]);
        assert_eq!(resolve_local("solar", &movies), Some(1));
    }

    #[test]
    fn test_resolve_same_year_prefers_first_row() {
        let movies = catalog(&["Twins (1988)", "Twins Effect (1988)"]);
        assert_eq!(resolve_local("twins", &movies), Some(0));
    }

    #[test]
    fn test_resolve_no_match() {
        let movies = catalog(&["Heat (1995)"]);
        assert_eq!(resolve_local("Casablanca", &movies), None);
        assert_eq!(resolve_local("   ", &movies), None);
        assert_eq!(resolve_local("heat", &[]), None);
    }
}
