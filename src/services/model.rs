//! Similarity model builder
//!
//! Joins rating statistics onto the catalog and derives a genre TF-IDF
//! representation plus the full pairwise cosine-similarity matrix. The
//! resulting bundle is immutable and shared read-only between requests.

use std::collections::{BTreeMap, HashMap, HashSet};

use once_cell::sync::Lazy;

use crate::models::{CatalogMovie, Movie, MovieId, MovieStats, Rating};

/// Movies with fewer ratings than this get zeroed statistics
pub const MIN_RATING_COUNT: u32 = 10;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "across", "after", "afterwards", "again", "against", "all",
        "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
        "amongst", "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone",
        "anything", "anyway", "anywhere", "are", "around", "as", "at", "back", "be", "became",
        "because", "become", "becomes", "becoming", "been", "before", "beforehand", "behind",
        "being", "below", "beside", "besides", "between", "beyond", "bill", "both", "bottom",
        "but", "by", "call", "can", "cannot", "cant", "co", "con", "could", "couldnt", "cry",
        "de", "describe", "detail", "do", "done", "down", "due", "during", "each", "eg",
        "eight", "either", "eleven", "else", "elsewhere", "empty", "enough", "etc", "even",
        "ever", "every", "everyone", "everything", "everywhere", "except", "few", "fifteen",
        "fifty", "fill", "find", "fire", "first", "five", "for", "former", "formerly", "forty",
        "found", "four", "from", "front", "full", "further", "get", "give", "go", "had", "has",
        "hasnt", "have", "he", "hence", "her", "here", "hereafter", "hereby", "herein",
        "hereupon", "hers", "herself", "him", "himself", "his", "how", "however", "hundred",
        "i", "ie", "if", "in", "inc", "indeed", "interest", "into", "is", "it", "its",
        "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd", "made", "many",
        "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover", "most",
        "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither", "never",
        "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
        "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
        "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
        "part", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem",
        "seemed", "seeming", "seems", "serious", "several", "she", "should", "show", "side",
        "since", "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something",
        "sometime", "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than",
        "that", "the", "their", "them", "themselves", "then", "thence", "there", "thereafter",
        "thereby", "therefore", "therein", "thereupon", "these", "they", "thick", "thin",
        "third", "this", "those", "though", "three", "through", "throughout", "thru", "thus",
        "to", "together", "too", "top", "toward", "towards", "twelve", "twenty", "two", "un",
        "under", "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were",
        "what", "whatever", "when", "whence", "whenever", "where", "whereafter", "whereas",
        "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while", "whither",
        "who", "whoever", "whole", "whom", "whose", "why", "will", "with", "within", "without",
        "would", "yet", "you", "your", "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

/// Splits a genre string into lower-cased alphanumeric tokens, dropping stop-words
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_ascii_lowercase)
        .filter(|t| !STOP_WORDS.contains(t.as_str()))
        .collect()
}

/// Mean rating and count per movie, zeroed below [`MIN_RATING_COUNT`]
pub fn aggregate_ratings(ratings: &[Rating]) -> HashMap<MovieId, MovieStats> {
    let mut totals: HashMap<MovieId, (f64, u32)> = HashMap::new();
    for rating in ratings {
        let entry = totals.entry(rating.movie_id).or_insert((0.0, 0));
        entry.0 += rating.rating;
        entry.1 += 1;
    }

    totals
        .into_iter()
        .filter(|(_, (_, count))| *count >= MIN_RATING_COUNT)
        .map(|(id, (sum, count))| {
            (
                id,
                MovieStats {
                    mean_rating: sum / count as f64,
                    rating_count: count,
                },
            )
        })
        .collect()
}

/// Fitted TF-IDF state over the genre vocabulary
#[derive(Debug, Clone, Default)]
pub struct GenreVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

/// Sparse L2-normalised row: (term index, weight) sorted by term index
pub type SparseVector = Vec<(usize, f64)>;

impl GenreVectorizer {
    /// Fits vocabulary and smoothed idf on the given documents
    pub fn fit(documents: &[Vec<String>]) -> Self {
        let terms: HashSet<&str> = documents.iter().flatten().map(String::as_str).collect();
        let mut sorted: Vec<&str> = terms.into_iter().collect();
        sorted.sort_unstable();

        let vocabulary: BTreeMap<String, usize> = sorted
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect();

        let mut document_frequency = vec![0usize; vocabulary.len()];
        for document in documents {
            let unique: HashSet<&str> = document.iter().map(String::as_str).collect();
            for term in unique {
                document_frequency[vocabulary[term]] += 1;
            }
        }

        let n = documents.len() as f64;
        let idf = document_frequency
            .into_iter()
            .map(|df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        Self { vocabulary, idf }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// TF-IDF vector for one document; out-of-vocabulary terms are ignored
    pub fn transform(&self, document: &[String]) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in document {
            if let Some(&index) = self.vocabulary.get(term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();

        let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, weight) in &mut vector {
                *weight /= norm;
            }
        }
        vector
    }
}

fn dot(a: &SparseVector, b: &SparseVector) -> f64 {
    let (mut i, mut j, mut sum) = (0, 0, 0.0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

/// Dense symmetric matrix of pairwise cosine similarities, row-major
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Cosine similarity of every pair of L2-normalised vectors
    pub fn from_vectors(vectors: &[SparseVector]) -> Self {
        let size = vectors.len();
        let mut values = vec![0.0; size * size];

        for i in 0..size {
            for j in i..size {
                let similarity = dot(&vectors[i], &vectors[j]).clamp(0.0, 1.0);
                values[i * size + j] = similarity;
                values[j * size + i] = similarity;
            }
        }

        Self { size, values }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.size..(i + 1) * self.size]
    }
}

/// Immutable bundle consumed by the recommender
#[derive(Debug, Clone, Default)]
pub struct SimilarityModel {
    pub movies: Vec<CatalogMovie>,
    pub vectorizer: GenreVectorizer,
    pub similarity: SimilarityMatrix,
}

impl SimilarityModel {
    /// Builds statistics, genre vectors and the similarity matrix in catalog order
    pub fn build(movies: Vec<Movie>, ratings: &[Rating]) -> Self {
        let stats = aggregate_ratings(ratings);

        let movies: Vec<CatalogMovie> = movies
            .into_iter()
            .map(|movie| {
                let stats = stats.get(&movie.id).copied().unwrap_or_default();
                CatalogMovie { movie, stats }
            })
            .collect();

        let documents: Vec<Vec<String>> = movies.iter().map(|m| tokenize(&m.movie.genres)).collect();
        let vectorizer = GenreVectorizer::fit(&documents);
        let vectors: Vec<SparseVector> = documents.iter().map(|d| vectorizer.transform(d)).collect();
        let similarity = SimilarityMatrix::from_vectors(&vectors);

        tracing::info!(
            movies = movies.len(),
            rated_movies = stats.len(),
            vocabulary = vectorizer.vocabulary_size(),
            "Similarity model built"
        );

        Self {
            movies,
            vectorizer,
            similarity,
        }
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratings_for(movie_id: MovieId, value: f64, count: u32) -> Vec<Rating> {
        (0..count)
            .map(|user_id| Rating {
                movie_id,
                rating: value,
                user_id,
            })
            .collect()
    }

    fn sample_movies() -> Vec<Movie> {
        vec![
            Movie::new(1, "Toy Story (1995)", "Adventure|Animation|Children|Comedy|Fantasy"),
            Movie::new(2, "Jumanji (1995)", "Adventure|Children|Fantasy"),
            Movie::new(3, "Heat (1995)", "Action|Crime|Thriller"),
            Movie::new(4, "Blade Runner (1982)", "Action|Sci-Fi|Thriller"),
            Movie::new(5, "Untitled", "(no genres listed)"),
        ]
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Action|Sci-Fi"), vec!["action", "sci", "fi"]);
        assert_eq!(tokenize("Film-Noir|Comedy"), vec!["film", "noir", "comedy"]);
        assert_eq!(tokenize("(no genres listed)"), vec!["genres", "listed"]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_tokenize_drops_english_stop_words() {
        assert_eq!(tokenize("Amongst|Whereafter|Action"), vec!["action"]);
        assert_eq!(tokenize("Fire|System|Western"), vec!["western"]);
        assert_eq!(tokenize("War|Mystery"), vec!["war", "mystery"]);
    }

    #[test]
    fn test_aggregate_requires_minimum_count() {
        let mut ratings = ratings_for(1, 4.0, 10);
        ratings.extend(ratings_for(2, 5.0, 9));
        ratings.push(Rating {
            movie_id: 1,
            rating: 1.8,
            user_id: 99,
        });

        let stats = aggregate_ratings(&ratings);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[&1].rating_count, 11);
        assert!((stats[&1].mean_rating - 3.8).abs() < 1e-9);
        assert!(!stats.contains_key(&2));
    }

    #[test]
    fn test_idf_is_smoothed() {
        let documents = vec![
            vec!["action".to_string()],
            vec!["action".to_string(), "drama".to_string()],
        ];
        let vectorizer = GenreVectorizer::fit(&documents);

        let idf = |term: &str| vectorizer.vocabulary.get(term).map(|&i| vectorizer.idf[i]);
        assert_eq!(idf("action"), Some(1.0));
        let expected = (3.0f64 / 2.0).ln() + 1.0;
        assert!((idf("drama").unwrap() - expected).abs() < 1e-12);
        assert_eq!(idf("comedy"), None);
    }

    #[test]
    fn test_transform_is_unit_length() {
        let documents = vec![tokenize("Action|Crime"), tokenize("Comedy")];
        let vectorizer = GenreVectorizer::fit(&documents);
        let vector = vectorizer.transform(&documents[0]);

        let norm: f64 = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
        assert!(vectorizer.transform(&[]).is_empty());
    }

    #[test]
    fn test_matrix_symmetric_and_bounded() {
        let model = SimilarityModel::build(sample_movies(), &[]);
        let n = model.similarity.len();
        assert_eq!(n, 5);

        for i in 0..n {
            for j in 0..n {
                let value = model.similarity.get(i, j);
                assert_eq!(value, model.similarity.get(j, i));
                assert!((0.0..=1.0).contains(&value), "({}, {}) = {}", i, j, value);
            }
        }
    }

    #[test]
    fn test_matrix_diagonal_and_disjoint_genres() {
        let model = SimilarityModel::build(sample_movies(), &[]);

        assert!((model.similarity.get(0, 0) - 1.0).abs() < 1e-9);
        // Toy Story and Heat share no genre tokens
        assert_eq!(model.similarity.get(0, 2), 0.0);
        assert!(model.similarity.get(0, 1) > 0.5);
        assert!(model.similarity.get(2, 3) > 0.3);
    }

    #[test]
    fn test_identical_genres_fully_similar() {
        let movies = vec![
            Movie::new(1, "A (2001)", "Action|Drama"),
            Movie::new(2, "B (2010)", "Drama|Action"),
            Movie::new(3, "C (2005)", "Comedy"),
        ];
        let model = SimilarityModel::build(movies, &[]);

        assert!((model.similarity.get(0, 1) - 1.0).abs() < 1e-9);
        assert_eq!(model.similarity.get(0, 2), 0.0);
    }

    #[test]
    fn test_stats_joined_onto_catalog() {
        let ratings = ratings_for(3, 4.5, 12);
        let model = SimilarityModel::build(sample_movies(), &ratings);

        assert_eq!(model.movies[2].stats.rating_count, 12);
        assert_eq!(model.movies[2].stats.mean_rating, 4.5);
        assert_eq!(model.movies[0].stats, MovieStats::default());
    }

    #[test]
    fn test_empty_catalog() {
        let model = SimilarityModel::build(Vec::new(), &ratings_for(1, 3.0, 20));
        assert!(model.is_empty());
        assert!(model.similarity.is_empty());
        assert_eq!(model.vectorizer.vocabulary_size(), 0);
    }

    #[test]
    fn test_row_matches_get() {
        let model = SimilarityModel::build(sample_movies(), &[]);
        let row = model.similarity.row(1);
        assert_eq!(row.len(), 5);
        for (j, value) in row.iter().enumerate() {
            assert_eq!(*value, model.similarity.get(1, j));
        }
    }
}
