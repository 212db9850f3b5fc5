pub mod enrichment;
pub mod model;
pub mod providers;
pub mod recommendations;
pub mod retry;
pub mod title_match;

pub use enrichment::EnrichmentService;
pub use model::SimilarityModel;
pub use retry::RetryPolicy;
