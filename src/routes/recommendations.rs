use axum::{
    extract::{Query, State},
    Extension, Json,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{MovieSummary, Recommendation},
    routes::AppState,
    services::recommendations::{self, DEFAULT_TOP_N},
};

const MAX_TOP_N: usize = 50;

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub title: String,
    #[serde(default)]
    pub top_n: Option<usize>,
    /// Attach provider poster/year/rating to each result
    #[serde(default)]
    pub enrich: bool,
}

#[derive(Debug, Serialize)]
pub struct RecommendationItem {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<MovieSummary>,
}

/// Handler for recommendations endpoint
///
/// An unknown title is not an error: the response is an empty list.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<RecommendationQuery>,
) -> AppResult<Json<Vec<RecommendationItem>>> {
    let title = params.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("title cannot be empty".to_string()));
    }
    let top_n = params.top_n.unwrap_or(DEFAULT_TOP_N).clamp(1, MAX_TOP_N);

    let results = recommendations::recommend(title, &state.model, top_n);

    tracing::info!(
        request_id = %request_id,
        title = %title,
        top_n,
        results = results.len(),
        enrich = params.enrich,
        "Recommendations computed"
    );

    let summaries: Vec<Option<MovieSummary>> = if params.enrich {
        join_all(
            results
                .iter()
                .map(|r| state.enrichment.movie_summary(&r.title)),
        )
        .await
    } else {
        vec![None; results.len()]
    };

    let items = results
        .into_iter()
        .zip(summaries)
        .map(|(recommendation, summary)| RecommendationItem {
            recommendation,
            summary,
        })
        .collect();

    Ok(Json(items))
}
