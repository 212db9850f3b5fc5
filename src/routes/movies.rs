use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{MovieDetails, MovieSummary},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub title: String,
}

impl TitleQuery {
    fn validated(&self) -> AppResult<&str> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AppError::InvalidInput("title cannot be empty".to_string()));
        }
        Ok(title)
    }
}

/// Poster, year and rating for a title
pub async fn summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TitleQuery>,
) -> AppResult<Json<MovieSummary>> {
    let title = params.validated()?;
    state
        .enrichment
        .movie_summary(title)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No confident match for '{}'", title)))
}

/// Full provider details for a title
pub async fn details(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TitleQuery>,
) -> AppResult<Json<MovieDetails>> {
    let title = params.validated()?;
    state
        .enrichment
        .movie_details(title)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No confident match for '{}'", title)))
}
