use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{EnrichmentService, SimilarityModel},
};

pub mod movies;
pub mod recommendations;

/// Shared, read-only application state
pub struct AppState {
    pub model: Arc<SimilarityModel>,
    pub enrichment: EnrichmentService,
}

impl AppState {
    pub fn new(model: SimilarityModel, enrichment: EnrichmentService) -> Self {
        Self {
            model: Arc::new(model),
            enrichment,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recommendations", get(recommendations::recommend))
        .route("/movies/summary", get(movies::summary))
        .route("/movies/details", get(movies::details))
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "healthy", "movies": state.model.len() })),
    )
}
