//! TMDb (The Movie Database) v3 provider
//!
//! API Flow:
//! 1. Search: /search/movie?query=..&year=.. → loosely matching candidates
//! 2. Details: /movie/{id}?append_to_response=credits,videos → full record
//!
//! The HTTP client is built once with timeouts and default headers and shared by
//! every call. Transient failures are retried by the configured [`RetryPolicy`].

use crate::{
    error::{AppError, AppResult},
    models::{MovieDetailsRecord, SearchCandidate, TmdbSearchResponse},
    services::{providers::MetadataProvider, retry::RetryPolicy},
};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Client as HttpClient,
};
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = "MovieRecommender/1.0";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    retry: RetryPolicy,
}

impl TmdbProvider {
    pub fn new(
        api_key: String,
        api_url: String,
        connect_timeout: Duration,
        read_timeout: Duration,
        retry: RetryPolicy,
    ) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = HttpClient::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            retry,
        })
    }

    /// GET a TMDb endpoint and decode the JSON body, retrying transient failures
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);
        let client = &self.http_client;
        let api_key = self.api_key.as_str();
        let url = url.as_str();

        self.retry
            .run(move || async move {
                let response = client
                    .get(url)
                    .query(&[("api_key", api_key)])
                    .query(params)
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(AppError::ExternalStatus {
                        status: status.as_u16(),
                        body,
                    });
                }

                Ok(response.json::<T>().await?)
            })
            .await
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn search_movies(
        &self,
        query: &str,
        year: Option<i32>,
    ) -> AppResult<Vec<SearchCandidate>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let mut params = vec![("query", query.to_string())];
        if let Some(year) = year {
            params.push(("year", year.to_string()));
        }

        let response: TmdbSearchResponse = self.get_json("/search/movie", &params).await?;

        tracing::info!(
            query = %query,
            year = ?year,
            results = response.results.len(),
            provider = "tmdb",
            "Movie search completed"
        );

        Ok(response.results)
    }

    async fn fetch_movie(&self, id: u64) -> AppResult<MovieDetailsRecord> {
        let params = [("append_to_response", "credits,videos".to_string())];
        let record: MovieDetailsRecord = self.get_json(&format!("/movie/{}", id), &params).await?;

        tracing::info!(
            tmdb_id = id,
            title = %record.title,
            provider = "tmdb",
            "Movie details fetched"
        );

        Ok(record)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
