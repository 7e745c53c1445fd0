//! Tavily web search.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use aprime_core::config::TavilyConfig;

use crate::backend::{upstream_error, SearchResponse, WebSearch};
use crate::error::HandlerError;

pub struct TavilyClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    search_depth: String,
    max_results: u32,
}

impl TavilyClient {
    pub fn new(http: reqwest::Client, config: &TavilyConfig, api_key: &str) -> Self {
        Self {
            http,
            endpoint: format!("{}/search", config.base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            search_depth: config.search_depth.clone(),
            max_results: config.max_results,
        }
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    search_depth: &'a str,
    include_answer: bool,
    max_results: u32,
}

#[async_trait]
impl WebSearch for TavilyClient {
    async fn search(&self, query: &str) -> Result<SearchResponse, HandlerError> {
        debug!(query_len = query.len(), depth = %self.search_depth, "Tavily search");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&SearchRequest {
                query,
                search_depth: &self.search_depth,
                include_answer: true,
                max_results: self.max_results,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let err = upstream_error(response).await;
            warn!(error = %err, "Tavily search failed");
            return Err(err);
        }

        Ok(response.json().await?)
    }
}
