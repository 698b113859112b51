//! Upstream job search collaborator.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::config::SearchConfig;
use crate::workflows::triage::Posting;

/// Produces the current list of postings for a query.
pub trait PostingSource: Send + Sync {
    fn fetch(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<Vec<Posting>, FetchError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("search credentials are not configured (ADZUNA_APP_ID / ADZUNA_APP_KEY)")]
    MissingCredentials,
    #[error("network response was not ok: {0}")]
    Status(reqwest::StatusCode),
    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Date,
    Relevance,
}

impl SortOrder {
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Relevance => "relevance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub what: String,
    pub location: String,
    pub results_per_page: u32,
    pub sort_by: SortOrder,
}

impl SearchQuery {
    /// Query string parameters, credentials excluded.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("what", self.what.clone()),
            ("where", self.location.clone()),
            ("sort_by", self.sort_by.as_param().to_string()),
            ("results_per_page", self.results_per_page.to_string()),
            ("content-type", "application/json".to_string()),
        ]
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            what: "Frontend Developer".to_string(),
            location: "London".to_string(),
            results_per_page: 100,
            sort_by: SortOrder::Date,
        }
    }
}

/// `{ "results": [...] }` body returned by the search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<Posting>,
}

/// HTTP client for the Adzuna job search API.
#[derive(Debug, Clone)]
pub struct AdzunaClient {
    http: reqwest::Client,
    api_url: String,
    app_id: String,
    app_key: String,
}

impl AdzunaClient {
    pub fn new(
        api_url: impl Into<String>,
        app_id: impl Into<String>,
        app_key: impl Into<String>,
    ) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.into(),
            app_id: app_id.into(),
            app_key: app_key.into(),
        })
    }

    pub fn from_config(config: &SearchConfig) -> Result<Self, FetchError> {
        Self::new(&config.api_url, &config.app_id, &config.app_key)
    }
}

impl PostingSource for AdzunaClient {
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<Posting>, FetchError> {
        if self.app_id.is_empty() || self.app_key.is_empty() {
            return Err(FetchError::MissingCredentials);
        }

        let response = self
            .http
            .get(&self.api_url)
            .query(&[("app_id", &self.app_id), ("app_key", &self.app_key)])
            .query(&query.params())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body: SearchResponse = response.json().await?;
        debug!(results = body.results.len(), what = %query.what, "search results received");
        Ok(body.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_follow_search_api_names() {
        let query = SearchQuery::default();
        let params = query.params();

        assert!(params.contains(&("what", "Frontend Developer".to_string())));
        assert!(params.contains(&("where", "London".to_string())));
        assert!(params.contains(&("sort_by", "date".to_string())));
        assert!(params.contains(&("results_per_page", "100".to_string())));
    }

    #[test]
    fn search_response_tolerates_missing_results() {
        let body: SearchResponse =
            serde_json::from_str(r#"{"count": 0, "mean": 0}"#).expect("parses");
        assert!(body.results.is_empty());

        let body: SearchResponse = serde_json::from_str(
            r#"{"results":[{"id":"1","title":"Vue Developer","created":"2024-01-02T00:00:00Z"}]}"#,
        )
        .expect("parses");
        assert_eq!(body.results.len(), 1);
        assert_eq!(body.results[0].title, "Vue Developer");
    }

    #[tokio::test]
    async fn client_refuses_to_fetch_without_credentials() {
        let client = AdzunaClient::new("http://127.0.0.1:9/search", "", "").expect("client builds");
        match client.fetch(&SearchQuery::default()).await {
            Err(FetchError::MissingCredentials) => {}
            other => panic!("expected missing credentials, got {other:?}"),
        }
    }
}
