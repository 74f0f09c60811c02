//! Site-restricted web search through the Brave Search API.
//!
//! One [`SiteSearchApi`] per configured social domain; each issues a single
//! `site:<domain> <query>` request and names its rows after the domain.

use serde::Deserialize;

use crate::error::SearchError;
use crate::types::ListingResult;

use super::{usable_key, SocialProvider};

/// Brave Search API restricted to one site domain.
#[derive(Clone)]
pub struct SiteSearchApi {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    domain: String,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct WebSearchResponse {
    #[serde(default)]
    web: Option<WebResults>,
}

#[derive(Debug, Deserialize)]
struct WebResults {
    #[serde(default)]
    results: Vec<WebResult>,
}

#[derive(Debug, Deserialize)]
struct WebResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
}

impl SiteSearchApi {
    pub fn new(
        client: reqwest::Client,
        endpoint: &str,
        api_key: Option<String>,
        domain: &str,
        max_results: usize,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.to_owned(),
            api_key,
            domain: domain.to_owned(),
            max_results,
        }
    }

    /// The restricted query sent upstream.
    pub fn scoped_query(&self, query: &str) -> String {
        format!("site:{} {query}", self.domain)
    }
}

impl SocialProvider for SiteSearchApi {
    fn name(&self) -> &str {
        &self.domain
    }

    fn has_credential(&self) -> bool {
        usable_key(self.api_key.as_ref()).is_some()
    }

    async fn fetch(&self, query: &str) -> Result<Vec<ListingResult>, SearchError> {
        let key = usable_key(self.api_key.as_ref())
            .ok_or_else(|| SearchError::Credential(format!("web search ({})", self.domain)))?;
        let scoped = self.scoped_query(query);
        tracing::trace!(query = %scoped, "site search");

        let count = self.max_results.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", scoped.as_str()), ("count", count.as_str())])
            .header("Accept", "application/json")
            .header("X-Subscription-Token", key)
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("site search request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Http(format!("site search API error {status}")));
        }

        let body: WebSearchResponse = response.json().await.map_err(|e| {
            SearchError::Parse(format!("site search decode failed: {}", e.without_url()))
        })?;

        let results = body.web.map(|w| w.results).unwrap_or_default();
        Ok(results
            .into_iter()
            .filter(|r| !r.title.trim().is_empty() && !r.url.trim().is_empty())
            .map(|r| ListingResult::new(r.title.trim(), r.url.trim(), &self.domain))
            .take(self.max_results)
            .collect())
    }
}
