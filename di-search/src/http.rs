//! Shared HTTP client and the soft-failing page fetcher.
//!
//! One [`reqwest::Client`] is built per [`crate::Collector`] with a
//! browser-like header profile and the configured timeout, then shared
//! read-only by every concurrent task.

use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, CACHE_CONTROL, PRAGMA};
use reqwest::StatusCode;

use crate::config::CollectConfig;
use crate::error::SearchError;

/// Realistic browser User-Agent strings; one is picked per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:128.0) Gecko/20100101 Firefox/128.0",
];

/// Build a [`reqwest::Client`] with the shared source header profile.
///
/// The client has:
/// - User-Agent from config, or a random entry from the built-in list
/// - `Accept-Language`, `Cache-Control: no-cache`, `Pragma: no-cache`
/// - Cookie store and a bounded redirect policy
/// - Timeout from config
///
/// # Errors
///
/// Returns [`SearchError::Config`] for an unusable header value and
/// [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &CollectConfig) -> Result<reqwest::Client, SearchError> {
    let ua = match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => random_user_agent().to_owned(),
    };

    let mut headers = HeaderMap::new();
    let language = HeaderValue::from_str(&config.accept_language)
        .map_err(|e| SearchError::Config(format!("invalid accept_language: {e}")))?;
    headers.insert(ACCEPT_LANGUAGE, language);
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(ua)
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // SAFETY: USER_AGENTS is a non-empty const array, choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}

/// Performs bounded-timeout GETs and reports any failure as an empty body.
///
/// Callers must treat `""` exactly like "no data"; the cause is only logged.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    /// Wrap an already configured client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a fetcher with a fresh client from `config`.
    ///
    /// # Errors
    ///
    /// Same as [`build_client`].
    pub fn from_config(config: &CollectConfig) -> Result<Self, SearchError> {
        Ok(Self::new(build_client(config)?))
    }

    /// The shared client, for callers that need JSON APIs.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// GET `url` and return its body on HTTP 200, or `""` on anything else.
    ///
    /// Failures are logged at `warn` with the source name and host only; the
    /// full URL carries the query and stays at `trace`.
    pub async fn fetch(&self, source: &str, url: &str) -> String {
        match self.try_fetch(url).await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(source, host = %host_of(url), error = %err, "page fetch failed");
                tracing::trace!(source, url, "failed page url");
                String::new()
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<String, SearchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("request failed: {}", e.without_url())))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(SearchError::Http(format!("unexpected status {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("response read failed: {}", e.without_url())))?;
        tracing::trace!(url, bytes = body.len(), "page fetched");
        Ok(body)
    }
}

/// Host part of `url` for logging, or `"-"` when it has none.
pub(crate) fn host_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| "-".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_user_agent_returns_valid_ua() {
        let ua = random_user_agent();
        assert!(USER_AGENTS.contains(&ua));
        assert!(ua.contains("Mozilla/5.0"));
    }

    #[test]
    fn build_client_with_default_config() {
        assert!(build_client(&CollectConfig::default()).is_ok());
    }

    #[test]
    fn build_client_rejects_bad_language_header() {
        let config = CollectConfig {
            accept_language: "en\nX-Injected: 1".into(),
            ..Default::default()
        };
        let err = build_client(&config).unwrap_err();
        assert!(err.to_string().contains("accept_language"));
    }

    #[tokio::test]
    async fn unreachable_host_yields_empty_body() {
        let config = CollectConfig {
            timeout_seconds: 2,
            ..Default::default()
        };
        let fetcher = PageFetcher::from_config(&config).expect("client");
        // Port 9 on loopback: nothing listens, connection is refused.
        let body = fetcher.fetch("Local", "http://127.0.0.1:9/unreachable").await;
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn malformed_url_yields_empty_body() {
        let fetcher = PageFetcher::from_config(&CollectConfig::default()).expect("client");
        assert!(fetcher.fetch("Broken", "not a url").await.is_empty());
    }

    #[tokio::test]
    async fn fetch_errors_omit_the_query_url() {
        let fetcher = PageFetcher::from_config(&CollectConfig::default()).expect("client");
        let err = fetcher
            .try_fetch("http://127.0.0.1:9/search?q=foam%20concrete")
            .await
            .unwrap_err();
        let text = err.to_string();
        assert!(!text.contains("foam"), "{text}");
        assert!(!text.contains("127.0.0.1"), "{text}");
    }

    #[tokio::test]
    async fn status_errors_omit_the_query_url() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fetcher = PageFetcher::from_config(&CollectConfig::default()).expect("client");
        let url = format!("{}/search?q=foam%20concrete", server.uri());
        let text = fetcher.try_fetch(&url).await.unwrap_err().to_string();
        assert!(text.contains("503"), "{text}");
        assert!(!text.contains("foam"), "{text}");
    }

    #[test]
    fn host_of_keeps_only_the_host() {
        assert_eq!(host_of("https://www.alibaba.com/trade/search?q=steel"), "www.alibaba.com");
        assert_eq!(host_of("not a url"), "-");
    }
}
