//! Periodic self-ping that keeps an idle hosted instance awake.

use std::time::Duration;

use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::KeepaliveConfig;
use crate::error::{AgentError, Result};

/// Per-ping request timeout.
const PING_TIMEOUT: Duration = Duration::from_secs(10);

/// GETs `{self_url}/` every interval until cancelled.
pub struct KeepAlive {
    client: reqwest::Client,
    url: String,
    interval: Duration,
    cancel: CancellationToken,
}

impl KeepAlive {
    /// Create a pinger for `self_url`.
    ///
    /// Call [`run`](Self::run) to start pinging.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] if the HTTP client cannot be built.
    pub fn new(self_url: &str, interval: Duration, cancel: CancellationToken) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(PING_TIMEOUT)
            .build()
            .map_err(|e| AgentError::Config(format!("keep-alive client: {e}")))?;
        Ok(Self {
            client,
            url: format!("{}/", self_url.trim().trim_end_matches('/')),
            interval,
            cancel,
        })
    }

    /// A pinger for `config`, or `None` when no self URL is configured.
    ///
    /// # Errors
    ///
    /// Same as [`KeepAlive::new`].
    pub fn from_config(config: &KeepaliveConfig, cancel: CancellationToken) -> Result<Option<Self>> {
        match config.self_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(Some(Self::new(
                url,
                Duration::from_secs(config.interval_seconds),
                cancel,
            )?)),
            _ => Ok(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Ping once. Returns the response status, or `None` if the request failed.
    pub async fn ping(&self) -> Option<StatusCode> {
        match self.client.get(&self.url).send().await {
            Ok(response) => {
                let status = response.status();
                info!(url = %self.url, %status, "keep-alive ping");
                Some(status)
            }
            Err(err) => {
                warn!(url = %self.url, error = %err, "keep-alive ping failed");
                None
            }
        }
    }

    /// Run the ping loop until the cancellation token is cancelled.
    ///
    /// ```rust,ignore
    /// if let Some(pinger) = KeepAlive::from_config(&config.keepalive, cancel.child_token())? {
    ///     tokio::spawn(pinger.run());
    /// }
    /// ```
    pub async fn run(self) {
        info!(url = %self.url(), interval = ?self.interval, "keep-alive started");
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("keep-alive cancelled");
                    break;
                }
                _ = tokio::time::sleep(self.interval) => {
                    self.ping().await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn no_url_means_no_pinger() {
        let config = KeepaliveConfig::default();
        assert!(KeepAlive::from_config(&config, CancellationToken::new()).unwrap().is_none());

        let blank = KeepaliveConfig {
            self_url: Some("  ".into()),
            interval_seconds: 300,
        };
        assert!(KeepAlive::from_config(&blank, CancellationToken::new()).unwrap().is_none());
    }

    #[test]
    fn url_targets_root() {
        let pinger =
            KeepAlive::new("https://agent.example/", Duration::from_secs(1), CancellationToken::new())
                .unwrap();
        assert_eq!(pinger.url(), "https://agent.example/");
    }

    #[tokio::test]
    async fn ping_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let pinger = KeepAlive::new(&server.uri(), Duration::from_secs(1), CancellationToken::new())
            .unwrap();
        assert_eq!(pinger.ping().await, Some(StatusCode::OK));
    }

    #[tokio::test]
    async fn failed_ping_is_none() {
        let pinger =
            KeepAlive::new("http://127.0.0.1:9", Duration::from_secs(1), CancellationToken::new())
                .unwrap();
        assert!(pinger.ping().await.is_none());
    }

    #[tokio::test]
    async fn loop_pings_until_cancelled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        let pinger = KeepAlive::new(&server.uri(), Duration::from_millis(50), cancel.clone())
            .unwrap();
        let handle = tokio::spawn(pinger.run());

        tokio::time::sleep(Duration::from_millis(400)).await;
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("loop exits after cancel")
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert!(requests.len() >= 2, "got {} pings", requests.len());
    }
}
