//! Collection configuration with sensible defaults.
//!
//! [`CollectConfig`] controls caps, concurrency, timeouts, request headers,
//! API credentials and endpoints. Every field has a default, so a partial
//! TOML table deserialises cleanly.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Site domains queried through the web-search API as `site:<domain> <query>`.
const DEFAULT_SOCIAL_DOMAINS: &[&str] = &[
    "linkedin.com",
    "facebook.com",
    "instagram.com",
    "x.com",
    "threads.net",
    "vk.com",
    "ok.ru",
    "t.me",
    "dzen.ru",
    "youtube.com",
    "tiktok.com",
    "pinterest.com",
    "reddit.com",
    "quora.com",
    "medium.com",
    "tumblr.com",
    "behance.net",
    "weibo.com",
    "xiaohongshu.com",
    "douyin.com",
    "kuaishou.com",
    "bilibili.com",
    "zhihu.com",
    "douban.com",
    "toutiao.com",
    "mp.weixin.qq.com",
    "tieba.baidu.com",
    "baijiahao.baidu.com",
];

/// Optional API credentials. A missing credential turns its collector into a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// YouTube Data API v3 key.
    pub youtube_api_key: Option<String>,
    /// Flickr REST API key.
    pub flickr_api_key: Option<String>,
    /// Brave Search API subscription token, used for site-restricted search.
    pub web_search_api_key: Option<String>,
}

/// Base URLs of the keyed APIs. Overridable so tests can point them at a mock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiEndpoints {
    pub youtube: String,
    pub flickr: String,
    pub web_search: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            youtube: "https://www.googleapis.com/youtube/v3/search".into(),
            flickr: "https://api.flickr.com/services/rest/".into(),
            web_search: "https://api.search.brave.com/res/v1/web/search".into(),
        }
    }
}

/// Configuration for a collection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectConfig {
    /// Cap on unified results after dedup.
    pub max_results: usize,
    /// Source tasks in flight at once.
    pub max_concurrency: usize,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Rows kept per source by the structured extractor.
    pub structured_cap: usize,
    /// Rows kept per source by the generic extractor.
    pub generic_cap: usize,
    /// Results requested from each keyed API call.
    pub social_result_cap: usize,
    /// Cap on results returned by the degraded fallback path.
    pub fallback_cap: usize,
    /// Maximum number of enriched supplier cards built before ranking.
    pub enrich_candidates: usize,
    /// Number of supplier cards kept after ranking.
    pub top_k: usize,
    /// Custom User-Agent. If `None`, one of a built-in browser list is used.
    pub user_agent: Option<String>,
    /// `Accept-Language` header sent to every source.
    pub accept_language: String,
    pub credentials: Credentials,
    pub api_endpoints: ApiEndpoints,
    /// Domains queried through the site-restricted web-search API.
    pub social_domains: Vec<String>,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            max_results: 500,
            max_concurrency: 16,
            timeout_seconds: 12,
            structured_cap: 5,
            generic_cap: 50,
            social_result_cap: 10,
            fallback_cap: 50,
            enrich_candidates: 40,
            top_k: 5,
            user_agent: None,
            accept_language: "ru,en;q=0.9,zh;q=0.8".into(),
            credentials: Credentials::default(),
            api_endpoints: ApiEndpoints::default(),
            social_domains: DEFAULT_SOCIAL_DOMAINS
                .iter()
                .map(|d| (*d).to_owned())
                .collect(),
        }
    }
}

impl CollectConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// All caps, the timeout and the concurrency limit must be greater than 0.
    pub fn validate(&self) -> Result<(), SearchError> {
        let positive = [
            ("max_results", self.max_results),
            ("max_concurrency", self.max_concurrency),
            ("structured_cap", self.structured_cap),
            ("generic_cap", self.generic_cap),
            ("social_result_cap", self.social_result_cap),
            ("fallback_cap", self.fallback_cap),
            ("enrich_candidates", self.enrich_candidates),
            ("top_k", self.top_k),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(SearchError::Config(format!(
                    "{name} must be greater than 0"
                )));
            }
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
