//! Social and keyed-API collection.
//!
//! Login-walled platforms are reached through sanctioned surfaces only:
//! keyed content APIs (YouTube, Flickr) and a web-search API restricted
//! to one site domain per call. Every call is independent and soft-failing;
//! a provider without its credential is a silent no-op.

pub mod content;
pub mod site_search;

use futures::stream::{self, StreamExt};

use crate::config::CollectConfig;
use crate::error::SearchError;
use crate::types::ListingResult;

pub use content::{FlickrApi, YouTubeApi};
pub use site_search::SiteSearchApi;

/// Name under which the whole social collection reports in a run.
pub const SOCIAL_SOURCE_NAME: &str = "Social/API";

/// A keyed third-party listing surface.
///
/// Implementors build their own request, call the API once, and map the
/// response onto [`ListingResult`] rows named after the platform or domain.
/// Implementations must return [`SearchError::Credential`] without touching
/// the network when their key is absent.
pub trait SocialProvider: Send + Sync {
    /// Platform or domain name used as the listing source.
    fn name(&self) -> &str;

    /// Whether a credential is configured.
    fn has_credential(&self) -> bool;

    /// Query the API once.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] on a missing credential, transport failure,
    /// non-success status or undecodable body.
    fn fetch(
        &self,
        query: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ListingResult>, SearchError>> + Send;
}

/// A configured key, treating blank values as absent.
pub(crate) fn usable_key(key: Option<&String>) -> Option<&str> {
    key.map(|k| k.trim()).filter(|k| !k.is_empty())
}

/// Run one provider call, converting any failure into an empty list.
pub async fn collect_soft<P: SocialProvider>(provider: &P, query: &str) -> Vec<ListingResult> {
    match provider.fetch(query).await {
        Ok(rows) => {
            tracing::debug!(
                source = provider.name(),
                count = rows.len(),
                "social provider returned results"
            );
            rows
        }
        Err(SearchError::Credential(_)) => Vec::new(),
        Err(err) => {
            tracing::warn!(source = provider.name(), error = %err, "social provider failed");
            Vec::new()
        }
    }
}

/// All social providers for one configuration.
///
/// Not `Debug`: providers hold API keys.
#[derive(Clone)]
pub struct SocialCollector {
    youtube: YouTubeApi,
    flickr: FlickrApi,
    site_searches: Vec<SiteSearchApi>,
    concurrency: usize,
}

impl SocialCollector {
    /// Build providers from `config`, sharing `client`.
    pub fn new(client: reqwest::Client, config: &CollectConfig) -> Self {
        let cap = config.social_result_cap;
        let credentials = &config.credentials;
        let endpoints = &config.api_endpoints;

        let site_searches = config
            .social_domains
            .iter()
            .map(|domain| {
                SiteSearchApi::new(
                    client.clone(),
                    &endpoints.web_search,
                    credentials.web_search_api_key.clone(),
                    domain,
                    cap,
                )
            })
            .collect();

        Self {
            youtube: YouTubeApi::new(
                client.clone(),
                &endpoints.youtube,
                credentials.youtube_api_key.clone(),
                cap,
            ),
            flickr: FlickrApi::new(
                client,
                &endpoints.flickr,
                credentials.flickr_api_key.clone(),
                cap,
            ),
            site_searches,
            concurrency: config.max_concurrency,
        }
    }

    /// Returns `true` if no provider has a credential, so collection is a no-op.
    pub fn is_inert(&self) -> bool {
        !self.youtube.has_credential()
            && !self.flickr.has_credential()
            && !self.site_searches.iter().any(|api| api.has_credential())
    }

    /// Query every provider. Content platforms first, then site searches in
    /// configured domain order.
    pub async fn collect(&self, query: &str) -> Vec<ListingResult> {
        if self.is_inert() {
            tracing::debug!("no social credentials configured, skipping");
            return Vec::new();
        }

        let (youtube, flickr) = futures::future::join(
            collect_soft(&self.youtube, query),
            collect_soft(&self.flickr, query),
        )
        .await;

        let pending: Vec<_> = self
            .site_searches
            .iter()
            .map(|api| collect_soft(api, query))
            .collect();
        let per_domain: Vec<Vec<ListingResult>> = stream::iter(pending)
            .buffered(self.concurrency.max(1))
            .collect()
            .await;

        let mut rows = youtube;
        rows.extend(flickr);
        rows.extend(per_domain.into_iter().flatten());
        rows
    }
}
