//! Fan-out collection across the source registry and social collector.

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::config::CollectConfig;
use crate::error::SearchError;
use crate::extract::extract_listings;
use crate::http::PageFetcher;
use crate::query::{encode_query, normalize_query};
use crate::registry::{SourceDefinition, SourceRegistry};
use crate::social::{SocialCollector, SOCIAL_SOURCE_NAME};
use crate::types::{CollectionRun, ListingResult, SourceOutcome, SourceReport};

use super::dedup::dedup_and_cap;

/// One source's contribution to a run.
struct SourceContribution {
    report: SourceReport,
    listings: Vec<ListingResult>,
}

impl SourceContribution {
    fn new(source: &str, outcome: SourceOutcome, listings: Vec<ListingResult>) -> Self {
        Self {
            report: SourceReport {
                source: source.to_owned(),
                outcome,
            },
            listings,
        }
    }
}

/// Drives collection runs for a fixed configuration.
///
/// Holds the shared HTTP client, the registries and the social providers.
/// Cheap to clone; every run is independent and keeps no state afterwards.
#[derive(Clone)]
pub struct Collector {
    fetcher: PageFetcher,
    registry: Arc<SourceRegistry>,
    fallback: Arc<SourceRegistry>,
    social: SocialCollector,
    config: Arc<CollectConfig>,
}

impl Collector {
    /// Build a collector over the built-in and fallback registries.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` fails validation or the
    /// HTTP client cannot be built.
    pub fn new(config: CollectConfig) -> Result<Self, SearchError> {
        Self::with_registries(config, SourceRegistry::builtin(), SourceRegistry::fallback())
    }

    /// Build a collector over caller-supplied registries.
    ///
    /// # Errors
    ///
    /// Same as [`Collector::new`].
    pub fn with_registries(
        config: CollectConfig,
        registry: SourceRegistry,
        fallback: SourceRegistry,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        let fetcher = PageFetcher::from_config(&config)?;
        let social = SocialCollector::new(fetcher.client().clone(), &config);
        Ok(Self {
            fetcher,
            registry: Arc::new(registry),
            fallback: Arc::new(fallback),
            social,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &CollectConfig {
        &self.config
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    /// Run one full collection for `query`.
    ///
    /// # Pipeline
    ///
    /// 1. Normalise the query once and percent-encode it
    /// 2. Run the social collector and every registry source concurrently,
    ///    at most `max_concurrency` source fetches in flight
    /// 3. Merge social results first, then sources in registry order
    /// 4. Deduplicate by trimmed link and cut at `max_results`
    ///
    /// Never fails: a source that times out, errors or yields unparsable
    /// markup contributes nothing.
    pub async fn collect(&self, query: &str) -> CollectionRun {
        let normalized = normalize_query(query);
        let encoded = encode_query(&normalized);
        tracing::trace!(query, normalized = %normalized, "collection started");

        let pending: Vec<_> = self
            .registry
            .iter()
            .map(|source| self.collect_source(source, &encoded))
            .collect();
        let sources = stream::iter(pending)
            .buffered(self.config.max_concurrency)
            .collect::<Vec<_>>();
        let (social, contributions) =
            futures::future::join(self.collect_social(&normalized), sources).await;

        let run = merge(normalized, social, contributions, self.config.max_results);
        tracing::info!(
            sources = run.sources.len(),
            results = run.results.len(),
            truncated = run.truncated,
            "collection finished"
        );
        run
    }

    /// Run [`Collector::collect`], retrying with the fallback subset if the
    /// full run produced nothing.
    ///
    /// Fallback sources are fetched one after another; their combined list
    /// is capped at `fallback_cap`. The returned run lists the full run's
    /// source outcomes followed by the fallback ones.
    pub async fn collect_with_fallback(&self, query: &str) -> CollectionRun {
        let run = self.collect(query).await;
        if !run.results.is_empty() {
            return run;
        }
        tracing::info!(
            sources = self.fallback.len(),
            "full collection empty, trying fallback sources"
        );

        let encoded = encode_query(&run.normalized_query);
        let mut contributions = Vec::with_capacity(self.fallback.len());
        for source in self.fallback.iter() {
            contributions.push(self.collect_source(source, &encoded).await);
        }

        let mut fallback = merge(
            run.normalized_query,
            None,
            contributions,
            self.config.fallback_cap,
        );
        let mut sources = run.sources;
        sources.append(&mut fallback.sources);
        fallback.sources = sources;
        fallback.used_fallback = true;
        fallback
    }

    /// Fetch one source page and apply its extraction rule.
    async fn collect_source(&self, source: &SourceDefinition, encoded: &str) -> SourceContribution {
        let url = source.url_for(encoded);
        let body = self.fetcher.fetch(&source.name, &url).await;
        if body.is_empty() {
            return SourceContribution::new(&source.name, SourceOutcome::NoData, Vec::new());
        }

        let listings = extract_listings(&body, source, &self.config);
        tracing::debug!(source = %source.name, count = listings.len(), "source extracted");
        SourceContribution::new(
            &source.name,
            SourceOutcome::Listings {
                count: listings.len(),
            },
            listings,
        )
    }

    /// The social collector as one contribution, or `None` when it is inert.
    async fn collect_social(&self, query: &str) -> Option<SourceContribution> {
        if self.social.is_inert() {
            return None;
        }
        let listings = self.social.collect(query).await;
        let outcome = if listings.is_empty() {
            SourceOutcome::NoData
        } else {
            SourceOutcome::Listings {
                count: listings.len(),
            }
        };
        Some(SourceContribution::new(SOCIAL_SOURCE_NAME, outcome, listings))
    }
}

/// Concatenate contributions (social first) and deduplicate up to `cap`.
fn merge(
    normalized_query: String,
    social: Option<SourceContribution>,
    contributions: Vec<SourceContribution>,
    cap: usize,
) -> CollectionRun {
    let mut sources = Vec::with_capacity(contributions.len() + 1);
    let mut listings = Vec::new();
    for contribution in social.into_iter().chain(contributions) {
        sources.push(contribution.report);
        listings.extend(contribution.listings);
    }

    let (results, truncated) = dedup_and_cap(listings, cap);
    CollectionRun {
        normalized_query,
        sources,
        results,
        truncated,
        used_fallback: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_collector(names: &[&str]) -> Collector {
        let config = CollectConfig {
            timeout_seconds: 1,
            ..Default::default()
        };
        let registry = SourceRegistry::from_definitions(
            names
                .iter()
                .map(|name| SourceDefinition::generic(name, "http://127.0.0.1:9/?q={q}"))
                .collect(),
        );
        Collector::with_registries(config, registry, SourceRegistry::from_definitions(vec![]))
            .expect("collector")
    }

    #[test]
    fn invalid_config_rejected() {
        let config = CollectConfig {
            max_concurrency: 0,
            ..Default::default()
        };
        assert!(Collector::new(config).is_err());
    }

    #[test]
    fn collector_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Collector>();
    }

    #[tokio::test]
    async fn unreachable_sources_yield_error_status_run() {
        let collector = unreachable_collector(&["A", "B"]);
        let run = collector.collect("ЛСТК").await;
        assert_eq!(run.normalized_query, "light gauge steel frame");
        assert!(run.results.is_empty());
        assert_eq!(run.status(), crate::types::RunStatus::Error);
        let names: Vec<&str> = run.sources.iter().map(|s| s.source.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert!(run.sources.iter().all(|s| s.outcome == SourceOutcome::NoData));
    }

    #[tokio::test]
    async fn empty_fallback_marks_run() {
        let collector = unreachable_collector(&["A"]);
        let run = collector.collect_with_fallback("steel").await;
        assert!(run.used_fallback);
        assert!(run.results.is_empty());
        assert_eq!(run.sources.len(), 1);
    }

    #[test]
    fn merge_puts_social_first_then_registry_order() {
        let social = SourceContribution::new(
            SOCIAL_SOURCE_NAME,
            SourceOutcome::Listings { count: 1 },
            vec![ListingResult::new("S", "https://shared.com", "YouTube")],
        );
        let first = SourceContribution::new(
            "First",
            SourceOutcome::Listings { count: 2 },
            vec![
                ListingResult::new("F", "https://shared.com", "First"),
                ListingResult::new("F2", "https://first.com", "First"),
            ],
        );
        let second = SourceContribution::new(
            "Second",
            SourceOutcome::Listings { count: 1 },
            vec![ListingResult::new("S2", "https://first.com", "Second")],
        );

        let run = merge("q".into(), Some(social), vec![first, second], 500);
        assert_eq!(run.results.len(), 2);
        assert_eq!(run.results[0].source, "YouTube");
        assert_eq!(run.results[1].source, "First");
        assert_eq!(run.sources[0].source, SOCIAL_SOURCE_NAME);
        assert_eq!(run.sources.len(), 3);
    }
}
