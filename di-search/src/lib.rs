//! # di-search
//!
//! Fan-out supplier listing collection for the di-agent service.
//!
//! One free-text query is sent to a fixed catalog of third-party sources
//! (B2B marketplaces, Chinese marketplaces, directories, search engines and
//! social landing pages) plus optional keyed APIs. Every source is fetched
//! and extracted independently; the partial results are merged into one
//! deduplicated, capped list.
//!
//! ## Design
//!
//! - Sources are a static registry of URL templates, each tagged with a
//!   curated selector rule or the generic anchor heuristics
//! - Fetches run concurrently with a bounded in-flight limit
//! - Every fetch and extraction is total: failures become empty
//!   contributions, never errors
//! - Merge order is social first, then registry order, so dedup is
//!   deterministic
//! - Contact extraction and supplier rating are heuristics and are tagged
//!   as such in their output
//!
//! ## Security
//!
//! - No network listeners; this is a library, not a server
//! - API keys are optional and never logged
//! - Queries are logged only at trace level

pub mod config;
pub mod contact;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod http;
pub mod orchestrator;
pub mod query;
pub mod registry;
pub mod social;
pub mod types;

pub use config::{ApiEndpoints, CollectConfig, Credentials};
pub use contact::extract_contacts;
pub use enrich::{build_cards, SupplierCard};
pub use error::{Result, SearchError};
pub use orchestrator::Collector;
pub use query::normalize_query;
pub use registry::{ExtractionRule, SelectorPair, SourceDefinition, SourceRegistry};
pub use types::{
    CollectionRun, Confidence, ContactInfo, ListingResult, RunStatus, SourceOutcome, SourceReport,
};

/// Collect listings for `query` across the built-in registry.
///
/// Builds a one-off [`Collector`]; long-running callers should build one
/// collector and reuse it so the HTTP client and its connection pool are
/// shared across runs.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid. Source failures
/// never surface here; they are empty contributions in the returned run.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> di_search::Result<()> {
/// let config = di_search::CollectConfig::default();
/// let run = di_search::collect("ЛСТК", &config).await?;
/// for listing in &run.results {
///     println!("{} ({}): {}", listing.title, listing.source, listing.link);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn collect(query: &str, config: &CollectConfig) -> Result<CollectionRun> {
    let collector = Collector::new(config.clone())?;
    Ok(collector.collect(query).await)
}

/// Like [`collect`], retrying with the small fallback subset when the full
/// run finds nothing.
///
/// # Errors
///
/// Same as [`collect`].
pub async fn collect_with_fallback(query: &str, config: &CollectConfig) -> Result<CollectionRun> {
    let collector = Collector::new(config.clone())?;
    Ok(collector.collect_with_fallback(query).await)
}
