//! Listing extraction from fetched source pages.
//!
//! Two strategies: [`structured`] applies curated per-source selector pairs,
//! [`generic`] applies a fixed list of structural heuristics. Both are total:
//! empty or garbage HTML yields an empty list.

pub mod generic;
pub mod structured;

use scraper::{ElementRef, Selector};

use crate::config::CollectConfig;
use crate::registry::{ExtractionRule, SourceDefinition};
use crate::types::ListingResult;

pub use generic::extract_generic;
pub use structured::extract_structured;

/// Apply the source's rule to `html`, using the caps from `config`.
pub fn extract_listings(
    html: &str,
    source: &SourceDefinition,
    config: &CollectConfig,
) -> Vec<ListingResult> {
    match &source.rule {
        ExtractionRule::Structured(pairs) => {
            extract_structured(html, pairs, &source.name, config.structured_cap)
        }
        ExtractionRule::Generic => extract_generic(html, &source.name, config.generic_cap),
    }
}

/// Parse a CSS selector, logging and skipping it when invalid.
pub(crate) fn parse_selector(raw: &str) -> Option<Selector> {
    match Selector::parse(raw) {
        Ok(selector) => Some(selector),
        Err(err) => {
            tracing::warn!(selector = raw, error = ?err, "invalid selector skipped");
            None
        }
    }
}

/// Whitespace-normalised text content of an element.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Prefix protocol-relative hrefs with `https:`.
pub(crate) fn fix_protocol_relative(href: &str) -> String {
    if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_owned()
    }
}

/// Returns `true` for `http://` and `https://` URLs.
pub(crate) fn is_absolute_http(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://")
}
