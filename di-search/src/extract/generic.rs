//! Fallback extraction for sources without curated selectors.
//!
//! Walks a priority-ordered list of structural anchor patterns, pairing
//! each anchor's own text with its own `href`. Only absolute http(s) links
//! survive; protocol-relative links are upgraded to `https:`.

use std::collections::HashSet;

use scraper::Html;

use crate::types::ListingResult;

use super::{element_text, fix_protocol_relative, is_absolute_http, parse_selector};

/// Anchor patterns, most specific first. The bare `a` catch-all is last.
pub const GENERIC_PATTERNS: &[&str] = &[
    "h2 a",
    ".title a",
    ".product-title a",
    ".company-name a",
    "a.gs-product-card__name",
    ".organic-gallery-title a",
    "h3 a",
    "a",
];

/// Extract up to `cap` (title, link) rows from an unknown page shape.
///
/// Rows with an empty href or empty text are skipped, non-absolute links
/// are dropped, and repeated (title, link) pairs are kept once. Scanning
/// stops as soon as the cap is reached.
pub fn extract_generic(html: &str, source: &str, cap: usize) -> Vec<ListingResult> {
    if html.trim().is_empty() || cap == 0 {
        return Vec::new();
    }
    let document = Html::parse_document(html);

    let mut rows: Vec<ListingResult> = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    'patterns: for pattern in GENERIC_PATTERNS {
        let Some(selector) = parse_selector(pattern) else {
            continue;
        };
        for anchor in document.select(&selector) {
            let href = anchor.value().attr("href").unwrap_or_default().trim();
            let title = element_text(anchor);
            if href.is_empty() || title.is_empty() {
                continue;
            }
            let link = fix_protocol_relative(href);
            if !is_absolute_http(&link) {
                continue;
            }
            if !seen.insert((title.clone(), link.clone())) {
                continue;
            }
            rows.push(ListingResult::new(&title, &link, source));
            if rows.len() >= cap {
                break 'patterns;
            }
        }
    }

    tracing::debug!(source, rows = rows.len(), "generic extraction");
    rows
}
