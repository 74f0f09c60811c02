//! Core types: listings, contact fields, and per-run bookkeeping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of characters kept from a listing title.
pub const MAX_TITLE_CHARS: usize = 200;

/// Link placeholder emitted by the structured extractor when a title has no
/// positional link partner.
pub const MISSING_LINK: &str = "N/A";

/// One candidate supplier or product listing found on a source.
///
/// Two listings with the same trimmed `link` are the same listing,
/// regardless of title or source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingResult {
    /// Listing title, at most [`MAX_TITLE_CHARS`] characters.
    pub title: String,
    /// Listing URL. Never empty.
    pub link: String,
    /// Name of the source (registry entry, platform or domain) that produced it.
    pub source: String,
}

impl ListingResult {
    /// Build a listing, truncating the title to [`MAX_TITLE_CHARS`].
    pub fn new(title: &str, link: &str, source: &str) -> Self {
        Self {
            title: truncate_chars(title, MAX_TITLE_CHARS),
            link: link.to_owned(),
            source: source.to_owned(),
        }
    }

    /// The identity key used for deduplication.
    pub fn dedup_key(&self) -> &str {
        self.link.trim()
    }
}

/// Truncate to at most `max` characters on a char boundary.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_owned(),
        None => text.to_owned(),
    }
}

/// Marker describing how trustworthy extracted contact fields are.
///
/// Always [`Confidence::Heuristic`]: every field comes from regex and
/// anchor scans of arbitrary third-party markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[default]
    Heuristic,
}

/// Best-effort contact and commercial fields scraped from a listing page.
///
/// Every field is independently optional. Absence is data, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub telegram: Option<String>,
    pub wechat: Option<String>,
    pub region: Option<String>,
    pub price: Option<String>,
    pub moq: Option<String>,
    pub certificates: Option<String>,
    /// Representative image (`og:image` or first `<img>`).
    pub image: Option<String>,
    pub confidence: Confidence,
}

impl ContactInfo {
    /// Returns `true` when no field was found.
    pub fn is_empty(&self) -> bool {
        [
            &self.phone,
            &self.email,
            &self.whatsapp,
            &self.telegram,
            &self.wechat,
            &self.region,
            &self.price,
            &self.moq,
            &self.certificates,
            &self.image,
        ]
        .iter()
        .all(|field| field.is_none())
    }
}

/// What a single source contributed to a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    /// The page was fetched and the extractor produced this many rows.
    Listings { count: usize },
    /// The fetch yielded no body (timeout, non-200, network error).
    NoData,
}

impl SourceOutcome {
    /// Number of listings contributed before dedup.
    pub fn count(&self) -> usize {
        match self {
            Self::Listings { count } => *count,
            Self::NoData => 0,
        }
    }
}

/// Per-source entry of a [`CollectionRun`], kept in registry order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    pub source: String,
    #[serde(flatten)]
    pub outcome: SourceOutcome,
}

/// Whether a run produced anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Ok,
    Error,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("ok"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// The result of one end-to-end collection for a single query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionRun {
    /// The query after normalisation (before percent-encoding).
    pub normalized_query: String,
    /// Per-source outcomes, registry order. Social collection reports as one entry.
    pub sources: Vec<SourceReport>,
    /// Deduplicated, capped listings.
    pub results: Vec<ListingResult>,
    /// `true` if the deduplicated list was cut at the result cap.
    pub truncated: bool,
    /// `true` if the results came from the degraded fallback subset.
    pub used_fallback: bool,
}

impl CollectionRun {
    /// [`RunStatus::Error`] only when the run produced no listings at all.
    pub fn status(&self) -> RunStatus {
        if self.results.is_empty() {
            RunStatus::Error
        } else {
            RunStatus::Ok
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_title_truncated_to_limit() {
        let long = "x".repeat(MAX_TITLE_CHARS + 50);
        let listing = ListingResult::new(&long, "https://a.com", "A");
        assert_eq!(listing.title.chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn truncation_respects_multibyte_chars() {
        let title = "панели ".repeat(60);
        let listing = ListingResult::new(&title, "https://a.com", "A");
        assert_eq!(listing.title.chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn dedup_key_is_trimmed_link() {
        let listing = ListingResult::new("T", "  https://z.com/item \n", "A");
        assert_eq!(listing.dedup_key(), "https://z.com/item");
    }

    #[test]
    fn empty_contact_info() {
        let info = ContactInfo::default();
        assert!(info.is_empty());
        let info = ContactInfo {
            moq: Some("100".into()),
            ..Default::default()
        };
        assert!(!info.is_empty());
    }

    #[test]
    fn contact_info_serialises_heuristic_marker() {
        let json = serde_json::to_value(ContactInfo::default()).expect("serialize");
        assert_eq!(json["confidence"], "heuristic");
        assert!(json["phone"].is_null());
    }

    #[test]
    fn source_outcome_serialises_tagged() {
        let json = serde_json::to_value(SourceOutcome::Listings { count: 3 }).expect("serialize");
        assert_eq!(json["status"], "listings");
        assert_eq!(json["count"], 3);
        let json = serde_json::to_value(SourceOutcome::NoData).expect("serialize");
        assert_eq!(json["status"], "no_data");
        assert_eq!(SourceOutcome::NoData.count(), 0);
    }

    #[test]
    fn source_report_flattens_outcome() {
        let report = SourceReport {
            source: "Alibaba".into(),
            outcome: SourceOutcome::Listings { count: 5 },
        };
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"source": "Alibaba", "status": "listings", "count": 5})
        );
    }

    #[test]
    fn empty_run_reports_error_status() {
        let run = CollectionRun {
            normalized_query: "foam concrete".into(),
            sources: vec![],
            results: vec![],
            truncated: false,
            used_fallback: false,
        };
        assert_eq!(run.status(), RunStatus::Error);
        assert_eq!(run.status().to_string(), "error");
    }
}
