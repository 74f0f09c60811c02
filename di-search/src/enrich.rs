//! Supplier-card enrichment for the top of a collection run.
//!
//! Walks the unified listings in order, fetches each detail page, drops
//! logistics offers and probable resellers, extracts contacts and scores
//! what is left. The result is a short, rating-sorted list of cards.

use std::collections::HashSet;
use std::sync::OnceLock;

use futures::stream::{self, StreamExt};
use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::contact::extract_contacts;
use crate::orchestrator::Collector;
use crate::types::{truncate_chars, ContactInfo, ListingResult};

/// Maximum characters of a listing title shown as company or product name.
pub const MAX_NAME_CHARS: usize = 140;

/// Listings scoring below this manufacturer confidence are skipped.
pub const MIN_MANUFACTURER_CONFIDENCE: f64 = 0.3;

/// Characters of the normalised company name used for card dedup.
const NAME_KEY_CHARS: usize = 40;

/// Lowercase vocabulary marking logistics offers or excluded regions.
const BANNED_TERMS: &[&str] = &[
    "shipping",
    "delivery",
    "logistics",
    "philippines",
    "物流",
    "доставка",
    "стоимость доставки",
    "логистика",
    "филиппины",
];

/// Hosts whose listings get full reputation weight.
const REPUTABLE_HOSTS: &[&str] = &[
    "alibaba.com",
    "made-in-china.com",
    "globalsources.com",
    "hktdc.com",
    "thomasnet.com",
    "kompass.com",
    "qcc.com",
    "tianyancha.com",
];

/// One enriched, rated supplier candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierCard {
    pub company_name: String,
    pub product: String,
    /// 0 to 100.
    pub rating: u8,
    pub source: String,
    pub website: String,
    pub contacts: ContactInfo,
}

struct Markers {
    factory: Regex,
    trading: Regex,
    production: Regex,
    legal: Regex,
    export: Regex,
}

impl Markers {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            factory: Regex::new(r"(?i)\bfactory\b|\bmanufacturer\b|我们的工厂|生产线|工厂")?,
            trading: Regex::new(r"(?i)trading company")?,
            production: Regex::new(r"(?i)production line|sq\.? ?m\b|employees|workshop")?,
            legal: Regex::new(r"(?i)ICP|备案|license|营业执照|统一社会信用代码")?,
            export: Regex::new(r"(?i)export|出口|海外|国际")?,
        })
    }
}

fn markers() -> Option<&'static Markers> {
    static MARKERS: OnceLock<Result<Markers, regex::Error>> = OnceLock::new();
    match MARKERS.get_or_init(Markers::compile) {
        Ok(markers) => Some(markers),
        Err(err) => {
            tracing::error!(error = %err, "enrichment markers failed to compile");
            None
        }
    }
}

/// Returns `true` if `text` mentions logistics or an excluded region.
pub fn is_banned(text: &str) -> bool {
    let lower = text.to_lowercase();
    BANNED_TERMS.iter().any(|term| lower.contains(term))
}

/// How much a detail page reads like a manufacturer, in `[0, 1]`.
///
/// An empty page scores 0.2: unknown, but not proof of a reseller.
pub fn manufacturer_confidence(html: &str) -> f64 {
    if html.is_empty() {
        return 0.2;
    }
    let Some(m) = markers() else {
        return 0.0;
    };
    let mut points = 0.0;
    if m.factory.is_match(html) {
        points += 0.6;
    }
    if m.trading.is_match(html) {
        points -= 0.4;
    }
    if m.production.is_match(html) {
        points += 0.2;
    }
    f64::clamp(points, 0.0, 1.0)
}

fn host_reputation(url: &str) -> f64 {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase));
    match host {
        Some(host)
            if REPUTABLE_HOSTS
                .iter()
                .any(|h| host == *h || host.ends_with(&format!(".{h}"))) =>
        {
            1.0
        }
        _ => 0.5,
    }
}

/// Weighted 0 to 100 rating of a supplier page.
///
/// | weight | signal                      | hit / miss |
/// |--------|-----------------------------|------------|
/// | 25%    | reputable marketplace host  | 1.0 / 0.5  |
/// | 20%    | certificates found          | 1.0 / 0.2  |
/// | 20%    | manufacturer confidence     | raw        |
/// | 15%    | price and MOQ both found    | 0.7 / 0.4  |
/// | 10%    | legal registration markers  | 0.8 / 0.4  |
/// | 10%    | export markers              | 0.7 / 0.4  |
pub fn compute_rating(html: &str, contacts: &ContactInfo, url: &str) -> u8 {
    let (legal, export) = match markers() {
        Some(m) => (m.legal.is_match(html), m.export.is_match(html)),
        None => (false, false),
    };
    let hit = |found: bool, yes: f64, no: f64| if found { yes } else { no };

    let score = 0.25 * host_reputation(url)
        + 0.20 * hit(contacts.certificates.is_some(), 1.0, 0.2)
        + 0.20 * manufacturer_confidence(html)
        + 0.15 * hit(contacts.price.is_some() && contacts.moq.is_some(), 0.7, 0.4)
        + 0.10 * hit(legal, 0.8, 0.4)
        + 0.10 * hit(export, 0.7, 0.4);

    // Clamped to [0, 100] so the cast cannot wrap.
    (score * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Turn one listing and its fetched detail page into a card, or `None` if
/// the listing is filtered out.
pub fn evaluate(listing: &ListingResult, page: &str) -> Option<SupplierCard> {
    if is_banned(page) || manufacturer_confidence(page) < MIN_MANUFACTURER_CONFIDENCE {
        return None;
    }
    let contacts = extract_contacts(page, &listing.link);
    let rating = compute_rating(page, &contacts, &listing.link);
    let name = truncate_chars(listing.title.trim(), MAX_NAME_CHARS);
    Some(SupplierCard {
        company_name: name.clone(),
        product: name,
        rating,
        source: listing.source.clone(),
        website: listing.link.clone(),
        contacts,
    })
}

/// Dedup key: host plus the first alphanumeric characters of the name.
fn card_key(card: &SupplierCard) -> String {
    let host = Url::parse(&card.website)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| "-".to_owned());
    let name: String = card
        .company_name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(NAME_KEY_CHARS)
        .collect();
    format!("{host}|{name}")
}

/// Dedup by host and name, sort by rating (stable), keep `top_k`.
pub fn rank_cards(cards: Vec<SupplierCard>, top_k: usize) -> Vec<SupplierCard> {
    let mut seen = HashSet::new();
    let mut unique: Vec<SupplierCard> = cards
        .into_iter()
        .filter(|card| seen.insert(card_key(card)))
        .collect();
    unique.sort_by(|a, b| b.rating.cmp(&a.rating));
    unique.truncate(top_k);
    unique
}

/// Enrich `listings` into at most `top_k` rated supplier cards.
///
/// Listings are considered in order. Detail pages are fetched with at most
/// `max_concurrency` in flight; collection stops once `enrich_candidates`
/// cards have been built.
pub async fn build_cards(collector: &Collector, listings: &[ListingResult]) -> Vec<SupplierCard> {
    let config = collector.config();
    let fetcher = collector.fetcher();

    let candidates = listings.iter().filter(|listing| {
        let usable = is_http_link(&listing.link) && !listing.title.trim().is_empty();
        usable && !is_banned(&listing.title)
    });
    let pending: Vec<_> = candidates
        .map(|listing| async move {
            let page = fetcher.fetch(&listing.source, &listing.link).await;
            evaluate(listing, &page)
        })
        .collect();

    let cards: Vec<SupplierCard> = stream::iter(pending)
        .buffered(config.max_concurrency)
        .filter_map(std::future::ready)
        .take(config.enrich_candidates)
        .collect()
        .await;

    tracing::debug!(enriched = cards.len(), "supplier cards built");
    rank_cards(cards, config.top_k)
}

fn is_http_link(link: &str) -> bool {
    link.starts_with("http://") || link.starts_with("https://")
}
