//! Response rendering: JSON payloads and HTML supplier cards.

use di_search::{CollectionRun, ContactInfo, ListingResult, RunStatus, SourceReport, SupplierCard};
use serde::{Deserialize, Serialize};

/// Line placed between consecutive cards.
pub const CARD_SEPARATOR: &str = "────────────────────────────";

const RANK_MARKERS: &[&str] = &["🥇", "🥈", "🥉", "4️⃣", "5️⃣"];

/// Requested response format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Html,
}

/// JSON body of `/search` and `/search_all`.
#[derive(Debug, Serialize)]
pub struct SearchPayload<'a> {
    pub status: RunStatus,
    pub query: &'a str,
    pub normalized_query: &'a str,
    pub count: usize,
    pub truncated: bool,
    pub used_fallback: bool,
    pub results: &'a [ListingResult],
    /// Per-source outcomes in registry order.
    pub sources: &'a [SourceReport],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cards: Option<&'a [SupplierCard]>,
}

impl<'a> SearchPayload<'a> {
    pub fn new(query: &'a str, run: &'a CollectionRun, cards: Option<&'a [SupplierCard]>) -> Self {
        Self {
            status: run.status(),
            query,
            normalized_query: &run.normalized_query,
            count: run.results.len(),
            truncated: run.truncated,
            used_fallback: run.used_fallback,
            results: &run.results,
            sources: &run.sources,
            cards,
        }
    }
}

/// Escape text for interpolation into HTML element content or attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `href` value for an external link, or `None` unless it is http(s).
fn web_href(link: &str) -> Option<String> {
    let link = link.trim();
    let lower = link.to_ascii_lowercase();
    (lower.starts_with("http://") || lower.starts_with("https://")).then(|| escape_html(link))
}

fn anchor(href: &str, text: &str) -> String {
    format!(
        r#"<a href="{href}" target="_blank" rel="noopener">{}</a>"#,
        escape_html(text)
    )
}

fn digits(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

/// Contact line: WeChat, WhatsApp, Telegram, email, phone and website,
/// separated by `|`.
fn contacts_html(contacts: &ContactInfo, website: &str) -> String {
    let mut parts = Vec::new();

    if let Some(wechat) = &contacts.wechat {
        parts.push(format!("WeChat: {}", escape_html(wechat)));
    }
    if let Some(whatsapp) = &contacts.whatsapp {
        let link = web_href(whatsapp)
            .unwrap_or_else(|| format!("https://wa.me/{}", digits(whatsapp)));
        parts.push(format!("WhatsApp: {}", anchor(&link, whatsapp)));
    }
    if let Some(telegram) = &contacts.telegram {
        let link = web_href(telegram)
            .unwrap_or_else(|| format!("https://t.me/{}", escape_html(telegram.trim_start_matches('@'))));
        parts.push(format!("Telegram: {}", anchor(&link, telegram)));
    }
    if let Some(email) = &contacts.email {
        let email = escape_html(email);
        parts.push(format!(r#"Email: <a href="mailto:{email}">{email}</a>"#));
    }
    if let Some(phone) = &contacts.phone {
        parts.push(format!(
            r#"Phone: <a href="tel:+{}">{}</a>"#,
            digits(phone),
            escape_html(phone)
        ));
    }
    if let Some(href) = web_href(website) {
        parts.push(format!("Website: {}", anchor(&href, website)));
    }

    parts.join(" | ")
}

fn field(label: &str, value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    (!value.is_empty()).then(|| format!("<div><b>{label}</b> {}</div>", escape_html(value)))
}

/// One ranked card. `index` is zero-based.
pub fn card_html(index: usize, card: &SupplierCard) -> String {
    let marker = RANK_MARKERS.get(index).copied().unwrap_or("▪️");
    let contacts = &card.contacts;
    let mut lines = vec![format!(
        "<div class=\"card\">\n<div>{marker} <b>TOP {} · {}</b></div>",
        index + 1,
        escape_html(&card.company_name)
    )];

    lines.extend(
        [
            field("🌍 Region:", contacts.region.as_deref()),
            field("🏷️ Product:", Some(card.product.as_str())),
            field("💰 Price:", contacts.price.as_deref()),
            field("📦 MOQ:", contacts.moq.as_deref()),
            field("🧾 Certificates:", contacts.certificates.as_deref()),
        ]
        .into_iter()
        .flatten(),
    );

    let contact_line = contacts_html(contacts, &card.website);
    if !contact_line.is_empty() {
        lines.push(format!("<div><b>📞 Contacts:</b> {contact_line}</div>"));
    }
    lines.push(format!("<div><b>🧠 Rating:</b> {} / 100</div>", card.rating));

    let source = match web_href(&card.website) {
        Some(href) => anchor(&href, &card.source),
        None => escape_html(&card.source),
    };
    lines.push(format!("<div><b>🔗 Source:</b> {source}</div>"));

    if let Some(href) = contacts.image.as_deref().and_then(web_href) {
        lines.push(format!("<div>{}</div>", anchor(&href, "Image")));
    }
    lines.push("</div>".to_owned());
    lines.join("\n")
}

/// Full HTML page for a query's cards.
pub fn render_html(query: &str, run: &CollectionRun, cards: &[SupplierCard]) -> String {
    let query = escape_html(query);
    let body = if cards.is_empty() {
        format!("<p>No suppliers found for “{query}”.</p>")
    } else {
        cards
            .iter()
            .enumerate()
            .map(|(i, card)| card_html(i, card))
            .collect::<Vec<_>>()
            .join(&format!("\n<p class=\"separator\">{CARD_SEPARATOR}</p>\n"))
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Suppliers: {query}</title>\n</head>\n<body>\n\
         <p>{} listings collected for <b>{}</b>.</p>\n{body}\n</body>\n</html>\n",
        run.results.len(),
        escape_html(&run.normalized_query),
    )
}
