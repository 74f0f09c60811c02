//! Best-effort contact and commercial field extraction from a listing page.
//!
//! Each field has a prioritised list of independent regex rules, each run
//! against either the page's visible text or its raw HTML; the first rule
//! that yields a non-empty value wins. A DOM pass over anchors then fills
//! fields the regex pass missed. Nothing here is authoritative: every
//! result is tagged [`Confidence::Heuristic`](crate::types::Confidence).

use std::sync::OnceLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::types::{truncate_chars, ContactInfo};

/// Maximum characters kept for free-text fields (region, price, MOQ).
const MAX_FIELD_CHARS: usize = 120;

/// Maximum distinct certificate markers reported.
const MAX_CERTIFICATES: usize = 10;

/// Which representation of the page a rule scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Haystack {
    Text,
    Html,
}

/// One regex rule; `group` 0 takes the whole match.
struct FieldRule {
    haystack: Haystack,
    regex: Regex,
    group: usize,
}

impl FieldRule {
    fn new(haystack: Haystack, pattern: &str, group: usize) -> Result<Self, regex::Error> {
        Ok(Self {
            haystack,
            regex: Regex::new(pattern)?,
            group,
        })
    }

    fn first_match(&self, text: &str, html: &str) -> Option<String> {
        let haystack = match self.haystack {
            Haystack::Text => text,
            Haystack::Html => html,
        };
        self.regex.captures_iter(haystack).find_map(|caps| {
            let value = caps.get(self.group)?.as_str().trim();
            (!value.is_empty()).then(|| value.to_owned())
        })
    }
}

struct ContactPatterns {
    phone: Regex,
    email: Vec<FieldRule>,
    whatsapp: Vec<FieldRule>,
    telegram: Vec<FieldRule>,
    wechat: Vec<FieldRule>,
    region: Vec<FieldRule>,
    moq: Vec<FieldRule>,
    price: Vec<FieldRule>,
    certificate: Regex,
}

impl ContactPatterns {
    fn compile() -> Result<Self, regex::Error> {
        use Haystack::{Html, Text};
        Ok(Self {
            phone: Regex::new(r"\+?\d[\d\- \t()]{6,}\d")?,
            email: vec![FieldRule::new(
                Text,
                r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}",
                0,
            )?],
            whatsapp: vec![FieldRule::new(
                Html,
                r"(?i)(?:wa\.me/|whatsapp(?:\.com)?/send\?phone=)(\+?\d[\d-]{5,})",
                1,
            )?],
            telegram: vec![FieldRule::new(
                Html,
                r"(?i)(?:\bt\.me/|\btelegram\.me/)([A-Za-z0-9_]{3,})",
                1,
            )?],
            wechat: vec![
                FieldRule::new(
                    Text,
                    r"(?i)(?:wechat|weixin|微信)(?:\s*(?:id|号))?\s*[:：]\s*([A-Za-z][A-Za-z0-9_-]{4,40})",
                    1,
                )?,
                FieldRule::new(Html, r#"(?i)(?:weixin\.qq\.com|wxid)[^\s'"<>]{0,40}"#, 0)?,
            ],
            region: vec![FieldRule::new(
                Text,
                r"(?i)(?:\b(?:province|city|регион|address)\b|所在地|所在省)[:： \t\-–]*([\p{L}\p{N}\-, \t]+)",
                1,
            )?],
            moq: vec![FieldRule::new(
                Text,
                r"(?i)(?:MOQ|min(?:imum)?\.?\s*order(?:\s*quantity)?|минимальный заказ|минимальный объ[её]м|起订量)[^\d]{0,10}(\d[\d,. \t]*)",
                1,
            )?],
            price: vec![FieldRule::new(
                Text,
                r"(?i)(?:price|цена|价格)[^\d$€£¥]{0,10}([$€£¥]? ?\d[\d.,/$€£¥ \t-]*)",
                1,
            )?],
            certificate: Regex::new(
                r"(?i)\b(ISO\s?\d{4,5}|ISO|CE|RoHS|BSCI|FCC|UL|CSA|GMP|HACCP|REACH|FDA|ICP|сертификат[а-яё]*|certificates?)\b",
            )?,
        })
    }
}

fn patterns() -> Option<&'static ContactPatterns> {
    static PATTERNS: OnceLock<Result<ContactPatterns, regex::Error>> = OnceLock::new();
    match PATTERNS.get_or_init(ContactPatterns::compile) {
        Ok(patterns) => Some(patterns),
        Err(err) => {
            tracing::error!(error = %err, "contact patterns failed to compile");
            None
        }
    }
}

/// Extract contact and commercial fields from a detail page.
///
/// `url` is the page's own address, used to resolve a relative image link.
/// Empty or garbage input yields an empty [`ContactInfo`].
pub fn extract_contacts(html: &str, url: &str) -> ContactInfo {
    let mut info = ContactInfo::default();
    if html.trim().is_empty() {
        return info;
    }
    let Some(patterns) = patterns() else {
        return info;
    };

    let document = Html::parse_document(&strip_tags(html, &["script", "style", "noscript"]));
    let text = visible_text(&document);

    info.phone = first_phone(&patterns.phone, &text);
    info.email = first_of(&patterns.email, &text, html);
    info.whatsapp = first_of(&patterns.whatsapp, &text, html);
    info.telegram = first_of(&patterns.telegram, &text, html);
    info.wechat = first_of(&patterns.wechat, &text, html);
    info.region = first_of(&patterns.region, &text, html).map(|v| clip_field(&v));
    info.moq = first_of(&patterns.moq, &text, html).map(|v| clip_field(&v));
    info.price = first_of(&patterns.price, &text, html).map(|v| clip_field(&v));
    info.certificates = certificates(&patterns.certificate, &text);

    fill_from_anchors(&document, &mut info);
    info.image = image_link(&document, url);

    tracing::trace!(url, empty = info.is_empty(), "contacts extracted");
    info
}

fn first_of(rules: &[FieldRule], text: &str, html: &str) -> Option<String> {
    rules.iter().find_map(|rule| rule.first_match(text, html))
}

/// First digit run that plausibly is a phone number (7 to 15 digits).
fn first_phone(regex: &Regex, text: &str) -> Option<String> {
    regex
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .find(|candidate| {
            let digits = candidate.chars().filter(char::is_ascii_digit).count();
            (7..=15).contains(&digits)
        })
        .map(str::to_owned)
}

fn certificates(regex: &Regex, text: &str) -> Option<String> {
    let mut found: Vec<String> = Vec::new();
    for m in regex.find_iter(text) {
        let marker = m.as_str();
        if !found.iter().any(|f| f.eq_ignore_ascii_case(marker)) {
            found.push(marker.to_owned());
        }
        if found.len() >= MAX_CERTIFICATES {
            break;
        }
    }
    (!found.is_empty()).then(|| found.join("; "))
}

/// Fill still-missing fields from `mailto:`, `tel:`, WhatsApp, Telegram and WeChat links.
fn fill_from_anchors(document: &Html, info: &mut ContactInfo) {
    let Ok(selector) = Selector::parse("a[href]") else {
        return;
    };
    for anchor in document.select(&selector) {
        let href = anchor.value().attr("href").unwrap_or_default().trim();
        if href.is_empty() {
            continue;
        }
        let lower = href.to_ascii_lowercase();

        if info.email.is_none() && lower.starts_with("mailto:") {
            let address = href["mailto:".len()..].split('?').next().unwrap_or_default();
            if !address.is_empty() {
                info.email = Some(address.to_owned());
            }
        }
        if info.phone.is_none() && lower.starts_with("tel:") {
            let number = href["tel:".len()..].trim();
            if !number.is_empty() {
                info.phone = Some(number.to_owned());
            }
        }
        if info.whatsapp.is_none() && (lower.contains("wa.me") || lower.contains("whatsapp")) {
            info.whatsapp = Some(href.to_owned());
        }
        if info.telegram.is_none() && (lower.contains("t.me/") || lower.contains("telegram")) {
            info.telegram = Some(href.to_owned());
        }
        if info.wechat.is_none() && lower.contains("weixin") {
            info.wechat = Some(href.to_owned());
        }
    }
}

/// `og:image` meta content, else the first `<img src>`, resolved against `url`.
fn image_link(document: &Html, url: &str) -> Option<String> {
    let meta = Selector::parse(r#"meta[property="og:image"], meta[name="og:image"]"#).ok()?;
    let img = Selector::parse("img[src]").ok()?;

    let raw = document
        .select(&meta)
        .find_map(|el| el.value().attr("content"))
        .or_else(|| document.select(&img).find_map(|el| el.value().attr("src")))
        .map(str::trim)
        .filter(|s| !s.is_empty())?;

    match Url::parse(url).and_then(|base| base.join(raw)) {
        Ok(resolved) => Some(resolved.to_string()),
        Err(_) => Some(raw.to_owned()),
    }
}

fn visible_text(document: &Html) -> String {
    document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn clip_field(value: &str) -> String {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(collapsed.trim_end_matches([',', '-', '/', ' ']), MAX_FIELD_CHARS)
}

/// Remove all instances of the given tags and their content before parsing.
fn strip_tags(html: &str, tags: &[&str]) -> String {
    tags.iter()
        .fold(html.to_owned(), |acc, tag| strip_tag(&acc, tag))
}

/// Remove all instances of a specific HTML tag and its content.
fn strip_tag(html: &str, tag: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let lower = html.to_ascii_lowercase();
    let open_tag = format!("<{tag}");
    let close_tag = format!("</{tag}>");

    let mut pos = 0;
    loop {
        let start = match lower[pos..].find(&open_tag) {
            Some(offset) => pos + offset,
            None => {
                result.push_str(&html[pos..]);
                break;
            }
        };

        // `<styles>` is not `<style`: the tag name must end here.
        let after_tag = start + open_tag.len();
        if let Some(&next) = lower.as_bytes().get(after_tag) {
            if !matches!(next, b' ' | b'>' | b'/' | b'\n' | b'\r' | b'\t') {
                result.push_str(&html[pos..after_tag]);
                pos = after_tag;
                continue;
            }
        }

        result.push_str(&html[pos..start]);

        pos = match lower[start..].find(&close_tag) {
            Some(offset) => start + offset + close_tag.len(),
            None => match lower[start..].find('>') {
                Some(offset) => start + offset + 1,
                None => html.len(),
            },
        };
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUPPLIER_PAGE: &str = r#"<html><head>
        <meta property="og:image" content="/img/factory.jpg">
        <script>var tracking = "+1 (555) 000-0000";</script>
        </head><body>
        <h1>Hebei Steel Frame Factory</h1>
        <p>Address: Shijiazhuang, Hebei</p>
        <p>Tel: +86 311 8888 1234</p>
        <p>Email us at sales@hebei-steel.cn</p>
        <p>WeChat: hebeisteel88</p>
        <p>Price: $12.50 / piece</p>
        <p>MOQ: 500 pieces</p>
        <p>Certified ISO 9001, CE and RoHS. ISO 9001 audited yearly.</p>
        <a href="https://wa.me/8613800001111">Chat</a>
        <a href="https://t.me/hebeisteel">Telegram</a>
        </body></html>"#;

    #[test]
    fn full_supplier_page() {
        let info = extract_contacts(SUPPLIER_PAGE, "https://hebei-steel.cn/about");
        assert_eq!(info.phone.as_deref(), Some("+86 311 8888 1234"));
        assert_eq!(info.email.as_deref(), Some("sales@hebei-steel.cn"));
        assert_eq!(info.whatsapp.as_deref(), Some("8613800001111"));
        assert_eq!(info.telegram.as_deref(), Some("hebeisteel"));
        assert_eq!(info.wechat.as_deref(), Some("hebeisteel88"));
        assert_eq!(info.region.as_deref(), Some("Shijiazhuang, Hebei"));
        assert_eq!(info.price.as_deref(), Some("$12.50"));
        assert_eq!(info.moq.as_deref(), Some("500"));
        assert_eq!(info.certificates.as_deref(), Some("ISO 9001; CE; RoHS"));
        assert_eq!(
            info.image.as_deref(),
            Some("https://hebei-steel.cn/img/factory.jpg")
        );
    }

    #[test]
    fn script_content_is_not_scanned() {
        let html = r#"<script>call("+1 (555) 000-0000")</script><p>no contacts here</p>"#;
        let info = extract_contacts(html, "https://x.com");
        assert!(info.phone.is_none());
    }

    #[test]
    fn anchors_fill_missing_fields() {
        let html = r#"<body>
            <a href="mailto:buyer@plant.com?subject=RFQ">Write</a>
            <a href="tel:+8657188889999">Call</a>
            <a href="https://api.whatsapp.com/">WhatsApp</a>
            <a href="https://telegram.org/dl">Telegram</a>
            <a href="https://open.weixin.com/qr">QR</a>
        </body>"#;
        let info = extract_contacts(html, "https://plant.com");
        assert_eq!(info.email.as_deref(), Some("buyer@plant.com"));
        assert_eq!(info.phone.as_deref(), Some("+8657188889999"));
        assert_eq!(info.whatsapp.as_deref(), Some("https://api.whatsapp.com/"));
        assert_eq!(info.telegram.as_deref(), Some("https://telegram.org/dl"));
        assert_eq!(info.wechat.as_deref(), Some("https://open.weixin.com/qr"));
    }

    #[test]
    fn regex_value_wins_over_anchor() {
        let html = r#"<p>Contact: first@a.com</p><a href="mailto:second@a.com">mail</a>"#;
        let info = extract_contacts(html, "https://a.com");
        assert_eq!(info.email.as_deref(), Some("first@a.com"));
    }

    #[test]
    fn short_digit_runs_are_not_phones() {
        let html = "<p>Founded 2004, 120 staff</p>";
        assert!(extract_contacts(html, "https://a.com").phone.is_none());
    }

    #[test]
    fn cyrillic_labels() {
        let html = "<p>Регион: Московская область</p><p>Минимальный заказ: 1 000 шт</p><p>Цена: 450 руб</p>";
        let info = extract_contacts(html, "https://a.ru");
        assert_eq!(info.region.as_deref(), Some("Московская область"));
        assert_eq!(info.moq.as_deref(), Some("1 000"));
        assert_eq!(info.price.as_deref(), Some("450"));
    }

    #[test]
    fn city_inside_a_word_is_not_a_region_label() {
        let html = "<p>Capacity: 3000 tons</p>";
        assert!(extract_contacts(html, "https://a.com").region.is_none());
    }

    #[test]
    fn first_img_used_without_og_image() {
        let html = r#"<img src="https://cdn.a.com/p.png"><img src="/second.png">"#;
        let info = extract_contacts(html, "https://a.com");
        assert_eq!(info.image.as_deref(), Some("https://cdn.a.com/p.png"));
    }

    #[test]
    fn empty_and_garbage_input() {
        assert!(extract_contacts("", "https://a.com").is_empty());
        assert!(extract_contacts("<<<>>>", "not a url").is_empty());
    }

    #[test]
    fn strip_tag_keeps_similar_tag_names() {
        let html = "<styles>keep</styles><style>drop</style>";
        assert_eq!(strip_tag(html, "style"), "<styles>keep</styles>");
    }
}
