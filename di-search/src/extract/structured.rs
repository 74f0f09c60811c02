//! Curated per-source extraction with positional title/link pairing.
//!
//! Titles and links are collected independently (each deduplicated in
//! document order) and then zipped by index. The pairing is approximate:
//! it is only as good as the curated selectors are narrow.

use scraper::Html;

use crate::registry::SelectorPair;
use crate::types::{ListingResult, MISSING_LINK};

use super::{element_text, fix_protocol_relative, parse_selector};

/// Extract up to `cap` listings from `html` using curated selector pairs.
///
/// Rules accumulate into shared title and link lists. Row `i` pairs
/// `titles[i]` with `links[i]`, or with [`MISSING_LINK`] when the link list
/// is shorter.
pub fn extract_structured(
    html: &str,
    rules: &[SelectorPair],
    source: &str,
    cap: usize,
) -> Vec<ListingResult> {
    if html.trim().is_empty() {
        return Vec::new();
    }
    let document = Html::parse_document(html);

    let mut titles: Vec<String> = Vec::new();
    let mut links: Vec<String> = Vec::new();

    for rule in rules {
        if let Some(selector) = parse_selector(&rule.title) {
            for element in document.select(&selector) {
                let title = element_text(element);
                if !title.is_empty() && !titles.contains(&title) {
                    titles.push(title);
                }
            }
        }
        if let Some(selector) = parse_selector(&rule.link) {
            for element in document.select(&selector) {
                let Some(href) = element.value().attr("href").map(str::trim) else {
                    continue;
                };
                if !href.is_empty() && !links.iter().any(|l| l == href) {
                    links.push(href.to_owned());
                }
            }
        }
    }

    let rows: Vec<ListingResult> = titles
        .iter()
        .take(cap)
        .enumerate()
        .map(|(i, title)| {
            let link = links
                .get(i)
                .map_or_else(|| MISSING_LINK.to_owned(), |l| fix_protocol_relative(l));
            ListingResult::new(title, &link, source)
        })
        .collect();

    tracing::debug!(
        source,
        titles = titles.len(),
        links = links.len(),
        rows = rows.len(),
        "structured extraction"
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(title: &str, link: &str) -> Vec<SelectorPair> {
        vec![SelectorPair::new(title, link)]
    }

    #[test]
    fn missing_link_gets_sentinel() {
        let html = r#"<div class="t">A</div><div class="t">B</div><a class="l" href="u1">x</a>"#;
        let rows = extract_structured(html, &rule(".t", "a.l"), "Src", 5);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "A");
        assert_eq!(rows[0].link, "u1");
        assert_eq!(rows[1].title, "B");
        assert_eq!(rows[1].link, MISSING_LINK);
    }

    #[test]
    fn capped_at_five_rows() {
        let html: String = (0..9)
            .map(|i| format!(r#"<h3 class="t"><a href="https://s.com/{i}">Item {i}</a></h3>"#))
            .collect();
        let rows = extract_structured(&html, &rule("h3.t a", "h3.t a"), "Baidu", 5);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[4].title, "Item 4");
        assert_eq!(rows[4].link, "https://s.com/4");
    }

    #[test]
    fn titles_and_links_deduplicated_independently() {
        let html = r#"
            <p class="company-name"><a href="https://m.com/a">Acme</a></p>
            <p class="company-name"><a href="https://m.com/b">Acme</a></p>
            <p class="company-name"><a href="https://m.com/a">Beta</a></p>
        "#;
        let rows = extract_structured(html, &rule(".company-name a", ".company-name a"), "MIC", 5);
        // Titles: [Acme, Beta]; links: [m.com/a, m.com/b] → positional zip.
        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].title.as_str(), rows[0].link.as_str()), ("Acme", "https://m.com/a"));
        assert_eq!((rows[1].title.as_str(), rows[1].link.as_str()), ("Beta", "https://m.com/b"));
    }

    #[test]
    fn rules_accumulate_across_pairs() {
        let html = r#"<div class="x"><a href="https://a.com">First</a></div>
                      <div class="y"><a href="https://b.com">Second</a></div>"#;
        let rules = vec![
            SelectorPair::new(".x a", ".x a"),
            SelectorPair::new(".y a", ".y a"),
        ];
        let rows = extract_structured(html, &rules, "Multi", 5);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].link, "https://b.com");
    }

    #[test]
    fn title_selector_without_anchor_uses_text() {
        let html = r#"<h2 class="organic-gallery-title"><a href="//www.alibaba.com/p/1">  Steel   frame </a></h2>"#;
        let rows = extract_structured(
            html,
            &rule(".organic-gallery-title", ".organic-gallery-title a"),
            "Alibaba",
            5,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Steel frame");
        assert_eq!(rows[0].link, "https://www.alibaba.com/p/1");
    }

    #[test]
    fn empty_and_garbage_html_yield_nothing() {
        assert!(extract_structured("", &rule("a", "a"), "S", 5).is_empty());
        assert!(extract_structured("<<<%%%not html", &rule("a", "a"), "S", 5).is_empty());
    }

    #[test]
    fn invalid_selector_yields_nothing() {
        let html = r#"<a href="https://a.com">A</a>"#;
        assert!(extract_structured(html, &rule("[[bad", "[[bad"), "S", 5).is_empty());
    }

    #[test]
    fn empty_titles_skipped() {
        let html = r#"<a class="t" href="https://a.com">   </a><a class="t" href="https://b.com">B</a>"#;
        let rows = extract_structured(html, &rule("a.t", "a.t"), "S", 5);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "B");
        // Link list still holds both hrefs, so pairing is positional.
        assert_eq!(rows[0].link, "https://a.com");
    }
}
