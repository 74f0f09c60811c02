//! Listing deduplication by trimmed link.
//!
//! Two listings with the same trimmed link are the same listing regardless
//! of title or source; the first one seen is kept.

use std::collections::HashSet;

use crate::types::ListingResult;

/// Deduplicate `listings` in order and cut the result at `cap`.
///
/// Returns the surviving listings and whether anything was dropped by the
/// cap. Listings whose link is blank after trimming are discarded.
pub fn dedup_and_cap(listings: Vec<ListingResult>, cap: usize) -> (Vec<ListingResult>, bool) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique: Vec<ListingResult> = Vec::new();
    let mut truncated = false;

    for listing in listings {
        let key = listing.dedup_key();
        if key.is_empty() || seen.contains(key) {
            continue;
        }
        if unique.len() >= cap {
            truncated = true;
            break;
        }
        seen.insert(key.to_owned());
        unique.push(listing);
    }

    (unique, truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(link: &str, source: &str) -> ListingResult {
        ListingResult::new("Title", link, source)
    }

    #[test]
    fn first_seen_wins() {
        let (rows, truncated) = dedup_and_cap(
            vec![
                listing("https://z.com/item", "First"),
                listing(" https://z.com/item\n", "Second"),
            ],
            500,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].source, "First");
        assert!(!truncated);
    }

    #[test]
    fn order_is_preserved() {
        let (rows, _) = dedup_and_cap(
            vec![
                listing("https://a.com", "S"),
                listing("https://b.com", "S"),
                listing("https://a.com", "S"),
                listing("https://c.com", "S"),
            ],
            500,
        );
        let links: Vec<&str> = rows.iter().map(|r| r.link.as_str()).collect();
        assert_eq!(links, ["https://a.com", "https://b.com", "https://c.com"]);
    }

    #[test]
    fn blank_links_dropped() {
        let (rows, _) = dedup_and_cap(vec![listing("   ", "S"), listing("", "S")], 500);
        assert!(rows.is_empty());
    }

    #[test]
    fn cap_sets_truncated_only_when_exceeded() {
        let many: Vec<ListingResult> = (0..10)
            .map(|i| listing(&format!("https://a.com/{i}"), "S"))
            .collect();

        let (rows, truncated) = dedup_and_cap(many.clone(), 10);
        assert_eq!(rows.len(), 10);
        assert!(!truncated);

        let (rows, truncated) = dedup_and_cap(many, 4);
        assert_eq!(rows.len(), 4);
        assert!(truncated);
    }

    #[test]
    fn duplicates_past_the_cap_do_not_count_as_truncation() {
        let (rows, truncated) = dedup_and_cap(
            vec![
                listing("https://a.com", "S"),
                listing("https://b.com", "S"),
                listing("https://a.com", "S"),
            ],
            2,
        );
        assert_eq!(rows.len(), 2);
        assert!(!truncated);
    }
}
