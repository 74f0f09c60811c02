//! Query normalisation.
//!
//! Most sources only understand Latin-script product terms, so a query
//! written in another script is mapped onto a curated English term when
//! one of the known stems appears in it.

/// Curated stem → canonical search term mapping, scanned in order.
const CANONICAL_TERMS: &[(&str, &str)] = &[
    ("фиброцем", "fiber cement panels"),
    ("пенобетон", "foam concrete"),
    ("лстк", "light gauge steel frame"),
    ("сэндвич", "sandwich panels"),
    ("оцинкован", "galvanized steel"),
    ("алюкобонд", "aluminum composite panel"),
];

/// Map `query` onto a canonical search term.
///
/// If the query contains non-Latin letters, the first curated stem found
/// (case-insensitively) replaces the whole query. Otherwise the query is
/// returned unchanged. Total and idempotent: canonical terms are Latin.
pub fn normalize_query(query: &str) -> String {
    if !has_non_latin_letters(query) {
        return query.to_owned();
    }
    let lowered = query.to_lowercase();
    CANONICAL_TERMS
        .iter()
        .find(|(stem, _)| lowered.contains(stem))
        .map_or_else(|| query.to_owned(), |(_, term)| (*term).to_owned())
}

/// Percent-encode a normalised query for substitution into a URL template.
pub fn encode_query(normalized: &str) -> String {
    urlencoding::encode(normalized).into_owned()
}

fn has_non_latin_letters(text: &str) -> bool {
    text.chars().any(|c| c.is_alphabetic() && !c.is_ascii())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyrillic_stem_maps_to_canonical_term() {
        assert_eq!(normalize_query("ЛСТК"), "light gauge steel frame");
        assert_eq!(normalize_query("Пенобетон блоки"), "foam concrete");
        assert_eq!(normalize_query("панели фиброцементные"), "fiber cement panels");
    }

    #[test]
    fn latin_query_passes_through() {
        assert_eq!(normalize_query("steel pipes"), "steel pipes");
        assert_eq!(normalize_query(""), "");
    }

    #[test]
    fn unknown_cyrillic_query_passes_through() {
        assert_eq!(normalize_query("кирпич"), "кирпич");
    }

    #[test]
    fn first_mapping_wins() {
        // Both "сэндвич" and "оцинкован" appear; "сэндвич" is earlier in the table.
        assert_eq!(
            normalize_query("оцинкованные сэндвич панели"),
            "sandwich panels"
        );
    }

    #[test]
    fn normalisation_is_idempotent() {
        for input in ["ЛСТК", "кирпич", "steel", "", "ФИБРОЦЕМЕНТ 8мм", "微信 сэндвич"] {
            let once = normalize_query(input);
            assert_eq!(normalize_query(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn encoded_query_is_url_safe() {
        let encoded = encode_query(&normalize_query("ЛСТК"));
        assert_eq!(encoded, "light%20gauge%20steel%20frame");
        assert_eq!(encode_query("a&b=c"), "a%26b%3Dc");
    }
}
