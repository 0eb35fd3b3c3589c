use regex::Regex;

use crate::models::ReferenceKind;

fn scheme_patterns() -> &'static [(Regex, ReferenceKind)] {
    use std::sync::OnceLock;

    static PATTERNS: OnceLock<Vec<(Regex, ReferenceKind)>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            vec![
                (
                    Regex::new(r"(?i)^data:").expect("invalid data URI regex"),
                    ReferenceKind::DataUri,
                ),
                (
                    Regex::new(r"^#").expect("invalid fragment regex"),
                    ReferenceKind::Fragment,
                ),
                (
                    Regex::new(r"(?i)^[a-z][a-z0-9+.\-]*:").expect("invalid scheme regex"),
                    ReferenceKind::External,
                ),
                (
                    Regex::new(r"^//").expect("invalid protocol-relative regex"),
                    ReferenceKind::External,
                ),
            ]
        })
        .as_slice()
}

/// Classify references that must never be copied or rewritten.
///
/// Returns `None` for path-like references, which are left to the resolver.
pub fn classify_passthrough(value: &str) -> Option<ReferenceKind> {
    let value = value.trim();
    scheme_patterns()
        .iter()
        .find(|(pattern, _)| pattern.is_match(value))
        .map(|(_, kind)| kind.clone())
}

/// Split a reference into its path and a verbatim `?query` / `#fragment` suffix.
pub fn split_suffix(value: &str) -> (&str, &str) {
    match value.find(['?', '#']) {
        Some(index) => value.split_at(index),
        None => (value, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_http_urls_as_external() {
        assert_eq!(
            classify_passthrough("https://example.com/a.css"),
            Some(ReferenceKind::External)
        );
        assert_eq!(
            classify_passthrough("HTTP://example.com"),
            Some(ReferenceKind::External)
        );
        assert_eq!(
            classify_passthrough("//cdn.example.com/lib.js"),
            Some(ReferenceKind::External)
        );
        assert_eq!(
            classify_passthrough("mailto:user@example.com"),
            Some(ReferenceKind::External)
        );
    }

    #[test]
    fn classifies_data_uris_and_fragments() {
        assert_eq!(
            classify_passthrough("data:image/png;base64,abc"),
            Some(ReferenceKind::DataUri)
        );
        assert_eq!(classify_passthrough("#top"), Some(ReferenceKind::Fragment));
    }

    #[test]
    fn keeps_relative_paths() {
        assert_eq!(classify_passthrough("images/photo.png"), None);
        assert_eq!(classify_passthrough("../fonts/a.woff"), None);
        assert_eq!(classify_passthrough("/img/logo.svg"), None);
    }

    #[test]
    fn splits_query_and_fragment_suffixes() {
        assert_eq!(split_suffix("a.png?v=2"), ("a.png", "?v=2"));
        assert_eq!(split_suffix("font.eot?#iefix"), ("font.eot", "?#iefix"));
        assert_eq!(split_suffix("icons.svg#glyph"), ("icons.svg", "#glyph"));
        assert_eq!(split_suffix("plain.css"), ("plain.css", ""));
    }
}
