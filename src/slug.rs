//! Filesystem-safe identifiers derived from URLs.
//!
//! Distinct URLs may map to the same slug (`https://a.com/a/b` and
//! `https://a.com/ab` both become `httpsacomab`). Cache entries keyed by slug
//! are shared in that case.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s-]").expect("Failed to compile slug regex"));

static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-\s]+").expect("Failed to compile slug regex"));

/// Lowercase, ASCII-only, hyphen-separated form of `value`.
///
/// Characters that do not survive NFKD decomposition as ASCII are dropped,
/// never transliterated.
pub fn slugify(value: &str) -> String {
    let ascii: String = value.nfkd().filter(char::is_ascii).collect();
    let cleaned = NON_WORD.replace_all(&ascii, "");
    let lowered = cleaned.trim().to_lowercase();

    SEPARATORS.replace_all(&lowered, "-").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_punctuation_dropped() {
        assert_eq!(
            slugify("https://example.com/article"),
            "httpsexamplecomarticle"
        );
    }

    #[test]
    fn test_hyphens_and_underscores_kept() {
        assert_eq!(
            slugify("https://Example.com/my-long_post/"),
            "httpsexamplecommy-long_post"
        );
    }

    #[test]
    fn test_whitespace_and_hyphen_runs_collapse() {
        assert_eq!(slugify("  a -- b \t c  "), "a-b-c");
    }

    #[test]
    fn test_non_ascii_dropped() {
        // decomposable accents keep their base letter, everything else disappears
        assert_eq!(slugify("https://ja.wikipedia.org/wiki/東京"), "httpsjawikipediaorgwiki");
        assert_eq!(slugify("café"), "cafe");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "https://example.com/article",
            "https://example.com/a b/c--d?x=1&y=2#frag",
            " -leading and trailing- ",
            "東京 - Tokyo",
            "",
        ];
        for input in inputs {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_known_collision() {
        assert_eq!(
            slugify("https://example.com/ab"),
            slugify("https://example.com/a/b")
        );
    }
}
