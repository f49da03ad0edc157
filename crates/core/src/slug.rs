//! Slug derivation.

use unicode_normalization::UnicodeNormalization;

/// Derive a lowercase, ASCII-only, URL-safe slug from a name.
///
/// Accented letters are decomposed and stripped of their marks, any other
/// non-ASCII character is dropped, and every run of characters outside
/// `[a-z0-9]` collapses into a single `-`. Leading and trailing separators
/// are removed.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;

    for c in name.nfkd().filter(char::is_ascii) {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn basic_names() {
        assert_eq!(slugify("Sport 10"), "sport-10");
        assert_eq!(slugify("test_sport"), "test-sport");
        assert_eq!(slugify("  Premier   League!! "), "premier-league");
    }

    #[test]
    fn apostrophes_split_words() {
        assert_eq!(slugify("IDon'tReallyLikeSports"), "idon-treallylikesports");
    }

    #[test]
    fn accents_are_transliterated() {
        assert_eq!(slugify("Fútbol Élite"), "futbol-elite");
        assert_eq!(slugify("Ætna 東京"), "tna");
    }

    #[test]
    fn output_is_ascii() {
        for name in ["Zürich ⚽ derby", "Ωmega", "---", ""] {
            assert!(slugify(name).is_ascii());
        }
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn pure_function() {
        assert_eq!(slugify("Same Name"), slugify("Same Name"));
    }

    proptest! {
        #[test]
        fn slug_is_ascii_and_stable(name in "\\PC{0,40}") {
            let slug = slugify(&name);
            prop_assert!(slug.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-'));
            prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
            prop_assert_eq!(slugify(&slug), slug);
        }
    }
}
