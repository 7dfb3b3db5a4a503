//! Regex replacement char filter.
//!
//! Besides arbitrary patterns, this module carries the presets used to clean
//! social-media text: URLs, `@mentions`, hash marks and punctuation.

use regex::Regex;

use super::CharFilter;
use crate::error::{Result, SentimentError};

/// URL-like runs: `scheme://...` or anything starting with `http`, up to the
/// next whitespace. Expects lower-cased input.
pub const URL_PATTERN: &str = r"(?:[a-z][a-z0-9+.\-]*://|http)\S*";

/// An `@` followed by word characters.
pub const MENTION_PATTERN: &str = r"@\w+";

/// A literal hash mark; the hashtag word itself is kept.
pub const HASH_MARK_PATTERN: &str = r"#";

/// Any single character that is neither alphanumeric nor whitespace.
pub const NON_ALPHANUMERIC_PATTERN: &str = r"[^\p{Alphabetic}\p{N}\s]";

/// A char filter that replaces every match of a regex pattern.
#[derive(Clone, Debug)]
pub struct PatternReplaceCharFilter {
    pattern: Regex,
    replacement: String,
    name: &'static str,
}

impl PatternReplaceCharFilter {
    /// Create a new pattern replace char filter.
    pub fn new(pattern: &str, replacement: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| SentimentError::analysis(format!("Invalid regex pattern: {e}")))?;

        Ok(Self {
            pattern,
            replacement: replacement.to_string(),
            name: "pattern_replace",
        })
    }

    /// Remove URL-like substrings.
    pub fn urls() -> Result<Self> {
        Ok(Self::new(URL_PATTERN, "")?.with_name("strip_urls"))
    }

    /// Remove `@mention` tokens.
    pub fn mentions() -> Result<Self> {
        Ok(Self::new(MENTION_PATTERN, "")?.with_name("strip_mentions"))
    }

    /// Remove `#` characters, keeping the word that follows.
    pub fn hash_marks() -> Result<Self> {
        Ok(Self::new(HASH_MARK_PATTERN, "")?.with_name("strip_hash_marks"))
    }

    /// Replace each non-alphanumeric, non-whitespace character with a space.
    pub fn punctuation() -> Result<Self> {
        Ok(Self::new(NON_ALPHANUMERIC_PATTERN, " ")?.with_name("replace_punctuation"))
    }

    fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// The regex pattern this filter replaces.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl CharFilter for PatternReplaceCharFilter {
    fn filter(&self, input: &str) -> String {
        self.pattern
            .replace_all(input, self.replacement.as_str())
            .into_owned()
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_replace() {
        let filter = PatternReplaceCharFilter::new(r"(\d+)", "NUM").unwrap();
        assert_eq!(filter.filter("year 2024"), "year NUM");
        assert_eq!(filter.name(), "pattern_replace");
    }

    #[test]
    fn test_invalid_pattern() {
        let err = PatternReplaceCharFilter::new(r"(", "").unwrap_err();
        assert!(matches!(err, SentimentError::Analysis(_)));
    }

    #[test]
    fn test_strip_urls() {
        let filter = PatternReplaceCharFilter::urls().unwrap();
        assert_eq!(filter.filter("see http://x.co now"), "see  now");
        assert_eq!(filter.filter("go https://t.co/abc?x=1"), "go ");
        assert_eq!(filter.filter("ftp://files.example.org/a b"), " b");
        assert_eq!(filter.filter("visit httpbin"), "visit ");
        assert_eq!(filter.filter("no links here"), "no links here");
    }

    #[test]
    fn test_strip_mentions() {
        let filter = PatternReplaceCharFilter::mentions().unwrap();
        assert_eq!(filter.filter("@bob thanks @alice_99!"), " thanks !");
        assert_eq!(filter.filter("mail me @ home"), "mail me @ home");
    }

    #[test]
    fn test_strip_hash_marks() {
        let filter = PatternReplaceCharFilter::hash_marks().unwrap();
        assert_eq!(filter.filter("#amazing #day"), "amazing day");
    }

    #[test]
    fn test_replace_punctuation() {
        let filter = PatternReplaceCharFilter::punctuation().unwrap();
        assert_eq!(filter.filter("wow!!! it's_great"), "wow    it s great");
        assert_eq!(filter.filter("naïve 42"), "naïve 42");
    }
}
