//! Lowercase char filter.

use super::CharFilter;

/// A char filter that lower-cases the whole input.
///
/// Runs on the raw string rather than on tokens so that the case-sensitive
/// patterns applied afterwards (URL schemes, mentions) only need to match
/// lower-case text.
#[derive(Clone, Debug, Default)]
pub struct LowercaseCharFilter;

impl LowercaseCharFilter {
    /// Create a new lowercase char filter.
    pub fn new() -> Self {
        LowercaseCharFilter
    }
}

impl CharFilter for LowercaseCharFilter {
    fn filter(&self, input: &str) -> String {
        if input.is_ascii() {
            input.to_ascii_lowercase()
        } else {
            input.to_lowercase()
        }
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase() {
        let filter = LowercaseCharFilter::new();
        assert_eq!(filter.filter("I LOVE This"), "i love this");
        assert_eq!(filter.filter("ÉCOLE"), "école");
        assert_eq!(filter.filter(""), "");
    }
}
