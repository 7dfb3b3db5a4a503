//! Char filter implementations for text normalization.
//!
//! Char filters rewrite the raw string before it reaches the tokenizer. They
//! run in the order they were added to a
//! [`PipelineAnalyzer`](crate::analysis::analyzer::PipelineAnalyzer), and that
//! order matters: URLs must be stripped before punctuation is replaced, or
//! `http://x.co` would survive as the tokens `http x co`.
//!
//! # Available Filters
//!
//! - [`lowercase::LowercaseCharFilter`] - Unicode lower-casing
//! - [`pattern_replace::PatternReplaceCharFilter`] - Regex-based replacement,
//!   with presets for URLs, mentions, hash marks and punctuation
//! - [`collapse_whitespace::CollapseWhitespaceCharFilter`] - Whitespace
//!   collapsing and trimming
//!
//! # Examples
//!
//! ```
//! use tweet_sentiment::analysis::char_filter::CharFilter;
//! use tweet_sentiment::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
//!
//! let filter = PatternReplaceCharFilter::mentions().unwrap();
//! assert_eq!(filter.filter("hi @bob!"), "hi !");
//! ```

/// Trait for character filters that transform text before tokenization.
pub trait CharFilter: Send + Sync {
    /// Apply this filter to the input text and return the filtered text.
    fn filter(&self, input: &str) -> String;

    /// Get the name of this char filter.
    fn name(&self) -> &'static str;
}

pub mod collapse_whitespace;
pub mod lowercase;
pub mod pattern_replace;

pub use collapse_whitespace::CollapseWhitespaceCharFilter;
pub use lowercase::LowercaseCharFilter;
pub use pattern_replace::PatternReplaceCharFilter;
