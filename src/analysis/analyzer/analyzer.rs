//! Core analyzer trait definition.
//!
//! An [`Analyzer`] turns raw text into the token stream the vectorizer counts:
//!
//! ```text
//! Raw Text → Char Filters → Tokenizer → Filter 1 → ... → Filter N → Tokens
//! ```
//!
//! # Available Implementations
//!
//! - [`PipelineAnalyzer`](super::PipelineAnalyzer) - Custom char filter + tokenizer + filter chains
//! - [`TweetNormalizer`](super::TweetNormalizer) - Social-media cleaning with lemmatization
//!
//! # Examples
//!
//! ```
//! use tweet_sentiment::analysis::analyzer::Analyzer;
//! use tweet_sentiment::analysis::token::TokenStream;
//! use tweet_sentiment::error::Result;
//!
//! struct MyAnalyzer;
//!
//! impl Analyzer for MyAnalyzer {
//!     fn analyze(&self, _text: &str) -> Result<TokenStream> {
//!         Ok(Box::new(std::iter::empty()))
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "my_analyzer"
//!     }
//!
//!     fn as_any(&self) -> &dyn std::any::Any {
//!         self
//!     }
//! }
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
///
/// The trait requires `Send + Sync` so that a fitted vectorizer can analyze
/// documents from several threads at once.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer.
    ///
    /// The name is persisted alongside a fitted vocabulary and checked when
    /// the vocabulary is loaded back, so it must be stable.
    fn name(&self) -> &'static str;

    /// Provide access to the concrete type for downcasting.
    fn as_any(&self) -> &dyn std::any::Any;
}
