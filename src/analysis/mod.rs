//! Text analysis for tweet-sentiment.
//!
//! Raw text goes through char filters, a tokenizer and token filters, in the
//! manner of Lucene-style analysis chains. [`TweetNormalizer`] is the chain
//! the vectorizer uses; the building blocks are public so that other chains
//! can be assembled with [`PipelineAnalyzer`].

pub mod analyzer;
pub mod char_filter;
pub mod linguistic;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

// Re-export commonly used types
pub use analyzer::*;
pub use linguistic::{Lexeme, LinguisticModel, RuleBasedEnglish};
pub use token::*;
