//! Analyzer implementations that combine tokenizers and filters.

mod analyzer;
mod normalizer;
mod pipeline;

pub use analyzer::Analyzer;
pub use normalizer::TweetNormalizer;
pub use pipeline::PipelineAnalyzer;
