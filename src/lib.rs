//! # tweet-sentiment
//!
//! A small, reproducible sentiment classifier for short social-media text.
//!
//! ## Features
//!
//! - Deterministic tweet normalization (URL, mention and hashtag cleanup,
//!   lemmatization, stop-word removal)
//! - Unigram + bigram TF-IDF features with a capped vocabulary
//! - Class-balanced multinomial logistic regression trained with L-BFGS
//! - Independently versioned, checksummed artifacts in pluggable storage
//! - Hold-out evaluation with classification report and confusion matrix

pub mod analysis;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod ml;
pub mod pipeline;
pub mod storage;

pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::error::{Result, SentimentError};
    pub use crate::pipeline::{Prediction, SentimentPipeline, TrainingReport};
    pub use crate::storage::{ArtifactStore, FileStorage, MemoryStorage};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
