//! Pipeline configuration.
//!
//! Every field has a default, so a JSON file only needs to name what it
//! changes:
//!
//! ```
//! use tweet_sentiment::config::PipelineConfig;
//!
//! let config = PipelineConfig::from_json_str(r#"{ "classifier": { "max_iter": 200 } }"#).unwrap();
//! assert_eq!(config.classifier.max_iter, 200);
//! assert_eq!(config.vectorizer.max_features, Some(10_000));
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SentimentError};
use crate::ml::logistic::ClassifierConfig;
use crate::ml::tfidf::VectorizerConfig;

/// Hyperparameters for a whole pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub vectorizer: VectorizerConfig,
    pub classifier: ClassifierConfig,
}

impl PipelineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            SentimentError::input(format!("cannot read config {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    pub fn with_vectorizer(mut self, vectorizer: VectorizerConfig) -> Self {
        self.vectorizer = vectorizer;
        self
    }

    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.vectorizer.validate()?;
        self.classifier.validate()
    }

    /// Pretty JSON rendering, as accepted by [`PipelineConfig::from_json_str`].
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
