//! The end-to-end sentiment pipeline.
//!
//! [`SentimentPipeline`] bundles the three fitted components and threads
//! text through them:
//!
//! ```text
//! text → TweetNormalizer → TfIdfVectorizer → LogisticRegression → LabelEncoder → label
//! ```
//!
//! A fitted pipeline is immutable and `Send + Sync`; load it once and share
//! it (by reference or `Arc`) with every caller.
//!
//! # Examples
//!
//! ```
//! use tweet_sentiment::config::PipelineConfig;
//! use tweet_sentiment::pipeline::SentimentPipeline;
//!
//! let corpus = ["I love this, amazing day", "I hate this, awful day"];
//! let labels = ["positive", "negative"];
//!
//! let (pipeline, report) = SentimentPipeline::train(&corpus, &labels, &PipelineConfig::default()).unwrap();
//! assert_eq!(report.classes, vec!["negative", "positive"]);
//!
//! let label = pipeline.predict("").unwrap();
//! assert!(label == "negative" || label == "positive");
//! ```

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::error::{Result, SentimentError};
use crate::ml::label::LabelEncoder;
use crate::ml::logistic::{FitSummary, LogisticRegression};
use crate::ml::tfidf::TfIdfVectorizer;

/// What a training run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub n_documents: usize,
    pub vocabulary_size: usize,
    pub classes: Vec<String>,
    pub fit: FitSummary,
}

/// A label together with the model's class probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    /// Probability of `label`.
    pub confidence: f64,
    /// `(class, probability)` for every class, in class index order.
    pub probabilities: Vec<(String, f64)>,
}

/// Normalizer, vectorizer, classifier and label codec as one unit.
#[derive(Debug, Clone)]
pub struct SentimentPipeline {
    vectorizer: TfIdfVectorizer,
    classifier: LogisticRegression,
    labels: Option<LabelEncoder>,
}

impl SentimentPipeline {
    /// Create an unfitted pipeline. Every prediction fails until it is fitted.
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(SentimentPipeline {
            vectorizer: TfIdfVectorizer::with_default_analyzer(config.vectorizer.clone())?,
            classifier: LogisticRegression::new(config.classifier.clone()),
            labels: None,
        })
    }

    /// Build and fit a pipeline in one step.
    pub fn train<S, L>(
        corpus: &[S],
        labels: &[L],
        config: &PipelineConfig,
    ) -> Result<(Self, TrainingReport)>
    where
        S: AsRef<str> + Sync,
        L: AsRef<str>,
    {
        let mut pipeline = Self::new(config)?;
        let report = pipeline.fit(corpus, labels)?;
        Ok((pipeline, report))
    }

    /// Fit every component on `corpus` and its parallel `labels`.
    ///
    /// On error the pipeline is left as it was.
    pub fn fit<S, L>(&mut self, corpus: &[S], labels: &[L]) -> Result<TrainingReport>
    where
        S: AsRef<str> + Sync,
        L: AsRef<str>,
    {
        if corpus.len() != labels.len() {
            return Err(SentimentError::LengthMismatch {
                expected: corpus.len(),
                actual: labels.len(),
            });
        }
        if corpus.is_empty() {
            return Err(SentimentError::input("cannot train on an empty corpus"));
        }

        let mut vectorizer = self.vectorizer.clone();
        let features = vectorizer.fit_transform(corpus)?;

        let encoder = LabelEncoder::fit(labels)?;
        let targets = encoder.encode_all(labels)?;

        let mut classifier = LogisticRegression::new(self.classifier.config().clone());
        let fit = classifier.fit(&features, &targets, encoder.len())?;

        let report = TrainingReport {
            n_documents: corpus.len(),
            vocabulary_size: vectorizer.vocabulary_size(),
            classes: encoder.classes().to_vec(),
            fit,
        };

        self.vectorizer = vectorizer;
        self.classifier = classifier;
        self.labels = Some(encoder);
        Ok(report)
    }

    /// Assemble a pipeline from separately fitted or loaded components.
    ///
    /// Fails with a state error if a component is unfitted or the shapes
    /// disagree.
    pub fn from_parts(
        vectorizer: TfIdfVectorizer,
        classifier: LogisticRegression,
        labels: LabelEncoder,
    ) -> Result<Self> {
        if !vectorizer.is_fitted() {
            return Err(SentimentError::NotFitted("vectorizer"));
        }
        classifier.validate()?;
        labels.validate()?;

        if classifier.n_features() != vectorizer.vocabulary_size() {
            return Err(SentimentError::shape(format!(
                "classifier expects {} features but the vocabulary has {} terms",
                classifier.n_features(),
                vectorizer.vocabulary_size()
            )));
        }
        if classifier.n_classes() != labels.len() {
            return Err(SentimentError::shape(format!(
                "classifier has {} classes but the label encoder has {}",
                classifier.n_classes(),
                labels.len()
            )));
        }

        Ok(SentimentPipeline {
            vectorizer,
            classifier,
            labels: Some(labels),
        })
    }

    pub fn is_fitted(&self) -> bool {
        self.labels.is_some()
    }

    /// The fitted components, or `NotFitted` before training or loading.
    pub fn parts(&self) -> Result<(&TfIdfVectorizer, &LogisticRegression, &LabelEncoder)> {
        match &self.labels {
            Some(labels) => Ok((&self.vectorizer, &self.classifier, labels)),
            None => Err(SentimentError::NotFitted("pipeline")),
        }
    }

    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &LogisticRegression {
        &self.classifier
    }

    pub fn label_encoder(&self) -> Option<&LabelEncoder> {
        self.labels.as_ref()
    }

    /// The class names, empty before fitting.
    pub fn classes(&self) -> &[String] {
        self.labels.as_ref().map(|l| l.classes()).unwrap_or(&[])
    }

    /// Predict the label of `text`. The empty string is valid input.
    pub fn predict(&self, text: &str) -> Result<String> {
        let (vectorizer, classifier, labels) = self.parts()?;
        let features = vectorizer.transform(text)?;
        let index = classifier.predict(&features)?;
        Ok(labels.decode(index)?.to_string())
    }

    /// Predict with the probability of every class.
    pub fn predict_with_confidence(&self, text: &str) -> Result<Prediction> {
        let (vectorizer, classifier, labels) = self.parts()?;
        let features = vectorizer.transform(text)?;
        let proba = classifier.predict_proba(&features)?;
        let index = classifier.predict(&features)?;

        let probabilities = labels
            .classes()
            .iter()
            .cloned()
            .zip(proba.iter().copied())
            .collect();

        Ok(Prediction {
            label: labels.decode(index)?.to_string(),
            confidence: proba[index],
            probabilities,
        })
    }

    /// Predict many texts in parallel. The output order matches the input.
    pub fn predict_batch<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Result<Vec<String>> {
        self.parts()?;
        texts.par_iter().map(|text| self.predict(text.as_ref())).collect()
    }
}
