//! TF-IDF vectorizer for text feature extraction.
//!
//! The vectorizer learns a capped vocabulary of word n-grams and their
//! document frequencies from a training corpus, then maps any text to an
//! L2-normalized [`SparseVector`]:
//!
//! ```text
//! weight(t, d) = tf(t, d) * idf(t)
//! idf(t)       = ln((1 + N) / (1 + df(t))) + 1
//! ```
//!
//! where `tf` is the raw count of `t` in `d` (or `1 + ln(count)` with
//! sublinear scaling), `N` is the number of training documents and `df(t)`
//! the number of training documents containing `t`.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use tweet_sentiment::analysis::TweetNormalizer;
//! use tweet_sentiment::ml::tfidf::{TfIdfVectorizer, VectorizerConfig};
//!
//! let corpus = vec![
//!     "I love this phone".to_string(),
//!     "I hate this phone".to_string(),
//! ];
//!
//! let analyzer = Arc::new(TweetNormalizer::new().unwrap());
//! let mut vectorizer = TfIdfVectorizer::new(VectorizerConfig::default(), analyzer);
//! vectorizer.fit(&corpus).unwrap();
//!
//! // love, hate, phone, "love phone", "hate phone"
//! assert_eq!(vectorizer.vocabulary_size(), 5);
//!
//! let features = vectorizer.transform("love love it").unwrap();
//! assert!((features.l2_norm() - 1.0).abs() < 1e-9);
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{Analyzer, TweetNormalizer};
use crate::error::{Result, SentimentError};
use crate::ml::sparse::SparseVector;

/// Default vocabulary cap.
pub const DEFAULT_MAX_FEATURES: usize = 10_000;

/// Vectorizer hyperparameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Keep at most this many terms, the most frequent ones. `None` keeps all.
    pub max_features: Option<usize>,

    /// Smallest and largest n-gram length, both inclusive.
    pub ngram_range: (usize, usize),

    /// Drop terms that occur in fewer training documents than this.
    pub min_df: usize,

    /// Use `1 + ln(tf)` instead of the raw term count.
    pub sublinear_tf: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        VectorizerConfig {
            max_features: Some(DEFAULT_MAX_FEATURES),
            ngram_range: (1, 2),
            min_df: 1,
            sublinear_tf: false,
        }
    }
}

impl VectorizerConfig {
    /// Set the vocabulary cap.
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the n-gram range.
    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        self.ngram_range = (min_n, max_n);
        self
    }

    /// Set the minimum document frequency.
    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df;
        self
    }

    /// Enable or disable sublinear term frequency.
    pub fn with_sublinear_tf(mut self, sublinear_tf: bool) -> Self {
        self.sublinear_tf = sublinear_tf;
        self
    }

    /// Reject settings that cannot produce a vocabulary.
    pub fn validate(&self) -> Result<()> {
        if self.max_features == Some(0) {
            return Err(SentimentError::input("max_features must be greater than 0"));
        }
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(SentimentError::input(format!(
                "invalid ngram_range ({min_n}, {max_n}): need 1 <= min <= max"
            )));
        }
        if self.min_df == 0 {
            return Err(SentimentError::input("min_df must be at least 1"));
        }
        Ok(())
    }
}

/// The serializable part of a fitted vectorizer.
///
/// Only counts are stored; IDF weights are recomputed on load with the same
/// formula, so they come out bit-identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerState {
    pub config: VectorizerConfig,
    /// Name of the analyzer the vocabulary was built with.
    pub analyzer: String,
    /// Terms ordered by feature index.
    pub terms: Vec<String>,
    /// Document frequency of each term, parallel to `terms`.
    pub document_frequency: Vec<usize>,
    pub n_documents: usize,
}

/// TF-IDF vectorizer for text feature extraction.
#[derive(Clone)]
pub struct TfIdfVectorizer {
    config: VectorizerConfig,
    /// Analyzer for tokenization.
    analyzer: Arc<dyn Analyzer>,
    /// Vocabulary: term -> index mapping.
    vocabulary: HashMap<String, usize>,
    /// Terms by index.
    terms: Vec<String>,
    document_frequency: Vec<usize>,
    /// Inverse document frequency for each term.
    idf: Vec<f64>,
    /// Total number of documents seen during training.
    n_documents: usize,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("config", &self.config)
            .field("vocabulary_size", &self.vocabulary.len())
            .field("n_documents", &self.n_documents)
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer with the specified analyzer.
    pub fn new(config: VectorizerConfig, analyzer: Arc<dyn Analyzer>) -> Self {
        Self {
            config,
            analyzer,
            vocabulary: HashMap::new(),
            terms: Vec::new(),
            document_frequency: Vec::new(),
            idf: Vec::new(),
            n_documents: 0,
        }
    }

    /// Create an unfitted vectorizer backed by the default tweet normalizer.
    pub fn with_default_analyzer(config: VectorizerConfig) -> Result<Self> {
        Ok(Self::new(config, Arc::new(TweetNormalizer::new()?)))
    }

    /// Fit the vectorizer on training documents.
    pub fn fit<S: AsRef<str> + Sync>(&mut self, documents: &[S]) -> Result<()> {
        self.config.validate()?;
        if documents.is_empty() {
            return Err(SentimentError::input("cannot fit a vectorizer on an empty corpus"));
        }

        let analyzed: Vec<Vec<String>> = documents
            .par_iter()
            .map(|doc| self.terms_of(doc.as_ref()))
            .collect::<Result<_>>()?;

        let mut term_frequency: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();

        for terms in &analyzed {
            let mut seen = HashSet::new();
            for term in terms {
                *term_frequency.entry(term.clone()).or_insert(0) += 1;
                if seen.insert(term.as_str()) {
                    *document_frequency.entry(term.clone()).or_insert(0) += 1;
                }
            }
        }

        let min_df = self.config.min_df;
        let mut candidates: Vec<(String, usize)> = term_frequency
            .into_iter()
            .filter(|(term, _)| document_frequency.get(term).copied().unwrap_or(0) >= min_df)
            .collect();

        if candidates.is_empty() {
            return Err(SentimentError::input(
                "empty vocabulary: the documents contain only stop words or noise",
            ));
        }

        // Most frequent first, lexical order among equals.
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if let Some(max_features) = self.config.max_features {
            candidates.truncate(max_features);
        }

        let mut terms: Vec<String> = candidates.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        let df: Vec<usize> = terms
            .iter()
            .map(|term| document_frequency.get(term).copied().unwrap_or(0))
            .collect();

        self.install(terms, df, documents.len());

        log::debug!(
            "Fitted vectorizer on {} documents: {} features (cap {:?})",
            self.n_documents,
            self.terms.len(),
            self.config.max_features
        );

        Ok(())
    }

    /// Transform a document into an L2-normalized TF-IDF vector.
    pub fn transform(&self, document: &str) -> Result<SparseVector> {
        self.ensure_fitted()?;

        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.terms_of(document)? {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let sublinear = self.config.sublinear_tf;
        let weights = counts.into_iter().map(|(idx, count)| {
            let tf = if sublinear { 1.0 + count.ln() } else { count };
            (idx, tf * self.idf[idx])
        });

        let mut vector = SparseVector::from_pairs(self.terms.len(), weights)?;
        vector.normalize_l2();
        Ok(vector)
    }

    /// Transform many documents in parallel, preserving order.
    pub fn transform_batch<S: AsRef<str> + Sync>(&self, documents: &[S]) -> Result<Vec<SparseVector>> {
        self.ensure_fitted()?;
        documents
            .par_iter()
            .map(|doc| self.transform(doc.as_ref()))
            .collect()
    }

    /// Fit on `documents`, then transform them.
    pub fn fit_transform<S: AsRef<str> + Sync>(&mut self, documents: &[S]) -> Result<Vec<SparseVector>> {
        self.fit(documents)?;
        self.transform_batch(documents)
    }

    /// Analyze `text` and expand its tokens into the configured n-grams.
    pub fn terms_of(&self, text: &str) -> Result<Vec<String>> {
        let tokens: Vec<String> = self.analyzer.analyze(text)?.map(|token| token.text).collect();
        Ok(ngrams(&tokens, self.config.ngram_range))
    }

    /// Whether the vectorizer has been fitted or loaded.
    pub fn is_fitted(&self) -> bool {
        !self.terms.is_empty()
    }

    /// Get the size of the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }

    /// Number of documents the vectorizer was fitted on.
    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// The term at feature `index`.
    pub fn feature_name(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    /// The feature index of `term`.
    pub fn feature_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Terms ordered by feature index.
    pub fn feature_names(&self) -> &[String] {
        &self.terms
    }

    /// IDF weight of feature `index`.
    pub fn idf(&self, index: usize) -> Option<f64> {
        self.idf.get(index).copied()
    }

    /// Training document frequency of feature `index`.
    pub fn document_frequency(&self, index: usize) -> Option<usize> {
        self.document_frequency.get(index).copied()
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    pub fn analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.analyzer
    }

    /// Snapshot the fitted state for persistence.
    pub fn to_state(&self) -> Result<VectorizerState> {
        self.ensure_fitted()?;
        Ok(VectorizerState {
            config: self.config.clone(),
            analyzer: self.analyzer.name().to_string(),
            terms: self.terms.clone(),
            document_frequency: self.document_frequency.clone(),
            n_documents: self.n_documents,
        })
    }

    /// Rebuild a fitted vectorizer from a persisted state.
    ///
    /// `analyzer` must be the analyzer the state was fitted with; a different
    /// analyzer would produce terms the vocabulary has never seen.
    pub fn from_state(state: VectorizerState, analyzer: Arc<dyn Analyzer>) -> Result<Self> {
        if state.analyzer != analyzer.name() {
            return Err(SentimentError::shape(format!(
                "vocabulary was built with analyzer '{}' but '{}' was supplied",
                state.analyzer,
                analyzer.name()
            )));
        }
        if state.terms.is_empty() {
            return Err(SentimentError::shape("vectorizer state has an empty vocabulary"));
        }
        if state.document_frequency.len() != state.terms.len() {
            return Err(SentimentError::shape(format!(
                "{} document frequencies for {} terms",
                state.document_frequency.len(),
                state.terms.len()
            )));
        }
        if let Some(&df) = state
            .document_frequency
            .iter()
            .find(|&&df| df == 0 || df > state.n_documents)
        {
            return Err(SentimentError::shape(format!(
                "document frequency {df} is impossible for {} documents",
                state.n_documents
            )));
        }
        let unique: HashSet<&str> = state.terms.iter().map(String::as_str).collect();
        if unique.len() != state.terms.len() {
            return Err(SentimentError::shape("vectorizer state has duplicate terms"));
        }

        let mut vectorizer = Self::new(state.config, analyzer);
        vectorizer.install(state.terms, state.document_frequency, state.n_documents);
        Ok(vectorizer)
    }

    fn install(&mut self, terms: Vec<String>, document_frequency: Vec<usize>, n_documents: usize) {
        let n = n_documents as f64;
        self.idf = document_frequency
            .iter()
            .map(|&df| ((n + 1.0) / (df as f64 + 1.0)).ln() + 1.0)
            .collect();
        self.vocabulary = terms
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.clone(), idx))
            .collect();
        self.terms = terms;
        self.document_frequency = document_frequency;
        self.n_documents = n_documents;
    }

    fn ensure_fitted(&self) -> Result<()> {
        if self.is_fitted() {
            Ok(())
        } else {
            Err(SentimentError::NotFitted("vectorizer"))
        }
    }
}

/// All n-grams of `tokens` with `min_n <= n <= max_n`, joined by single spaces.
fn ngrams(tokens: &[String], (min_n, max_n): (usize, usize)) -> Vec<String> {
    let mut out = Vec::new();
    for n in min_n.max(1)..=max_n {
        out.extend(tokens.windows(n).map(|window| window.join(" ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectorizer(config: VectorizerConfig) -> TfIdfVectorizer {
        TfIdfVectorizer::with_default_analyzer(config).unwrap()
    }

    fn corpus(docs: &[&str]) -> Vec<String> {
        docs.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_ngrams() {
        let tokens = corpus(&["a", "b", "c"]);
        assert_eq!(ngrams(&tokens, (1, 2)), vec!["a", "b", "c", "a b", "b c"]);
        assert_eq!(ngrams(&tokens, (2, 3)), vec!["a b", "b c", "a b c"]);
        assert!(ngrams(&[], (1, 2)).is_empty());
    }

    #[test]
    fn test_fit_builds_lexical_indices() {
        let mut v = vectorizer(VectorizerConfig::default());
        v.fit(&corpus(&["love phone", "hate phone"])).unwrap();

        assert_eq!(
            v.feature_names(),
            &["hate", "hate phone", "love", "love phone", "phone"]
        );
        assert_eq!(v.feature_index("phone"), Some(4));
        assert_eq!(v.document_frequency(4), Some(2));
        assert_eq!(v.n_documents(), 2);

        // df == N gives the minimum idf of exactly 1.
        assert_eq!(v.idf(4), Some(1.0));
        let rare = (3.0f64 / 2.0).ln() + 1.0;
        assert_eq!(v.idf(0), Some(rare));
    }

    #[test]
    fn test_cap_and_tie_breaking() {
        let config = VectorizerConfig::default()
            .with_ngram_range(1, 1)
            .with_max_features(Some(2));
        let mut v = vectorizer(config);
        v.fit(&corpus(&["good good good bad", "good bad ugly", "ugly nice"]))
            .unwrap();

        // good (4) wins; bad and ugly tie at 2 and bad is lexically first.
        assert_eq!(v.feature_names(), &["bad", "good"]);

        let mut again = vectorizer(
            VectorizerConfig::default()
                .with_ngram_range(1, 1)
                .with_max_features(Some(2)),
        );
        again
            .fit(&corpus(&["ugly nice", "good bad ugly", "good good good bad"]))
            .unwrap();
        assert_eq!(again.feature_names(), v.feature_names());
    }

    #[test]
    fn test_min_df() {
        let mut v = vectorizer(VectorizerConfig::default().with_ngram_range(1, 1).with_min_df(2));
        v.fit(&corpus(&["happy cat", "happy dog", "sad cat"])).unwrap();
        assert_eq!(v.feature_names(), &["cat", "happy"]);
    }

    #[test]
    fn test_transform_is_unit_length() {
        let mut v = vectorizer(VectorizerConfig::default());
        v.fit(&corpus(&["love this phone", "hate this phone", "phone battery"]))
            .unwrap();

        let features = v.transform("Love LOVE the phone!").unwrap();
        assert_eq!(features.dim(), v.vocabulary_size());
        assert!((features.l2_norm() - 1.0).abs() < 1e-9);
        assert!(features.iter().all(|(_, w)| w > 0.0));
    }

    #[test]
    fn test_unseen_and_empty_text() {
        let mut v = vectorizer(VectorizerConfig::default());
        v.fit(&corpus(&["love phone", "hate phone"])).unwrap();

        assert!(v.transform("").unwrap().is_zero());
        assert!(v.transform("completely unrelated words").unwrap().is_zero());
        assert_eq!(v.transform("").unwrap().dim(), 5);
    }

    #[test]
    fn test_sublinear_tf() {
        let config = VectorizerConfig::default().with_ngram_range(1, 1);
        let mut raw = vectorizer(config.clone());
        let mut sub = vectorizer(config.with_sublinear_tf(true));
        let docs = corpus(&["love phone", "hate phone"]);
        raw.fit(&docs).unwrap();
        sub.fit(&docs).unwrap();

        let text = "love love love phone";
        let love = raw.feature_index("love").unwrap();
        assert!(sub.transform(text).unwrap().get(love) < raw.transform(text).unwrap().get(love));
    }

    #[test]
    fn test_not_fitted() {
        let v = vectorizer(VectorizerConfig::default());
        let err = v.transform("hello").unwrap_err();
        assert!(matches!(err, SentimentError::NotFitted("vectorizer")));
        assert!(v.to_state().is_err());
    }

    #[test]
    fn test_fit_errors() {
        let mut v = vectorizer(VectorizerConfig::default());
        let empty: Vec<String> = Vec::new();
        assert!(v.fit(&empty).unwrap_err().is_input_error());

        let err = v.fit(&corpus(&["the and of", "@bob http://x.co"])).unwrap_err();
        assert!(err.is_input_error());
        assert!(!v.is_fitted());
    }

    #[test]
    fn test_config_validation() {
        assert!(VectorizerConfig::default().validate().is_ok());
        assert!(VectorizerConfig::default().with_max_features(Some(0)).validate().is_err());
        assert!(VectorizerConfig::default().with_ngram_range(2, 1).validate().is_err());
        assert!(VectorizerConfig::default().with_ngram_range(0, 1).validate().is_err());
        assert!(VectorizerConfig::default().with_min_df(0).validate().is_err());
    }

    #[test]
    fn test_state_round_trip() {
        let mut v = vectorizer(VectorizerConfig::default());
        v.fit(&corpus(&["love this phone", "hate this phone", "battery died fast"]))
            .unwrap();

        let state = v.to_state().unwrap();
        let restored = TfIdfVectorizer::from_state(state, Arc::clone(v.analyzer())).unwrap();

        for text in ["love phone battery", "", "hate hate phone"] {
            assert_eq!(v.transform(text).unwrap(), restored.transform(text).unwrap());
        }
    }

    #[test]
    fn test_state_validation() {
        let mut v = vectorizer(VectorizerConfig::default());
        v.fit(&corpus(&["love phone", "hate phone"])).unwrap();
        let analyzer = Arc::clone(v.analyzer());

        let mut state = v.to_state().unwrap();
        state.document_frequency.pop();
        assert!(TfIdfVectorizer::from_state(state, Arc::clone(&analyzer)).unwrap_err().is_state_error());

        let mut state = v.to_state().unwrap();
        state.terms[1] = state.terms[0].clone();
        assert!(TfIdfVectorizer::from_state(state, Arc::clone(&analyzer)).is_err());

        let mut state = v.to_state().unwrap();
        state.analyzer = "something_else".to_string();
        assert!(TfIdfVectorizer::from_state(state, analyzer).unwrap_err().is_state_error());
    }
}
