//! Label encoding between class names and dense indices.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SentimentError};

/// Maps class names to indices `0..len()` in sorted order.
///
/// ```
/// use tweet_sentiment::ml::label::LabelEncoder;
///
/// let encoder = LabelEncoder::fit(&["positive", "negative", "neutral", "positive"]).unwrap();
///
/// assert_eq!(encoder.classes(), &["negative", "neutral", "positive"]);
/// assert_eq!(encoder.encode("neutral").unwrap(), 1);
/// assert_eq!(encoder.decode(2).unwrap(), "positive");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Learn the sorted set of distinct labels.
    pub fn fit<S: AsRef<str>>(labels: &[S]) -> Result<Self> {
        if labels.is_empty() {
            return Err(SentimentError::input("cannot fit a label encoder on no labels"));
        }
        let mut classes: Vec<String> = labels.iter().map(|l| l.as_ref().to_string()).collect();
        classes.sort();
        classes.dedup();
        Ok(LabelEncoder { classes })
    }

    /// Rebuild an encoder from an already sorted, duplicate-free class list.
    pub fn from_classes(classes: Vec<String>) -> Result<Self> {
        let encoder = LabelEncoder { classes };
        encoder.validate()?;
        Ok(encoder)
    }

    /// Check that the classes are non-empty, sorted and distinct.
    pub fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(SentimentError::shape("label encoder has no classes"));
        }
        if self.classes.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(SentimentError::shape(
                "label encoder classes must be sorted and distinct",
            ));
        }
        Ok(())
    }

    /// Index of `label`.
    pub fn encode(&self, label: &str) -> Result<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .map_err(|_| SentimentError::UnknownLabel(label.to_string()))
    }

    /// Encode every label, failing on the first unknown one.
    pub fn encode_all<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>> {
        labels.iter().map(|l| self.encode(l.as_ref())).collect()
    }

    /// Label at `index`.
    pub fn decode(&self, index: usize) -> Result<&str> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or(SentimentError::IndexOutOfRange {
                index,
                len: self.classes.len(),
            })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
